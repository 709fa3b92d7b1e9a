use proptest::prelude::*;
use rag_explorer::topology::find_edge;
use rag_explorer::{build_scenario, NodeId, PayloadData, ScenarioName};

fn scenario_name() -> impl Strategy<Value = ScenarioName> {
    prop_oneof![Just(ScenarioName::Ingestion), Just(ScenarioName::Query)]
}

proptest! {
    #[test]
    fn positions_are_contiguous_from_zero(name in scenario_name(), tenant in "[A-Za-z0-9 _-]{1,24}") {
        let scenario = build_scenario(name, &tenant);
        prop_assert!(!scenario.is_empty());
        for (i, step) in scenario.steps().iter().enumerate() {
            prop_assert_eq!(step.position, i);
        }
        prop_assert!(scenario.steps()[0].edge.is_none());
    }

    #[test]
    fn edges_continue_from_previous_node(name in scenario_name(), tenant in "\\PC{1,16}") {
        let scenario = build_scenario(name, &tenant);
        for pair in scenario.steps().windows(2) {
            let edge = pair[1].edge.expect("every step after the first has an edge");
            prop_assert_eq!(edge.from, pair[0].node);
            prop_assert_eq!(edge.to, pair[1].node);
            prop_assert!(find_edge(edge).is_some());
        }
    }

    #[test]
    fn tenant_never_changes_shape(name in scenario_name(), a in "[a-z]{1,12}", b in "[A-Z]{1,12}") {
        let left = build_scenario(name, &a);
        let right = build_scenario(name, &b);
        prop_assert_eq!(left.len(), right.len());
        for (l, r) in left.steps().iter().zip(right.steps()) {
            prop_assert_eq!(l.node, r.node);
            prop_assert_eq!(l.edge, r.edge);
            prop_assert_eq!(&l.payload.title, &r.payload.title);
        }
    }

    #[test]
    fn generation_is_deterministic(name in scenario_name(), tenant in "[A-Za-z ]{1,20}") {
        prop_assert_eq!(build_scenario(name, &tenant), build_scenario(name, &tenant));
    }
}

#[test]
fn test_every_node_is_a_diagram_node() {
    for name in [ScenarioName::Ingestion, ScenarioName::Query] {
        for step in build_scenario(name, "T-800").steps() {
            assert!(NodeId::ALL.contains(&step.node));
        }
    }
}

#[test]
fn test_first_steps_never_designate_the_language_model() {
    for name in [ScenarioName::Ingestion, ScenarioName::Query] {
        let scenario = build_scenario(name, "T-800");
        assert!(!scenario.steps()[0].node.is_language_model());
    }
}

#[test]
fn test_query_scenario_has_exactly_one_generation_step() {
    let scenario = build_scenario(ScenarioName::Query, "T-800");
    let llm_steps: Vec<_> = scenario
        .steps()
        .iter()
        .filter(|s| s.node.is_language_model())
        .collect();
    assert_eq!(llm_steps.len(), 1);
    assert_eq!(llm_steps[0].position, 7);
}

#[test]
fn test_final_query_step_is_plain_text() {
    let scenario = build_scenario(ScenarioName::Query, "T-800");
    let last = &scenario.steps()[scenario.last_position()];
    assert_eq!(last.node, NodeId::User);
    assert!(matches!(last.payload.data, PayloadData::Text(ref t) if t.contains("20 days")));
}
