//! Fixed pipeline diagram
//!
//! The diagram is a small directed graph of named infrastructure nodes.
//! Nothing here is mutable: the layout and the edge set are compiled in,
//! and every display flag is derived on demand from
//! (topology, running scenario, highlighted node/edge).

use crate::scenario::ScenarioName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of the pipeline diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    /// Document source (object store change feed)
    Source,
    /// Stream buffer
    Kafka,
    /// Stream processor
    Flink,
    /// Embedding service
    Embedding,
    /// Vector index
    VectorDb,
    /// Cache and conversation memory
    Redis,
    /// Retriever
    Retriever,
    /// Cross-encoder reranker
    Reranker,
    /// Language model
    Llm,
    /// Query origin
    User,
}

impl NodeId {
    /// Every node in diagram order
    pub const ALL: [NodeId; 10] = [
        NodeId::Source,
        NodeId::Kafka,
        NodeId::Flink,
        NodeId::Embedding,
        NodeId::VectorDb,
        NodeId::Redis,
        NodeId::Retriever,
        NodeId::Reranker,
        NodeId::Llm,
        NodeId::User,
    ];

    /// Stable identifier used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeId::Source => "source",
            NodeId::Kafka => "kafka",
            NodeId::Flink => "flink",
            NodeId::Embedding => "embedding",
            NodeId::VectorDb => "vector_db",
            NodeId::Redis => "redis",
            NodeId::Retriever => "retriever",
            NodeId::Reranker => "reranker",
            NodeId::Llm => "llm",
            NodeId::User => "user",
        }
    }

    /// Label drawn inside the node box
    pub fn label(&self) -> &'static str {
        match self {
            NodeId::Source => "Data Source",
            NodeId::Kafka => "Kafka Stream",
            NodeId::Flink => "Flink Processor",
            NodeId::Embedding => "Embedding Service",
            NodeId::VectorDb => "Vector DB",
            NodeId::Redis => "Redis Cache",
            NodeId::Retriever => "Retriever",
            NodeId::Reranker => "Reranker",
            NodeId::Llm => "LLM",
            NodeId::User => "User",
        }
    }

    /// Top-left corner of the node box in diagram coordinates
    pub fn position(&self) -> (u32, u32) {
        match self {
            NodeId::Source => (40, 60),
            NodeId::Kafka => (200, 60),
            NodeId::Flink => (360, 60),
            NodeId::Embedding => (520, 160),
            NodeId::VectorDb => (680, 60),
            NodeId::User => (40, 320),
            NodeId::Redis => (200, 320),
            NodeId::Retriever => (360, 260),
            NodeId::Reranker => (680, 260),
            NodeId::Llm => (520, 380),
        }
    }

    /// Whether the node is the language model (the step that triggers a real answer)
    pub fn is_language_model(&self) -> bool {
        matches!(self, NodeId::Llm)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed edge between two diagram nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Node the packet leaves
    pub from: NodeId,
    /// Node the packet arrives at
    pub to: NodeId,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Which scenario(s) route traffic over a diagram edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowMembership {
    Ingestion,
    Query,
    Both,
}

impl FlowMembership {
    pub fn includes(&self, flow: ScenarioName) -> bool {
        matches!(
            (self, flow),
            (FlowMembership::Both, _)
                | (FlowMembership::Ingestion, ScenarioName::Ingestion)
                | (FlowMembership::Query, ScenarioName::Query)
        )
    }
}

/// An edge of the static diagram together with its flow membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagramEdge {
    pub edge: Edge,
    pub flow: FlowMembership,
}

const fn diagram_edge(from: NodeId, to: NodeId, flow: FlowMembership) -> DiagramEdge {
    DiagramEdge {
        edge: Edge { from, to },
        flow,
    }
}

/// The full edge set of the diagram
pub const EDGES: [DiagramEdge; 13] = [
    diagram_edge(NodeId::Source, NodeId::Kafka, FlowMembership::Ingestion),
    diagram_edge(NodeId::Kafka, NodeId::Flink, FlowMembership::Ingestion),
    diagram_edge(NodeId::Flink, NodeId::Embedding, FlowMembership::Ingestion),
    diagram_edge(NodeId::Embedding, NodeId::VectorDb, FlowMembership::Both),
    diagram_edge(NodeId::User, NodeId::Redis, FlowMembership::Query),
    diagram_edge(NodeId::Redis, NodeId::Retriever, FlowMembership::Query),
    diagram_edge(NodeId::Retriever, NodeId::Embedding, FlowMembership::Query),
    diagram_edge(NodeId::Embedding, NodeId::Redis, FlowMembership::Query),
    diagram_edge(NodeId::Redis, NodeId::VectorDb, FlowMembership::Query),
    diagram_edge(NodeId::VectorDb, NodeId::Reranker, FlowMembership::Query),
    diagram_edge(NodeId::Reranker, NodeId::Llm, FlowMembership::Query),
    diagram_edge(NodeId::Llm, NodeId::Redis, FlowMembership::Query),
    diagram_edge(NodeId::Redis, NodeId::User, FlowMembership::Query),
];

/// Look up an edge of the diagram
pub fn find_edge(edge: Edge) -> Option<&'static DiagramEdge> {
    EDGES.iter().find(|e| e.edge == edge)
}

/// Whether a diagram edge carries traffic for the running flow
pub fn edge_in_flow(edge: &DiagramEdge, flow: Option<ScenarioName>) -> bool {
    flow.map(|f| edge.flow.includes(f)).unwrap_or(false)
}

/// Whether a node touches at least one edge of the running flow
pub fn node_in_flow(node: NodeId, flow: Option<ScenarioName>) -> bool {
    EDGES
        .iter()
        .any(|e| (e.edge.from == node || e.edge.to == node) && edge_in_flow(e, flow))
}

/// Render-ready node state
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub id: NodeId,
    pub label: &'static str,
    pub x: u32,
    pub y: u32,
    pub selected: bool,
    pub in_active_flow: bool,
}

/// Render-ready edge state
#[derive(Debug, Clone, Serialize)]
pub struct EdgeView {
    pub from: NodeId,
    pub to: NodeId,
    pub in_active_flow: bool,
    pub animating: bool,
}

/// Everything a diagram renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct DiagramView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

/// Derive the diagram view for the current highlight state
pub fn diagram_view(
    flow: Option<ScenarioName>,
    active_node: Option<NodeId>,
    active_edge: Option<Edge>,
) -> DiagramView {
    let nodes = NodeId::ALL
        .iter()
        .map(|&id| {
            let (x, y) = id.position();
            NodeView {
                id,
                label: id.label(),
                x,
                y,
                selected: active_node == Some(id),
                in_active_flow: node_in_flow(id, flow),
            }
        })
        .collect();

    let edges = EDGES
        .iter()
        .map(|e| EdgeView {
            from: e.edge.from,
            to: e.edge.to,
            in_active_flow: edge_in_flow(e, flow),
            animating: active_edge == Some(e.edge),
        })
        .collect();

    DiagramView { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ids_round_trip_through_serde() {
        let json = serde_json::to_string(&NodeId::VectorDb).unwrap();
        assert_eq!(json, "\"vector_db\"");
        for node in NodeId::ALL {
            let value = serde_json::to_value(node).unwrap();
            assert_eq!(value.as_str(), Some(node.as_str()));
        }
    }

    #[test]
    fn test_edges_are_unique() {
        for (i, a) in EDGES.iter().enumerate() {
            for b in &EDGES[i + 1..] {
                assert_ne!(a.edge, b.edge, "duplicate diagram edge {}", a.edge);
            }
        }
    }

    #[test]
    fn test_shared_edge_active_in_both_flows() {
        let shared = find_edge(Edge::new(NodeId::Embedding, NodeId::VectorDb)).unwrap();
        assert!(edge_in_flow(shared, Some(ScenarioName::Ingestion)));
        assert!(edge_in_flow(shared, Some(ScenarioName::Query)));
        assert!(!edge_in_flow(shared, None));
    }

    #[test]
    fn test_node_flow_membership() {
        assert!(node_in_flow(NodeId::Kafka, Some(ScenarioName::Ingestion)));
        assert!(!node_in_flow(NodeId::Kafka, Some(ScenarioName::Query)));
        assert!(node_in_flow(NodeId::Reranker, Some(ScenarioName::Query)));
        assert!(!node_in_flow(NodeId::Reranker, Some(ScenarioName::Ingestion)));
        assert!(!node_in_flow(NodeId::Embedding, None));
    }

    #[test]
    fn test_diagram_view_marks_selection_and_animation() {
        let edge = Edge::new(NodeId::Kafka, NodeId::Flink);
        let view = diagram_view(Some(ScenarioName::Ingestion), Some(NodeId::Flink), Some(edge));

        assert_eq!(view.nodes.len(), NodeId::ALL.len());
        assert_eq!(view.edges.len(), EDGES.len());

        let selected: Vec<_> = view.nodes.iter().filter(|n| n.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, NodeId::Flink);

        let animating: Vec<_> = view.edges.iter().filter(|e| e.animating).collect();
        assert_eq!(animating.len(), 1);
        assert_eq!((animating[0].from, animating[0].to), (NodeId::Kafka, NodeId::Flink));
    }

    #[test]
    fn test_idle_diagram_has_no_flags() {
        let view = diagram_view(None, None, None);
        assert!(view.nodes.iter().all(|n| !n.selected && !n.in_active_flow));
        assert!(view.edges.iter().all(|e| !e.animating && !e.in_active_flow));
    }
}
