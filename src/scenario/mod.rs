//! Scenario tables
//!
//! A scenario is a hand-authored, tenant-parameterized sequence of steps.
//! Tables are rebuilt on every call; the tenant id only shows up inside
//! strings and payload fields and never changes the shape of a scenario.

mod ingestion;
pub mod payload;
mod query;

pub use payload::{DisplayHint, InspectorPayload, PayloadData};

use crate::topology::{Edge, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Scenario errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    /// Name is neither "ingestion" nor "query"
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;

/// The two simulated pipeline runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioName {
    Ingestion,
    Query,
}

impl ScenarioName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioName::Ingestion => "ingestion",
            ScenarioName::Query => "query",
        }
    }
}

impl fmt::Display for ScenarioName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioName {
    type Err = ScenarioError;

    fn from_str(s: &str) -> ScenarioResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ingestion" => Ok(ScenarioName::Ingestion),
            "query" => Ok(ScenarioName::Query),
            _ => Err(ScenarioError::UnknownScenario(s.to_string())),
        }
    }
}

/// One stage of a scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    /// Zero-based position within the scenario
    pub position: usize,
    /// Diagram node highlighted by this step
    pub node: NodeId,
    /// Edge animated into `node`; absent on the first step
    pub edge: Option<Edge>,
    /// Console line describing the step
    pub log_line: String,
    /// What the inspector shows
    pub payload: InspectorPayload,
}

/// An ordered, immutable run of steps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    name: ScenarioName,
    tenant_id: String,
    steps: Vec<StepRecord>,
}

impl Scenario {
    pub fn name(&self) -> ScenarioName {
        self.name
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn get(&self, position: usize) -> Option<&StepRecord> {
        self.steps.get(position)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Position of the final step
    pub fn last_position(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// Assembles a scenario, assigning positions and flow edges as steps are appended
///
/// Each appended step receives the edge `previous.node -> node`, so flow
/// continuity holds for every table built through here.
pub(crate) struct ScenarioBuilder {
    name: ScenarioName,
    tenant_id: String,
    steps: Vec<StepRecord>,
}

impl ScenarioBuilder {
    pub(crate) fn new(name: ScenarioName, tenant_id: &str) -> Self {
        Self {
            name,
            tenant_id: tenant_id.to_string(),
            steps: Vec::new(),
        }
    }

    pub(crate) fn step(
        mut self,
        node: NodeId,
        log_line: impl Into<String>,
        payload: InspectorPayload,
    ) -> Self {
        let edge = self.steps.last().map(|prev| Edge::new(prev.node, node));
        self.steps.push(StepRecord {
            position: self.steps.len(),
            node,
            edge,
            log_line: log_line.into(),
            payload,
        });
        self
    }

    pub(crate) fn build(self) -> Scenario {
        Scenario {
            name: self.name,
            tenant_id: self.tenant_id,
            steps: self.steps,
        }
    }
}

/// Build the step sequence of a scenario for a tenant
pub fn build_scenario(name: ScenarioName, tenant_id: &str) -> Scenario {
    debug_assert!(!tenant_id.is_empty(), "tenant id must not be empty");
    match name {
        ScenarioName::Ingestion => ingestion::steps(tenant_id),
        ScenarioName::Query => query::steps(tenant_id),
    }
}
