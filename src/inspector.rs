//! Inspector view model
//!
//! Turns the payload of the applied step into one of a few render
//! strategies. The ranking hint is honoured only when the record really
//! carries a candidate list; anything else falls back to formatted JSON.

use crate::scenario::{DisplayHint, InspectorPayload, PayloadData};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A reranked retrieval candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub id: String,
    pub text: String,
    pub old_rank: u32,
    pub new_rank: u32,
    pub score: f64,
}

/// Render-ready inspector panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InspectorView {
    /// Nothing applied yet
    Idle,
    Ranking {
        title: String,
        description: String,
        model: Option<String>,
        candidates: Vec<RankedCandidate>,
    },
    Structured {
        title: String,
        description: String,
        body: String,
    },
    Text {
        title: String,
        description: String,
        body: String,
    },
}

impl InspectorView {
    /// Build the view for an optional payload
    pub fn from_payload(payload: Option<&InspectorPayload>) -> Self {
        let Some(payload) = payload else {
            return InspectorView::Idle;
        };
        let title = payload.title.clone();
        let description = payload.description.clone();

        if payload.display == Some(DisplayHint::Ranking) {
            if let Some(candidates) = ranking_candidates(payload) {
                let model = payload
                    .data
                    .get("model")
                    .and_then(|m| m.as_str())
                    .map(str::to_string);
                return InspectorView::Ranking {
                    title,
                    description,
                    model,
                    candidates,
                };
            }
            warn!("Payload '{}' declares ranking display without a candidate list", payload.title);
        }

        match &payload.data {
            PayloadData::Structured(map) => InspectorView::Structured {
                title,
                description,
                body: serde_json::to_string_pretty(map).unwrap_or_default(),
            },
            PayloadData::Text(text) => InspectorView::Text {
                title,
                description,
                body: text.clone(),
            },
        }
    }
}

/// Extract the candidate list of a ranking payload, if it has a valid one
pub fn ranking_candidates(payload: &InspectorPayload) -> Option<Vec<RankedCandidate>> {
    let candidates = payload.data.get("candidates")?;
    serde_json::from_value(candidates.clone()).ok()
}
