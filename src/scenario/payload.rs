//! Inspector payloads attached to each step

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rendering hint declared by a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayHint {
    /// Before/after rank and score table over `data.candidates`
    Ranking,
}

/// The body of an inspector payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadData {
    /// Plain text shown verbatim
    Text(String),
    /// A structured record shown as formatted JSON
    Structured(Map<String, Value>),
}

impl PayloadData {
    /// Wrap a JSON value; objects become records, anything else is shown as text
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(map) => PayloadData::Structured(map),
            Value::String(s) => PayloadData::Text(s),
            other => PayloadData::Text(other.to_string()),
        }
    }

    pub fn as_record(&self) -> Option<&Map<String, Value>> {
        match self {
            PayloadData::Structured(map) => Some(map),
            PayloadData::Text(_) => None,
        }
    }

    /// Field lookup on a structured payload
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_record().and_then(|m| m.get(key))
    }
}

/// What the inspector panel shows for an applied step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectorPayload {
    pub title: String,
    pub description: String,
    #[serde(rename = "visual_type", skip_serializing_if = "Option::is_none", default)]
    pub display: Option<DisplayHint>,
    pub data: PayloadData,
}

impl InspectorPayload {
    pub fn new(title: impl Into<String>, description: impl Into<String>, data: PayloadData) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            display: None,
            data,
        }
    }

    /// Payload with a structured JSON record
    pub fn record(title: impl Into<String>, description: impl Into<String>, data: Value) -> Self {
        Self::new(title, description, PayloadData::from_json(data))
    }

    /// Payload with plain text
    pub fn text(title: impl Into<String>, description: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(title, description, PayloadData::Text(text.into()))
    }

    pub fn with_display(mut self, hint: DisplayHint) -> Self {
        self.display = Some(hint);
        self
    }
}
