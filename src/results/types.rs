//! Suggestion type definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::history::HistoryEntry;

/// A GeoJSON feature as returned by a remote backend
///
/// Only `properties.label` is interpreted; everything else is carried as
/// opaque payload so that a submitted feature equals what the backend sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub properties: FeatureProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    /// Remaining top-level members (e.g. `type`)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Feature {
    /// Create a feature with only a label
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            id: None,
            properties: FeatureProperties {
                label: label.into(),
                extra: Map::new(),
            },
            geometry: None,
            bbox: None,
            extra: Map::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.properties.label
    }
}

/// Feature properties: a mandatory label plus opaque metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub label: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Feature collection envelope shared by the GeoJSON backends
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// One entry of a suggestion list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SuggestionItem {
    /// Feature returned by a remote backend
    Remote { source: String, feature: Feature },
    /// Previously submitted selection replayed from history
    History(HistoryEntry),
    /// Result of the caller-supplied source
    Additional { result: Value },
}

impl SuggestionItem {
    pub fn remote(source: impl Into<String>, feature: Feature) -> Self {
        Self::Remote {
            source: source.into(),
            feature,
        }
    }

    pub fn additional(result: Value) -> Self {
        Self::Additional { result }
    }

    /// Name of the source that produced this item
    pub fn source(&self) -> &str {
        match self {
            Self::Remote { source, .. } => source,
            Self::History(_) => "history",
            Self::Additional { .. } => crate::sources::ADDITIONAL_SOURCE,
        }
    }

    /// The payload handed to the host on submit, with any tagging removed
    pub fn payload(&self) -> Value {
        match self {
            Self::Remote { feature, .. } => {
                serde_json::to_value(feature).unwrap_or(Value::Null)
            }
            Self::History(entry) => entry.item.payload(),
            Self::Additional { result } => result.clone(),
        }
    }

    /// Strip history wrapping
    pub fn into_unwrapped(self) -> SuggestionItem {
        match self {
            Self::History(entry) => entry.item.into_unwrapped(),
            other => other,
        }
    }

    pub fn is_history(&self) -> bool {
        matches!(self, Self::History(_))
    }
}

/// Per-source response timing information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timing {
    /// Source name
    pub source: String,
    /// Response time in milliseconds
    pub time_ms: u64,
    /// Number of suggestions returned
    pub result_count: usize,
}

/// Source failure types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum SourceError {
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("Failed to parse response: {0}")]
    Parse(String),
    #[error("Invalid source configuration: {0}")]
    Config(String),
    #[error("Additional source failed: {0}")]
    Caller(String),
}

/// A source that contributed nothing because it failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: String,
    pub error: SourceError,
}
