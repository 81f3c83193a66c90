use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ExtractError;
use crate::terraform::StateDocument;

/// Execution context carried into every emitted record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ContextFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_instance_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl ContextFields {
    /// Set, non-empty fields in their canonical order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("provider", &self.provider),
            ("cluster", &self.cluster),
            ("instance", &self.instance),
            ("schedule_id", &self.schedule_id),
            ("job_instance_id", &self.job_instance_id),
            ("run_id", &self.run_id),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        })
        .collect()
    }
}

/// A record returned by the inventory store that embeds Terraform state
/// under `raw.terraform`.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceResource {
    pub id: Option<String>,
    pub state: StateDocument,
}

impl SourceResource {
    pub fn from_record(record: &Value) -> Result<Self, ExtractError> {
        let id = record.get("_id").and_then(scalar_string);

        let raw_state = record
            .get("raw")
            .and_then(|raw| raw.get("terraform"))
            .ok_or_else(|| ExtractError::InvalidState {
                message: format!(
                    "source resource {} has no raw.terraform",
                    id.as_deref().unwrap_or("<no _id>")
                ),
            })?;

        // Some stores keep the state as the raw JSON text.
        let state = match raw_state {
            Value::String(text) => serde_json::from_str(text),
            other => StateDocument::from_value(other.clone()),
        }
        .map_err(|e| ExtractError::InvalidState {
            message: format!("failed to decode terraform state: {}", e),
        })?;

        Ok(Self { id, state })
    }
}

/// The record written to the inventory store for one matched instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NormalizedResource {
    pub resource_type: String,
    pub name: String,
    pub values: Map<String, Value>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(flatten)]
    pub context: ContextFields,
    pub human_description: String,
}

/// Reads a scalar JSON value as an identifier string. Empty strings count
/// as absent.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
