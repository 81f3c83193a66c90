use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalize::parse_object;
use super::{ExtractConfig, MatchCriteria, PipelinePolicy, TieBreak, TransformSpec};
use crate::resource::ContextFields;
use crate::terraform::FilterSpec;

/// Sentinel the orchestration layer uses for "not supplied".
pub const NULL_SENTINEL: &str = "null";

/// One extraction job as handed over by the orchestration layer: loosely
/// typed, with `"null"` standing in for absent values. Structured fields
/// (`add_values`, `mapping`, `match`, `labels`, `tags`, `filter_names`)
/// accept either JSON text or an already-structured value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExtractInput {
    /// Type of the records produced.
    pub resource_type: String,
    /// Type of the source resource to look up; defaults to `resource_type`.
    #[serde(default)]
    pub src_resource_type: Option<String>,
    /// Terraform type matched in the state; defaults to `resource_type`.
    #[serde(default)]
    pub terraform_type: Option<String>,
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(default, alias = "mode")]
    pub terraform_mode: Option<String>,
    #[serde(default)]
    pub vpc: Option<String>,
    #[serde(default, alias = "must_exist")]
    pub must_exists: Option<bool>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default, rename = "match")]
    pub match_override: Option<Value>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub filter_names: Option<Value>,
    #[serde(default)]
    pub add_values: Option<Value>,
    #[serde(default)]
    pub mapping: Option<Value>,
    #[serde(default)]
    pub labels: Option<Value>,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub schedule_id: Option<String>,
    #[serde(default)]
    pub job_instance_id: Option<String>,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub tie_break: Option<TieBreak>,
}

impl ExtractInput {
    pub fn into_config(self) -> ExtractConfig {
        let src_type = present(self.src_resource_type).unwrap_or_else(|| self.resource_type.clone());
        let terraform_type = present(self.terraform_type).unwrap_or_else(|| self.resource_type.clone());
        let provider = present(self.provider);
        let vpc = present(self.vpc);

        let criteria = match as_object("match", self.match_override) {
            Some(raw) => MatchCriteria::from_override(raw),
            None => {
                let mut builder = MatchCriteria::builder(src_type)
                    .must_exist(self.must_exists.unwrap_or(true));
                if let Some(id) = present(self.id) {
                    builder = builder.id(id);
                }
                if let Some(provider) = &provider {
                    builder = builder.provider(provider.clone());
                }
                if let Some(vpc) = &vpc {
                    builder = builder.vpc(vpc.clone());
                }
                builder.build()
            }
        };

        let mut filter = FilterSpec::new(terraform_type);
        if let Some(mode) = present(self.terraform_mode) {
            filter = filter.with_mode(mode);
        }
        // A block must pass both `resource_name` and `filter_names`.
        let allowlist = match (present(self.resource_name), names(self.filter_names)) {
            (Some(name), Some(names)) => Some(names.into_iter().filter(|n| *n == name).collect()),
            (Some(name), None) => Some(vec![name]),
            (None, names) => names,
        };
        if let Some(allowlist) = allowlist {
            filter = filter.with_names(allowlist);
        }

        let transform = TransformSpec::from_objects(
            as_object("add_values", self.add_values).unwrap_or_default(),
            as_object("mapping", self.mapping).unwrap_or_default(),
        );

        let context = ContextFields {
            provider,
            cluster: present(self.cluster),
            instance: present(self.instance),
            schedule_id: present(self.schedule_id),
            job_instance_id: present(self.job_instance_id),
            run_id: present(self.run_id),
        };

        ExtractConfig {
            resource_type: self.resource_type,
            criteria,
            filter,
            vpc,
            context,
            transform,
            labels: list(self.labels).map(Value::Array),
            tags: list(self.tags).map(Value::Array),
            policy: PipelinePolicy {
                tie_break: self.tie_break.unwrap_or_default(),
            },
        }
    }
}

/// Drops the `"null"` sentinel and empty strings.
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != NULL_SENTINEL)
}

/// Resolves JSON text to a value; text that is not JSON stays a string and
/// structured values pass through. `null` and the sentinel mean absent.
fn structured(value: Option<Value>) -> Option<Value> {
    match value? {
        Value::Null => None,
        Value::String(text) => {
            let text = present(Some(text))?;
            Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
        }
        other => Some(other),
    }
}

fn as_object(field: &str, value: Option<Value>) -> Option<serde_json::Map<String, Value>> {
    match structured(value)? {
        Value::Object(obj) => Some(obj),
        // Not JSON: let the parser report why.
        Value::String(text) => parse_object(field, &text),
        other => {
            tracing::warn!(field, got = %other, "expected a JSON object, ignoring");
            None
        }
    }
}

/// Lists accept a JSON array, a comma-separated string, or a single scalar.
/// Objects are kept whole as a one-element list.
fn list(value: Option<Value>) -> Option<Vec<Value>> {
    let items = match structured(value)? {
        Value::Array(items) => items,
        Value::String(text) => text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()))
            .collect(),
        other => vec![other],
    };
    Some(items).filter(|items| !items.is_empty())
}

/// Block names are plain text: a comma-separated string or a JSON array.
/// Scalars such as `true` or `1` are names too. An empty list means no filter.
fn names(value: Option<Value>) -> Option<Vec<String>> {
    let names: Vec<String> = match value? {
        Value::Null => return None,
        Value::String(text) => {
            let text = present(Some(text))?;
            match serde_json::from_str::<Value>(&text) {
                Ok(Value::Array(items)) => items.iter().filter_map(name_text).collect(),
                _ => text
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            }
        }
        Value::Array(items) => items.iter().filter_map(name_text).collect(),
        other => name_text(&other).into_iter().collect(),
    };
    Some(names).filter(|names| !names.is_empty())
}

fn name_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => {
            tracing::warn!(got = %other, "block name is not a scalar, ignoring");
            None
        }
    }
}
