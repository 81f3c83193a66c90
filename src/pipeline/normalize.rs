use serde_json::{Map, Value};

use crate::resource::{ContextFields, scalar_string};

/// Caller-supplied edits applied to every matched instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformSpec {
    /// Set unconditionally.
    pub add_values: Map<String, Value>,
    /// `source_key -> target_key`; copies when the source key is present.
    pub mapping: Vec<(String, String)>,
}

impl TransformSpec {
    /// Mapping entries whose target is not a string are skipped.
    pub fn from_objects(add_values: Map<String, Value>, mapping: Map<String, Value>) -> Self {
        let mapping = mapping
            .into_iter()
            .filter_map(|(source, target)| match target {
                Value::String(target) => Some((source, target)),
                other => {
                    tracing::warn!(
                        source = %source,
                        target = %other,
                        "mapping target is not a string, skipping"
                    );
                    None
                }
            })
            .collect();

        Self { add_values, mapping }
    }

    pub fn is_empty(&self) -> bool {
        self.add_values.is_empty() && self.mapping.is_empty()
    }
}

/// Parses `raw` as a JSON object, logging and returning `None` otherwise.
pub(crate) fn parse_object(field: &str, raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(obj)) => Some(obj),
        Ok(other) => {
            tracing::warn!(field, got = %other, "expected a JSON object, ignoring");
            None
        }
        Err(e) => {
            tracing::warn!(field, error = %e, "malformed JSON, ignoring");
            None
        }
    }
}

/// Everything the normalizer needs besides the instance itself.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeInput<'a> {
    pub target_type: &'a str,
    pub vpc: Option<&'a str>,
    pub context: &'a ContextFields,
    pub transform: &'a TransformSpec,
}

/// Merges instance attributes with the run's context and transform. Steps
/// run in a fixed order since later ones read fields earlier ones set.
pub fn normalize(
    attributes: &Map<String, Value>,
    input: &NormalizeInput<'_>,
    block_name: Option<&str>,
) -> Map<String, Value> {
    let mut values = attributes.clone();

    values.insert(
        "resource_type".to_string(),
        Value::String(input.target_type.to_string()),
    );

    if let Some(vpc) = input.vpc.filter(|v| !v.is_empty()) {
        values.insert("vpc".to_string(), Value::String(vpc.to_string()));
    }

    for (key, value) in &input.transform.add_values {
        values.insert(key.clone(), value.clone());
    }

    for (source, target) in &input.transform.mapping {
        if let Some(value) = values.get(source).cloned() {
            values.insert(target.clone(), value);
        }
    }

    // State files write unset attributes as null.
    if values.get("name").and_then(scalar_string).is_none() {
        if let Some(name) = block_name {
            values.insert("name".to_string(), Value::String(name.to_string()));
        }
    }

    for (key, value) in input.context.entries() {
        values.insert(key.to_string(), Value::String(value.to_string()));
    }

    values
}
