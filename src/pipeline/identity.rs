use serde_json::{Map, Value};

use crate::hash::ContentHasher;
use crate::resource::scalar_string;

/// Providers whose records carry an ARN worth decomposing.
pub const ARN_PROVIDERS: &[&str] = &["aws", "ec2"];

/// Guarantees `_id` on `values` and links it to `source_id`.
///
/// `_id` precedence, first hit wins: an existing `_id`, the record's own
/// `id`, the ARN (for AWS providers), then a canonical content hash. The
/// hash never runs once an earlier rule has chosen the identifier, so the
/// same input state always yields the same `_id`.
pub fn resolve(
    mut values: Map<String, Value>,
    hasher: &dyn ContentHasher,
    source_id: Option<&str>,
) -> Map<String, Value> {
    if !has_id(&values) {
        if let Some(id) = values.get("id").and_then(scalar_string) {
            values.insert("_id".to_string(), Value::String(id));
        }
    }

    if is_arn_provider(&values) {
        if let Some(arn) = values.get("arn").and_then(scalar_string) {
            enrich_from_arn(&mut values, &arn);
        }
    }

    if !has_id(&values) {
        let digest = hasher.hash(&Value::Object(values.clone()));
        values.insert("_id".to_string(), Value::String(digest));
    }

    if let Some(parent) = source_id.filter(|p| !p.is_empty()) {
        values.insert("parent".to_string(), Value::String(parent.to_string()));
    }

    values
}

fn has_id(values: &Map<String, Value>) -> bool {
    values.get("_id").and_then(scalar_string).is_some()
}

fn is_arn_provider(values: &Map<String, Value>) -> bool {
    values
        .get("provider")
        .and_then(|p| p.as_str())
        .is_some_and(|p| ARN_PROVIDERS.contains(&p))
}

fn enrich_from_arn(values: &mut Map<String, Value>, arn: &str) {
    if values.get("region").and_then(scalar_string).is_none() {
        if let Some(region) = arn_region(arn) {
            values.insert("region".to_string(), Value::String(region.to_string()));
        }
    }

    if !has_id(values) {
        values.insert("_id".to_string(), Value::String(arn_to_id(arn)));
    }

    match values.get("tags") {
        Some(Value::Object(tags)) => {
            let collapsed: Vec<Value> = tags.values().cloned().collect();
            values.insert("tags".to_string(), Value::Array(collapsed));
        }
        Some(Value::Array(_)) | None => {}
        Some(_) => {
            values.remove("tags");
        }
    }
}

/// `arn:partition:service:region:account:resource` -> region, when present.
pub fn arn_region(arn: &str) -> Option<&str> {
    arn.split(':').nth(3).filter(|region| !region.is_empty())
}

pub fn arn_to_id(arn: &str) -> String {
    arn.replace([':', '/'], "_")
}
