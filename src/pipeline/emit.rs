use serde_json::{Map, Value};

use crate::resource::{ContextFields, NormalizedResource, scalar_string};
use crate::store::{InventoryStore, StoreError};

/// Builds the persisted record for one resolved value set.
///
/// Context fields are mirrored at the top level so the store can index on
/// either the record or its `values`.
pub fn assemble(
    values: Map<String, Value>,
    context: &ContextFields,
    labels: Option<&Value>,
    tags: Option<&Value>,
) -> NormalizedResource {
    let id = values
        .get("_id")
        .and_then(scalar_string)
        .unwrap_or_default();
    let resource_type = values
        .get("resource_type")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let name = values
        .get("name")
        .and_then(scalar_string)
        .unwrap_or_else(|| id.clone());
    let parent = values.get("parent").and_then(scalar_string);

    NormalizedResource {
        human_description: describe(&resource_type, &id),
        resource_type,
        name,
        values,
        id,
        parent,
        labels: labels.cloned(),
        tags: tags.cloned(),
        context: context.clone(),
    }
}

pub fn describe(resource_type: &str, id: &str) -> String {
    format!("{} {}", resource_type, id)
}

/// One store write per record, no retry.
pub async fn emit(
    store: &dyn InventoryStore,
    record: &NormalizedResource,
) -> Result<String, StoreError> {
    let stored_id = store.add_resource(record).await?;
    tracing::debug!(
        id = %record.id,
        resource_type = %record.resource_type,
        parent = record.parent.as_deref().unwrap_or(""),
        "record emitted"
    );
    Ok(stored_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn values() -> Map<String, Value> {
        json!({
            "_id": "i-1",
            "resource_type": "compute_node",
            "name": "web",
            "parent": "state-1",
            "cluster": "prod"
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn test_assemble_record() {
        let ctx = ContextFields {
            cluster: Some("prod".to_string()),
            ..Default::default()
        };
        let labels = json!(["web", "public"]);
        let record = assemble(values(), &ctx, Some(&labels), None);

        assert_eq!(record.id, "i-1");
        assert_eq!(record.resource_type, "compute_node");
        assert_eq!(record.name, "web");
        assert_eq!(record.parent.as_deref(), Some("state-1"));
        assert_eq!(record.labels, Some(labels));
        assert!(record.tags.is_none());
        assert_eq!(record.context.cluster.as_deref(), Some("prod"));
        assert_eq!(record.values["cluster"], "prod");
        assert_eq!(record.human_description, "compute_node i-1");
    }

    #[test]
    fn test_assemble_name_falls_back_to_id() {
        let mut v = values();
        v.remove("name");
        let record = assemble(v, &ContextFields::default(), None, None);
        assert_eq!(record.name, "i-1");
    }

    #[tokio::test]
    async fn test_emit_writes_once() {
        let store = MemoryStore::default();
        let record = assemble(values(), &ContextFields::default(), None, None);
        let id = emit(&store, &record).await.unwrap();
        assert_eq!(id, "i-1");
        assert_eq!(store.added(), vec![record]);
    }
}
