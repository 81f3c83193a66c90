use std::path::Path;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::{InventoryStore, StoreError};
use crate::pipeline::MatchCriteria;
use crate::resource::NormalizedResource;

/// In-process inventory. Candidates match when every criteria key equals the
/// record's field of the same name; written records are keyed by `_id`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    resources: Vec<Value>,
    added: Mutex<Vec<NormalizedResource>>,
}

impl MemoryStore {
    pub fn new(resources: Vec<Value>) -> Self {
        Self {
            resources,
            added: Mutex::new(Vec::new()),
        }
    }

    /// Loads a JSON file holding either one resource or an array of them.
    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::Decode {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|e| StoreError::Decode {
            message: format!("failed to parse {}: {}", path.display(), e),
        })?;

        let resources = match value {
            Value::Array(items) => items,
            single => vec![single],
        };
        Ok(Self::new(resources))
    }

    /// Records written so far, in first-write order.
    pub fn added(&self) -> Vec<NormalizedResource> {
        self.added
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_resource(&self, criteria: &MatchCriteria) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .resources
            .iter()
            .filter(|resource| {
                criteria
                    .query()
                    .iter()
                    .all(|(key, expected)| resource.get(key) == Some(expected))
            })
            .cloned()
            .collect())
    }

    async fn add_resource(&self, record: &NormalizedResource) -> Result<String, StoreError> {
        // A panicked writer leaves the list itself intact.
        let mut added = self.added.lock().unwrap_or_else(PoisonError::into_inner);

        match added.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => added.push(record.clone()),
        }
        Ok(record.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ContextFields;
    use serde_json::json;

    fn record(id: &str, name: &str) -> NormalizedResource {
        NormalizedResource {
            resource_type: "compute_node".to_string(),
            name: name.to_string(),
            values: serde_json::Map::new(),
            id: id.to_string(),
            parent: None,
            labels: None,
            tags: None,
            context: ContextFields::default(),
            human_description: format!("compute_node {}", id),
        }
    }

    #[tokio::test]
    async fn test_get_resource_matches_on_criteria_fields() {
        let store = MemoryStore::new(vec![
            json!({"_id": "a", "resource_type": "terraform_state", "vpc": "vpc-1"}),
            json!({"_id": "b", "resource_type": "terraform_state", "vpc": "vpc-2"}),
            json!({"_id": "c", "resource_type": "other"}),
        ]);
        let criteria = MatchCriteria::builder("terraform_state").vpc("vpc-2").build();
        let found = store.get_resource(&criteria).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["_id"], "b");
    }

    #[tokio::test]
    async fn test_add_resource_overwrites_same_id() {
        let store = MemoryStore::default();
        store.add_resource(&record("i-1", "first")).await.unwrap();
        store.add_resource(&record("i-2", "other")).await.unwrap();
        store.add_resource(&record("i-1", "second")).await.unwrap();

        let added = store.added();
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].name, "second");
        assert_eq!(added[1].id, "i-2");
    }

    #[tokio::test]
    async fn test_override_must_exist_key_not_matched() {
        let store = MemoryStore::new(vec![json!({"_id": "a", "resource_type": "tf_bundle"})]);
        let raw = json!({"resource_type": "tf_bundle", "must_exist": true});
        let criteria = MatchCriteria::from_override(raw.as_object().unwrap().clone());
        assert_eq!(store.get_resource(&criteria).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_writes_survive_poisoned_lock() {
        let store = std::sync::Arc::new(MemoryStore::default());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.added.lock().unwrap();
            panic!("writer panicked");
        })
        .join();

        store.add_resource(&record("i-1", "web")).await.unwrap();
        assert_eq!(store.added().len(), 1);
    }

    #[test]
    fn test_from_file_accepts_single_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        std::fs::write(&path, r#"{"_id": "s", "resource_type": "terraform_state"}"#).unwrap();
        let store = MemoryStore::from_file(&path).unwrap();
        assert_eq!(store.resources.len(), 1);
    }

    #[test]
    fn test_from_file_missing_is_decode_error() {
        let err = MemoryStore::from_file(Path::new("/nonexistent/inventory.json")).unwrap_err();
        assert!(matches!(err, StoreError::Decode { .. }));
    }
}
