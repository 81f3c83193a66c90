mod error;
mod http;
mod memory;

pub use error::StoreError;
pub use http::HttpStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::pipeline::MatchCriteria;
use crate::resource::NormalizedResource;

/// The external inventory that holds source resources and receives
/// normalized records.
///
/// `add_resource` must be safe under concurrent calls and idempotent for a
/// repeated `_id`.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    fn name(&self) -> &str;

    /// Candidates matching `criteria`, in the store's own order.
    async fn get_resource(&self, criteria: &MatchCriteria) -> Result<Vec<Value>, StoreError>;

    /// Persists `record`, returning the stored record id.
    async fn add_resource(&self, record: &NormalizedResource) -> Result<String, StoreError>;
}
