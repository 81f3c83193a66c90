//! tfinv - Terraform state to inventory extractor
//!
//! Locates a source resource holding Terraform state in an inventory store,
//! walks its resource instances and writes each one back as a normalized
//! record with a stable identifier and a link to its source.

pub mod config;
pub mod error;
pub mod hash;
pub mod output;
pub mod pipeline;
pub mod resource;
pub mod store;
pub mod terraform;

pub use config::Config;
pub use error::ExtractError;
pub use hash::{ContentHasher, Sha256Hasher};
pub use pipeline::{ExtractConfig, ExtractInput, ExtractReport, MatchCriteria, Pipeline};
pub use resource::{ContextFields, NormalizedResource, SourceResource};
pub use store::{HttpStore, InventoryStore, MemoryStore, StoreError};
pub use terraform::{FilterSpec, StateDocument};
