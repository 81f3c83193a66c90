pub mod state;

pub use state::{FilterSpec, InstanceRecord, ResourceBlock, StateDocument};
