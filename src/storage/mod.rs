//! Persistent storage for the sample log and the cluster rule table.
//!
//! Both stores are abstracted behind traits so backends can be swapped
//! without touching engine code:
//! - `SledMlStore`: durable sled backend used by the server binary
//! - `MemoryStore`: in-memory store for tests and minimal deployments
//!
//! The rule table write contract is atomic replace: readers always observe
//! a fully-formed table, never a partial one.

mod memory;
mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledMlStore;

use crate::types::{RuleTable, Sample};

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("store lock poisoned")]
    Poisoned,
}

impl From<sled::Error> for StoreError {
    fn from(e: sled::Error) -> Self {
        Self::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Append-only log of (steps, heart-rate) observations.
///
/// Implementations must be thread-safe (Send + Sync) for shared access
/// across request handlers.
pub trait SampleStore: Send + Sync {
    /// Append a sample; returns the updated sample count.
    fn append(&self, sample: &Sample) -> Result<u64, StoreError>;

    /// Read the full log in insertion order. Bulk read used only at
    /// retrain time.
    fn read_all(&self) -> Result<Vec<Sample>, StoreError>;

    /// Current number of recorded samples.
    fn count(&self) -> Result<u64, StoreError>;
}

/// Durable home of the cluster rule table.
pub trait RuleStore: Send + Sync {
    /// Read the current table.
    fn read(&self) -> Result<RuleTable, StoreError>;

    /// Replace the table atomically.
    fn write(&self, table: &RuleTable) -> Result<(), StoreError>;
}
