//! In-memory store for tests and minimal deployments.
//!
//! Thread-safe via `RwLock`. Not durable — data lost on restart.

use std::sync::RwLock;

use super::{RuleStore, SampleStore, StoreError};
use crate::types::{RuleTable, Sample};

pub struct MemoryStore {
    samples: RwLock<Vec<Sample>>,
    rules: RwLock<RuleTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            samples: RwLock::new(Vec::new()),
            rules: RwLock::new(RuleTable::default()),
        }
    }

    /// Start from a specific rule table instead of the built-in default.
    pub fn with_rules(table: RuleTable) -> Self {
        Self {
            samples: RwLock::new(Vec::new()),
            rules: RwLock::new(table),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleStore for MemoryStore {
    fn append(&self, sample: &Sample) -> Result<u64, StoreError> {
        let mut log = self.samples.write().map_err(|_| StoreError::Poisoned)?;
        log.push(sample.clone());
        Ok(log.len() as u64)
    }

    fn read_all(&self) -> Result<Vec<Sample>, StoreError> {
        let log = self.samples.read().map_err(|_| StoreError::Poisoned)?;
        Ok(log.clone())
    }

    fn count(&self) -> Result<u64, StoreError> {
        let log = self.samples.read().map_err(|_| StoreError::Poisoned)?;
        Ok(log.len() as u64)
    }
}

impl RuleStore for MemoryStore {
    fn read(&self) -> Result<RuleTable, StoreError> {
        let table = self.rules.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.clone())
    }

    fn write(&self, table: &RuleTable) -> Result<(), StoreError> {
        let mut current = self.rules.write().map_err(|_| StoreError::Poisoned)?;
        *current = table.clone();
        Ok(())
    }
}
