//! Sled-backed sample log and rule table.
//!
//! One database, two trees: `ml_samples` holds the append-only sample log
//! keyed by a monotonic id (insertion order preserved), `cluster_rules`
//! holds the whole rule table as a single JSON record. A table write is one
//! `insert` plus a flush, so readers never see a half-written table.

use std::path::Path;
use std::sync::Arc;

use sled::Tree;

use super::{RuleStore, SampleStore, StoreError};
use crate::types::{RuleTable, Sample};

const SAMPLES_TREE: &str = "ml_samples";
const RULES_TREE: &str = "cluster_rules";
const RULES_KEY: &[u8] = b"current";

/// Durable store backing the server binary.
#[derive(Clone)]
pub struct SledMlStore {
    db: Arc<sled::Db>,
    samples: Tree,
    rules: Tree,
}

impl SledMlStore {
    /// Open or create the store at `path`.
    ///
    /// Seeds the built-in default rule table on first open so prediction
    /// works before any retrain has run.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        let db = sled::open(path_ref)?;
        let samples = db.open_tree(SAMPLES_TREE)?;
        let rules = db.open_tree(RULES_TREE)?;

        let store = Self {
            db: Arc::new(db),
            samples,
            rules,
        };

        if store.rules.get(RULES_KEY)?.is_none() {
            store.write(&RuleTable::default())?;
            tracing::info!(path = ?path_ref, "Seeded default rule table");
        }

        tracing::info!(path = ?path_ref, samples = store.samples.len(), "ML store opened");
        Ok(store)
    }
}

impl SampleStore for SledMlStore {
    fn append(&self, sample: &Sample) -> Result<u64, StoreError> {
        // generate_id() is monotonic, so big-endian keys keep insertion order
        let id = self.db.generate_id()?;
        let bytes = serde_json::to_vec(sample)?;
        self.samples.insert(id.to_be_bytes(), bytes)?;

        let count = self.samples.len() as u64;
        tracing::debug!(
            steps = sample.steps,
            avg_hr = sample.avg_hr,
            count = count,
            "Sample recorded"
        );
        Ok(count)
    }

    fn read_all(&self) -> Result<Vec<Sample>, StoreError> {
        let mut out = Vec::with_capacity(self.samples.len());
        for item in self.samples.iter() {
            let (_key, value) = item?;
            match serde_json::from_slice::<Sample>(&value) {
                Ok(sample) => out.push(sample),
                Err(e) => {
                    // A corrupt record must not poison a whole retrain
                    tracing::warn!(error = %e, "Skipping undecodable sample record");
                }
            }
        }
        Ok(out)
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.samples.len() as u64)
    }
}

impl RuleStore for SledMlStore {
    fn read(&self) -> Result<RuleTable, StoreError> {
        match self.rules.get(RULES_KEY)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(RuleTable::default()),
        }
    }

    fn write(&self, table: &RuleTable) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(table)?;
        self.rules.insert(RULES_KEY, bytes)?;
        self.rules.flush()?;
        Ok(())
    }
}
