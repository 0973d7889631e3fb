//! Retraining orchestrator.
//!
//! `CoachEngine` glues the sample log, the k-means trainer and the rule
//! table together: it records observations, decides when to retrain
//! (every Nth sample), and merges freshly learned centroids back onto the
//! persisted rule table without touching its hand-authored fields.
//!
//! Retraining is single-flight: the automatic path skips when a run is
//! already in progress, the manual path waits for it. A failed automatic
//! retrain is logged and swallowed so serving continues on the
//! last-known-good table; a manual retrain surfaces its error.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use super::coach::{build_coach_message, CoachInput};
use super::hr_zones::zone_range;
use super::predictor::predict_cluster;
use super::trainer::train_kmeans;
use crate::config::MlConfig;
use crate::error::EngineError;
use crate::storage::{RuleStore, SampleStore, StoreError};
use crate::types::{engine_defaults, RulePatch, RuleTable, Sample};

/// Result of recording one observation.
#[derive(Debug, Clone, Copy)]
pub struct RecordOutcome {
    /// Updated sample count
    pub count: u64,
    /// Whether this append triggered a successful retrain
    pub retrained: bool,
}

/// Full analysis of one observation, ready for rendering.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub cluster_id: u32,
    pub title: String,
    pub message: String,
    pub target_steps: f64,
    pub tips: Vec<String>,
    pub zone_pct: [f64; 2],
    pub zone_bpm_range: Option<[u32; 2]>,
    pub sample_count: u64,
    pub retrained: bool,
}

/// Orchestrates sample recording, prediction and periodic retraining.
pub struct CoachEngine {
    samples: Arc<dyn SampleStore>,
    rules: Arc<dyn RuleStore>,
    config: MlConfig,
    // Single-flight discipline for retraining
    retrain_gate: Mutex<()>,
}

impl CoachEngine {
    pub fn new(
        samples: Arc<dyn SampleStore>,
        rules: Arc<dyn RuleStore>,
        config: MlConfig,
    ) -> Self {
        Self {
            samples,
            rules,
            config,
            retrain_gate: Mutex::new(()),
        }
    }

    /// Append one observation to the sample log and run the automatic
    /// retrain check. Recording always succeeds if storage succeeds; a
    /// failed automatic retrain never propagates.
    pub fn record_sample(&self, steps: f64, avg_hr: f64) -> Result<RecordOutcome, EngineError> {
        if !steps.is_finite() || !avg_hr.is_finite() {
            return Err(EngineError::InvalidInput(
                "steps and avgHr must be finite numbers".to_string(),
            ));
        }

        let count = self.samples.append(&Sample::new(steps, avg_hr))?;
        let retrained = self.maybe_retrain(count);
        Ok(RecordOutcome { count, retrained })
    }

    /// Threshold check plus swallow-and-log execution. Returns whether a
    /// retrain ran to completion.
    fn maybe_retrain(&self, count: u64) -> bool {
        let every = self.config.retrain_every;
        if every == 0 || count < every || count % every != 0 {
            return false;
        }

        // Skip if another retrain is in flight
        let Ok(_guard) = self.retrain_gate.try_lock() else {
            info!(count = count, "Retrain already in progress, skipping trigger");
            return false;
        };

        match self.retrain() {
            Ok(table) => {
                info!(count = count, clusters = table.len(), "Automatic retrain complete");
                true
            }
            Err(e) => {
                // Serving continues on the last-known-good rule table
                warn!(count = count, error = %e, "Automatic retrain failed");
                false
            }
        }
    }

    /// Explicit manual retrain. Waits for any in-flight run, then surfaces
    /// every failure to the caller.
    pub fn retrain_now(&self) -> Result<RuleTable, EngineError> {
        let _guard = self
            .retrain_gate
            .lock()
            .map_err(|_| EngineError::Persistence(StoreError::Poisoned))?;
        self.retrain()
    }

    /// One full retrain: read the sample population, refit centroids, and
    /// merge them into the rule table sorted ascending by step count.
    ///
    /// All-or-nothing with respect to durable state: the previous table is
    /// replaced by exactly one atomic write, so any failure before it
    /// leaves the published table untouched.
    fn retrain(&self) -> Result<RuleTable, EngineError> {
        let samples = self.samples.read_all()?;
        if samples.len() < self.config.min_retrain_samples {
            return Err(EngineError::InsufficientData {
                needed: self.config.min_retrain_samples,
                got: samples.len(),
            });
        }

        let mut centroids = train_kmeans(
            &samples,
            self.config.k,
            self.config.max_iter,
            self.config.seed,
        )?;
        centroids.sort_by(|a, b| a.steps.total_cmp(&b.steps));

        let mut table = self.rules.read()?;
        for (index, centroid) in centroids.iter().enumerate() {
            let id = (index + 1).to_string();
            match table.clusters.iter_mut().find(|r| r.id == id) {
                Some(rule) => rule.apply(RulePatch {
                    avg_hr: centroid.avg_hr,
                    steps: centroid.steps,
                    target_steps: centroid.steps + engine_defaults::TARGET_STEPS_OFFSET,
                }),
                None => warn!(id = %id, "No rule entry for trained centroid, dropping it"),
            }
        }

        self.rules.write(&table)?;
        Ok(table)
    }

    /// Classify an observation against the current rule table.
    pub fn predict(&self, steps: f64, avg_hr: f64) -> Result<u32, EngineError> {
        let table = self.rules.read()?;
        Ok(predict_cluster(&table, steps, avg_hr)?.cluster_id)
    }

    /// Full analyze flow: record the observation (running the automatic
    /// retrain check), classify it against the then-current table, and
    /// assemble the recommendation.
    pub fn analyze(
        &self,
        steps: f64,
        avg_hr: f64,
        age: Option<f64>,
        weight: Option<f64>,
    ) -> Result<Analysis, EngineError> {
        let outcome = self.record_sample(steps, avg_hr)?;
        let mut analysis = self.recommend(steps, avg_hr, age, weight)?;
        analysis.sample_count = outcome.count;
        analysis.retrained = outcome.retrained;
        Ok(analysis)
    }

    /// Read-only variant of [`analyze`](Self::analyze): classify and render
    /// without recording a sample. Used when re-serving the last snapshot.
    pub fn recommend(
        &self,
        steps: f64,
        avg_hr: f64,
        age: Option<f64>,
        weight: Option<f64>,
    ) -> Result<Analysis, EngineError> {
        let table = self.rules.read()?;
        let assignment = predict_cluster(&table, steps, avg_hr)?;
        let rule = table.get(assignment.cluster_id).ok_or_else(|| {
            EngineError::InvalidInput(format!(
                "no rule for cluster {}",
                assignment.cluster_id
            ))
        })?;

        let zone_bpm_range = zone_range(rule.zone_pct, age);
        let target_steps = steps + engine_defaults::TARGET_STEPS_OFFSET;
        let message = build_coach_message(&CoachInput {
            cluster_id: assignment.cluster_id,
            rule,
            steps,
            avg_hr,
            age,
            weight,
            zone_bpm_range,
            target_steps: Some(target_steps),
        });

        Ok(Analysis {
            cluster_id: assignment.cluster_id,
            title: rule.title.clone(),
            message,
            target_steps,
            tips: rule.tips.clone(),
            zone_pct: rule.zone_pct,
            zone_bpm_range,
            sample_count: self.samples.count()?,
            retrained: false,
        })
    }

    /// Snapshot of the current rule table.
    pub fn rules(&self) -> Result<RuleTable, EngineError> {
        Ok(self.rules.read()?)
    }

    /// Current sample count.
    pub fn sample_count(&self) -> Result<u64, EngineError> {
        Ok(self.samples.count()?)
    }
}
