//! Core types: Sample, Centroid, ClusterRule, RuleTable, FeatureStats, etc.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed engine constants matching the deployed model.
pub mod engine_defaults {
    /// Number of activity clusters (fixed at initialization)
    pub const CLUSTER_COUNT: usize = 3;
    /// Maximum Lloyd iterations per training run
    pub const MAX_ITER: usize = 30;
    /// Fixed training seed so repeated refits on the same samples are reproducible
    pub const TRAIN_SEED: i64 = 42;
    /// Automatic retrain fires on every Nth recorded sample
    pub const RETRAIN_EVERY: u64 = 20;
    /// Minimum sample population before any retrain is attempted
    pub const MIN_RETRAIN_SAMPLES: usize = 3;
    /// Daily step target offset applied on top of a cluster's learned steps
    pub const TARGET_STEPS_OFFSET: f64 = 1000.0;
}

/// A single (steps, heart-rate) observation. Immutable once recorded;
/// appended to the sample log on every successful analyze/ingest/learn request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    /// Daily step count at observation time
    pub steps: f64,
    /// Average heart rate (bpm)
    pub avg_hr: f64,
    /// When the sample was recorded
    pub created_at: DateTime<Utc>,
}

impl Sample {
    /// Build a sample stamped with the current time.
    pub fn new(steps: f64, avg_hr: f64) -> Self {
        Self {
            steps,
            avg_hr,
            created_at: Utc::now(),
        }
    }
}

/// A cluster center in raw (non-standardized) units.
///
/// Produced only by the trainer; ephemeral until merged into the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub avg_hr: f64,
    pub steps: f64,
}

/// Durable, authoritative mapping from a cluster id to user-facing
/// recommendation content.
///
/// Training may overwrite `avg_hr`, `steps` and `target_steps` (via
/// [`RulePatch`]); `id`, `title`, `tips` and `zone_pct` are hand-authored
/// and outlive any retraining.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterRule {
    /// Numeric string id, "1".."k"; fixed at initialization
    pub id: String,
    /// Short activity-level title shown to the user
    pub title: String,
    /// Hand-authored coaching tips
    pub tips: Vec<String>,
    /// Heart-rate zone as fractions of max HR, `[low, high]`
    pub zone_pct: [f64; 2],
    /// Learned centroid heart rate (bpm)
    pub avg_hr: f64,
    /// Learned centroid step count
    pub steps: f64,
    /// Daily step target derived from the centroid
    pub target_steps: f64,
}

/// The mutable fields a retrain is allowed to write into a [`ClusterRule`].
///
/// Everything not named here is hand-authored and immutable by construction.
#[derive(Debug, Clone, Copy)]
pub struct RulePatch {
    pub avg_hr: f64,
    pub steps: f64,
    pub target_steps: f64,
}

impl ClusterRule {
    /// Apply a retrain patch, leaving all hand-authored fields untouched.
    pub fn apply(&mut self, patch: RulePatch) {
        self.avg_hr = patch.avg_hr;
        self.steps = patch.steps;
        self.target_steps = patch.target_steps;
    }
}

/// The full rule table. Iteration order is table order, which is also the
/// tie-break order for nearest-centroid prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTable {
    pub clusters: Vec<ClusterRule>,
}

impl RuleTable {
    /// Look up a rule by its numeric string id.
    pub fn get(&self, id: u32) -> Option<&ClusterRule> {
        let wanted = id.to_string();
        self.clusters.iter().find(|r| r.id == wanted)
    }

    /// Number of clusters (k).
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

impl Default for RuleTable {
    /// Built-in 3-cluster table used until the first retrain overwrites the
    /// learned numeric fields. Titles and tips are hand-authored copy.
    fn default() -> Self {
        Self {
            clusters: vec![
                ClusterRule {
                    id: "1".to_string(),
                    title: "Dusuk Tempo".to_string(),
                    tips: vec![
                        "Gun icine kisa yuruyus molalari ekle.".to_string(),
                        "Asansor yerine merdiveni tercih et.".to_string(),
                    ],
                    zone_pct: [0.50, 0.60],
                    avg_hr: 72.0,
                    steps: 3000.0,
                    target_steps: 4000.0,
                },
                ClusterRule {
                    id: "2".to_string(),
                    title: "Dengeli Tempo".to_string(),
                    tips: vec![
                        "Haftada 3 gun tempolu yuruyus yap.".to_string(),
                        "Isinma ve sogumayi atlama.".to_string(),
                    ],
                    zone_pct: [0.60, 0.70],
                    avg_hr: 110.0,
                    steps: 8000.0,
                    target_steps: 9000.0,
                },
                ClusterRule {
                    id: "3".to_string(),
                    title: "Yuksek Tempo".to_string(),
                    tips: vec![
                        "Yuklenme gunlerinin arasina dinlenme koy.".to_string(),
                        "Nabiz bandindan cikmamaya dikkat et.".to_string(),
                    ],
                    zone_pct: [0.70, 0.85],
                    avg_hr: 150.0,
                    steps: 14000.0,
                    target_steps: 15000.0,
                },
            ],
        }
    }
}

/// Standardization statistics over a 2-D point set.
///
/// Derived transiently from whatever set is being standardized (rule
/// centroids for prediction, the sample population for training). Never
/// persisted. Population std, floored at 1.0 when variance is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStats {
    pub mean_hr: f64,
    pub mean_steps: f64,
    pub std_hr: f64,
    pub std_steps: f64,
}

/// Output of prediction: rule-table id (1-based) plus the zero-based
/// internal index used during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClusterAssignment {
    /// 1-based id matching the rule table
    pub cluster_id: u32,
    /// 0-based index in table iteration order
    pub index: usize,
}
