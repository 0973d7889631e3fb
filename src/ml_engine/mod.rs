//! K-means activity clustering engine.
//!
//! Classifies a user's (steps, avgHr) observation into one of k activity
//! clusters and periodically refits the cluster centers from accumulated
//! samples. One fixed feature pair, squared Euclidean distance in
//! standardized space, small fixed k.
//!
//! ## Architecture
//! - `standardizer`: z-score normalization, leaf used by both paths
//! - `rng`: Park-Miller LCG for reproducible seeded initialization
//! - `trainer`: Lloyd's algorithm over the full sample population
//! - `predictor`: nearest-centroid classification over rule centroids
//! - `retrainer`: `CoachEngine` orchestration (record / trigger / merge)
//! - `coach`: deterministic coaching-message assembly
//! - `hr_zones`: age-based heart-rate zone helpers

pub mod coach;
pub mod hr_zones;
pub mod predictor;
pub mod retrainer;
pub mod rng;
pub mod standardizer;
pub mod trainer;

pub use coach::{build_coach_message, CoachInput};
pub use hr_zones::{estimate_max_hr, zone_range, ZONE_NOTE};
pub use predictor::predict_cluster;
pub use retrainer::{Analysis, CoachEngine, RecordOutcome};
pub use rng::Lcg;
pub use trainer::train_kmeans;
