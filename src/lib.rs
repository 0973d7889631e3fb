//! FitAdvisor Coach Engine
//!
//! Backend core for activity-cluster coaching recommendations.
//!
//! ## Architecture
//!
//! - **ML Engine**: k-means clustering of (steps, avgHr) observations with
//!   seeded, reproducible training and online retraining
//! - **Storage**: append-only sample log plus a durable cluster rule table
//!   (hand-authored content, learned centroids)
//! - **API**: Axum HTTP surface for analyze / ingest / learn / retrain

pub mod api;
pub mod config;
pub mod error;
pub mod ml_engine;
pub mod storage;
pub mod types;

// Re-export configuration
pub use config::{EngineConfig, MlConfig};

// Re-export commonly used types
pub use types::{
    Centroid, ClusterAssignment, ClusterRule, FeatureStats, RulePatch, RuleTable, Sample,
};

// Re-export engine components
pub use error::EngineError;
pub use ml_engine::{
    build_coach_message, predict_cluster, train_kmeans, Analysis, CoachEngine, CoachInput,
};

// Re-export storage
pub use storage::{MemoryStore, RuleStore, SampleStore, SledMlStore, StoreError};
