//! Engine error taxonomy.
//!
//! Three failure classes cross the engine boundary: invalid numeric input
//! (fail fast, surfaced to the caller), insufficient data for a training
//! run, and persistence failures from the sample log or rule table.
//! Automatic threshold-triggered retrains swallow and log the latter two;
//! an explicit manual retrain surfaces them.

use crate::storage::StoreError;

/// Errors exposed by the clustering and retraining engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Non-finite or missing numeric input to predict/analyze
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Too few samples to train
    #[error("insufficient data: need at least {needed} samples, have {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Sample log or rule table read/write failure
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl EngineError {
    /// Stable machine-readable code for the API envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}
