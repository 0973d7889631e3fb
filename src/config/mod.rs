//! Engine configuration loaded from TOML.
//!
//! ## Loading order
//!
//! 1. `FITADVISOR_CONFIG` environment variable (path to TOML file)
//! 2. `fitadvisor.toml` in the current working directory
//! 3. Built-in defaults (matching the deployed model constants)
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere.
//! The [`CoachEngine`](crate::ml_engine::CoachEngine) takes its [`MlConfig`]
//! by value instead, so engine tests never touch the global.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::engine_defaults;

/// Root configuration for a deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// HTTP server binding
    #[serde(default)]
    pub server: ServerConfig,

    /// Clustering and retraining parameters
    #[serde(default)]
    pub ml: MlConfig,

    /// Durable storage location
    #[serde(default)]
    pub storage: StorageConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Clustering and retraining parameters.
///
/// The seed is fixed, not re-randomized, so repeated retrains on the same
/// sample population are reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlConfig {
    /// Number of activity clusters
    #[serde(default = "default_k")]
    pub k: usize,
    /// Maximum Lloyd iterations per training run
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// Training seed
    #[serde(default = "default_seed")]
    pub seed: i64,
    /// Automatic retrain fires on every Nth sample; 0 disables the trigger
    #[serde(default = "default_retrain_every")]
    pub retrain_every: u64,
    /// Retrain floor, stricter than the trainer's own `>= k` precondition
    #[serde(default = "default_min_retrain_samples")]
    pub min_retrain_samples: usize,
}

fn default_k() -> usize {
    engine_defaults::CLUSTER_COUNT
}

fn default_max_iter() -> usize {
    engine_defaults::MAX_ITER
}

fn default_seed() -> i64 {
    engine_defaults::TRAIN_SEED
}

fn default_retrain_every() -> u64 {
    engine_defaults::RETRAIN_EVERY
}

fn default_min_retrain_samples() -> usize {
    engine_defaults::MIN_RETRAIN_SAMPLES
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            max_iter: default_max_iter(),
            seed: default_seed(),
            retrain_every: default_retrain_every(),
            min_retrain_samples: default_min_retrain_samples(),
        }
    }
}

/// Durable storage location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./fitadvisor_data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl EngineConfig {
    /// Load configuration using the standard search order.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("FITADVISOR_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from FITADVISOR_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from FITADVISOR_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "FITADVISOR_CONFIG points to non-existent file, falling back");
            }
        }

        let local = Path::new("fitadvisor.toml");
        if local.exists() {
            match Self::load_from_file(local) {
                Ok(config) => {
                    info!(path = %local.display(), "Loaded config from working directory");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse fitadvisor.toml, using defaults");
                }
            }
        }

        info!("Using built-in default configuration");
        Self::default()
    }

    /// Parse a specific TOML file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

/// Global configuration, initialized once at startup.
static ENGINE_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Initialize the global configuration. Later calls are ignored with a
/// warning so tests can call it freely.
pub fn init(config: EngineConfig) {
    if ENGINE_CONFIG.set(config).is_err() {
        warn!("config::init() called more than once, ignoring");
    }
}

/// Get the global configuration, falling back to defaults when `init()` has
/// not run (tests, library embedding).
pub fn get() -> &'static EngineConfig {
    ENGINE_CONFIG.get_or_init(EngineConfig::default)
}

/// Whether `init()` has run.
pub fn is_initialized() -> bool {
    ENGINE_CONFIG.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployed_model() {
        let config = EngineConfig::default();
        assert_eq!(config.ml.k, 3);
        assert_eq!(config.ml.max_iter, 30);
        assert_eq!(config.ml.seed, 42);
        assert_eq!(config.ml.retrain_every, 20);
        assert_eq!(config.ml.min_retrain_samples, 3);
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let parsed: EngineConfig = toml::from_str(
            r#"
            [ml]
            retrain_every = 50

            [server]
            port = 8080
            "#,
        )
        .unwrap();
        assert_eq!(parsed.ml.retrain_every, 50);
        assert_eq!(parsed.ml.k, 3);
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.server.host, "0.0.0.0");
    }
}
