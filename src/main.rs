//! FitAdvisor Coach Engine server.
//!
//! # Usage
//!
//! ```bash
//! # Run with defaults (data in ./fitadvisor_data, port 4000)
//! cargo run --release
//!
//! # Custom bind address and data directory
//! cargo run --release -- --addr 127.0.0.1:8080 --data-dir /var/lib/fitadvisor
//! ```
//!
//! # Environment Variables
//!
//! - `FITADVISOR_CONFIG`: path to a TOML config file
//! - `FITADVISOR_CORS_ORIGINS`: comma-separated allowed CORS origins
//! - `RUST_LOG`: logging level (default: info)

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use fitadvisor::api::{create_app, AppState};
use fitadvisor::config::{self, EngineConfig};
use fitadvisor::ml_engine::CoachEngine;
use fitadvisor::storage::SledMlStore;

#[derive(Parser, Debug)]
#[command(name = "fitadvisor")]
#[command(about = "FitAdvisor Coach Engine - activity clustering and coaching recommendations")]
#[command(version)]
struct CliArgs {
    /// Override the server bind address (default from config, "0.0.0.0:4000")
    #[arg(short, long)]
    addr: Option<String>,

    /// Override the durable storage directory
    #[arg(long, value_name = "DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Load configuration from a specific TOML file
    #[arg(short, long, value_name = "FILE", env = "FITADVISOR_CONFIG")]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = CliArgs::parse();

    let mut engine_config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => EngineConfig::load(),
    };
    if let Some(dir) = args.data_dir {
        engine_config.storage.data_dir = dir;
    }
    let addr = args.addr.unwrap_or_else(|| {
        format!(
            "{}:{}",
            engine_config.server.host, engine_config.server.port
        )
    });

    let store = SledMlStore::open(&engine_config.storage.data_dir).with_context(|| {
        format!(
            "failed to open ML store at {} (is another instance running?)",
            engine_config.storage.data_dir.display()
        )
    })?;
    let store = Arc::new(store);

    let engine = Arc::new(CoachEngine::new(
        store.clone(),
        store,
        engine_config.ml.clone(),
    ));
    config::init(engine_config);

    let state = AppState::new(engine);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "FitAdvisor coach engine listening");

    axum::serve(listener, app)
        .await
        .context("server terminated")?;

    Ok(())
}
