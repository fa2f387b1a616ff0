//! payroll-server - HTTP front end for the payroll engine.
//!
//! Loads the YAML configuration, optionally seeds the in-memory store, and
//! serves the payroll API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;
use payroll_engine::payroll::PayrollEngine;
use payroll_engine::store::InMemoryStore;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// payroll-server - attendance payroll API
#[derive(Parser, Debug)]
#[command(name = "payroll-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config/payroll.yaml")]
    config: PathBuf,

    /// Address to listen on, overriding server.bind_address
    #[arg(long)]
    bind: Option<String>,

    /// Seed file to load, overriding seed_file
    #[arg(long)]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = ConfigLoader::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let config = loader.config();

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let store = match cli.seed.as_ref().or(config.seed_file.as_ref()) {
        Some(path) => {
            let seed = ConfigLoader::load_seed(path)
                .with_context(|| format!("failed to load seed {}", path.display()))?;
            let store = InMemoryStore::from_seed(seed)
                .with_context(|| format!("seed {} is inconsistent", path.display()))?;
            info!(
                seed = %path.display(),
                employees = store.employee_count()?,
                "In-memory store seeded"
            );
            store
        }
        None => InMemoryStore::new(),
    };

    let engine = PayrollEngine::new(Arc::new(store), config.payroll.clone());
    let router = create_router(AppState::new(engine));

    let bind_address = cli.bind.unwrap_or_else(|| config.server.bind_address.clone());
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    info!(
        address = %bind_address,
        hours_per_day = config.payroll.hours_per_day,
        currency_scale = config.payroll.currency_scale,
        "payroll-server listening"
    );

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
