//! release-catalog server
//!
//! Usage: `release-catalog [config.json]`
//!
//! The config path may also come from `RELEASE_CATALOG_CONFIG`; without one the
//! defaults are used. `TMDB_API_KEY` overrides `tmdb.api_key`. Log verbosity
//! follows `RUST_LOG` (default `info`).

use release_catalog::api::AppState;
use release_catalog::{Config, Result, TmdbSource, run_with_shutdown};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "RELEASE_CATALOG_CONFIG";
const API_KEY_ENV: &str = "TMDB_API_KEY";

#[tokio::main]
async fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "release-catalog exited with an error");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = load_config()?;
    config.validate()?;

    tracing::info!(
        lookback_days = config.catalog.lookback_days,
        page_size = config.catalog.page_size,
        region = %config.catalog.canonical_region,
        concurrency = config.catalog.validation_concurrency,
        "Configuration loaded"
    );

    let source = Arc::new(TmdbSource::new(config.tmdb.clone())?);
    let state = AppState::new(Arc::new(config), source);

    run_with_shutdown(state).await
}

fn load_config() -> Result<Config> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok());

    let mut config = match path {
        Some(path) => {
            tracing::info!(path = %path, "Loading configuration file");
            Config::from_file(&path)?
        }
        None => Config::default(),
    };

    if let Ok(key) = std::env::var(API_KEY_ENV)
        && !key.trim().is_empty()
    {
        config.tmdb.api_key = key;
    }

    Ok(config)
}
