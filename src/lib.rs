//! # release-catalog
//!
//! On-demand "recent releases" movie catalog, served as a Stremio-style addon.
//!
//! ## How a page is built
//!
//! The upstream listing (TMDb discover) is filtered by its *primary* release
//! date, which is often a festival premiere or a foreign release. Each catalog
//! request therefore walks the listing page by page, checks every new
//! candidate's release date in the canonical region (with bounded concurrency),
//! and stops as soon as the requested page can be filled. Nothing is cached
//! between requests, and upstream failures shorten a page instead of failing it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use release_catalog::{CatalogBuilder, Config, TmdbSource};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.tmdb.api_key = "your-tmdb-key".to_string();
//!     config.validate()?;
//!
//!     let source = Arc::new(TmdbSource::new(config.tmdb.clone())?);
//!     let builder = CatalogBuilder::new(source, Arc::new(config.catalog.clone()));
//!
//!     for item in builder.build_page(1).await {
//!         println!("{} ({})", item.name, item.release_date);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Addon API server
pub mod api;
/// Catalog builder: page iteration, dedup, validation, pagination
pub mod catalog;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Upstream release sources
pub mod source;
/// Core types
pub mod types;
/// Release window
pub mod window;

// Re-export commonly used types
pub use catalog::{BuildState, BuildStats, CatalogBuilder, CatalogPage};
pub use config::{ApiConfig, CatalogConfig, Config, ReleaseDatePolicy, TmdbConfig};
pub use error::{ApiError, Error, ErrorDetail, Result, SourceError, ToHttpStatus, ValidationError};
pub use source::{ReleaseSource, TmdbSource};
pub use types::{CandidateItem, MetaItem, PageRequest, SourceId, ValidatedItem};
pub use window::DateWindow;

use tokio_util::sync::CancellationToken;

/// Helper function to run the API server with graceful signal handling.
///
/// Serves until a termination signal arrives, then lets in-flight requests finish.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use release_catalog::{Config, TmdbSource, api::AppState, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Arc::new(Config::default());
///     let source = Arc::new(TmdbSource::new(config.tmdb.clone())?);
///
///     run_with_shutdown(AppState::new(config, source)).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(state: api::AppState) -> Result<()> {
    let shutdown = CancellationToken::new();

    let signal_task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            tokio::select! {
                _ = wait_for_signal() => shutdown.cancel(),
                _ = shutdown.cancelled() => {}
            }
        }
    });

    let result = api::start_api_server(state, shutdown.clone()).await;

    // Stop the signal listener if the server exited on its own
    shutdown.cancel();
    let _ = signal_task.await;

    result
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
