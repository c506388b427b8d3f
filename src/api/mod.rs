//! Addon API server module
//!
//! Serves the catalog over the addon protocol (manifest, catalog pages, item
//! details) plus a health check and the OpenAPI document.

use crate::Result;
use crate::error::Error;
use axum::{Router, http::HeaderValue, routing::get};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Addon
/// - `GET /manifest.json` - Addon manifest
/// - `GET /catalog/:type/:id.json` - Catalog page (`?page=N` or `?skip=K`)
/// - `GET /catalog/:type/:id/:extra.json` - Catalog page with path extras (`skip=K`)
/// - `GET /meta/:type/:id.json` - Item details
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
///
/// Any other path answers `{"status": "ok"}`.
pub fn create_router(state: AppState) -> Router {
    let api_config = state.config.api.clone();

    let router = Router::new()
        // Addon
        .route("/manifest.json", get(routes::manifest))
        .route("/catalog/:type/:id", get(routes::catalog))
        .route("/catalog/:type/:id/:extra", get(routes::catalog_with_extra))
        .route("/meta/:type/:id", get(routes::meta))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .fallback(routes::fallback)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Apply CORS middleware if enabled in config
    if api_config.cors_enabled {
        let cors = build_cors_layer(&api_config.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// # Arguments
///
/// * `origins` - List of allowed origins (supports "*" for any origin)
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Bind the configured address and serve until `shutdown` is cancelled
///
/// # Example
///
/// ```no_run
/// use release_catalog::{Config, TmdbSource, api::{AppState, start_api_server}};
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let source = Arc::new(TmdbSource::new(config.tmdb.clone())?);
/// let state = AppState::new(config, source);
///
/// start_api_server(state, CancellationToken::new()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(state: AppState, shutdown: CancellationToken) -> Result<()> {
    let bind_address = state.config.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let listener = TcpListener::bind(bind_address).await.map_err(Error::Io)?;

    serve(listener, state, shutdown).await
}

/// Serve the router on an already bound listener until `shutdown` is cancelled
pub async fn serve(listener: TcpListener, state: AppState, shutdown: CancellationToken) -> Result<()> {
    let app = create_router(state);

    if let Ok(address) = listener.local_addr() {
        tracing::info!(address = %address, "API server listening");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
