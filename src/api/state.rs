//! Application state for the API server

use crate::catalog::CatalogBuilder;
use crate::config::Config;
use crate::source::ReleaseSource;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clones).
#[derive(Clone)]
pub struct AppState {
    /// Process configuration
    pub config: Arc<Config>,

    /// Builds catalog pages on demand
    pub catalog: Arc<CatalogBuilder>,

    /// Upstream source, used directly by the meta endpoint
    pub source: Arc<dyn ReleaseSource>,
}

impl AppState {
    /// Create state whose catalog builder reads from `source`
    pub fn new(config: Arc<Config>, source: Arc<dyn ReleaseSource>) -> Self {
        let catalog = CatalogBuilder::new(source.clone(), Arc::new(config.catalog.clone()));
        Self {
            config,
            catalog: Arc::new(catalog),
            source,
        }
    }
}
