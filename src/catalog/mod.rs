//! Catalog builder
//!
//! Builds one page of the "recent releases" catalog on demand:
//! 1. Walk the upstream listing page by page ([`SourcePageIterator`])
//! 2. Drop ids already seen in this build ([`SeenIds`])
//! 3. Validate the rest against their regional release dates ([`Validator`]),
//!    at most `validation_concurrency` lookups at a time ([`run_batch`])
//! 4. Stop as soon as enough items are accumulated for the requested page
//! 5. Slice the page out of the accumulated list ([`slice`])
//!
//! Nothing is cached between builds. Upstream failures never surface as errors:
//! a failed listing call ends the scan, a failed lookup excludes the candidate.

use crate::config::CatalogConfig;
use crate::error::{SourceError, ValidationError};
use crate::source::{ReleaseSource, SourceResult};
use crate::types::{PageRequest, ValidatedItem};
use crate::window::DateWindow;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

mod dedup;
mod limiter;
mod pages;
mod paginate;
mod validator;

pub use dedup::SeenIds;
pub use limiter::{WorkerPanic, run_batch};
pub use pages::{PagesEnd, SourcePageIterator};
pub use paginate::slice;
pub use validator::{Validator, select_date};

#[cfg(test)]
pub(crate) mod test_helpers;

/// Terminal state of a build
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildState {
    /// Still pulling source pages
    Scanning,
    /// Enough items were accumulated for the requested page
    Satisfied,
    /// The listing ended (empty page, last page, failure, or page cap) first
    Exhausted,
}

/// Counters collected during one build
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Listing calls made
    pub source_pages_fetched: u32,
    /// Candidates dropped because their id was already seen
    pub duplicates_skipped: usize,
    /// Candidates handed to the validator
    pub validations_dispatched: usize,
    /// Candidates with no qualifying release date in any consulted region
    pub rejected_no_date: usize,
    /// Candidates whose release date fell outside the window
    pub rejected_outside_window: usize,
    /// Lookups that failed, timed out, or panicked
    pub lookup_failures: usize,
}

/// One built page plus what happened while building it
#[derive(Clone, Debug)]
pub struct CatalogPage {
    /// Items of the requested page
    pub items: Vec<ValidatedItem>,
    /// The page that was requested
    pub request: PageRequest,
    /// Window the build validated against
    pub window: DateWindow,
    /// Terminal state
    pub state: BuildState,
    /// Why the listing ended, when it did
    pub pages_end: Option<PagesEnd>,
    /// Validated items accumulated before slicing
    pub accumulated: usize,
    /// Counters
    pub stats: BuildStats,
}

/// Builds catalog pages from a [`ReleaseSource`]
#[derive(Clone)]
pub struct CatalogBuilder {
    source: Arc<dyn ReleaseSource>,
    config: Arc<CatalogConfig>,
}

impl CatalogBuilder {
    /// Create a builder over `source`
    pub fn new(source: Arc<dyn ReleaseSource>, config: Arc<CatalogConfig>) -> Self {
        Self { source, config }
    }

    /// Catalog settings in use
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Request for `page_number` at the configured page size
    pub fn page_request(&self, page_number: usize) -> PageRequest {
        PageRequest::new(page_number, self.config.page_size)
    }

    /// Items of page `page_number` (1-based); never fails, total failure is an empty page
    pub async fn build_page(&self, page_number: usize) -> Vec<ValidatedItem> {
        self.build_report(page_number).await.items
    }

    /// Build page `page_number` over the window ending today, with diagnostics
    pub async fn build_report(&self, page_number: usize) -> CatalogPage {
        let window = DateWindow::current(self.config.lookback_days);
        self.build_in_window(self.page_request(page_number), window)
            .await
    }

    /// Build `request` against an explicit window
    pub async fn build_in_window(&self, request: PageRequest, window: DateWindow) -> CatalogPage {
        let config = self.config.as_ref();
        let source = self.source.as_ref();
        let needed = request.needed();

        debug!(
            page = request.page_number,
            needed,
            window = %window,
            "Building catalog page"
        );

        let validator = Validator::new(source, config, window);
        let mut pages = SourcePageIterator::new(
            source,
            window,
            config.source_page_size,
            config.max_source_pages,
            config.request_timeout,
        );
        let mut seen = SeenIds::new();
        let mut accumulated: Vec<ValidatedItem> = Vec::new();
        let mut stats = BuildStats::default();
        let mut state = BuildState::Scanning;

        while state == BuildState::Scanning {
            let Some(batch) = pages.next_page().await else {
                state = BuildState::Exhausted;
                break;
            };

            let batch_len = batch.len();
            let fresh = seen.admit(batch);
            stats.duplicates_skipped += batch_len - fresh.len();

            if !fresh.is_empty() {
                stats.validations_dispatched += fresh.len();
                let results = run_batch(&fresh, config.validation_concurrency, |item| {
                    validator.validate(item)
                })
                .await;

                for result in results {
                    match result {
                        Ok(item) => accumulated.push(item),
                        Err(e) => record_rejection(&mut stats, &e),
                    }
                }
            }

            // A sorted catalog is ordered over the whole scan, so it cannot stop early
            if !config.sort_by_release_date && accumulated.len() >= needed {
                state = BuildState::Satisfied;
            }
        }
        stats.source_pages_fetched = pages.pages_fetched();

        if config.sort_by_release_date {
            accumulated.sort_by(|a, b| b.release_date.cmp(&a.release_date));
        }

        let items = slice(&accumulated, request);
        info!(
            page = request.page_number,
            items = items.len(),
            accumulated = accumulated.len(),
            state = ?state,
            source_pages = stats.source_pages_fetched,
            validations = stats.validations_dispatched,
            lookup_failures = stats.lookup_failures,
            "Catalog page built"
        );

        CatalogPage {
            items,
            request,
            window,
            state,
            pages_end: pages.end(),
            accumulated: accumulated.len(),
            stats,
        }
    }
}

fn record_rejection(stats: &mut BuildStats, error: &ValidationError) {
    if error.is_lookup_failure() {
        stats.lookup_failures += 1;
    } else if let ValidationError::OutsideWindow { .. } = error {
        stats.rejected_outside_window += 1;
    } else {
        stats.rejected_no_date += 1;
    }
    debug!(error = %error, "Candidate excluded");
}

/// Await an upstream call, treating expiry of `limit` as [`SourceError::Timeout`]
pub(crate) async fn within<T>(
    limit: Option<Duration>,
    call: impl Future<Output = SourceResult<T>>,
) -> SourceResult<T> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| Err(SourceError::Timeout)),
        None => call.await,
    }
}
