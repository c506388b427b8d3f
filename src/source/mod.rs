//! Upstream release data sources
//!
//! The catalog builder only talks to the [`ReleaseSource`] trait. [`TmdbSource`]
//! is the production implementation; tests substitute in-memory fakes.

use crate::error::SourceError;
use crate::types::{MovieDetails, ReleaseDateEntry, SourceId, SourcePage, SourcePageCursor};
use crate::window::DateWindow;

mod tmdb;

pub use tmdb::{TMDB_PAGE_SIZE, TmdbSource};

/// Result type for a single upstream call
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// A listing of releases plus per-item regional release dates
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// One page of releases inside `window`, newest release date first
    async fn list_releases(
        &self,
        cursor: SourcePageCursor,
        window: DateWindow,
    ) -> SourceResult<SourcePage>;

    /// Dated release entries of `id` in `region`, in upstream order
    ///
    /// An empty vector means the region has no dated entry for the item.
    async fn release_dates(&self, id: SourceId, region: &str)
    -> SourceResult<Vec<ReleaseDateEntry>>;

    /// Full details of one item; `None` when the upstream does not know the id
    async fn movie_details(&self, id: SourceId) -> SourceResult<Option<MovieDetails>>;
}
