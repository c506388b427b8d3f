//! Regional release-date validation of a single candidate

use super::within;
use crate::config::{CatalogConfig, ReleaseDatePolicy};
use crate::error::ValidationError;
use crate::source::ReleaseSource;
use crate::types::{CandidateItem, MediaType, ReleaseDateEntry, ValidatedItem};
use crate::window::DateWindow;
use chrono::NaiveDate;
use tracing::debug;

/// Confirms candidates against the release dates of the configured regions
///
/// Holds no mutable state, so one validator serves every concurrent lookup of a build.
pub struct Validator<'a> {
    source: &'a dyn ReleaseSource,
    config: &'a CatalogConfig,
    window: DateWindow,
}

impl<'a> Validator<'a> {
    /// Validator for one build over `window`
    pub fn new(source: &'a dyn ReleaseSource, config: &'a CatalogConfig, window: DateWindow) -> Self {
        Self {
            source,
            config,
            window,
        }
    }

    /// Resolve the candidate's release date and check it against the window
    ///
    /// Regions are consulted in order (canonical first); the first region with a
    /// qualifying dated entry decides. Any lookup failure excludes the candidate.
    pub async fn validate(&self, item: &CandidateItem) -> Result<ValidatedItem, ValidationError> {
        let id = item.source_id;
        let date = self.resolve_date(item).await?;

        if let Some(listed) = item.listed_release_date
            && listed != date
        {
            debug!(
                id = %id,
                listed = %listed,
                regional = %date,
                "Listed date differs from regional release"
            );
        }

        if !self.window.contains(date) {
            return Err(ValidationError::OutsideWindow { id, date });
        }

        Ok(ValidatedItem {
            id: id.prefixed(),
            media_type: MediaType::Movie,
            name: item.display_name(),
            description: item.overview.clone().unwrap_or_default(),
            poster_url: item.poster_url.clone(),
            release_date: date,
        })
    }

    async fn resolve_date(&self, item: &CandidateItem) -> Result<NaiveDate, ValidationError> {
        let id = item.source_id;
        let timeout = self.config.request_timeout;

        for region in self.config.regions() {
            let entries = within(timeout, self.source.release_dates(id, region))
                .await
                .map_err(|source| ValidationError::Lookup { id, source })?;

            if let Some(date) = select_date(
                &entries,
                self.config.date_policy,
                &self.config.qualifying_release_types,
            ) {
                return Ok(date);
            }
        }

        Err(ValidationError::NoQualifyingDate { id })
    }
}

/// Pick one date among a region's entries
///
/// With a non-empty `qualifying_types`, entries of other (or unknown) types are ignored.
pub fn select_date(
    entries: &[ReleaseDateEntry],
    policy: ReleaseDatePolicy,
    qualifying_types: &[u8],
) -> Option<NaiveDate> {
    let mut qualifying = entries.iter().filter(|entry| {
        qualifying_types.is_empty()
            || entry
                .release_type
                .is_some_and(|t| qualifying_types.contains(&t))
    });

    match policy {
        ReleaseDatePolicy::Earliest => qualifying.map(|e| e.date).min(),
        ReleaseDatePolicy::FirstListed => qualifying.next().map(|e| e.date),
    }
}
