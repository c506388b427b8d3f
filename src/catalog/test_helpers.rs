//! In-memory [`ReleaseSource`] for catalog and API tests

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::error::SourceError;
use crate::source::{ReleaseSource, SourceResult};
use crate::types::{
    CandidateItem, MovieDetails, ReleaseDateEntry, SourceId, SourcePage, SourcePageCursor,
};
use crate::window::DateWindow;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// How a release-date lookup for one id behaves
#[derive(Clone, Debug)]
enum DateBehavior {
    Fail,
    Hang,
    Panic,
}

/// Scriptable release source with call counters and an in-flight gauge
#[derive(Default)]
pub(crate) struct FakeSource {
    pages: Vec<Vec<CandidateItem>>,
    /// Page numbers (1-based) whose listing call fails
    failing_pages: HashSet<u32>,
    dates: HashMap<(SourceId, String), Vec<ReleaseDateEntry>>,
    behaviors: HashMap<SourceId, DateBehavior>,
    details: HashMap<SourceId, MovieDetails>,
    lookup_delay: Option<Duration>,

    list_calls: Mutex<Vec<u32>>,
    date_calls: Mutex<HashMap<SourceId, usize>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upstream pages in order; page `n` is `pages[n - 1]`
    pub fn with_pages(mut self, pages: Vec<Vec<CandidateItem>>) -> Self {
        self.pages = pages;
        self
    }

    /// `page_count` pages of `page_size` sequential ids (from 1), all dated `date` in `US`
    pub fn uniform(page_count: usize, page_size: usize, date: NaiveDate) -> Self {
        let mut source = Self::new();
        let mut pages = Vec::with_capacity(page_count);
        let mut next_id = 1u64;
        for _ in 0..page_count {
            let mut page = Vec::with_capacity(page_size);
            for _ in 0..page_size {
                page.push(candidate(next_id));
                source = source.dated(next_id, "US", vec![date]);
                next_id += 1;
            }
            pages.push(page);
        }
        source.with_pages(pages)
    }

    /// Untyped release dates of `id` in `region`, in upstream order
    pub fn dated(self, id: u64, region: &str, dates: Vec<NaiveDate>) -> Self {
        self.entries(id, region, dates.into_iter().map(ReleaseDateEntry::on).collect())
    }

    /// Release entries of `id` in `region`
    pub fn entries(mut self, id: u64, region: &str, entries: Vec<ReleaseDateEntry>) -> Self {
        self.dates.insert((SourceId(id), region.to_string()), entries);
        self
    }

    /// Release-date lookups of `id` fail
    pub fn failing(mut self, id: u64) -> Self {
        self.behaviors.insert(SourceId(id), DateBehavior::Fail);
        self
    }

    /// Release-date lookups of `id` never complete
    pub fn hanging(mut self, id: u64) -> Self {
        self.behaviors.insert(SourceId(id), DateBehavior::Hang);
        self
    }

    /// Release-date lookups of `id` panic
    pub fn panicking(mut self, id: u64) -> Self {
        self.behaviors.insert(SourceId(id), DateBehavior::Panic);
        self
    }

    /// Listing call for page `page` fails
    pub fn failing_page(mut self, page: u32) -> Self {
        self.failing_pages.insert(page);
        self
    }

    /// Details returned by `movie_details`
    pub fn with_details(mut self, details: MovieDetails) -> Self {
        self.details.insert(details.source_id, details);
        self
    }

    /// Every release-date lookup sleeps this long
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    /// Page numbers requested from the listing, in call order
    pub fn listed_pages(&self) -> Vec<u32> {
        self.list_calls.lock().unwrap().clone()
    }

    /// Release-date lookups made for `id` (across all regions)
    pub fn lookups_of(&self, id: u64) -> usize {
        self.date_calls
            .lock()
            .unwrap()
            .get(&SourceId(id))
            .copied()
            .unwrap_or(0)
    }

    /// Total release-date lookups
    pub fn total_lookups(&self) -> usize {
        self.date_calls.lock().unwrap().values().sum()
    }

    /// Highest number of concurrent release-date lookups observed
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

/// Candidate with a predictable title
pub(crate) fn candidate(id: u64) -> CandidateItem {
    CandidateItem::new(id, format!("Movie {}", id))
}

/// A date in 2025
pub(crate) fn day(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).unwrap()
}

/// 2025-01-01 ..= 2025-06-30
pub(crate) fn test_window() -> DateWindow {
    DateWindow::between(day(1, 1), day(6, 30))
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ReleaseSource for FakeSource {
    async fn list_releases(
        &self,
        cursor: SourcePageCursor,
        _window: DateWindow,
    ) -> SourceResult<SourcePage> {
        self.list_calls.lock().unwrap().push(cursor.page);

        if self.failing_pages.contains(&cursor.page) {
            return Err(SourceError::Network("listing unavailable".to_string()));
        }

        let index = (cursor.page as usize).saturating_sub(1);
        let items = self.pages.get(index).cloned().unwrap_or_default();
        Ok(SourcePage {
            items,
            has_more: (cursor.page as usize) < self.pages.len(),
        })
    }

    async fn release_dates(
        &self,
        id: SourceId,
        region: &str,
    ) -> SourceResult<Vec<ReleaseDateEntry>> {
        *self.date_calls.lock().unwrap().entry(id).or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        match self.behaviors.get(&id) {
            Some(DateBehavior::Fail) => {
                return Err(SourceError::Http {
                    status: 500,
                    url: format!("fake://movie/{}/release_dates", id),
                });
            }
            Some(DateBehavior::Hang) => std::future::pending::<()>().await,
            Some(DateBehavior::Panic) => panic!("lookup of {} blew up", id),
            None => {}
        }

        Ok(self
            .dates
            .get(&(id, region.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn movie_details(&self, id: SourceId) -> SourceResult<Option<MovieDetails>> {
        if matches!(self.behaviors.get(&id), Some(DateBehavior::Fail)) {
            return Err(SourceError::Timeout);
        }
        Ok(self.details.get(&id).cloned())
    }
}
