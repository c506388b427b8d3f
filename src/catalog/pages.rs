//! Sequential, bounded walk over the upstream listing

use super::within;
use crate::source::ReleaseSource;
use crate::types::{CandidateItem, SourcePageCursor};
use crate::window::DateWindow;
use std::time::Duration;
use tracing::{debug, warn};

/// Why the page iterator stopped producing pages
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PagesEnd {
    /// The safety cap on upstream pages was reached
    PageCap,
    /// The upstream returned an empty page
    EmptyPage,
    /// The upstream reported no pages after the last one
    NoMorePages,
    /// A listing call failed or timed out
    SourceFailed,
}

/// Lazily fetches upstream listing pages in order, one at a time
///
/// Pages are numbered from 1. After `max_pages` fetches, an empty page, a page
/// reporting no successor, or a failed fetch, every further call returns `None`.
pub struct SourcePageIterator<'a> {
    source: &'a dyn ReleaseSource,
    window: DateWindow,
    cursor: SourcePageCursor,
    max_pages: u32,
    timeout: Option<Duration>,
    pages_fetched: u32,
    end: Option<PagesEnd>,
}

impl<'a> SourcePageIterator<'a> {
    /// Start at page 1 of the listing restricted to `window`
    pub fn new(
        source: &'a dyn ReleaseSource,
        window: DateWindow,
        page_size: usize,
        max_pages: u32,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            source,
            window,
            cursor: SourcePageCursor { page: 1, page_size },
            max_pages,
            timeout,
            pages_fetched: 0,
            end: None,
        }
    }

    /// Fetch the next page, or `None` once the listing is exhausted
    pub async fn next_page(&mut self) -> Option<Vec<CandidateItem>> {
        if self.end.is_some() {
            return None;
        }
        if self.pages_fetched >= self.max_pages {
            debug!(max_pages = self.max_pages, "Upstream page cap reached");
            self.end = Some(PagesEnd::PageCap);
            return None;
        }

        let cursor = self.cursor;
        self.cursor.page = self.cursor.page.saturating_add(1);
        self.pages_fetched += 1;

        match within(self.timeout, self.source.list_releases(cursor, self.window)).await {
            Ok(page) if page.items.is_empty() => {
                debug!(page = cursor.page, "Upstream returned an empty page");
                self.end = Some(PagesEnd::EmptyPage);
                None
            }
            Ok(page) => {
                if !page.has_more {
                    self.end = Some(PagesEnd::NoMorePages);
                }
                debug!(
                    page = cursor.page,
                    items = page.items.len(),
                    has_more = page.has_more,
                    "Fetched upstream page"
                );
                Some(page.items)
            }
            Err(e) => {
                warn!(page = cursor.page, error = %e, "Upstream listing failed, ending scan");
                self.end = Some(PagesEnd::SourceFailed);
                None
            }
        }
    }

    /// Number of listing calls made so far
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Why the iterator ended, if it has
    pub fn end(&self) -> Option<PagesEnd> {
        self.end
    }
}
