//! Core types for release-catalog

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Prefix used for item ids on the wire (`tmdb:603`)
pub const ID_PREFIX: &str = "tmdb";

/// Identifier of an item in the upstream release source
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct SourceId(pub u64);

impl SourceId {
    /// Get the inner value
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Parse a wire id, accepting both `tmdb:603` and a bare `603`
    pub fn parse_prefixed(raw: &str) -> Option<Self> {
        let bare = match raw.split_once(':') {
            Some((prefix, rest)) if prefix == ID_PREFIX => rest,
            Some(_) => return None,
            None => raw,
        };
        bare.parse().ok().map(SourceId)
    }

    /// The id as exposed to clients
    pub fn prefixed(&self) -> String {
        format!("{}:{}", ID_PREFIX, self.0)
    }
}

impl From<u64> for SourceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Media type of catalog entries
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Feature film
    #[default]
    Movie,
}

impl MediaType {
    /// Path segment used by the addon protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
        }
    }
}

/// Raw record from one page of the upstream listing
///
/// Transient: lives from the page fetch until its validation finishes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateItem {
    /// Upstream id
    pub source_id: SourceId,
    /// Localized title
    pub title: Option<String>,
    /// Title in the original language
    pub original_title: Option<String>,
    /// Plot overview
    pub overview: Option<String>,
    /// Absolute poster URL, resolved by the source
    pub poster_url: Option<String>,
    /// Primary release date as reported by the listing (not authoritative)
    pub listed_release_date: Option<NaiveDate>,
}

impl CandidateItem {
    /// Minimal candidate with only an id and a title
    pub fn new(source_id: impl Into<SourceId>, title: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            title: Some(title.into()),
            original_title: None,
            overview: None,
            poster_url: None,
            listed_release_date: None,
        }
    }

    /// Display name, falling back to the original title and then the id
    pub fn display_name(&self) -> String {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.original_title.as_deref().filter(|t| !t.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Movie {}", self.source_id))
    }
}

/// A catalog entry whose regional release date was confirmed inside the release window
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidatedItem {
    /// Client-facing id (`tmdb:<id>`)
    pub id: String,
    /// Always `movie`
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Display name
    pub name: String,
    /// Overview text (empty when unknown)
    pub description: String,
    /// Absolute poster URL
    #[serde(rename = "poster")]
    pub poster_url: Option<String>,
    /// Resolved regional release date
    #[serde(rename = "releaseInfo")]
    #[schema(value_type = String, format = Date)]
    pub release_date: NaiveDate,
}

/// One dated release entry for a candidate in a given region
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseDateEntry {
    /// Release date (day granularity)
    pub date: NaiveDate,
    /// Upstream release type (1 premiere .. 6 TV), when known
    pub release_type: Option<u8>,
}

impl ReleaseDateEntry {
    /// Entry with no release type
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            release_type: None,
        }
    }
}

/// Position of the source page iterator in the upstream listing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourcePageCursor {
    /// 1-based page number in the upstream listing
    pub page: u32,
    /// Number of items per upstream page
    pub page_size: usize,
}

/// One page of the upstream listing
#[derive(Clone, Debug, Default)]
pub struct SourcePage {
    /// Candidates on this page, in upstream order
    pub items: Vec<CandidateItem>,
    /// Whether the upstream reports pages after this one
    pub has_more: bool,
}

/// A page of the catalog as requested by the client
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page_number: usize,
    /// Items per page
    pub page_size: usize,
}

impl PageRequest {
    /// Create a request; page numbers below 1 are treated as page 1
    pub fn new(page_number: usize, page_size: usize) -> Self {
        Self {
            page_number: page_number.max(1),
            page_size,
        }
    }

    /// Derive the page from a `skip` offset
    pub fn from_skip(skip: usize, page_size: usize) -> Self {
        let page_number = skip.checked_div(page_size).unwrap_or(0) + 1;
        Self::new(page_number, page_size)
    }

    /// Number of validated items needed before this page is fully known
    pub fn needed(&self) -> usize {
        self.page_number.saturating_mul(self.page_size)
    }

    /// Index of the first item on this page
    pub fn start(&self) -> usize {
        self.page_number
            .saturating_sub(1)
            .saturating_mul(self.page_size)
    }
}

/// Detailed record for the meta endpoint
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovieDetails {
    /// Upstream id
    pub source_id: SourceId,
    /// Title
    pub title: Option<String>,
    /// Overview
    pub overview: Option<String>,
    /// Absolute poster URL
    pub poster_url: Option<String>,
    /// Absolute backdrop URL
    pub background_url: Option<String>,
    /// Primary release date, as reported upstream
    pub release_date: Option<String>,
    /// IMDb id (`tt...`)
    pub imdb_id: Option<String>,
}

/// Full item description served by the meta endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MetaItem {
    /// Client-facing id (`tmdb:<id>`)
    pub id: String,
    /// Always `movie`
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Title
    pub name: Option<String>,
    /// Overview text (empty when unknown)
    pub description: String,
    /// Absolute poster URL
    pub poster: Option<String>,
    /// Absolute background image URL
    pub background: Option<String>,
    /// Primary release date
    pub released: Option<String>,
    /// IMDb id
    pub imdb: Option<String>,
}

impl From<MovieDetails> for MetaItem {
    fn from(details: MovieDetails) -> Self {
        Self {
            id: details.source_id.prefixed(),
            media_type: MediaType::Movie,
            name: details.title,
            description: details.overview.unwrap_or_default(),
            poster: details.poster_url,
            background: details.background_url,
            released: details.release_date.filter(|d| !d.is_empty()),
            imdb: details.imdb_id.filter(|i| !i.is_empty()),
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_parses_prefixed_and_bare_ids() {
        assert_eq!(SourceId::parse_prefixed("tmdb:603"), Some(SourceId(603)));
        assert_eq!(SourceId::parse_prefixed("603"), Some(SourceId(603)));
        assert_eq!(SourceId::parse_prefixed("imdb:603"), None);
        assert_eq!(SourceId::parse_prefixed("tmdb:"), None);
        assert_eq!(SourceId::parse_prefixed("tt0133093"), None);
        assert_eq!(SourceId(603).prefixed(), "tmdb:603");
    }

    #[test]
    fn test_display_name_falls_back_to_original_title_then_id() {
        let mut item = CandidateItem::new(5u64, "");
        assert_eq!(item.display_name(), "Movie 5");

        item.original_title = Some("Le Titre".to_string());
        assert_eq!(item.display_name(), "Le Titre");

        item.title = Some("The Title".to_string());
        assert_eq!(item.display_name(), "The Title");
    }

    #[test]
    fn test_validated_item_uses_addon_field_names() {
        let item = ValidatedItem {
            id: "tmdb:1".to_string(),
            media_type: MediaType::Movie,
            name: "One".to_string(),
            description: String::new(),
            poster_url: None,
            release_date: NaiveDate::from_ymd_opt(2025, 3, 9).unwrap(),
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["id"], "tmdb:1");
        assert_eq!(json["type"], "movie");
        assert_eq!(json["releaseInfo"], "2025-03-09");
        assert!(json["poster"].is_null());
    }

    #[test]
    fn test_page_request_arithmetic() {
        let first = PageRequest::new(0, 40);
        assert_eq!(first.page_number, 1);
        assert_eq!(first.start(), 0);
        assert_eq!(first.needed(), 40);

        let third = PageRequest::new(3, 40);
        assert_eq!(third.start(), 80);
        assert_eq!(third.needed(), 120);
    }

    #[test]
    fn test_page_request_from_skip() {
        assert_eq!(PageRequest::from_skip(0, 40).page_number, 1);
        assert_eq!(PageRequest::from_skip(39, 40).page_number, 1);
        assert_eq!(PageRequest::from_skip(40, 40).page_number, 2);
        assert_eq!(PageRequest::from_skip(100, 0).page_number, 1);
    }
}
