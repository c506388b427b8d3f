//! TMDb-backed release source
//!
//! Uses three endpoints of the TMDb v3 API:
//! - `/discover/movie` for the date-filtered listing, newest first
//! - `/movie/{id}/release_dates` for per-region release dates
//! - `/movie/{id}` for the meta endpoint

use super::{ReleaseSource, SourceResult};
use crate::config::TmdbConfig;
use crate::error::{Error, Result, SourceError};
use crate::types::{
    CandidateItem, MovieDetails, ReleaseDateEntry, SourceId, SourcePage, SourcePageCursor,
};
use crate::window::DateWindow;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

const POSTER_SIZE: &str = "w500";
const BACKDROP_SIZE: &str = "original";

/// Items per page returned by `/discover/movie`; TMDb does not allow changing it
pub const TMDB_PAGE_SIZE: usize = 20;

/// [`ReleaseSource`] backed by the TMDb HTTP API
pub struct TmdbSource {
    /// HTTP client shared by all requests
    http_client: reqwest::Client,

    config: TmdbConfig,
}

impl TmdbSource {
    /// Create a new TMDb source
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be created
    pub fn new(config: TmdbConfig) -> Result<Self> {
        Url::parse(&config.base_url)
            .map_err(|e| Error::config("tmdb.base_url", format!("invalid URL: {}", e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("release-catalog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Build an endpoint URL; query pairs are appended, the API key last
    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> SourceResult<Url> {
        let raw = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let mut url = Url::parse(&raw).map_err(|e| SourceError::Malformed(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("api_key", &self.config.api_key);
        }
        Ok(url)
    }

    /// GET a JSON document; `Ok(None)` on 404
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> SourceResult<Option<T>> {
        let display_url = redact(&url);
        debug!(url = %display_url, "TMDb request");

        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: display_url,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| SourceError::Malformed(format!("{}: {}", display_url, e)))
    }

    fn image_url(&self, size: &str, path: Option<String>) -> Option<String> {
        path.filter(|p| !p.is_empty()).map(|p| {
            format!(
                "{}/{}{}",
                self.config.image_base_url.trim_end_matches('/'),
                size,
                p
            )
        })
    }

    fn discover_query(&self, cursor: SourcePageCursor, window: DateWindow) -> Vec<(&str, String)> {
        let filters = &self.config.discover;
        let mut query = vec![
            ("sort_by", "primary_release_date.desc".to_string()),
            ("primary_release_date.gte", window.from().to_string()),
            ("primary_release_date.lte", window.to().to_string()),
            ("page", cursor.page.to_string()),
        ];
        if let Some(language) = &filters.language {
            query.push(("language", language.clone()));
        }
        if let Some(original) = &filters.original_language {
            query.push(("with_original_language", original.clone()));
        }
        if let Some(votes) = filters.min_vote_count {
            query.push(("vote_count.gte", votes.to_string()));
        }
        if !filters.without_genres.is_empty() {
            let genres: Vec<String> = filters
                .without_genres
                .iter()
                .map(|g| g.to_string())
                .collect();
            query.push(("without_genres", genres.join(",")));
        }
        query
    }
}

#[async_trait::async_trait]
impl ReleaseSource for TmdbSource {
    async fn list_releases(
        &self,
        cursor: SourcePageCursor,
        window: DateWindow,
    ) -> SourceResult<SourcePage> {
        if cursor.page_size != TMDB_PAGE_SIZE {
            debug!(
                requested = cursor.page_size,
                actual = TMDB_PAGE_SIZE,
                "TMDb page size is fixed; ignoring configured source page size"
            );
        }

        let url = self.endpoint("discover/movie", &self.discover_query(cursor, window))?;
        let Some(body) = self.get_json::<DiscoverResponse>(url).await? else {
            return Ok(SourcePage::default());
        };

        let page = if body.page == 0 { cursor.page } else { body.page };
        let items = body
            .results
            .into_iter()
            .flatten()
            .filter_map(|movie| {
                let id = movie.id?;
                Some(CandidateItem {
                    source_id: SourceId(id),
                    title: movie.title,
                    original_title: movie.original_title,
                    overview: movie.overview,
                    poster_url: self.image_url(POSTER_SIZE, movie.poster_path),
                    listed_release_date: movie.release_date.as_deref().and_then(parse_day),
                })
            })
            .collect();

        Ok(SourcePage {
            items,
            has_more: page < body.total_pages,
        })
    }

    async fn release_dates(
        &self,
        id: SourceId,
        region: &str,
    ) -> SourceResult<Vec<ReleaseDateEntry>> {
        let url = self.endpoint(&format!("movie/{}/release_dates", id), &[])?;
        let Some(body) = self.get_json::<ReleaseDatesResponse>(url).await? else {
            return Ok(Vec::new());
        };
        let results = body
            .results
            .ok_or_else(|| SourceError::Malformed(format!("release_dates of {} has no results", id)))?;

        let entries = results
            .into_iter()
            .find(|r| r.iso_3166_1.eq_ignore_ascii_case(region))
            .map(|r| {
                r.release_dates
                    .into_iter()
                    .filter_map(|d| {
                        let date = d.release_date.as_deref().and_then(parse_day)?;
                        Some(ReleaseDateEntry {
                            date,
                            release_type: d.release_type,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(entries)
    }

    async fn movie_details(&self, id: SourceId) -> SourceResult<Option<MovieDetails>> {
        let url = self.endpoint(&format!("movie/{}", id), &[("language", "en-US".to_string())])?;
        let Some(movie) = self.get_json::<MovieResponse>(url).await? else {
            return Ok(None);
        };

        Ok(Some(MovieDetails {
            source_id: SourceId(movie.id),
            title: movie.title,
            overview: movie.overview,
            poster_url: self.image_url(POSTER_SIZE, movie.poster_path),
            background_url: self.image_url(BACKDROP_SIZE, movie.backdrop_path),
            release_date: movie.release_date,
            imdb_id: movie.imdb_id,
        }))
    }
}

/// Parse the day part of a TMDb date or timestamp (`2025-03-01T00:00:00.000Z`)
fn parse_day(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// URL for logs and errors, without the API key
fn redact(url: &Url) -> String {
    let mut clean = url.clone();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != "api_key")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(kept);
    }
    clean.to_string()
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    results: Vec<Option<DiscoverMovie>>,
    #[serde(default)]
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct DiscoverMovie {
    id: Option<u64>,
    title: Option<String>,
    original_title: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReleaseDatesResponse {
    results: Option<Vec<RegionReleaseDates>>,
}

#[derive(Debug, Deserialize)]
struct RegionReleaseDates {
    iso_3166_1: String,
    #[serde(default)]
    release_dates: Vec<RawReleaseDate>,
}

#[derive(Debug, Deserialize)]
struct RawReleaseDate {
    release_date: Option<String>,
    #[serde(rename = "type")]
    release_type: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct MovieResponse {
    id: u64,
    title: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    release_date: Option<String>,
    imdb_id: Option<String>,
}
