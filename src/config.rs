//! Configuration types for release-catalog
//!
//! One [`Config`] is built per process (from a JSON file or defaults) and handed
//! to the catalog builder and the API as an `Arc`. Nothing reads configuration
//! from globals.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, time::Duration};

/// Main configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog builder settings (window, page sizes, concurrency, date policy)
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Upstream TMDb connection settings
    #[serde(default)]
    pub tmdb: TmdbConfig,

    /// Addon manifest identity
    #[serde(default)]
    pub addon: AddonConfig,

    /// HTTP server settings
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from a JSON file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Check the settings that would otherwise make every build empty or unbounded
    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()?;

        if self.tmdb.api_key.trim().is_empty() {
            return Err(Error::config("tmdb.api_key", "TMDb API key is not set"));
        }
        if url::Url::parse(&self.tmdb.base_url).is_err() {
            return Err(Error::config("tmdb.base_url", "not a valid URL"));
        }

        Ok(())
    }
}

/// Catalog builder configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Length of the release window in days, ending today (default: 180)
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Items per catalog page served to clients (default: 40)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Items per upstream listing page (default: 20)
    #[serde(default = "default_source_page_size")]
    pub source_page_size: usize,

    /// Maximum upstream pages scanned per build (default: 50)
    #[serde(default = "default_max_source_pages")]
    pub max_source_pages: u32,

    /// Concurrent release-date lookups per batch (default: 8)
    #[serde(default = "default_validation_concurrency")]
    pub validation_concurrency: usize,

    /// Region whose release dates are authoritative (default: "US")
    #[serde(default = "default_canonical_region")]
    pub canonical_region: String,

    /// Regions consulted in order when the canonical region has no dated entry
    #[serde(default)]
    pub fallback_regions: Vec<String>,

    /// How a single date is picked among a region's entries
    #[serde(default)]
    pub date_policy: ReleaseDatePolicy,

    /// Release types that count (TMDb: 1 premiere, 2 limited theatrical, 3 theatrical,
    /// 4 digital, 5 physical, 6 TV); empty accepts all
    #[serde(default)]
    pub qualifying_release_types: Vec<u8>,

    /// Timeout applied to every upstream call made during a build (None = no extra timeout)
    #[serde(default, with = "optional_duration_serde")]
    pub request_timeout: Option<Duration>,

    /// Sort accumulated items newest first before slicing (default: false, discovery order)
    ///
    /// When set, every build scans until the source is exhausted or the page cap is reached.
    #[serde(default)]
    pub sort_by_release_date: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            page_size: default_page_size(),
            source_page_size: default_source_page_size(),
            max_source_pages: default_max_source_pages(),
            validation_concurrency: default_validation_concurrency(),
            canonical_region: default_canonical_region(),
            fallback_regions: Vec::new(),
            date_policy: ReleaseDatePolicy::default(),
            qualifying_release_types: Vec::new(),
            request_timeout: None,
            sort_by_release_date: false,
        }
    }
}

impl CatalogConfig {
    /// Regions to consult, canonical first
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical_region.as_str())
            .chain(self.fallback_regions.iter().map(String::as_str))
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::config("catalog.page_size", "must be greater than zero"));
        }
        if self.source_page_size == 0 {
            return Err(Error::config(
                "catalog.source_page_size",
                "must be greater than zero",
            ));
        }
        if self.max_source_pages == 0 {
            return Err(Error::config(
                "catalog.max_source_pages",
                "must be greater than zero",
            ));
        }
        if self.validation_concurrency == 0 {
            return Err(Error::config(
                "catalog.validation_concurrency",
                "must be greater than zero",
            ));
        }
        if self.canonical_region.trim().is_empty() {
            return Err(Error::config(
                "catalog.canonical_region",
                "must be a region code such as \"US\"",
            ));
        }
        Ok(())
    }
}

/// Release date selection among the entries of one region
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseDatePolicy {
    /// Earliest dated entry (default)
    #[default]
    Earliest,
    /// First entry in upstream order
    FirstListed,
}

/// TMDb connection settings
#[derive(Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// API key (v3)
    #[serde(default)]
    pub api_key: String,

    /// API base URL (default: "https://api.themoviedb.org/3")
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,

    /// Image CDN base URL (default: "https://image.tmdb.org/t/p")
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    /// HTTP client timeout (default: 10 seconds)
    #[serde(default = "default_http_timeout", with = "duration_serde")]
    pub http_timeout: Duration,

    /// Extra filters applied to the discover listing
    #[serde(default)]
    pub discover: DiscoverFilters,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_tmdb_base_url(),
            image_base_url: default_image_base_url(),
            http_timeout: default_http_timeout(),
            discover: DiscoverFilters::default(),
        }
    }
}

impl std::fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("image_base_url", &self.image_base_url)
            .field("http_timeout", &self.http_timeout)
            .field("discover", &self.discover)
            .finish()
    }
}

/// Optional narrowing of the discover listing
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DiscoverFilters {
    /// Response language, e.g. "en-US"
    #[serde(default)]
    pub language: Option<String>,

    /// Only titles originally in this language, e.g. "en"
    #[serde(default)]
    pub original_language: Option<String>,

    /// Minimum vote count
    #[serde(default)]
    pub min_vote_count: Option<u32>,

    /// Genre ids to exclude
    #[serde(default)]
    pub without_genres: Vec<u32>,
}

/// Addon manifest identity
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddonConfig {
    /// Manifest id (default: "recent_us_movies")
    #[serde(default = "default_addon_id")]
    pub id: String,

    /// Manifest version (default: "1.0.0")
    #[serde(default = "default_addon_version")]
    pub version: String,

    /// Display name (default: "Recent US Movie Releases")
    #[serde(default = "default_addon_name")]
    pub name: String,

    /// Description; generated from the release window when unset
    #[serde(default)]
    pub description: Option<String>,

    /// Catalog id served under /catalog/movie/ (default: "recent_movies")
    #[serde(default = "default_catalog_id")]
    pub catalog_id: String,

    /// Catalog display name (default: "Recent US Releases")
    #[serde(default = "default_catalog_name")]
    pub catalog_name: String,
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self {
            id: default_addon_id(),
            version: default_addon_version(),
            name: default_addon_name(),
            description: None,
            catalog_id: default_catalog_id(),
            catalog_name: default_catalog_name(),
        }
    }
}

/// HTTP server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:7000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS (default: true; addon clients run in browsers)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_lookback_days() -> u32 {
    180
}

fn default_page_size() -> usize {
    40
}

fn default_source_page_size() -> usize {
    20
}

fn default_max_source_pages() -> u32 {
    50
}

fn default_validation_concurrency() -> usize {
    8
}

fn default_canonical_region() -> String {
    "US".to_string()
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_addon_id() -> String {
    "recent_us_movies".to_string()
}

fn default_addon_version() -> String {
    "1.0.0".to_string()
}

fn default_addon_name() -> String {
    "Recent US Movie Releases".to_string()
}

fn default_catalog_id() -> String {
    "recent_movies".to_string()
}

fn default_catalog_name() -> String {
    "Recent US Releases".to_string()
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 7000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_true() -> bool {
    true
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
