//! Route handlers for the addon API
//!
//! Handlers are organized by resource:
//! - [`addon`]: manifest and catalog pages
//! - [`meta`]: single-item details
//! - [`system`]: health, OpenAPI, fallback

use crate::types::{MediaType, MetaItem, PageRequest, ValidatedItem};
use serde::{Deserialize, Serialize};

mod addon;
mod meta;
mod system;

pub use addon::*;
pub use meta::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Addon manifest served at /manifest.json
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Addon id
    pub id: String,
    /// Addon version
    pub version: String,
    /// Display name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Resources this addon serves
    pub resources: Vec<String>,
    /// Content types this addon serves
    pub types: Vec<MediaType>,
    /// Catalogs offered
    pub catalogs: Vec<ManifestCatalog>,
    /// Id prefixes the meta resource answers for
    pub id_prefixes: Vec<String>,
}

/// One catalog entry of the manifest
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ManifestCatalog {
    /// Content type
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Catalog id
    pub id: String,
    /// Display name
    pub name: String,
    /// Supported extra properties
    pub extra: Vec<ManifestExtra>,
}

/// A supported catalog extra property
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ManifestExtra {
    /// Property name (`skip`, `page`)
    pub name: String,
}

/// Query parameters for GET /catalog/:type/:id.json
///
/// Values are parsed leniently: anything that is not a number is ignored.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CatalogQuery {
    /// 1-based page number (default: 1)
    pub page: Option<String>,
    /// Number of items to skip; converted to a page number
    pub skip: Option<String>,
}

impl CatalogQuery {
    /// Parse a path extra such as `skip=40.json` or `page=2&genre=x.json`
    pub fn from_extra(extra: &str) -> Self {
        let mut query = CatalogQuery::default();
        for pair in strip_json(extra).split('&') {
            match pair.split_once('=') {
                Some(("page", value)) => query.page = Some(value.to_string()),
                Some(("skip", value)) => query.skip = Some(value.to_string()),
                _ => {}
            }
        }
        query
    }

    /// Requested page number; `page` wins over `skip`, page numbers below 1 become 1
    pub fn page_number(&self, page_size: usize) -> usize {
        if let Some(page) = self.page.as_deref().and_then(parse_count) {
            return page.max(1);
        }
        if let Some(skip) = self.skip.as_deref().and_then(parse_count) {
            return PageRequest::from_skip(skip, page_size).page_number;
        }
        1
    }
}

/// Parse the leading integer of `raw` (`"2abc"` is 2), clamping negative numbers to 0
fn parse_count(raw: &str) -> Option<usize> {
    let raw = raw.trim_start();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return None;
    }
    if negative {
        return Some(0);
    }
    Some(digits.parse().unwrap_or(usize::MAX))
}

/// Response body of the catalog resource
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CatalogResponse {
    /// Items of the requested page
    pub metas: Vec<ValidatedItem>,
}

/// Response body of the meta resource
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MetaResponse {
    /// Item details; null when the id is unknown or the upstream failed
    pub meta: Option<MetaItem>,
}

/// Path segments carry a `.json` suffix (`recent_movies.json`)
pub(crate) fn strip_json(segment: &str) -> &str {
    segment.strip_suffix(".json").unwrap_or(segment)
}
