//! Error types for release-catalog
//!
//! This module provides the error handling for the library:
//! - The crate-level [`Error`] used by configuration, the server, and the meta endpoint
//! - [`SourceError`] for failures talking to the upstream release listing
//! - [`ValidationError`] describing why a candidate was excluded from the catalog
//! - HTTP status code mapping and the JSON error envelope used by the API

use crate::types::SourceId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for release-catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for release-catalog
///
/// Catalog builds never surface this type: every upstream failure inside a build
/// collapses into a shorter page. It is used at the edges (configuration loading,
/// server startup, the meta endpoint).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "page_size")
        key: Option<String>,
    },

    /// Upstream release source failed
    #[error("release source error: {0}")]
    Source(#[from] SourceError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Requested resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Failures of a single call to the upstream release source
#[derive(Debug, Error)]
pub enum SourceError {
    /// Upstream answered with a non-success status
    #[error("upstream returned HTTP {status} for {url}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Request URL with credentials stripped
        url: String,
    },

    /// Connection, TLS, or transport failure
    #[error("upstream request failed: {0}")]
    Network(String),

    /// The call did not complete within the configured timeout
    #[error("upstream request timed out")]
    Timeout,

    /// The body could not be decoded or lacked required fields
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            SourceError::Timeout
        } else if error.is_decode() {
            SourceError::Malformed(error.to_string())
        } else {
            SourceError::Network(error.without_url().to_string())
        }
    }
}

/// Why a candidate was excluded from the catalog
///
/// Every variant has the same effect on a build (the candidate is dropped),
/// but keeping them apart lets callers and tests tell "no date" from
/// "the lookup failed".
#[derive(Debug, Error)]
pub enum ValidationError {
    /// No dated release entry exists in any consulted region
    #[error("no qualifying release date for {id}")]
    NoQualifyingDate {
        /// Upstream id of the candidate
        id: SourceId,
    },

    /// The resolved release date falls outside the release window
    #[error("release date {date} of {id} is outside the release window")]
    OutsideWindow {
        /// Upstream id of the candidate
        id: SourceId,
        /// The resolved release date
        date: NaiveDate,
    },

    /// The release-date lookup failed
    #[error("release date lookup for {id} failed: {source}")]
    Lookup {
        /// Upstream id of the candidate
        id: SourceId,
        /// Underlying upstream failure
        #[source]
        source: SourceError,
    },

    /// The validation task panicked; the limiter caught it
    #[error("validation worker panicked: {0}")]
    WorkerPanicked(String),
}

impl ValidationError {
    /// True when the exclusion came from a failed lookup rather than from the data
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            ValidationError::Lookup { .. } | ValidationError::WorkerPanicked(_)
        )
    }
}

/// API error response format
///
/// Returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "not_found",
///     "message": "not found: catalog movie/unknown"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "config_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::Config { .. } => 400,
            Error::NotFound(_) => 404,

            // 502 Bad Gateway - upstream failures
            Error::Source(SourceError::Timeout) => 504,
            Error::Source(_) => 502,
            Error::Network(_) => 502,

            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Source(e) => match e {
                SourceError::Http { .. } => "upstream_http_error",
                SourceError::Network(_) => "upstream_unavailable",
                SourceError::Timeout => "upstream_timeout",
                SourceError::Malformed(_) => "upstream_malformed",
            },
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::NotFound(_) => "not_found",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({ "key": key })),
            Error::Source(SourceError::Http { status, .. }) => {
                Some(serde_json::json!({ "upstream_status": status }))
            }
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
