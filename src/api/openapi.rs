//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the addon API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the release-catalog addon API
///
/// Served at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "release-catalog addon API",
        version = "0.1.0",
        description = "Catalog of recent movie releases, validated against regional release dates",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:7000", description = "Local development server")
    ),
    paths(
        // Addon resources
        crate::api::routes::manifest,
        crate::api::routes::catalog,
        crate::api::routes::catalog_with_extra,
        crate::api::routes::meta,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(
        schemas(
            crate::api::routes::Manifest,
            crate::api::routes::ManifestCatalog,
            crate::api::routes::ManifestExtra,
            crate::api::routes::CatalogQuery,
            crate::api::routes::CatalogResponse,
            crate::api::routes::MetaResponse,
            crate::types::ValidatedItem,
            crate::types::MetaItem,
            crate::types::MediaType,
            crate::error::ApiError,
            crate::error::ErrorDetail,
        )
    ),
    tags(
        (name = "addon", description = "Manifest, catalog, and meta resources"),
        (name = "system", description = "Health check and API documentation"),
    )
)]
pub struct ApiDoc;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_addon_paths() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();

        for expected in [
            "/manifest.json",
            "/catalog/{type}/{id}.json",
            "/catalog/{type}/{id}/{extra}.json",
            "/meta/{type}/{id}.json",
            "/health",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {expected} in {paths:?}"
            );
        }
    }

    #[test]
    fn test_openapi_serializes() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("ValidatedItem"));
    }
}
