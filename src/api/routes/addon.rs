//! Manifest and catalog handlers

use super::{
    CatalogQuery, CatalogResponse, Manifest, ManifestCatalog, ManifestExtra, strip_json,
};
use crate::api::state::AppState;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{ID_PREFIX, MediaType};
use axum::{
    Json,
    extract::{Path, Query, State},
};

impl Manifest {
    /// Manifest describing the configured catalog
    pub fn from_config(config: &Config) -> Self {
        let addon = &config.addon;
        let description = addon.description.clone().unwrap_or_else(|| {
            format!(
                "Movies released in {} during the last {} days",
                config.catalog.canonical_region, config.catalog.lookback_days
            )
        });

        Self {
            id: addon.id.clone(),
            version: addon.version.clone(),
            name: addon.name.clone(),
            description,
            resources: vec!["catalog".to_string(), "meta".to_string()],
            types: vec![MediaType::Movie],
            catalogs: vec![ManifestCatalog {
                media_type: MediaType::Movie,
                id: addon.catalog_id.clone(),
                name: addon.catalog_name.clone(),
                extra: vec![
                    ManifestExtra {
                        name: "skip".to_string(),
                    },
                    ManifestExtra {
                        name: "page".to_string(),
                    },
                ],
            }],
            id_prefixes: vec![format!("{}:", ID_PREFIX)],
        }
    }
}

/// GET /manifest.json - Addon manifest
#[utoipa::path(
    get,
    path = "/manifest.json",
    tag = "addon",
    responses(
        (status = 200, description = "Addon manifest", body = Manifest)
    )
)]
pub async fn manifest(State(state): State<AppState>) -> Json<Manifest> {
    Json(Manifest::from_config(&state.config))
}

/// GET /catalog/:type/:id.json - One catalog page
#[utoipa::path(
    get,
    path = "/catalog/{type}/{id}.json",
    tag = "addon",
    params(
        ("type" = String, Path, description = "Content type, always `movie`"),
        ("id" = String, Path, description = "Catalog id"),
        ("page" = Option<String>, Query, description = "1-based page number (default: 1)"),
        ("skip" = Option<String>, Query, description = "Items to skip; converted to a page number")
    ),
    responses(
        (status = 200, description = "Catalog page", body = CatalogResponse),
        (status = 404, description = "Unknown catalog", body = crate::error::ApiError)
    )
)]
pub async fn catalog(
    State(state): State<AppState>,
    Path((media_type, file)): Path<(String, String)>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>> {
    serve_catalog(&state, &media_type, strip_json(&file), &query).await
}

/// GET /catalog/:type/:id/:extra.json - One catalog page, extras in the path
#[utoipa::path(
    get,
    path = "/catalog/{type}/{id}/{extra}.json",
    tag = "addon",
    params(
        ("type" = String, Path, description = "Content type, always `movie`"),
        ("id" = String, Path, description = "Catalog id"),
        ("extra" = String, Path, description = "Extra properties, e.g. `skip=40`")
    ),
    responses(
        (status = 200, description = "Catalog page", body = CatalogResponse),
        (status = 404, description = "Unknown catalog", body = crate::error::ApiError)
    )
)]
pub async fn catalog_with_extra(
    State(state): State<AppState>,
    Path((media_type, catalog_id, extra)): Path<(String, String, String)>,
) -> Result<Json<CatalogResponse>> {
    let query = CatalogQuery::from_extra(&extra);
    serve_catalog(&state, &media_type, &catalog_id, &query).await
}

async fn serve_catalog(
    state: &AppState,
    media_type: &str,
    catalog_id: &str,
    query: &CatalogQuery,
) -> Result<Json<CatalogResponse>> {
    if media_type != MediaType::Movie.as_str() || catalog_id != state.config.addon.catalog_id {
        return Err(Error::NotFound(format!(
            "catalog {}/{}",
            media_type, catalog_id
        )));
    }

    let page_number = query.page_number(state.catalog.config().page_size);
    tracing::debug!(page = page_number, "Catalog request");

    let metas = state.catalog.build_page(page_number).await;
    Ok(Json(CatalogResponse { metas }))
}
