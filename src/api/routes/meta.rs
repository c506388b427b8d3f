//! Meta handler

use super::{MetaResponse, strip_json};
use crate::api::state::AppState;
use crate::types::{MediaType, MetaItem, SourceId};
use axum::{
    Json,
    extract::{Path, State},
};

/// GET /meta/:type/:id.json - Details of one item
///
/// Always answers 200; `meta` is null when the id cannot be parsed, is unknown
/// upstream, or the upstream call failed.
#[utoipa::path(
    get,
    path = "/meta/{type}/{id}.json",
    tag = "addon",
    params(
        ("type" = String, Path, description = "Content type, always `movie`"),
        ("id" = String, Path, description = "Item id, `tmdb:603` or `603`")
    ),
    responses(
        (status = 200, description = "Item details or null", body = MetaResponse)
    )
)]
pub async fn meta(
    State(state): State<AppState>,
    Path((media_type, file)): Path<(String, String)>,
) -> Json<MetaResponse> {
    let raw_id = strip_json(&file);

    let Some(id) = SourceId::parse_prefixed(raw_id)
        .filter(|_| media_type == MediaType::Movie.as_str())
    else {
        tracing::debug!(id = raw_id, media_type = %media_type, "Unsupported meta id");
        return Json(MetaResponse { meta: None });
    };

    let meta = match state.source.movie_details(id).await {
        Ok(details) => details.map(MetaItem::from),
        Err(e) => {
            tracing::warn!(source_id = %id, error = %e, "Failed to fetch movie details");
            None
        }
    };

    Json(MetaResponse { meta })
}
