use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vidops_core::ContentItem;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ListContentQuery {
    pub account_id: Uuid,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ClearedLinksData {
    pub content_id: Uuid,
}

/// `GET /api/v1/content` — account snapshot in `video_number` order, with
/// optional free-text narrowing over internal and main titles.
pub(super) async fn list_content(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListContentQuery>,
) -> Result<Json<ApiResponse<Vec<ContentItem>>>, ApiError> {
    let items = vidops_db::list_content_items(&state.pool, query.account_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = match query.search.as_deref() {
        Some(term) if !term.is_empty() => vidops_linking::search_content(&items, term)
            .into_iter()
            .cloned()
            .collect(),
        _ => items,
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `GET /api/v1/content/{id}`
pub(super) async fn get_content(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ContentItem>>, ApiError> {
    let item = vidops_db::get_content_item(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "content item not found"))?;

    Ok(Json(ApiResponse {
        data: item,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `DELETE /api/v1/content/{id}/links` — removes every link involving the
/// item: its stored watch URLs and any videos still pointing at it.
pub(super) async fn clear_content_links(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ClearedLinksData>>, ApiError> {
    vidops_db::clear_content_links(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ClearedLinksData { content_id: id },
        meta: ResponseMeta::new(req_id.0),
    }))
}
