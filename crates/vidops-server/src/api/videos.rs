use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use vidops_core::{Channel, ExternalVideo, Topic};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AccountQuery {
    pub account_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListVideosQuery {
    pub account_id: Uuid,
    /// Restrict to one channel; without it the whole account is returned.
    pub channel_id: Option<Uuid>,
    /// Only videos not yet linked to a content item.
    #[serde(default)]
    pub unlinked: bool,
    pub search: Option<String>,
    pub limit: Option<i64>,
}

/// `GET /api/v1/channels`
pub(super) async fn list_channels(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AccountQuery>,
) -> Result<Json<ApiResponse<Vec<Channel>>>, ApiError> {
    let data = vidops_db::list_channels(&state.pool, query.account_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `GET /api/v1/topics`
pub(super) async fn list_topics(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AccountQuery>,
) -> Result<Json<ApiResponse<Vec<Topic>>>, ApiError> {
    let data = vidops_db::list_topics(&state.pool, query.account_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `GET /api/v1/videos` — synced external videos, most recent first.
pub(super) async fn list_videos(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListVideosQuery>,
) -> Result<Json<ApiResponse<Vec<ExternalVideo>>>, ApiError> {
    let videos = match query.channel_id {
        Some(channel_id) => vidops_db::list_channel_videos(
            &state.pool,
            channel_id,
            query.unlinked,
            normalize_limit(query.limit),
        )
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?,
        None => {
            let all = vidops_db::list_account_videos(&state.pool, query.account_id)
                .await
                .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
            if query.unlinked {
                all.into_iter()
                    .filter(|v| v.linked_content_id.is_none())
                    .collect()
            } else {
                all
            }
        }
    };

    let data = match query.search.as_deref() {
        Some(term) if !term.is_empty() => {
            let refs: Vec<&ExternalVideo> = videos.iter().collect();
            vidops_linking::search_external(&refs, term)
                .into_iter()
                .cloned()
                .collect()
        }
        _ => videos,
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
