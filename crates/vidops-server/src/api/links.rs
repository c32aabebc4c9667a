//! Link management: manual link/unlink, similarity-driven auto-linking and
//! the reconciliation sweep.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use vidops_core::Language;
use vidops_linking::{
    best_content_match, best_external_match, content_to_external_candidates, plan_reconciliation,
};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CreateLinkRequest {
    pub external_video_id: Uuid,
    pub content_id: Uuid,
    pub language: Language,
}

#[derive(Debug, Deserialize)]
pub(super) struct DeleteLinkQuery {
    /// When present, only that track's watch URL is cleared; without it both
    /// are cleared (the external-side unlink does not know which language
    /// was linked).
    pub language: Option<Language>,
}

#[derive(Debug, Serialize)]
pub(super) struct LinkData {
    pub external_video_id: Uuid,
    pub content_id: Option<Uuid>,
}

/// Auto-link runs in one of two directions. `content_id` plus `language`
/// searches the matching channel's unlinked videos for the item;
/// `external_video_id` searches the account's content items for the video.
#[derive(Debug, Deserialize)]
pub(super) struct AutoLinkRequest {
    pub account_id: Uuid,
    pub content_id: Option<Uuid>,
    pub language: Option<Language>,
    pub external_video_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub(super) struct AutoLinkData {
    /// `false` is the "no suitable match" outcome, not an error.
    pub linked: bool,
    pub external_video_id: Option<Uuid>,
    pub content_id: Option<Uuid>,
    pub score: Option<f64>,
}

impl AutoLinkData {
    fn no_match() -> Self {
        Self {
            linked: false,
            external_video_id: None,
            content_id: None,
            score: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ReconcileRequest {
    pub account_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ReconcileSummary {
    pub orphaned: usize,
    pub mismatched: usize,
    pub cleared: u64,
}

/// `POST /api/v1/links` — manual link between a video and a content item.
pub(super) async fn create_link(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateLinkRequest>,
) -> Result<Json<ApiResponse<LinkData>>, ApiError> {
    vidops_db::set_link(
        &state.pool,
        body.external_video_id,
        body.content_id,
        body.language,
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(
        external_video_id = %body.external_video_id,
        content_id = %body.content_id,
        language = %body.language,
        "link created"
    );
    Ok(Json(ApiResponse {
        data: LinkData {
            external_video_id: body.external_video_id,
            content_id: Some(body.content_id),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `DELETE /api/v1/links/{external_video_id}`
pub(super) async fn delete_link(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(external_video_id): Path<Uuid>,
    Query(query): Query<DeleteLinkQuery>,
) -> Result<Json<ApiResponse<LinkData>>, ApiError> {
    vidops_db::clear_link(&state.pool, external_video_id, query.language)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(%external_video_id, "link cleared");
    Ok(Json(ApiResponse {
        data: LinkData {
            external_video_id,
            content_id: None,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `POST /api/v1/links/auto`
pub(super) async fn auto_link(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AutoLinkRequest>,
) -> Result<Json<ApiResponse<AutoLinkData>>, ApiError> {
    let data = match (body.content_id, body.external_video_id) {
        (Some(content_id), None) => {
            let Some(language) = body.language else {
                return Err(ApiError::new(
                    req_id.0,
                    "validation_error",
                    "language is required when linking from a content item",
                ));
            };
            link_content_to_external(&state, &req_id.0, body.account_id, content_id, language)
                .await?
        }
        (None, Some(external_video_id)) => {
            link_external_to_content(&state, &req_id.0, body.account_id, external_video_id).await?
        }
        _ => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "provide exactly one of content_id or external_video_id",
            ));
        }
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

async fn link_content_to_external(
    state: &AppState,
    req_id: &str,
    account_id: Uuid,
    content_id: Uuid,
    language: Language,
) -> Result<AutoLinkData, ApiError> {
    let item = vidops_db::get_content_item(&state.pool, content_id)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?
        .ok_or_else(|| ApiError::new(req_id, "not_found", "content item not found"))?;

    let channel = vidops_db::get_channel_for_language(&state.pool, account_id, language)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?
        .ok_or_else(|| {
            ApiError::new(req_id, "not_found", "no channel for the requested language")
        })?;

    let videos = vidops_db::list_channel_videos(&state.pool, channel.id, true, 500)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?;

    let candidates = content_to_external_candidates(&item, &videos, &channel);
    let Some(decision) = best_external_match(&item, language, &candidates, state.config.link_threshold)
    else {
        return Ok(AutoLinkData::no_match());
    };

    vidops_db::set_link(&state.pool, decision.candidate_id, content_id, language)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?;

    tracing::info!(
        %content_id,
        external_video_id = %decision.candidate_id,
        score = decision.score,
        "auto-link committed"
    );
    Ok(AutoLinkData {
        linked: true,
        external_video_id: Some(decision.candidate_id),
        content_id: Some(content_id),
        score: Some(decision.score),
    })
}

async fn link_external_to_content(
    state: &AppState,
    req_id: &str,
    account_id: Uuid,
    external_video_id: Uuid,
) -> Result<AutoLinkData, ApiError> {
    let video = vidops_db::get_external_video(&state.pool, external_video_id)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?
        .ok_or_else(|| ApiError::new(req_id, "not_found", "external video not found"))?;

    let items = vidops_db::list_content_items(&state.pool, account_id)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?;

    let Some(decision) = best_content_match(&video, &items, state.config.link_threshold) else {
        return Ok(AutoLinkData::no_match());
    };

    // Scoring takes the better of the two main titles, but the watch URL
    // always lands on the track matching the video's channel language.
    let channel = vidops_db::get_channel(&state.pool, video.channel_id)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?
        .ok_or_else(|| ApiError::new(req_id, "not_found", "channel for video not found"))?;
    let language = channel.language;

    vidops_db::set_link(&state.pool, external_video_id, decision.candidate_id, language)
        .await
        .map_err(|e| map_db_error(req_id.to_string(), &e))?;

    tracing::info!(
        %external_video_id,
        content_id = %decision.candidate_id,
        score = decision.score,
        %language,
        "auto-link committed"
    );
    Ok(AutoLinkData {
        linked: true,
        external_video_id: Some(external_video_id),
        content_id: Some(decision.candidate_id),
        score: Some(decision.score),
    })
}

/// `POST /api/v1/links/reconcile`
pub(super) async fn reconcile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ReconcileRequest>,
) -> Result<Json<ApiResponse<ReconcileSummary>>, ApiError> {
    let summary = run_reconcile_sweep(&state.pool, body.account_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: summary,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// One reconciliation pass over an account: classify every linked video and
/// clear the stale ones on the external side only.
///
/// Shared between the HTTP trigger and the background cron job.
///
/// # Errors
///
/// Returns [`vidops_db::DbError`] if any snapshot read or the unlink update
/// fails.
pub(crate) async fn run_reconcile_sweep(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<ReconcileSummary, vidops_db::DbError> {
    let linked = vidops_db::list_linked_videos(pool, account_id).await?;
    let items = vidops_db::list_content_items(pool, account_id).await?;

    let plan = plan_reconciliation(&linked, &items);
    let cleared = vidops_db::unlink_external_side(pool, &plan.stale_video_ids()).await?;

    if cleared > 0 {
        tracing::info!(
            %account_id,
            orphaned = plan.orphaned.len(),
            mismatched = plan.mismatched.len(),
            cleared,
            "reconciliation cleared stale links"
        );
    }
    Ok(ReconcileSummary {
        orphaned: plan.orphaned.len(),
        mismatched: plan.mismatched.len(),
        cleared,
    })
}
