//! Planning endpoints: gap analysis and schedule generation/commit.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vidops_core::{Language, SchedulingPreferences};
use vidops_planning::{analyze_gap, eligible_candidates, generate_schedule, Assignment, GapReport};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct GapQuery {
    pub account_id: Uuid,
    pub language: Language,
    pub target_date: NaiveDate,
    pub posts_per_week: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct GenerateRequest {
    pub account_id: Uuid,
    pub language: Language,
    /// First day the walk may assign; defaults to today.
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub preferences: SchedulingPreferences,
}

#[derive(Debug, Serialize)]
pub(super) struct GeneratedSchedule {
    pub assignments: Vec<Assignment>,
    /// Eligible candidates the walk could not place before its cap.
    pub unplaced: usize,
}

#[derive(Debug, Deserialize)]
pub(super) struct SaveScheduleRequest {
    pub assignments: Vec<SaveAssignment>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SaveAssignment {
    pub content_id: Uuid,
    pub date: NaiveDate,
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub(super) struct SaveScheduleData {
    pub applied: usize,
}

#[derive(Debug, Deserialize)]
pub(super) struct UnscheduleQuery {
    pub language: Language,
}

#[derive(Debug, Serialize)]
pub(super) struct UnscheduleData {
    pub content_id: Uuid,
    pub language: Language,
}

/// `GET /api/v1/planning/gap`
pub(super) async fn gap_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<GapQuery>,
) -> Result<Json<ApiResponse<GapReport>>, ApiError> {
    let items = vidops_db::list_content_items(&state.pool, query.account_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let topics = vidops_db::list_topics(&state.pool, query.account_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let report = analyze_gap(
        &items,
        &topics,
        Utc::now().date_naive(),
        query.target_date,
        query.posts_per_week,
        query.language,
        state.config.long_form_share,
    );

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `POST /api/v1/planning/schedule` — generate without persisting. A
/// schedule the caller discards never touches the store.
pub(super) async fn generate_schedule_handler(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<ApiResponse<GeneratedSchedule>>, ApiError> {
    let items = vidops_db::list_content_items(&state.pool, body.account_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let candidates = eligible_candidates(&items, &body.preferences, body.language);
    let start = body.start_date.unwrap_or_else(|| Utc::now().date_naive());
    let assignments = generate_schedule(&candidates, &body.preferences, body.language, start);
    let unplaced = candidates.len() - assignments.len();

    Ok(Json(ApiResponse {
        data: GeneratedSchedule {
            assignments,
            unplaced,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `POST /api/v1/planning/schedule/save` — commit generated assignments.
///
/// Writes are issued one item at a time; a failure partway leaves earlier
/// items scheduled. The error message reports how many writes had already
/// been applied so the caller knows the store moved.
pub(super) async fn save_schedule(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SaveScheduleRequest>,
) -> Result<Json<ApiResponse<SaveScheduleData>>, ApiError> {
    let mut applied = 0usize;
    for assignment in &body.assignments {
        let timestamp = assignment.date.and_time(NaiveTime::MIN).and_utc();
        if let Err(e) = vidops_db::set_publication_date(
            &state.pool,
            assignment.content_id,
            assignment.language,
            timestamp,
        )
        .await
        {
            tracing::error!(
                error = %e,
                content_id = %assignment.content_id,
                applied,
                total = body.assignments.len(),
                "schedule save failed partway"
            );
            return Err(ApiError::new(
                req_id.0,
                "internal_error",
                format!(
                    "schedule save failed after applying {applied} of {} assignments",
                    body.assignments.len()
                ),
            ));
        }
        applied += 1;
    }

    tracing::info!(applied, "schedule saved");
    Ok(Json(ApiResponse {
        data: SaveScheduleData { applied },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// `DELETE /api/v1/planning/schedule/{content_id}` — put a scheduled item
/// back into the draft pool by clearing one track's publication date.
pub(super) async fn unschedule(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(content_id): Path<Uuid>,
    Query(query): Query<UnscheduleQuery>,
) -> Result<Json<ApiResponse<UnscheduleData>>, ApiError> {
    vidops_db::clear_publication_date(&state.pool, content_id, query.language)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(%content_id, language = %query.language, "publication date cleared");
    Ok(Json(ApiResponse {
        data: UnscheduleData {
            content_id,
            language: query.language,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
