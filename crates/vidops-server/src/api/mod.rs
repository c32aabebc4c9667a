mod content;
mod links;
mod planning;
mod videos;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

pub(crate) use links::run_reconcile_sweep;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<vidops_core::AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 500)
}

pub(super) fn map_db_error(request_id: String, error: &vidops_db::DbError) -> ApiError {
    if matches!(error, vidops_db::DbError::NotFound) {
        return ApiError::new(request_id, "not_found", "record not found");
    }
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/content", get(content::list_content))
        .route("/api/v1/content/{id}", get(content::get_content))
        .route(
            "/api/v1/content/{id}/links",
            axum::routing::delete(content::clear_content_links),
        )
        .route("/api/v1/channels", get(videos::list_channels))
        .route("/api/v1/topics", get(videos::list_topics))
        .route("/api/v1/videos", get(videos::list_videos))
        .route(
            "/api/v1/links",
            post(links::create_link),
        )
        .route(
            "/api/v1/links/{external_video_id}",
            axum::routing::delete(links::delete_link),
        )
        .route("/api/v1/links/auto", post(links::auto_link))
        .route("/api/v1/links/reconcile", post(links::reconcile))
        .route("/api/v1/planning/gap", get(planning::gap_report))
        .route(
            "/api/v1/planning/schedule",
            post(planning::generate_schedule_handler),
        )
        .route(
            "/api/v1/planning/schedule/save",
            post(planning::save_schedule),
        )
        .route(
            "/api/v1/planning/schedule/{content_id}",
            axum::routing::delete(planning::unschedule),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match vidops_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn test_config() -> Arc<vidops_core::AppConfig> {
        Arc::new(vidops_core::AppConfig {
            database_url: "postgres://localhost/vidops_test".to_string(),
            env: vidops_core::Environment::Test,
            bind_addr: "127.0.0.1:0".parse().expect("addr"),
            log_level: "info".to_string(),
            db_max_connections: 5,
            db_min_connections: 1,
            db_acquire_timeout_secs: 5,
            link_threshold: 0.6,
            long_form_share: 0.6,
            reconcile_cron: "0 0 * * * *".to_string(),
        })
    }

    fn test_app(pool: sqlx::PgPool) -> Router {
        let auth = crate::middleware::AuthState::from_env(true).expect("auth");
        build_app(
            AppState {
                pool,
                config: test_config(),
            },
            auth,
            default_rate_limit_state(),
        )
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json parse")
    }

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(10_000)), 500);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_db_error_maps_to_404() {
        let error = map_db_error("req-1".to_string(), &vidops_db::DbError::NotFound);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // ---------------------------------------------------------------------
    // Seed helpers for route integration tests
    // ---------------------------------------------------------------------

    async fn seed_channel(pool: &sqlx::PgPool, account_id: Uuid, language: &str) -> Uuid {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO youtube_channels (account_id, external_id, title, language) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(account_id)
        .bind(format!("UC-{language}"))
        .bind(format!("Channel {language}"))
        .bind(language)
        .fetch_one(pool)
        .await
        .expect("seed channel")
    }

    async fn seed_content_item(
        pool: &sqlx::PgPool,
        account_id: Uuid,
        number: i32,
        en_title: &str,
    ) -> Uuid {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO content_items \
             (account_id, video_number, internal_title, video_type, en_main_title, en_status, es_status) \
             VALUES ($1, $2, $3, 'long-form', $4, 'edited', 'idea') RETURNING id",
        )
        .bind(account_id)
        .bind(number)
        .bind(format!("item {number}"))
        .bind(en_title)
        .fetch_one(pool)
        .await
        .expect("seed content item")
    }

    async fn seed_video(
        pool: &sqlx::PgPool,
        account_id: Uuid,
        channel_id: Uuid,
        external_id: &str,
        title: &str,
    ) -> Uuid {
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO external_videos \
             (account_id, channel_id, external_id, title, duration_seconds, is_short) \
             VALUES ($1, $2, $3, $4, 600, false) RETURNING id",
        )
        .bind(account_id)
        .bind(channel_id)
        .bind(external_id)
        .bind(title)
        .fetch_one(pool)
        .await
        .expect("seed video")
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_returns_ok(pool: sqlx::PgPool) {
        let app = test_app(pool);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"].as_str(), Some("ok"));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_content_returns_seeded_items(pool: sqlx::PgPool) {
        let account_id = Uuid::new_v4();
        seed_content_item(&pool, account_id, 1, "Rust Ownership Explained").await;
        seed_content_item(&pool, account_id, 2, "Borrow Checker Deep Dive").await;

        let app = test_app(pool);
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/content?account_id={account_id}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["video_number"].as_i64(), Some(1));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn get_content_returns_404_for_unknown_id(pool: sqlx::PgPool) {
        let app = test_app(pool);
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/content/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn manual_link_sets_both_sides(pool: sqlx::PgPool) {
        let account_id = Uuid::new_v4();
        let channel_id = seed_channel(&pool, account_id, "en").await;
        let content_id = seed_content_item(&pool, account_id, 1, "Rust Intro").await;
        let video_id = seed_video(&pool, account_id, channel_id, "abc123", "Rust Intro").await;

        let app = test_app(pool.clone());
        let body = serde_json::json!({
            "external_video_id": video_id,
            "content_id": content_id,
            "language": "en",
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/links")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);

        let linked: Option<Uuid> = sqlx::query_scalar(
            "SELECT linked_content_id FROM external_videos WHERE id = $1",
        )
        .bind(video_id)
        .fetch_one(&pool)
        .await
        .expect("read back");
        assert_eq!(linked, Some(content_id));

        let link: Option<String> =
            sqlx::query_scalar("SELECT en_youtube_link FROM content_items WHERE id = $1")
                .bind(content_id)
                .fetch_one(&pool)
                .await
                .expect("read back");
        assert_eq!(link.as_deref(), Some("https://youtube.com/watch?v=abc123"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn auto_link_commits_a_high_overlap_match(pool: sqlx::PgPool) {
        let account_id = Uuid::new_v4();
        let channel_id = seed_channel(&pool, account_id, "en").await;
        let content_id =
            seed_content_item(&pool, account_id, 1, "rust ownership borrowing explained").await;
        let video_id = seed_video(
            &pool,
            account_id,
            channel_id,
            "vid-match",
            "rust ownership borrowing explained",
        )
        .await;
        seed_video(&pool, account_id, channel_id, "vid-other", "cooking pasta tonight").await;

        let app = test_app(pool.clone());
        let body = serde_json::json!({
            "account_id": account_id,
            "content_id": content_id,
            "language": "en",
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/links/auto")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["linked"].as_bool(), Some(true));
        assert_eq!(
            json["data"]["external_video_id"].as_str(),
            Some(video_id.to_string().as_str())
        );

        let linked: Option<Uuid> = sqlx::query_scalar(
            "SELECT linked_content_id FROM external_videos WHERE id = $1",
        )
        .bind(video_id)
        .fetch_one(&pool)
        .await
        .expect("read back");
        assert_eq!(linked, Some(content_id));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn auto_link_from_video_uses_the_channel_language(pool: sqlx::PgPool) {
        let account_id = Uuid::new_v4();
        let channel_id = seed_channel(&pool, account_id, "es").await;
        // Only the EN title matches, but the video lives on the ES channel,
        // so the watch URL must land on the ES track.
        let content_id =
            seed_content_item(&pool, account_id, 1, "rust ownership borrowing explained").await;
        let video_id = seed_video(
            &pool,
            account_id,
            channel_id,
            "vid-es",
            "rust ownership borrowing explained",
        )
        .await;

        let app = test_app(pool.clone());
        let body = serde_json::json!({
            "account_id": account_id,
            "external_video_id": video_id,
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/links/auto")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["linked"].as_bool(), Some(true));
        assert_eq!(
            json["data"]["content_id"].as_str(),
            Some(content_id.to_string().as_str())
        );

        let (en_link, es_link): (Option<String>, Option<String>) = sqlx::query_as(
            "SELECT en_youtube_link, es_youtube_link FROM content_items WHERE id = $1",
        )
        .bind(content_id)
        .fetch_one(&pool)
        .await
        .expect("read back");
        assert_eq!(en_link, None);
        assert_eq!(
            es_link.as_deref(),
            Some("https://youtube.com/watch?v=vid-es")
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn auto_link_reports_no_match_below_threshold(pool: sqlx::PgPool) {
        let account_id = Uuid::new_v4();
        let channel_id = seed_channel(&pool, account_id, "en").await;
        let content_id = seed_content_item(&pool, account_id, 1, "Cooking Pasta").await;
        seed_video(
            &pool,
            account_id,
            channel_id,
            "vid1",
            "Rust Introduction Tutorial",
        )
        .await;

        let app = test_app(pool);
        let body = serde_json::json!({
            "account_id": account_id,
            "content_id": content_id,
            "language": "en",
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/links/auto")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["linked"].as_bool(), Some(false));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn reconcile_clears_orphaned_links(pool: sqlx::PgPool) {
        let account_id = Uuid::new_v4();
        let channel_id = seed_channel(&pool, account_id, "en").await;
        let video_id = seed_video(&pool, account_id, channel_id, "vid1", "anything").await;
        // Point the link at a content item that does not exist.
        sqlx::query("UPDATE external_videos SET linked_content_id = $1 WHERE id = $2")
            .bind(Uuid::new_v4())
            .bind(video_id)
            .execute(&pool)
            .await
            .expect("force orphan");

        let app = test_app(pool.clone());
        let body = serde_json::json!({ "account_id": account_id });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/links/reconcile")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["orphaned"].as_u64(), Some(1));
        assert_eq!(json["data"]["cleared"].as_u64(), Some(1));

        let linked: Option<Uuid> = sqlx::query_scalar(
            "SELECT linked_content_id FROM external_videos WHERE id = $1",
        )
        .bind(video_id)
        .fetch_one(&pool)
        .await
        .expect("read back");
        assert_eq!(linked, None);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn schedule_save_writes_publication_dates(pool: sqlx::PgPool) {
        let account_id = Uuid::new_v4();
        let content_id = seed_content_item(&pool, account_id, 1, "Rust Intro").await;

        let app = test_app(pool.clone());
        let body = serde_json::json!({
            "assignments": [
                { "content_id": content_id, "date": "2026-09-07", "language": "en" }
            ]
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/planning/schedule/save")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["applied"].as_u64(), Some(1));

        let date: Option<chrono::DateTime<Utc>> = sqlx::query_scalar(
            "SELECT en_publication_date FROM content_items WHERE id = $1",
        )
        .bind(content_id)
        .fetch_one(&pool)
        .await
        .expect("read back");
        assert_eq!(
            date.map(|d| d.date_naive().to_string()),
            Some("2026-09-07".to_string())
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn unschedule_clears_the_publication_date(pool: sqlx::PgPool) {
        let account_id = Uuid::new_v4();
        let content_id = seed_content_item(&pool, account_id, 1, "Rust Intro").await;
        sqlx::query("UPDATE content_items SET en_publication_date = NOW() WHERE id = $1")
            .bind(content_id)
            .execute(&pool)
            .await
            .expect("seed date");

        let app = test_app(pool.clone());
        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!(
                        "/api/v1/planning/schedule/{content_id}?language=en"
                    ))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);

        let date: Option<chrono::DateTime<Utc>> = sqlx::query_scalar(
            "SELECT en_publication_date FROM content_items WHERE id = $1",
        )
        .bind(content_id)
        .fetch_one(&pool)
        .await
        .expect("read back");
        assert_eq!(date, None);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn unschedule_returns_404_for_unknown_item(pool: sqlx::PgPool) {
        let app = test_app(pool);
        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!(
                        "/api/v1/planning/schedule/{}?language=en",
                        Uuid::new_v4()
                    ))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
