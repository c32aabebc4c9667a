//! Database operations for the `external_videos` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use vidops_core::ExternalVideo;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `external_videos` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExternalVideoRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub channel_id: Uuid,
    pub external_id: String,
    pub title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub duration_seconds: Option<i32>,
    pub is_short: Option<bool>,
    pub linked_content_id: Option<Uuid>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ExternalVideoRow> for ExternalVideo {
    fn from(row: ExternalVideoRow) -> Self {
        Self {
            id: row.id,
            account_id: row.account_id,
            channel_id: row.channel_id,
            external_id: row.external_id,
            title: row.title,
            published_at: row.published_at,
            view_count: row.view_count,
            like_count: row.like_count,
            comment_count: row.comment_count,
            duration_seconds: row.duration_seconds,
            is_short: row.is_short,
            linked_content_id: row.linked_content_id,
        }
    }
}

const COLUMNS: &str = "id, account_id, channel_id, external_id, title, published_at, \
     view_count, like_count, comment_count, duration_seconds, is_short, \
     linked_content_id, last_synced_at, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns videos on one channel, most recently published first.
///
/// With `unlinked_only` set, rows that already reference a content item are
/// excluded — the candidate pool for content→external linking.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_channel_videos(
    pool: &PgPool,
    channel_id: Uuid,
    unlinked_only: bool,
    limit: i64,
) -> Result<Vec<ExternalVideo>, DbError> {
    let sql = if unlinked_only {
        format!(
            "SELECT {COLUMNS} FROM external_videos \
             WHERE channel_id = $1 AND linked_content_id IS NULL \
             ORDER BY published_at DESC NULLS LAST LIMIT $2"
        )
    } else {
        format!(
            "SELECT {COLUMNS} FROM external_videos \
             WHERE channel_id = $1 \
             ORDER BY published_at DESC NULLS LAST LIMIT $2"
        )
    };
    let rows = sqlx::query_as::<_, ExternalVideoRow>(&sql)
        .bind(channel_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(ExternalVideo::from).collect())
}

/// Returns every synced video for an account, most recently published first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_account_videos(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<Vec<ExternalVideo>, DbError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM external_videos \
         WHERE account_id = $1 \
         ORDER BY published_at DESC NULLS LAST"
    );
    let rows = sqlx::query_as::<_, ExternalVideoRow>(&sql)
        .bind(account_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(ExternalVideo::from).collect())
}

/// Returns all linked videos for an account — the reconciliation sweep's
/// working set.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_linked_videos(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<Vec<ExternalVideo>, DbError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM external_videos \
         WHERE account_id = $1 AND linked_content_id IS NOT NULL \
         ORDER BY published_at DESC NULLS LAST"
    );
    let rows = sqlx::query_as::<_, ExternalVideoRow>(&sql)
        .bind(account_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(ExternalVideo::from).collect())
}

/// Returns a single video by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_external_video(pool: &PgPool, id: Uuid) -> Result<Option<ExternalVideo>, DbError> {
    let sql = format!("SELECT {COLUMNS} FROM external_videos WHERE id = $1");
    let row = sqlx::query_as::<_, ExternalVideoRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(ExternalVideo::from))
}
