//! The link store: the bidirectional association between an external video
//! and a content item.
//!
//! A link lives in two places — `external_videos.linked_content_id` and the
//! content item's language-scoped `*_youtube_link` column. Every operation
//! that changes both sides runs inside a single transaction so callers never
//! observe a half-written link.

use sqlx::PgPool;
use uuid::Uuid;

use vidops_core::{ExternalVideo, Language};

use crate::external_videos::ExternalVideoRow;
use crate::DbError;

/// Links an external video to a content item.
///
/// Writes the back-reference on the video row and the canonical watch URL on
/// the content item's track for `language`, atomically.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if either record does not exist (nothing is
/// written), or [`DbError::Sqlx`] on query failure.
pub async fn set_link(
    pool: &PgPool,
    external_video_id: Uuid,
    content_id: Uuid,
    language: Language,
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    let external_id: Option<String> = sqlx::query_scalar(
        "UPDATE external_videos SET linked_content_id = $1 WHERE id = $2 RETURNING external_id",
    )
    .bind(content_id)
    .bind(external_video_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(external_id) = external_id else {
        return Err(DbError::NotFound);
    };

    let watch_url = format!("https://youtube.com/watch?v={external_id}");
    let sql = match language {
        Language::En => "UPDATE content_items SET en_youtube_link = $1 WHERE id = $2",
        Language::Es => "UPDATE content_items SET es_youtube_link = $1 WHERE id = $2",
    };
    let result = sqlx::query(sql)
        .bind(&watch_url)
        .bind(content_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    tx.commit().await?;
    Ok(())
}

/// Unlinks an external video, clearing both sides atomically.
///
/// With `language: Some(_)` only that track's watch URL is cleared (the
/// content→external unlink, where the caller knows which language was
/// linked). With `None` both EN and ES URLs are cleared — the
/// external→content unlink does not know which language matched, so it
/// clears defensively on both.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the video does not exist, or
/// [`DbError::Sqlx`] on query failure. A video that is already unlinked is
/// not an error.
pub async fn clear_link(
    pool: &PgPool,
    external_video_id: Uuid,
    language: Option<Language>,
) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    let linked: Option<Option<Uuid>> = sqlx::query_scalar(
        "SELECT linked_content_id FROM external_videos WHERE id = $1 FOR UPDATE",
    )
    .bind(external_video_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(linked_content_id) = linked else {
        return Err(DbError::NotFound);
    };

    sqlx::query("UPDATE external_videos SET linked_content_id = NULL WHERE id = $1")
        .bind(external_video_id)
        .execute(&mut *tx)
        .await?;

    if let Some(content_id) = linked_content_id {
        let sql = match language {
            Some(Language::En) => "UPDATE content_items SET en_youtube_link = NULL WHERE id = $1",
            Some(Language::Es) => "UPDATE content_items SET es_youtube_link = NULL WHERE id = $1",
            None => {
                "UPDATE content_items \
                 SET en_youtube_link = NULL, es_youtube_link = NULL \
                 WHERE id = $1"
            }
        };
        // The content item may have been deleted since linking; that's fine,
        // the video side is cleared regardless.
        sqlx::query(sql).bind(content_id).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Clears every link involving a content item: both its watch URLs and any
/// external videos still pointing at it.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the content item does not exist, or
/// [`DbError::Sqlx`] on query failure.
pub async fn clear_content_links(pool: &PgPool, content_id: Uuid) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE external_videos SET linked_content_id = NULL WHERE linked_content_id = $1")
        .bind(content_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query(
        "UPDATE content_items \
         SET en_youtube_link = NULL, es_youtube_link = NULL \
         WHERE id = $1",
    )
    .bind(content_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    tx.commit().await?;
    Ok(())
}

/// Looks up an account's video snapshot by its platform video identifier.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_by_external_id(
    pool: &PgPool,
    account_id: Uuid,
    external_id: &str,
) -> Result<Option<ExternalVideo>, DbError> {
    let row = sqlx::query_as::<_, ExternalVideoRow>(
        "SELECT id, account_id, channel_id, external_id, title, published_at, \
                view_count, like_count, comment_count, duration_seconds, is_short, \
                linked_content_id, last_synced_at, created_at \
         FROM external_videos \
         WHERE account_id = $1 AND external_id = $2",
    )
    .bind(account_id)
    .bind(external_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(ExternalVideo::from))
}

/// Returns linked videos whose referenced content item no longer exists in
/// the account.
///
/// `linked_content_id` carries no foreign key, so content deletions leave
/// these dangling until the reconciliation sweep clears them.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_orphaned(pool: &PgPool, account_id: Uuid) -> Result<Vec<ExternalVideo>, DbError> {
    let rows = sqlx::query_as::<_, ExternalVideoRow>(
        "SELECT v.id, v.account_id, v.channel_id, v.external_id, v.title, v.published_at, \
                v.view_count, v.like_count, v.comment_count, v.duration_seconds, v.is_short, \
                v.linked_content_id, v.last_synced_at, v.created_at \
         FROM external_videos v \
         LEFT JOIN content_items c \
           ON c.id = v.linked_content_id AND c.account_id = v.account_id \
         WHERE v.account_id = $1 AND v.linked_content_id IS NOT NULL AND c.id IS NULL",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ExternalVideo::from).collect())
}

/// Clears `linked_content_id` on the given videos without touching the
/// content side. Used by the reconciliation sweep, which clears unilaterally.
///
/// Returns the number of rows cleared.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn unlink_external_side(pool: &PgPool, video_ids: &[Uuid]) -> Result<u64, DbError> {
    if video_ids.is_empty() {
        return Ok(0);
    }
    let result =
        sqlx::query("UPDATE external_videos SET linked_content_id = NULL WHERE id = ANY($1)")
            .bind(video_ids)
            .execute(pool)
            .await?;

    Ok(result.rows_affected())
}
