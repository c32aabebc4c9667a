//! Database operations for the `content_items` table.
//!
//! Rows store the two language variants as flat `en_*`/`es_*` columns; the
//! domain conversion folds them into per-language [`LanguageTrack`] records.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use vidops_core::{ContentItem, Language, LanguageTrack, VideoStatus, VideoType};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `content_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContentItemRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub video_number: i32,
    pub internal_title: String,
    pub video_type: String,
    pub topic_id: Option<Uuid>,
    pub en_main_title: Option<String>,
    pub es_main_title: Option<String>,
    pub en_status: String,
    pub es_status: String,
    pub en_publication_date: Option<DateTime<Utc>>,
    pub es_publication_date: Option<DateTime<Utc>>,
    pub en_youtube_link: Option<String>,
    pub es_youtube_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ContentItemRow {
    /// Convert into the domain [`ContentItem`], parsing the stored enums.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if a stored status or video type is not
    /// recognized.
    pub fn into_domain(self) -> Result<ContentItem, DbError> {
        Ok(ContentItem {
            id: self.id,
            account_id: self.account_id,
            video_number: self.video_number,
            internal_title: self.internal_title,
            video_type: self.video_type.parse::<VideoType>()?,
            topic_id: self.topic_id,
            en: LanguageTrack {
                main_title: self.en_main_title,
                status: self.en_status.parse::<VideoStatus>()?,
                publication_date: self.en_publication_date,
                youtube_link: self.en_youtube_link,
            },
            es: LanguageTrack {
                main_title: self.es_main_title,
                status: self.es_status.parse::<VideoStatus>()?,
                publication_date: self.es_publication_date,
                youtube_link: self.es_youtube_link,
            },
            created_at: self.created_at,
        })
    }
}

const COLUMNS: &str = "id, account_id, video_number, internal_title, video_type, topic_id, \
     en_main_title, es_main_title, en_status, es_status, \
     en_publication_date, es_publication_date, en_youtube_link, es_youtube_link, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all content items for an account in ascending `video_number` order.
///
/// This is the snapshot read used by the auto-linker, gap analyzer and
/// schedule generator; the ordering doubles as the generator's stable
/// candidate order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::Decode`] if a
/// row holds an unknown status or video type.
pub async fn list_content_items(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<Vec<ContentItem>, DbError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM content_items WHERE account_id = $1 ORDER BY video_number ASC"
    );
    let rows = sqlx::query_as::<_, ContentItemRow>(&sql)
        .bind(account_id)
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(ContentItemRow::into_domain).collect()
}

/// Returns a single content item by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::Decode`] if the
/// row holds an unknown status or video type.
pub async fn get_content_item(pool: &PgPool, id: Uuid) -> Result<Option<ContentItem>, DbError> {
    let sql = format!("SELECT {COLUMNS} FROM content_items WHERE id = $1");
    let row = sqlx::query_as::<_, ContentItemRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(ContentItemRow::into_domain).transpose()
}

/// Sets the publication date for one language variant of a content item.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matches the id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_publication_date(
    pool: &PgPool,
    id: Uuid,
    language: Language,
    date: DateTime<Utc>,
) -> Result<(), DbError> {
    let sql = match language {
        Language::En => "UPDATE content_items SET en_publication_date = $1 WHERE id = $2",
        Language::Es => "UPDATE content_items SET es_publication_date = $1 WHERE id = $2",
    };
    let result = sqlx::query(sql).bind(date).bind(id).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Clears the publication date for one language variant of a content item.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matches the id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn clear_publication_date(
    pool: &PgPool,
    id: Uuid,
    language: Language,
) -> Result<(), DbError> {
    let sql = match language {
        Language::En => "UPDATE content_items SET en_publication_date = NULL WHERE id = $1",
        Language::Es => "UPDATE content_items SET es_publication_date = NULL WHERE id = $1",
    };
    let result = sqlx::query(sql).bind(id).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
