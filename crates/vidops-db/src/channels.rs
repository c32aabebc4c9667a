//! Database operations for the `youtube_channels` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use vidops_core::{Channel, Language};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `youtube_channels` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChannelRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub external_id: String,
    pub title: String,
    pub language: String,
    pub created_at: DateTime<Utc>,
}

impl ChannelRow {
    /// Convert into the domain [`Channel`], parsing the language tag.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Decode`] if the stored language is not recognized.
    pub fn into_domain(self) -> Result<Channel, DbError> {
        Ok(Channel {
            id: self.id,
            account_id: self.account_id,
            external_id: self.external_id,
            title: self.title,
            language: self.language.parse::<Language>()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all channels for an account, ordered by language tag.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::Decode`] if a
/// row holds an unknown language.
pub async fn list_channels(pool: &PgPool, account_id: Uuid) -> Result<Vec<Channel>, DbError> {
    let rows = sqlx::query_as::<_, ChannelRow>(
        "SELECT id, account_id, external_id, title, language, created_at \
         FROM youtube_channels \
         WHERE account_id = $1 \
         ORDER BY language",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ChannelRow::into_domain).collect()
}

/// Returns every distinct account id with at least one channel.
///
/// Drives the background reconciliation sweep, which runs per account.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_account_ids(pool: &PgPool) -> Result<Vec<Uuid>, DbError> {
    let ids = sqlx::query_scalar::<_, Uuid>(
        "SELECT DISTINCT account_id FROM youtube_channels ORDER BY account_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(ids)
}

/// Returns a single channel by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::Decode`] if the
/// row holds an unknown language.
pub async fn get_channel(pool: &PgPool, id: Uuid) -> Result<Option<Channel>, DbError> {
    let row = sqlx::query_as::<_, ChannelRow>(
        "SELECT id, account_id, external_id, title, language, created_at \
         FROM youtube_channels \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(ChannelRow::into_domain).transpose()
}

/// Returns the account's channel for a language, or `None` if none exists.
///
/// Each account has at most one channel per language (unique constraint).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::Decode`] if the
/// row holds an unknown language.
pub async fn get_channel_for_language(
    pool: &PgPool,
    account_id: Uuid,
    language: Language,
) -> Result<Option<Channel>, DbError> {
    let row = sqlx::query_as::<_, ChannelRow>(
        "SELECT id, account_id, external_id, title, language, created_at \
         FROM youtube_channels \
         WHERE account_id = $1 AND language = $2",
    )
    .bind(account_id)
    .bind(language.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(ChannelRow::into_domain).transpose()
}
