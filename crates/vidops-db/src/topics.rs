//! Database operations for the `topics` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use vidops_core::Topic;

use crate::DbError;

/// A row from the `topics` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TopicRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub color: String,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<TopicRow> for Topic {
    fn from(row: TopicRow) -> Self {
        Self {
            id: row.id,
            account_id: row.account_id,
            name: row.name,
            color: row.color,
            keywords: row.keywords,
        }
    }
}

/// Returns all topics for an account, ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_topics(pool: &PgPool, account_id: Uuid) -> Result<Vec<Topic>, DbError> {
    let rows = sqlx::query_as::<_, TopicRow>(
        "SELECT id, account_id, name, color, keywords, created_at \
         FROM topics \
         WHERE account_id = $1 \
         ORDER BY name",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Topic::from).collect())
}
