//! Append-only audit log of list-scraper executions.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use snizenja_core::ScrapeRun;

use crate::DbError;

/// A row from the `scrape_runs` table. Never mutated after insertion.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScrapeRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub store: String,
    pub total_scraped: i32,
    pub filtered_count: i32,
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Appends one run record. Returns the internal `id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_run(pool: &PgPool, run: &ScrapeRun) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO scrape_runs \
             (public_id, store, total_scraped, filtered_count, errors, \
              started_at, completed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
    )
    .bind(run.public_id)
    .bind(run.store.key())
    .bind(run.total_scraped)
    .bind(run.filtered_count)
    .bind(&run.errors)
    .bind(run.started_at)
    .bind(run.completed_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns the most recent `limit` runs across all stores, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_runs(pool: &PgPool, limit: i64) -> Result<Vec<ScrapeRunRow>, DbError> {
    let rows = sqlx::query_as::<_, ScrapeRunRow>(
        "SELECT id, public_id, store, total_scraped, filtered_count, errors, \
                started_at, completed_at \
         FROM scrape_runs \
         ORDER BY started_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
