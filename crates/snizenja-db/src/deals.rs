//! Database operations for the `deals` catalog.
//!
//! The write discipline is asymmetric on purpose: upserts are eager (every
//! sighting refreshes the row) while deletes are cautious (stale cleanup is
//! gated by a minimum-yield safeguard so a broken scraper cannot wipe a
//! store's catalog).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use snizenja_core::{Deal, Store};

use crate::DbError;

/// A row from the `deals` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DealRow {
    pub id: String,
    pub store: String,
    pub name: String,
    pub brand: Option<String>,
    pub original_price: i64,
    pub sale_price: i64,
    pub discount_percent: i16,
    pub url: String,
    pub image_url: String,
    pub detail_image_url: Option<String>,
    pub description: Option<String>,
    pub sizes: Vec<String>,
    pub categories: Vec<String>,
    /// Stored lowercase; decode with `Gender::from_db`.
    pub gender: String,
    pub scraped_at: DateTime<Utc>,
    pub details_scraped_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

const DEAL_COLUMNS: &str = "id, store, name, brand, original_price, sale_price, \
     discount_percent, url, image_url, detail_image_url, description, \
     sizes, categories, gender, scraped_at, details_scraped_at, created_at";

/// Upserts a deal keyed by `url`.
///
/// On conflict every list-pass field is updated in place and `scraped_at`
/// is refreshed; `id` and `url` are never changed. Detail enrichment
/// (description, detail image, and non-empty sizes) is preserved: the list
/// pass cannot clobber it with empty data. Two listing sections racing on
/// the same URL resolve to one row, which is why duplicate-key conflicts
/// are never surfaced as errors.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_deal(pool: &PgPool, deal: &Deal) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO deals \
             (id, store, name, brand, original_price, sale_price, \
              discount_percent, url, image_url, sizes, categories, gender) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         ON CONFLICT (url) DO UPDATE SET \
             name             = EXCLUDED.name, \
             brand            = EXCLUDED.brand, \
             original_price   = EXCLUDED.original_price, \
             sale_price       = EXCLUDED.sale_price, \
             discount_percent = EXCLUDED.discount_percent, \
             image_url        = EXCLUDED.image_url, \
             sizes            = CASE WHEN cardinality(EXCLUDED.sizes) > 0 \
                                     THEN EXCLUDED.sizes ELSE deals.sizes END, \
             categories       = CASE WHEN cardinality(EXCLUDED.categories) > 0 \
                                     THEN EXCLUDED.categories ELSE deals.categories END, \
             gender           = CASE WHEN EXCLUDED.gender <> 'unisex' \
                                     THEN EXCLUDED.gender ELSE deals.gender END, \
             scraped_at       = NOW()",
    )
    .bind(&deal.id)
    .bind(deal.store.key())
    .bind(&deal.name)
    .bind(&deal.brand)
    .bind(deal.original_price)
    .bind(deal.sale_price)
    .bind(deal.discount_percent)
    .bind(&deal.url)
    .bind(&deal.image_url)
    .bind(&deal.sizes)
    .bind(&deal.categories)
    .bind(deal.gender.as_str())
    .execute(pool)
    .await?;

    Ok(())
}

/// Applies detail enrichment to the deal with `url` and stamps
/// `details_scraped_at`.
///
/// `sizes` is written as-is (an empty list is meaningful: it records that a
/// successful detail pass found nothing in stock). Description, image,
/// categories, and gender only overwrite when the detail pass produced a
/// value.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no deal has that URL, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn apply_detail(
    pool: &PgPool,
    url: &str,
    sizes: &[String],
    description: Option<&str>,
    detail_image_url: Option<&str>,
    categories: &[String],
    gender: Option<&str>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE deals SET \
             sizes              = $2, \
             description        = COALESCE($3, description), \
             detail_image_url   = COALESCE($4, detail_image_url), \
             categories         = CASE WHEN cardinality($5::text[]) > 0 \
                                       THEN $5 ELSE categories END, \
             gender             = COALESCE($6, gender), \
             details_scraped_at = NOW() \
         WHERE url = $1",
    )
    .bind(url)
    .bind(sizes)
    .bind(description)
    .bind(detail_image_url)
    .bind(categories)
    .bind(gender)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Returns the URLs of deals for `store` that still need a detail pass:
/// never enriched, or — the silent-failure recovery case — enriched but
/// with an empty size list. With `force`, every deal for the store is
/// selected for a full re-scrape.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn pending_details(
    pool: &PgPool,
    store: Store,
    force: bool,
) -> Result<Vec<String>, DbError> {
    let urls = sqlx::query_scalar::<_, String>(
        "SELECT url FROM deals \
         WHERE store = $1 \
           AND ($2 \
                OR details_scraped_at IS NULL \
                OR (details_scraped_at IS NOT NULL AND cardinality(sizes) = 0)) \
         ORDER BY scraped_at DESC, id",
    )
    .bind(store.key())
    .bind(force)
    .fetch_all(pool)
    .await?;

    Ok(urls)
}

/// Fetches one deal by URL.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] when absent, [`DbError::Sqlx`] on query
/// failure.
pub async fn get_deal_by_url(pool: &PgPool, url: &str) -> Result<DealRow, DbError> {
    let row = sqlx::query_as::<_, DealRow>(&format!(
        "SELECT {DEAL_COLUMNS} FROM deals WHERE url = $1"
    ))
    .bind(url)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Deletes a single deal by URL (the out-of-stock path for stores whose
/// policy removes zero-size products). Returns whether a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_deal(pool: &PgPool, url: &str) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM deals WHERE url = $1")
        .bind(url)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Removes deals for `store` that the latest run no longer reported —
/// rows whose `scraped_at` predates `run_started_at`.
///
/// Gated by the minimum-yield safeguard: when `deals_found` is below
/// `floor`, the run is not trusted enough to delete anything (a transient
/// site or scraper failure would otherwise wipe the store's catalog), so
/// cleanup is skipped entirely. Returns the number of rows deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn cleanup_stale(
    pool: &PgPool,
    store: Store,
    run_started_at: DateTime<Utc>,
    deals_found: i64,
    floor: i64,
) -> Result<u64, DbError> {
    if deals_found < floor {
        tracing::warn!(
            store = %store,
            deals_found,
            floor,
            "run yield below cleanup floor — skipping stale cleanup"
        );
        return Ok(0);
    }

    let result = sqlx::query("DELETE FROM deals WHERE store = $1 AND scraped_at < $2")
        .bind(store.key())
        .bind(run_started_at)
        .execute(pool)
        .await?;

    let deleted = result.rows_affected();
    if deleted > 0 {
        tracing::info!(store = %store, deleted, "removed stale deals");
    }
    Ok(deleted)
}
