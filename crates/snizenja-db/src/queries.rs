//! Read-model queries for the catalog consumers (web app, API).
//!
//! This pipeline is the catalog's sole writer; everything here is
//! read-only filtering and facet aggregation over `deals`.

use sqlx::PgPool;

use snizenja_core::brand;

use crate::deals::DealRow;
use crate::DbError;

/// Sort orders exposed to catalog consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DealSort {
    /// Deepest discount first; ties broken by lower price.
    #[default]
    DiscountDesc,
    PriceAsc,
    Newest,
}

impl DealSort {
    fn order_by(self) -> &'static str {
        match self {
            DealSort::DiscountDesc => "discount_percent DESC, sale_price ASC",
            DealSort::PriceAsc => "sale_price ASC, discount_percent DESC",
            DealSort::Newest => "scraped_at DESC, id",
        }
    }
}

/// Input filters for catalog listing. Every filter is optional; `None`
/// means "no constraint".
#[derive(Debug, Clone, Default)]
pub struct DealFilters<'a> {
    pub store: Option<&'a str>,
    /// Canonical brand; matching expands to every known alias and casing
    /// so records stored under a stale alias stay visible.
    pub brand: Option<&'a str>,
    /// A full `main/sub` category path.
    pub category: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub min_discount: Option<i16>,
    pub max_sale_price: Option<i64>,
    pub sort: DealSort,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// One value/count pair from a facet aggregation.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FacetCount {
    pub value: String,
    pub count: i64,
}

fn brand_variants(filter: Option<&str>) -> Option<Vec<String>> {
    filter.map(brand::expand_variants)
}

/// Returns deals matching `filters`, paginated and sorted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_deals(
    pool: &PgPool,
    filters: &DealFilters<'_>,
) -> Result<Vec<DealRow>, DbError> {
    let query = format!(
        "SELECT id, store, name, brand, original_price, sale_price, \
                discount_percent, url, image_url, detail_image_url, description, \
                sizes, categories, gender, scraped_at, details_scraped_at, created_at \
         FROM deals \
         WHERE ($1::TEXT IS NULL OR store = $1) \
           AND ($2::TEXT[] IS NULL OR brand = ANY($2)) \
           AND ($3::TEXT IS NULL OR $3 = ANY(categories)) \
           AND ($4::TEXT IS NULL OR gender = $4) \
           AND ($5::SMALLINT IS NULL OR discount_percent >= $5) \
           AND ($6::BIGINT IS NULL OR sale_price <= $6) \
         ORDER BY {} \
         LIMIT COALESCE($7, 9223372036854775807) OFFSET COALESCE($8, 0)",
        filters.sort.order_by()
    );

    let rows = sqlx::query_as::<_, DealRow>(&query)
        .bind(filters.store)
        .bind(brand_variants(filters.brand))
        .bind(filters.category)
        .bind(filters.gender)
        .bind(filters.min_discount)
        .bind(filters.max_sale_price)
        .bind(filters.limit)
        .bind(filters.offset)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns the total number of deals matching `filters`, ignoring
/// pagination.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_deals(pool: &PgPool, filters: &DealFilters<'_>) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM deals \
         WHERE ($1::TEXT IS NULL OR store = $1) \
           AND ($2::TEXT[] IS NULL OR brand = ANY($2)) \
           AND ($3::TEXT IS NULL OR $3 = ANY(categories)) \
           AND ($4::TEXT IS NULL OR gender = $4) \
           AND ($5::SMALLINT IS NULL OR discount_percent >= $5) \
           AND ($6::BIGINT IS NULL OR sale_price <= $6)",
    )
    .bind(filters.store)
    .bind(brand_variants(filters.brand))
    .bind(filters.category)
    .bind(filters.gender)
    .bind(filters.min_discount)
    .bind(filters.max_sale_price)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Facet dimensions supported by [`facet_counts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Store,
    Gender,
    Brand,
    Category,
}

/// Returns per-value deal counts for one facet dimension, largest first.
///
/// Categories are unnested so a deal with two paths counts toward both.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn facet_counts(pool: &PgPool, facet: Facet) -> Result<Vec<FacetCount>, DbError> {
    let query = match facet {
        Facet::Store => {
            "SELECT store AS value, COUNT(*) AS count FROM deals \
             GROUP BY store ORDER BY count DESC, value"
        }
        Facet::Gender => {
            "SELECT gender AS value, COUNT(*) AS count FROM deals \
             GROUP BY gender ORDER BY count DESC, value"
        }
        Facet::Brand => {
            "SELECT brand AS value, COUNT(*) AS count FROM deals \
             WHERE brand IS NOT NULL \
             GROUP BY brand ORDER BY count DESC, value"
        }
        Facet::Category => {
            "SELECT UNNEST(categories) AS value, COUNT(*) AS count FROM deals \
             GROUP BY value ORDER BY count DESC, value"
        }
    };

    let rows = sqlx::query_as::<_, FacetCount>(query)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
