//! Offline tests for pool configuration and row types. These do not
//! require a live database connection; the live write-path tests are in
//! `live.rs` behind `#[ignore]`.

use chrono::Utc;
use snizenja_db::{DealRow, PoolConfig, ScrapeRunRow};
use uuid::Uuid;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = snizenja_core::AppConfig {
        database_url: "postgres://example".to_string(),
        log_level: "info".to_string(),
        min_discount_percent: 50,
        request_timeout_secs: 30,
        user_agent: "ua".to_string(),
        max_retries: 2,
        retry_backoff_base_secs: 2,
        page_delay_min_ms: 400,
        page_delay_max_ms: 2500,
        max_pages_per_section: 60,
        max_load_more_clicks: 80,
        chrome_executable: None,
        cleanup_floor_min: 0,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`DealRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn deal_row_has_expected_fields() {
    let row = DealRow {
        id: "planeta-0011aabbccdd".to_string(),
        store: "planeta".to_string(),
        name: "NIKE AIR MAX 90".to_string(),
        brand: Some("NIKE".to_string()),
        original_price: 10_000,
        sale_price: 4_500,
        discount_percent: 55,
        url: "https://www.planetasport.rs/proizvod/air-max-90".to_string(),
        image_url: "https://www.planetasport.rs/img/air-max-90.jpg".to_string(),
        detail_image_url: None,
        description: None,
        sizes: vec!["42".to_string()],
        categories: vec!["obuca/patike".to_string()],
        gender: "zenski".to_string(),
        scraped_at: Utc::now(),
        details_scraped_at: None,
        created_at: Utc::now(),
    };

    assert_eq!(
        snizenja_core::Gender::from_db(&row.gender),
        snizenja_core::Gender::Zenski
    );
    assert!(row.details_scraped_at.is_none());
}

/// The minimum-yield safeguard short-circuits before any query runs, so a
/// lazy (never-connected) pool is enough to exercise it: a low-yield run
/// must leave the catalog untouched and report zero deletions.
#[tokio::test]
async fn low_yield_cleanup_is_skipped_without_touching_the_database() {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://unused@localhost/unused")
        .expect("lazy pool");

    let deleted = snizenja_db::cleanup_stale(&pool, snizenja_core::Store::Planeta, Utc::now(), 3, 40)
        .await
        .expect("safeguard path");
    assert_eq!(deleted, 0);
}

#[test]
fn scrape_run_row_has_expected_fields() {
    let row = ScrapeRunRow {
        id: 1,
        public_id: Uuid::new_v4(),
        store: "buzz".to_string(),
        total_scraped: 120,
        filtered_count: 34,
        errors: vec!["page 4: timeout".to_string()],
        started_at: Utc::now(),
        completed_at: Utc::now(),
    };

    assert_eq!(row.store, "buzz");
    assert_eq!(row.errors.len(), 1);
}
