//! Pass runners and the sequential orchestrator.
//!
//! Stores run one at a time — deliberately not concurrently, to keep
//! headless-browser memory bounded to one store and to avoid correlated
//! rate limiting. A store-level failure is caught, recorded in the summary,
//! and never stops the remaining stores.

use std::time::Instant;

use snizenja_core::{AppConfig, ScrapeRun, Store};
use snizenja_scraper::{
    fetch_detail, scrape_list, DelayPolicy, DetailPage, HttpClient, ListContext, PassPhase,
    PassTracker,
};
use sqlx::PgPool;

/// Outcome of one store's list pass, for operator output.
#[derive(Debug)]
pub(crate) struct ListPassOutcome {
    pub total_scraped: i32,
    pub persisted: i32,
    pub deleted: u64,
    pub error_count: usize,
}

fn build_http_client(config: &AppConfig) -> anyhow::Result<HttpClient> {
    HttpClient::new(
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))
}

fn delay_policy(config: &AppConfig) -> DelayPolicy {
    DelayPolicy::new(config.page_delay_min_ms, config.page_delay_max_ms)
}

/// Runs one store's list pass end to end: scrape, persist, log the run,
/// clean up stale deals.
///
/// # Errors
///
/// Returns an error when the pass could not start at all (client/browser
/// construction) or when the run record itself cannot be written.
/// Per-record persistence failures are appended to the run's error list
/// instead.
pub(crate) async fn run_list_pass(
    pool: &PgPool,
    config: &AppConfig,
    store: Store,
) -> anyhow::Result<ListPassOutcome> {
    let http = build_http_client(config)?;
    let ctx = ListContext::new(&http, config, delay_policy(config));

    tracing::info!(store = %store, transport = ?store.transport(), "list pass starting");

    let mut run = ScrapeRun::begin(store);
    let harvest = scrape_list(store, &ctx).await?;
    run.total_scraped = harvest.total_scraped;
    run.errors = harvest.errors;

    let mut tracker = PassTracker::at(store, PassPhase::Filtering);
    tracker.enter(PassPhase::Persisting);

    let mut persisted: i32 = 0;
    for deal in &harvest.deals {
        match snizenja_db::upsert_deal(pool, deal).await {
            Ok(()) => persisted = persisted.saturating_add(1),
            Err(e) => run.record_error(format!("upsert {}: {e}", deal.url)),
        }
    }
    run.filtered_count = persisted;
    run.finish();

    snizenja_db::insert_run(pool, &run).await?;

    // Eager upsert above, cautious delete here: the per-store floor (raised
    // by the global minimum) decides whether this run is trusted to delete.
    let floor = store.cleanup_floor().max(config.cleanup_floor_min);
    let deleted = snizenja_db::cleanup_stale(
        pool,
        store,
        run.started_at,
        i64::from(persisted),
        floor,
    )
    .await?;

    tracker.enter(PassPhase::Done);
    tracing::info!(
        store = %store,
        total_scraped = run.total_scraped,
        persisted,
        deleted,
        errors = run.errors.len(),
        "list pass complete"
    );

    Ok(ListPassOutcome {
        total_scraped: run.total_scraped,
        persisted,
        deleted,
        error_count: run.errors.len(),
    })
}

/// Runs one store's detail enrichment pass.
///
/// Selects deals still lacking a successful detail pass (or everything,
/// with `force`), fetches each product page, and persists per record so a
/// killed process resumes near where it left off. Per-item failures are
/// logged and skipped.
///
/// # Errors
///
/// Returns an error when the client cannot be built or the pending
/// selection fails.
pub(crate) async fn run_enrich_pass(
    pool: &PgPool,
    config: &AppConfig,
    store: Store,
    force: bool,
) -> anyhow::Result<u32> {
    if !store.has_detail_pass() {
        tracing::info!(store = %store, "store has no detail pass — nothing to enrich");
        return Ok(0);
    }

    let http = build_http_client(config)?;
    let ctx = ListContext::new(&http, config, delay_policy(config));

    let urls = snizenja_db::pending_details(pool, store, force).await?;
    tracing::info!(store = %store, pending = urls.len(), force, "detail pass starting");

    let mut enriched: u32 = 0;
    for (index, url) in urls.iter().enumerate() {
        if index > 0 {
            ctx.delay.pause().await;
        }

        let page = match fetch_detail(store, &ctx, url).await {
            Ok(page) => page,
            Err(e) => {
                // Transient fetch/render failure: move on to the next item.
                tracing::warn!(store = %store, url, error = %e, "detail fetch failed");
                continue;
            }
        };

        match page {
            DetailPage::Listing => {
                // A listing where a product page was expected. Extracting
                // from it would produce garbage sizes, and writing would
                // clobber prior enrichment with empty data.
                tracing::warn!(store = %store, url, "detail URL rendered a listing page — skipped");
            }
            DetailPage::Product(data) => {
                if data.sizes.is_empty() && store.delete_on_empty_sizes() {
                    // A full, successful page load with zero in-stock sizes
                    // means the item sold out.
                    match snizenja_db::delete_deal(pool, url).await {
                        Ok(removed) => {
                            tracing::info!(store = %store, url, removed, "out of stock — deal removed");
                        }
                        Err(e) => {
                            tracing::warn!(store = %store, url, error = %e, "out-of-stock delete failed");
                        }
                    }
                    continue;
                }

                let categories: Vec<String> =
                    data.category.map(|c| vec![c.as_path()]).unwrap_or_default();
                let gender = data.gender.map(snizenja_core::Gender::as_str);

                match snizenja_db::apply_detail(
                    pool,
                    url,
                    &data.sizes,
                    data.description.as_deref(),
                    data.detail_image_url.as_deref(),
                    &categories,
                    gender,
                )
                .await
                {
                    Ok(()) => enriched += 1,
                    Err(snizenja_db::DbError::NotFound) => {
                        // Deleted by a concurrent cleanup; nothing to enrich.
                        tracing::debug!(store = %store, url, "deal vanished before enrichment");
                    }
                    Err(e) => {
                        tracing::warn!(store = %store, url, error = %e, "enrichment write failed");
                    }
                }
            }
        }
    }

    tracing::info!(store = %store, enriched, "detail pass complete");
    Ok(enriched)
}

/// Result of a full orchestrator run.
#[derive(Debug)]
pub(crate) struct RunSummary {
    pub succeeded: Vec<Store>,
    pub failed: Vec<(Store, String)>,
    pub elapsed_secs: u64,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let succeeded = self
            .succeeded
            .iter()
            .map(|s| s.key())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(
            f,
            "run finished in {}s — {} succeeded, {} failed",
            self.elapsed_secs,
            self.succeeded.len(),
            self.failed.len()
        )?;
        writeln!(f, "  succeeded: [{succeeded}]")?;
        if self.failed.is_empty() {
            write!(f, "  failed:    []")
        } else {
            let failed = self
                .failed
                .iter()
                .map(|(s, e)| format!("{}: {e}", s.key()))
                .collect::<Vec<_>>()
                .join("; ");
            write!(f, "  failed:    [{failed}]")
        }
    }
}

/// Runs all list passes sequentially, then all detail passes sequentially.
/// Store-level failures are recorded and do not stop the remaining stores.
pub(crate) async fn run_all(pool: &PgPool, config: &AppConfig) -> RunSummary {
    let started = Instant::now();
    let mut failed: Vec<(Store, String)> = Vec::new();

    for store in Store::ALL {
        if let Err(e) = run_list_pass(pool, config, store).await {
            tracing::error!(store = %store, error = %e, "list pass failed");
            failed.push((store, format!("list: {e}")));
        }
    }

    for store in Store::ALL {
        if !store.has_detail_pass() {
            continue;
        }
        if let Err(e) = run_enrich_pass(pool, config, store, false).await {
            tracing::error!(store = %store, error = %e, "detail pass failed");
            failed.push((store, format!("detail: {e}")));
        }
    }

    let failed_stores: std::collections::HashSet<Store> =
        failed.iter().map(|(s, _)| *s).collect();
    let succeeded = Store::ALL
        .into_iter()
        .filter(|s| !failed_stores.contains(s))
        .collect();

    RunSummary {
        succeeded,
        failed,
        elapsed_secs: started.elapsed().as_secs(),
    }
}
