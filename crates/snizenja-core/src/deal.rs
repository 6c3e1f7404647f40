//! Canonical domain types written by the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::gender::Gender;
use crate::stores::Store;

/// One discounted product offer, normalized across stores.
///
/// The write model: timestamps (`scraped_at`, `details_scraped_at`,
/// `created_at`) are owned by the persistence layer and do not appear here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    /// Store-prefixed, derived from the URL via [`deal_id`]; stable across
    /// runs.
    pub id: String,
    pub store: Store,
    pub name: String,
    /// Canonical uppercase brand, when one could be determined.
    pub brand: Option<String>,
    /// Integer RSD.
    pub original_price: i64,
    /// Integer RSD; always strictly below `original_price` for a persisted
    /// deal.
    pub sale_price: i64,
    /// Derived via [`discount_percent`]; 0–100.
    pub discount_percent: i16,
    /// The natural identity of a deal. Re-scraping the same URL updates,
    /// never duplicates.
    pub url: String,
    pub image_url: String,
    pub detail_image_url: Option<String>,
    pub description: Option<String>,
    /// In-stock size labels; empty until a detail pass confirms them.
    pub sizes: Vec<String>,
    /// Category paths in `main/sub` form; empty when unclassifiable.
    pub categories: Vec<String>,
    pub gender: Gender,
}

/// Audit record of one list-scraper execution for one store. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRun {
    pub public_id: Uuid,
    pub store: Store,
    /// Raw candidates seen before discount filtering.
    pub total_scraped: i32,
    /// Candidates that survived the threshold and were persisted.
    pub filtered_count: i32,
    /// Error messages in occurrence order.
    pub errors: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl ScrapeRun {
    /// Starts a run record for `store` with the clock captured now.
    /// `completed_at` is finalized by [`ScrapeRun::finish`].
    #[must_use]
    pub fn begin(store: Store) -> Self {
        let now = Utc::now();
        Self {
            public_id: Uuid::new_v4(),
            store,
            total_scraped: 0,
            filtered_count: 0,
            errors: Vec::new(),
            started_at: now,
            completed_at: now,
        }
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Stamps the completion time. Idempotent from the caller's point of
    /// view; the latest call wins.
    pub fn finish(&mut self) {
        self.completed_at = Utc::now();
    }
}

/// Derives the stable deal id for a URL: the store key plus the first
/// 12 hex characters of `sha256(url)`.
///
/// A pure function of its inputs, so ids are reproducible across runs and
/// processes — there is no per-run counter state.
#[must_use]
pub fn deal_id(store: Store, url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let mut hex = String::with_capacity(12);
    for byte in digest.iter().take(6) {
        hex.push_str(&format!("{byte:02x}"));
    }
    format!("{}-{hex}", store.key())
}

/// Computes the rounded discount percentage for a price pair.
///
/// Returns `None` when the pair cannot represent a real discount: a
/// non-positive price, or `sale >= original`. Callers never persist such
/// pairs.
#[must_use]
pub fn discount_percent(original_price: i64, sale_price: i64) -> Option<i16> {
    if original_price <= 0 || sale_price <= 0 || sale_price >= original_price {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = (original_price - sale_price) as f64 / original_price as f64;
    #[allow(clippy::cast_possible_truncation)]
    let percent = (ratio * 100.0).round() as i16;
    Some(percent)
}
