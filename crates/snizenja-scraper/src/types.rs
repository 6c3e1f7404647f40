//! Intermediate shapes passed between extraction, filtering, and
//! persistence.

use serde::{Deserialize, Serialize};
use snizenja_core::{CategoryPath, Gender};

/// A raw candidate extracted from one listing card, before discount
/// filtering and classification.
///
/// Price fields are already parsed integers: a card whose prices would not
/// parse is dropped at extraction time and never becomes a `RawListing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawListing {
    pub name: String,
    /// Absolute product URL; the de-duplication and identity key.
    pub url: String,
    pub image_url: String,
    pub original_price: i64,
    pub sale_price: i64,
    /// Brand as the card labels it, when present.
    pub brand_hint: Option<String>,
    /// Store-specific structured category text (breadcrumb, product-type
    /// field), when present.
    pub category_hint: Option<String>,
    /// Audience attribution from the listing section the card was found in.
    pub gender_hint: Option<Gender>,
    /// In-stock sizes, for stores whose cards expose them inline.
    pub sizes: Vec<String>,
}

/// Result of one store's list pass, ready for persistence.
#[derive(Debug)]
pub struct ListHarvest {
    /// Qualifying deals, de-duplicated by URL, in first-seen order.
    pub deals: Vec<snizenja_core::Deal>,
    /// Raw candidates seen before filtering.
    pub total_scraped: i32,
    /// Non-fatal errors accumulated during the pass.
    pub errors: Vec<String>,
}

/// What fetching a product detail URL produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailPage {
    /// The URL rendered a multi-product listing instead of a product page.
    /// Extraction is short-circuited; existing enrichment must be kept.
    Listing,
    Product(DetailData),
}

/// Enrichment data from a product page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailData {
    /// In-stock sizes only; out-of-stock options are excluded at
    /// extraction.
    pub sizes: Vec<String>,
    pub description: Option<String>,
    pub detail_image_url: Option<String>,
    /// Category from structured detail-page fields, when the list pass
    /// could not determine one.
    pub category: Option<CategoryPath>,
    /// Gender from structured detail-page fields, when the list pass could
    /// not determine one.
    pub gender: Option<Gender>,
}
