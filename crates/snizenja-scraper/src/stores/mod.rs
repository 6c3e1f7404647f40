//! Per-retailer extraction strategies.
//!
//! One module per store behind two enum-dispatched entry points:
//! [`scrape_list`] for the paginated sale listing and [`fetch_detail`] for
//! a single product page. Extraction internals are bespoke per store; the
//! contracts, filtering, and classification are shared here so the stores
//! cannot drift apart on semantics.

mod buzz;
mod djak;
mod intersport;
mod n_sport;
mod office_shoes;
mod planeta;
mod sport_vision;
mod tike;

use scraper::{ElementRef, Html, Selector};
use snizenja_core::{brand, category, deal_id, discount_percent, gender, AppConfig, Deal, Store};

use crate::client::HttpClient;
use crate::error::ScraperError;
use crate::pass::{DelayPolicy, PassPhase, PassTracker};
use crate::types::{DetailPage, ListHarvest, RawListing};

/// Shared dependencies handed to every store pass.
pub struct ListContext<'a> {
    pub http: &'a HttpClient,
    pub config: &'a AppConfig,
    pub delay: DelayPolicy,
    /// Test seam: rewrites a store's base URL onto another host so a local
    /// mock server can stand in for the retailer. `None` in production.
    pub base_override: Option<&'a str>,
}

impl<'a> ListContext<'a> {
    #[must_use]
    pub fn new(http: &'a HttpClient, config: &'a AppConfig, delay: DelayPolicy) -> Self {
        Self {
            http,
            config,
            delay,
            base_override: None,
        }
    }

    /// The store's sale entry URLs, with the base override applied.
    pub(super) fn entry_urls(&self, store: Store) -> Vec<String> {
        store
            .entry_urls()
            .iter()
            .map(|url| match self.base_override {
                Some(base) => url.replacen(store.base_url(), base, 1),
                None => (*url).to_string(),
            })
            .collect()
    }
}

/// Runs the list pass for `store`.
///
/// # Errors
///
/// Returns [`ScraperError`] only for failures before any page was fetched
/// (e.g. the browser would not launch). Mid-pass failures end the pass
/// early and surface in [`ListHarvest::errors`] with partial results.
pub async fn scrape_list(store: Store, ctx: &ListContext<'_>) -> Result<ListHarvest, ScraperError> {
    match store {
        Store::Planeta => planeta::scrape_list(ctx).await,
        Store::Djak => djak::scrape_list(ctx).await,
        Store::SportVision => sport_vision::scrape_list(ctx).await,
        Store::NSport => n_sport::scrape_list(ctx).await,
        Store::Buzz => buzz::scrape_list(ctx).await,
        Store::OfficeShoes => office_shoes::scrape_list(ctx).await,
        Store::Tike => tike::scrape_list(ctx).await,
        Store::Intersport => intersport::scrape_list(ctx).await,
    }
}

/// Fetches and extracts one product detail page for `store`.
///
/// # Errors
///
/// Returns [`ScraperError`] on fetch failure or when the store has no
/// detail pass.
pub async fn fetch_detail(
    store: Store,
    ctx: &ListContext<'_>,
    url: &str,
) -> Result<DetailPage, ScraperError> {
    match store {
        Store::Planeta => planeta::fetch_detail(ctx, url).await,
        Store::Djak => djak::fetch_detail(ctx, url).await,
        Store::SportVision => sport_vision::fetch_detail(ctx, url).await,
        Store::NSport => n_sport::fetch_detail(ctx, url).await,
        Store::Buzz => buzz::fetch_detail(ctx, url).await,
        Store::OfficeShoes => office_shoes::fetch_detail(ctx, url).await,
        Store::Tike => tike::fetch_detail(ctx, url).await,
        Store::Intersport => Err(ScraperError::Extraction {
            url: url.to_owned(),
            reason: "intersport has no detail pass".to_owned(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Shared DOM helpers
// ---------------------------------------------------------------------------

/// Parses a selector written as a literal in a store module.
pub(super) fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("valid selector literal")
}

/// Collapsed inner text of the first match under `el`.
pub(super) fn text_of(el: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let node = el.select(selector).next()?;
    let text = node.text().collect::<Vec<_>>().join(" ");
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Attribute of the first match under `el`.
pub(super) fn attr_of(el: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    el.select(selector)
        .next()
        .and_then(|node| node.value().attr(attr))
        .map(str::to_owned)
}

/// Resolves a possibly relative `href` against a store's base URL.
pub(super) fn absolute(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_owned()
    } else if let Some(rest) = href.strip_prefix('/') {
        format!("{}/{rest}", base.trim_end_matches('/'))
    } else {
        format!("{}/{href}", base.trim_end_matches('/'))
    }
}

/// Listing-page detector for detail scrapers: a URL that was supposed to be
/// a product page but renders two or more product cards is a listing, and
/// extraction must be short-circuited rather than scraping garbage.
pub(super) fn is_listing_page(html: &str, card_selector: &str) -> bool {
    let document = Html::parse_document(html);
    let cards = sel(card_selector);
    document.select(&cards).count() > 1
}

/// Sanity check on an extracted size list: a page that mixes numeric shoe
/// sizes with letter clothing sizes was mis-rendered, and its sizes are
/// discarded rather than guessed at.
pub(super) fn sizes_are_consistent(sizes: &[String]) -> bool {
    let has_shoe = sizes.iter().any(|s| {
        s.trim()
            .split([' ', '.', ','])
            .next()
            .and_then(|n| n.parse::<u32>().ok())
            .is_some_and(|n| (20..=52).contains(&n))
    });
    let has_letter = sizes.iter().any(|s| {
        matches!(
            s.trim().to_ascii_uppercase().as_str(),
            "XXS" | "XS" | "S" | "M" | "L" | "XL" | "XXL" | "3XL" | "4XL"
        )
    });
    !(has_shoe && has_letter)
}

// ---------------------------------------------------------------------------
// Shared filtering / assembly
// ---------------------------------------------------------------------------

/// Converts one raw candidate into a persistable [`Deal`], or `None` when
/// it does not qualify.
///
/// Classification runs the shared fallback chains: structured hints first,
/// then URL segments, then free-text name matching.
fn assemble_deal(store: Store, raw: RawListing, min_discount: i16) -> Option<Deal> {
    let discount = discount_percent(raw.original_price, raw.sale_price)?;
    if discount < min_discount {
        return None;
    }

    let brand = raw
        .brand_hint
        .as_deref()
        .and_then(brand::normalize)
        .or_else(|| brand::extract_from_name(&raw.name));

    let category = raw
        .category_hint
        .as_deref()
        .and_then(category::classify)
        .or_else(|| category::classify(&raw.url))
        .or_else(|| category::classify(&raw.name));

    let gender = raw
        .gender_hint
        .unwrap_or_else(|| gender::classify_with_default(&raw.name, &raw.url));

    Some(Deal {
        id: deal_id(store, &raw.url),
        store,
        name: raw.name,
        brand,
        original_price: raw.original_price,
        sale_price: raw.sale_price,
        discount_percent: discount,
        url: raw.url,
        image_url: raw.image_url,
        detail_image_url: None,
        description: None,
        sizes: raw.sizes,
        categories: category.map(|c| vec![c.as_path()]).unwrap_or_default(),
        gender,
    })
}

/// Shared tail of every list pass: de-duplicate by URL (first section seen
/// wins), apply the discount filter, and assemble deals.
///
/// `total_seen` counts raw card elements encountered, including ones whose
/// prices did not parse and that therefore never became a [`RawListing`].
pub(super) fn finish_harvest(
    store: Store,
    tracker: &mut PassTracker,
    raws: Vec<RawListing>,
    errors: Vec<String>,
    total_seen: usize,
    min_discount: i16,
) -> ListHarvest {
    tracker.enter(PassPhase::Filtering);

    let total_scraped = i32::try_from(total_seen).unwrap_or(i32::MAX);

    let mut seen = std::collections::HashSet::new();
    let deals: Vec<Deal> = raws
        .into_iter()
        .filter(|raw| seen.insert(raw.url.clone()))
        .filter_map(|raw| assemble_deal(store, raw, min_discount))
        .collect();

    tracing::info!(
        store = %store,
        total_scraped,
        qualifying = deals.len(),
        errors = errors.len(),
        "list pass extracted"
    );

    ListHarvest {
        deals,
        total_scraped,
        errors,
    }
}
