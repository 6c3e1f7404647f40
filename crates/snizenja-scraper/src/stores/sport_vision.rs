//! Sport Vision (sportvision.rs).
//!
//! Browser store. The outlet grid hydrates client-side, so each page is a
//! fresh browser navigation on `?page=N`. The discount badge on cards has
//! been observed lagging behind price changes, so the discount is always
//! recomputed from the price pair and the badge is ignored.

use regex::Regex;
use scraper::Html;
use snizenja_core::Store;

use super::{absolute, attr_of, finish_harvest, is_listing_page, sel, text_of, ListContext};
use crate::browser::Browser;
use crate::error::ScraperError;
use crate::pass::{PassPhase, PassTracker};
use crate::price::parse_rsd;
use crate::types::{DetailData, DetailPage, ListHarvest, RawListing};

const CARD: &str = "div.item-data";
const NAME_LINK: &str = "a.item-link";
const BRAND: &str = "div.brand-name";
const IMAGE: &str = "img.item-image";
const OLD_PRICE: &str = "div.prev-price";
const NEW_PRICE: &str = "div.current-price";

pub(super) async fn scrape_list(ctx: &ListContext<'_>) -> Result<ListHarvest, ScraperError> {
    let mut tracker = PassTracker::new(Store::SportVision);

    let browser = Browser::launch(ctx.config.chrome_executable.as_deref()).await?;
    let (raws, errors, total_seen) = scrape_pages(&browser, ctx, &mut tracker).await;
    browser.close().await;

    Ok(finish_harvest(
        Store::SportVision,
        &mut tracker,
        raws,
        errors,
        total_seen,
        ctx.config.min_discount_percent,
    ))
}

async fn scrape_pages(
    browser: &Browser,
    ctx: &ListContext<'_>,
    tracker: &mut PassTracker,
) -> (Vec<RawListing>, Vec<String>, usize) {
    let mut raws: Vec<RawListing> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut total_seen = 0usize;

    let entries = ctx.entry_urls(Store::SportVision);
    let entry = &entries[0];

    let mut page_number = 0usize;
    loop {
        page_number += 1;
        if page_number > ctx.config.max_pages_per_section {
            errors.push(
                ScraperError::PaginationLimit {
                    entry_url: entry.clone(),
                    max_pages: ctx.config.max_pages_per_section,
                }
                .to_string(),
            );
            break;
        }
        tracker.enter(PassPhase::Paginating);
        if page_number > 1 {
            ctx.delay.pause().await;
        }

        let url = format!("{entry}?page={page_number}");
        let page = match browser.open(&url).await {
            Ok(page) => page,
            Err(e) => {
                errors.push(format!("{url}: {e}"));
                break;
            }
        };
        let html = match page.content().await {
            Ok(html) => html,
            Err(e) => {
                errors.push(format!("{url}: {e}"));
                break;
            }
        };

        tracker.enter(PassPhase::Extracting);
        let (cards, seen) = extract_cards(&html, &mut errors);
        total_seen += seen;
        if cards.is_empty() {
            break;
        }
        raws.extend(cards);
    }

    (raws, errors, total_seen)
}

fn extract_cards(html: &str, errors: &mut Vec<String>) -> (Vec<RawListing>, usize) {
    let document = Html::parse_document(html);
    let card_sel = sel(CARD);
    let name_sel = sel(NAME_LINK);
    let brand_sel = sel(BRAND);
    let image_sel = sel(IMAGE);
    let old_sel = sel(OLD_PRICE);
    let new_sel = sel(NEW_PRICE);

    let base = Store::SportVision.base_url();
    let mut out = Vec::new();
    let mut seen = 0usize;

    for card in document.select(&card_sel) {
        seen += 1;

        let Some(name) = text_of(card, &name_sel) else {
            errors.push("sport-vision: card without an item link".to_owned());
            continue;
        };
        let Some(href) = attr_of(card, &name_sel, "href") else {
            errors.push(format!("sport-vision: card '{name}' without an href"));
            continue;
        };

        let original = text_of(card, &old_sel).as_deref().and_then(parse_rsd);
        let sale = text_of(card, &new_sel).as_deref().and_then(parse_rsd);
        let (Some(original_price), Some(sale_price)) = (original, sale) else {
            continue;
        };

        out.push(RawListing {
            name,
            url: absolute(base, &href),
            image_url: attr_of(card, &image_sel, "src")
                .map(|src| absolute(base, &src))
                .unwrap_or_default(),
            original_price,
            sale_price,
            brand_hint: text_of(card, &brand_sel),
            category_hint: None,
            gender_hint: None,
            sizes: Vec::new(),
        });
    }

    (out, seen)
}

pub(super) async fn fetch_detail(
    ctx: &ListContext<'_>,
    url: &str,
) -> Result<DetailPage, ScraperError> {
    let html = ctx.http.fetch_html(url).await?;
    Ok(extract_detail(&html, url))
}

/// Product pages ship their state as an embedded `productData` JSON object;
/// the markup around it is hydration scaffolding.
fn extract_detail(html: &str, url: &str) -> DetailPage {
    if is_listing_page(html, CARD) {
        return DetailPage::Listing;
    }

    let re = Regex::new(r"(?s)var\s+productData\s*=\s*(\{.*?\})\s*;").expect("valid regex");
    let Some(captures) = re.captures(html) else {
        tracing::debug!(url, "sport-vision detail without productData block");
        return DetailPage::Product(DetailData::default());
    };

    let body = captures.get(1).map_or("", |m| m.as_str());
    let data: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(url, error = %e, "sport-vision productData did not parse");
            return DetailPage::Product(DetailData::default());
        }
    };

    let sizes = data["sizes"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter(|entry| entry["available"].as_bool().unwrap_or(false))
                .filter_map(|entry| entry["label"].as_str())
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let description = data["description"]
        .as_str()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned);

    let detail_image_url = data["image"]
        .as_str()
        .map(|src| absolute(Store::SportVision.base_url(), src));

    DetailPage::Product(DetailData {
        sizes,
        description,
        detail_image_url,
        category: None,
        gender: None,
    })
}
