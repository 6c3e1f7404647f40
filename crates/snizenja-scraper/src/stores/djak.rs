//! Djak Sport (djaksport.com).
//!
//! Browser store. The sale section is split by audience (muskarci / zene /
//! deca) and each section grows through a "load more" control, so the pass
//! drives headless Chrome per section and reads the settled DOM once. The
//! section a card was found in is its gender attribution.

use scraper::Html;
use snizenja_core::{category, gender, Gender, Store};

use super::{
    absolute, attr_of, finish_harvest, is_listing_page, sel, sizes_are_consistent, text_of,
    ListContext,
};
use crate::browser::Browser;
use crate::error::ScraperError;
use crate::pass::{PassPhase, PassTracker};
use crate::price::parse_rsd;
use crate::types::{DetailData, DetailPage, ListHarvest, RawListing};

const CARD: &str = "div.product-box";
const NAME_LINK: &str = "a.product-box-title";
const IMAGE: &str = "img.product-box-image";
const OLD_PRICE: &str = "span.old-price";
const NEW_PRICE: &str = "span.new-price";
const LOAD_MORE: &str = "button.load-more";

const SECTION_GENDERS: [Gender; 3] = [Gender::Muski, Gender::Zenski, Gender::Deca];

pub(super) async fn scrape_list(ctx: &ListContext<'_>) -> Result<ListHarvest, ScraperError> {
    let mut tracker = PassTracker::new(Store::Djak);

    // Browser lifetime is scoped to this store's pass; close on every path.
    let browser = Browser::launch(ctx.config.chrome_executable.as_deref()).await?;
    let (raws, errors, total_seen) = scrape_sections(&browser, ctx, &mut tracker).await;
    browser.close().await;

    Ok(finish_harvest(
        Store::Djak,
        &mut tracker,
        raws,
        errors,
        total_seen,
        ctx.config.min_discount_percent,
    ))
}

/// Walks each audience section, loading the full listing before extraction.
/// Failures are recorded and end the pass early; already-extracted cards
/// are still returned.
async fn scrape_sections(
    browser: &Browser,
    ctx: &ListContext<'_>,
    tracker: &mut PassTracker,
) -> (Vec<RawListing>, Vec<String>, usize) {
    let mut raws: Vec<RawListing> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut total_seen = 0usize;

    let entries = ctx.entry_urls(Store::Djak);
    for (index, entry) in entries.iter().enumerate() {
        tracker.enter(PassPhase::Paginating);
        if index > 0 {
            ctx.delay.pause().await;
        }

        let page = match browser.open(entry).await {
            Ok(page) => page,
            Err(e) => {
                errors.push(format!("{entry}: {e}"));
                break;
            }
        };

        if let Err(e) = page
            .load_all(LOAD_MORE, CARD, ctx.config.max_load_more_clicks, ctx.delay)
            .await
        {
            // Whatever already rendered is still worth extracting.
            errors.push(format!("{entry}: load more: {e}"));
        }

        let html = match page.content().await {
            Ok(html) => html,
            Err(e) => {
                errors.push(format!("{entry}: {e}"));
                break;
            }
        };

        tracker.enter(PassPhase::Extracting);
        let gender_hint = SECTION_GENDERS.get(index).copied();
        let (cards, seen) = extract_cards(&html, gender_hint, &mut errors);
        total_seen += seen;
        raws.extend(cards);
    }

    (raws, errors, total_seen)
}

fn extract_cards(
    html: &str,
    gender_hint: Option<Gender>,
    errors: &mut Vec<String>,
) -> (Vec<RawListing>, usize) {
    let document = Html::parse_document(html);
    let card_sel = sel(CARD);
    let name_sel = sel(NAME_LINK);
    let image_sel = sel(IMAGE);
    let old_sel = sel(OLD_PRICE);
    let new_sel = sel(NEW_PRICE);

    let base = Store::Djak.base_url();
    let mut out = Vec::new();
    let mut seen = 0usize;

    for card in document.select(&card_sel) {
        seen += 1;

        let Some(name) = text_of(card, &name_sel) else {
            errors.push("djak: card without a title link".to_owned());
            continue;
        };
        let Some(href) = attr_of(card, &name_sel, "href") else {
            errors.push(format!("djak: card '{name}' without an href"));
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
            brand_hint: None,
            category_hint: None,
            gender_hint,
            sizes: Vec::new(),
        });
    }

    (out, seen)
}

pub(super) async fn fetch_detail(
    ctx: &ListContext<'_>,
    url: &str,
) -> Result<DetailPage, ScraperError> {
    // Product pages render server-side; no browser needed for the detail
    // pass.
    let html = ctx.http.fetch_html(url).await?;
    Ok(extract_detail(&html))
}

fn extract_detail(html: &str) -> DetailPage {
    if is_listing_page(html, CARD) {
        return DetailPage::Listing;
    }

    let document = Html::parse_document(html);
    let row_sel = sel("table.product-attributes tr");
    let th_sel = sel("th");
    let td_sel = sel("td");
    let size_sel = sel("div.size-picker span.size");
    let description_sel = sel("div#product-description");
    let image_sel = sel("div.main-image img");

    // The attribute table is the structured source for audience and
    // product type when the listing section could not provide them.
    let mut category_text: Option<String> = None;
    let mut gender_text: Option<String> = None;
    for row in document.select(&row_sel) {
        let Some(label) = text_of(row, &th_sel) else {
            continue;
        };
        let value = text_of(row, &td_sel);
        match label.trim().to_lowercase().as_str() {
            "vrsta proizvoda" | "kategorija" => category_text = value,
            "pol" => gender_text = value,
            _ => {}
        }
    }

    let mut sizes: Vec<String> = Vec::new();
    for chip in document.select(&size_sel) {
        let classes = chip.value().attr("class").unwrap_or_default();
        if classes.contains("unavailable") {
            continue;
        }
        let label = chip.text().collect::<String>();
        let label = label.trim();
        if !label.is_empty() {
            sizes.push(label.to_owned());
        }
    }
    if !sizes_are_consistent(&sizes) {
        sizes.clear();
    }

    let description = document
        .select(&description_sel)
        .next()
        .map(|n| n.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty());

    let detail_image_url = document
        .select(&image_sel)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| absolute(Store::Djak.base_url(), src));

    DetailPage::Product(DetailData {
        sizes,
        description,
        detail_image_url,
        category: category_text.as_deref().and_then(category::classify),
        gender: gender_text.as_deref().and_then(gender::classify),
    })
}
