//! Buzz Sneaker Station (buzzsneakers.rs).
//!
//! Browser store. A single sale feed grows through a "load more" button;
//! the pass clicks until the button disappears or the page stops growing.
//! Cards carry no audience section — gender comes from URL slug segments
//! (`-w-`, `-m-`) via the shared classifier chain.

use scraper::Html;
use snizenja_core::Store;

use super::{
    absolute, attr_of, finish_harvest, is_listing_page, sel, sizes_are_consistent, text_of,
    ListContext,
};
use crate::browser::Browser;
use crate::error::ScraperError;
use crate::pass::{PassPhase, PassTracker};
use crate::price::parse_rsd;
use crate::types::{DetailData, DetailPage, ListHarvest, RawListing};

const CARD: &str = "div.product-tile";
const NAME_LINK: &str = "a.tile-link";
const IMAGE: &str = "img.tile-image";
const OLD_PRICE: &str = "span.price-crossed";
const NEW_PRICE: &str = "span.price-discounted";
const LOAD_MORE: &str = "button#load-more-products";

pub(super) async fn scrape_list(ctx: &ListContext<'_>) -> Result<ListHarvest, ScraperError> {
    let mut tracker = PassTracker::new(Store::Buzz);

    let browser = Browser::launch(ctx.config.chrome_executable.as_deref()).await?;
    let (raws, errors, total_seen) = scrape_feed(&browser, ctx, &mut tracker).await;
    browser.close().await;

    Ok(finish_harvest(
        Store::Buzz,
        &mut tracker,
        raws,
        errors,
        total_seen,
        ctx.config.min_discount_percent,
    ))
}

async fn scrape_feed(
    browser: &Browser,
    ctx: &ListContext<'_>,
    tracker: &mut PassTracker,
) -> (Vec<RawListing>, Vec<String>, usize) {
    let mut errors: Vec<String> = Vec::new();
    let entries = ctx.entry_urls(Store::Buzz);
    let entry = &entries[0];

    tracker.enter(PassPhase::Paginating);
    let page = match browser.open(entry).await {
        Ok(page) => page,
        Err(e) => {
            errors.push(format!("{entry}: {e}"));
            return (Vec::new(), errors, 0);
        }
    };

    if let Err(e) = page
        .load_all(LOAD_MORE, CARD, ctx.config.max_load_more_clicks, ctx.delay)
        .await
    {
        errors.push(format!("{entry}: load more: {e}"));
    }

    let html = match page.content().await {
        Ok(html) => html,
        Err(e) => {
            errors.push(format!("{entry}: {e}"));
            return (Vec::new(), errors, 0);
        }
    };

    tracker.enter(PassPhase::Extracting);
    let (raws, total_seen) = extract_cards(&html, &mut errors);
    (raws, errors, total_seen)
}

fn extract_cards(html: &str, errors: &mut Vec<String>) -> (Vec<RawListing>, usize) {
    let document = Html::parse_document(html);
    let card_sel = sel(CARD);
    let name_sel = sel(NAME_LINK);
    let image_sel = sel(IMAGE);
    let old_sel = sel(OLD_PRICE);
    let new_sel = sel(NEW_PRICE);

    let base = Store::Buzz.base_url();
    let mut out = Vec::new();
    let mut seen = 0usize;

    for card in document.select(&card_sel) {
        seen += 1;

        let Some(name) = text_of(card, &name_sel) else {
            errors.push("buzz: tile without a link".to_owned());
            continue;
        };
        let Some(href) = attr_of(card, &name_sel, "href") else {
            errors.push(format!("buzz: tile '{name}' without an href"));
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
    Ok(extract_detail(&html))
}

fn extract_detail(html: &str) -> DetailPage {
    if is_listing_page(html, CARD) {
        return DetailPage::Listing;
    }

    let document = Html::parse_document(html);
    let size_sel = sel("ul.sizes-list li");
    let description_sel = sel("div.product-desc");
    let image_sel = sel("img#main-product-image");

    let mut sizes: Vec<String> = Vec::new();
    for item in document.select(&size_sel) {
        if item.value().attr("data-available") == Some("false") {
            continue;
        }
        let label = item.text().collect::<String>();
        let label = label.trim();
        if !label.is_empty() {
            sizes.push(label.to_owned());
        }
    }
    // A tile feed occasionally bleeds into the size list when the page
    // mis-renders; mixed shoe/clothing labels are the tell.
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
        .map(|src| absolute(Store::Buzz.base_url(), src));

    DetailPage::Product(DetailData {
        sizes,
        description,
        detail_image_url,
        category: None,
        gender: None,
    })
}
