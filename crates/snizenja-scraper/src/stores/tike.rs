//! Tike (tike.rs).
//!
//! Plain HTTP store, `?p=N` pagination. Listing pages carry the product
//! grid twice: as markup and as an embedded JSON block the site's own
//! frontend hydrates from. The JSON is the stabler source, so extraction
//! reads it and falls back to nothing — a page without the block is treated
//! as the end of pagination.

use regex::Regex;
use scraper::Html;
use serde::Deserialize;
use snizenja_core::Store;

use super::{absolute, finish_harvest, is_listing_page, sel, sizes_are_consistent, ListContext};
use crate::error::ScraperError;
use crate::pass::{PassPhase, PassTracker};
use crate::types::{DetailData, DetailPage, ListHarvest, RawListing};

const CARD: &str = "div.product-grid-item";

/// Shape of one entry in the embedded `category-products` JSON block.
#[derive(Debug, Deserialize)]
struct EmbeddedProduct {
    name: String,
    url: String,
    #[serde(default)]
    image: Option<String>,
    /// Integer RSD, already unformatted in the JSON.
    price: i64,
    #[serde(default)]
    discount_price: Option<i64>,
    #[serde(default)]
    brand: Option<String>,
}

pub(super) async fn scrape_list(ctx: &ListContext<'_>) -> Result<ListHarvest, ScraperError> {
    let mut tracker = PassTracker::new(Store::Tike);
    let mut raws: Vec<RawListing> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut total_seen = 0usize;

    let entries = ctx.entry_urls(Store::Tike);
    let entry = &entries[0];

    let mut page = 0usize;
    loop {
        page += 1;
        if page > ctx.config.max_pages_per_section {
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
        if page > 1 {
            ctx.delay.pause().await;
        }

        let url = format!("{entry}?p={page}");
        let html = match ctx.http.fetch_html(&url).await {
            Ok(html) => html,
            Err(e) => {
                errors.push(format!("{url}: {e}"));
                break;
            }
        };

        tracker.enter(PassPhase::Extracting);
        let (cards, seen) = match extract_embedded_products(&html) {
            Ok(pair) => pair,
            Err(reason) => {
                errors.push(format!("{url}: {reason}"));
                break;
            }
        };
        total_seen += seen;
        if cards.is_empty() {
            break;
        }
        raws.extend(cards);
    }

    Ok(finish_harvest(
        Store::Tike,
        &mut tracker,
        raws,
        errors,
        total_seen,
        ctx.config.min_discount_percent,
    ))
}

/// Pulls the `category-products` JSON block out of the page and converts
/// its entries. Entries without a discount price are seen-but-dropped.
fn extract_embedded_products(html: &str) -> Result<(Vec<RawListing>, usize), String> {
    let re = Regex::new(
        r#"(?s)<script type="application/json" id="category-products">(.*?)</script>"#,
    )
    .expect("valid regex");

    let Some(captures) = re.captures(html) else {
        // No block at all: past the last page, the grid template renders
        // without data.
        return Ok((Vec::new(), 0));
    };

    let body = captures.get(1).map_or("", |m| m.as_str());
    let products: Vec<EmbeddedProduct> =
        serde_json::from_str(body).map_err(|e| format!("embedded products JSON: {e}"))?;

    let base = Store::Tike.base_url();
    let seen = products.len();
    let out = products
        .into_iter()
        .filter_map(|p| {
            let sale_price = p.discount_price?;
            if p.price <= 0 || sale_price <= 0 {
                return None;
            }
            Some(RawListing {
                url: absolute(base, &p.url),
                image_url: p.image.map(|i| absolute(base, &i)).unwrap_or_default(),
                name: p.name,
                original_price: p.price,
                sale_price,
                brand_hint: p.brand,
                category_hint: None,
                gender_hint: None,
                sizes: Vec::new(),
            })
        })
        .collect();

    Ok((out, seen))
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
    let option_sel = sel("div.product-form select option");
    let description_sel = sel("div.product-description-text");
    let image_sel = sel("picture.product-main-image img");

    let mut sizes = Vec::new();
    for option in document.select(&option_sel) {
        let value = option.value().attr("value").unwrap_or_default();
        if value.is_empty() || option.value().attr("disabled").is_some() {
            continue;
        }
        let label = option.text().collect::<String>();
        let label = label.trim();
        // Sold-out options stay in the markup with a suffix instead of the
        // disabled attribute on some templates.
        if label.is_empty() || label.to_lowercase().contains("rasprodato") {
            continue;
        }
        sizes.push(label.to_owned());
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
        .map(|src| absolute(Store::Tike.base_url(), src));

    DetailPage::Product(DetailData {
        sizes,
        description,
        detail_image_url,
        category: None,
        gender: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_products(json: &str) -> String {
        format!(
            r#"<html><body>
                 <div class="product-grid"></div>
                 <script type="application/json" id="category-products">{json}</script>
               </body></html>"#
        )
    }

    #[test]
    fn extracts_embedded_json_products() {
        let html = page_with_products(
            r#"[
                {"name": "NIKE DUNK LOW PATIKE", "url": "/proizvod/dunk-low",
                 "image": "/img/dunk.jpg", "price": 15000, "discount_price": 7000,
                 "brand": "NIKE"},
                {"name": "BEZ POPUSTA", "url": "/proizvod/full-price",
                 "price": 10000}
               ]"#,
        );
        let (cards, seen) = extract_embedded_products(&html).unwrap();
        assert_eq!(seen, 2);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].url, "https://www.tike.rs/proizvod/dunk-low");
        assert_eq!(cards[0].original_price, 15_000);
        assert_eq!(cards[0].sale_price, 7_000);
    }

    #[test]
    fn missing_block_means_end_of_pagination() {
        let (cards, seen) = extract_embedded_products("<html><body></body></html>").unwrap();
        assert!(cards.is_empty());
        assert_eq!(seen, 0);
    }

    #[test]
    fn malformed_block_is_an_error_not_garbage() {
        let html = page_with_products("{not json");
        assert!(extract_embedded_products(&html).is_err());
    }

    #[test]
    fn detail_skips_sold_out_options() {
        let html = r#"
            <div class="product-form">
              <select>
                <option value="">Veličina</option>
                <option value="40">40</option>
                <option value="41">41 - Rasprodato</option>
                <option value="42">42</option>
              </select>
            </div>"#;
        let DetailPage::Product(data) = extract_detail(html) else {
            panic!("expected product");
        };
        assert_eq!(data.sizes, vec!["40".to_string(), "42".to_string()]);
    }
}
