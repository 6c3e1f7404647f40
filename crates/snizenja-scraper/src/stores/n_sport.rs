//! N Sport (n-sport.net).
//!
//! Plain HTTP store. The outlet feed is sorted by discount descending, so
//! the pass stops paging as soon as a card's discount falls below the run
//! threshold — later pages cannot contain qualifying deals. This is both an
//! optimization and a correctness signal about the feed ordering.

use scraper::Html;
use snizenja_core::{discount_percent, Store};

use super::{absolute, attr_of, finish_harvest, is_listing_page, sel, text_of, ListContext};
use crate::error::ScraperError;
use crate::pass::{PassPhase, PassTracker};
use crate::price::parse_rsd;
use crate::types::{DetailData, DetailPage, ListHarvest, RawListing};

const CARD: &str = "article.product-card";
const NAME_LINK: &str = "h2.product-title a";
const IMAGE: &str = ".product-media img";
const OLD_PRICE: &str = "span.price-before";
const NEW_PRICE: &str = "span.price-now";

pub(super) async fn scrape_list(ctx: &ListContext<'_>) -> Result<ListHarvest, ScraperError> {
    let mut tracker = PassTracker::new(Store::NSport);
    let mut raws: Vec<RawListing> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut total_seen = 0usize;

    let entries = ctx.entry_urls(Store::NSport);
    let entry = &entries[0];
    let min_discount = ctx.config.min_discount_percent;

    let mut page = 0usize;
    'pages: loop {
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

        let url = format!("{entry}&page={page}");
        let html = match ctx.http.fetch_html(&url).await {
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

        for card in cards {
            // Feed is discount-descending: the first sub-threshold card
            // means no further page can qualify.
            let below_threshold = discount_percent(card.original_price, card.sale_price)
                .is_none_or(|d| d < min_discount);
            if below_threshold {
                raws.push(card);
                break 'pages;
            }
            raws.push(card);
        }
    }

    Ok(finish_harvest(
        Store::NSport,
        &mut tracker,
        raws,
        errors,
        total_seen,
        min_discount,
    ))
}

fn extract_cards(html: &str, errors: &mut Vec<String>) -> (Vec<RawListing>, usize) {
    let document = Html::parse_document(html);
    let card_sel = sel(CARD);
    let name_sel = sel(NAME_LINK);
    let image_sel = sel(IMAGE);
    let old_sel = sel(OLD_PRICE);
    let new_sel = sel(NEW_PRICE);

    let base = Store::NSport.base_url();
    let mut out = Vec::new();
    let mut seen = 0usize;

    for card in document.select(&card_sel) {
        seen += 1;

        let Some(name) = text_of(card, &name_sel) else {
            errors.push("n-sport: card without a title".to_owned());
            continue;
        };
        let Some(href) = attr_of(card, &name_sel, "href") else {
            errors.push(format!("n-sport: card '{name}' without a product URL"));
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
    let option_sel = sel("select.size-select option");
    let description_sel = sel("div.product-description");
    let image_sel = sel("div.product-hero img");

    let mut sizes = Vec::new();
    for option in document.select(&option_sel) {
        // The placeholder option carries no value; sold-out options are
        // marked disabled.
        let value = option.value().attr("value").unwrap_or_default();
        if value.is_empty() || option.value().attr("disabled").is_some() {
            continue;
        }
        let label = option.text().collect::<String>();
        let label = label.trim();
        if !label.is_empty() {
            sizes.push(label.to_owned());
        }
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
        .map(|src| absolute(Store::NSport.base_url(), src));

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

    fn card(name: &str, slug: &str, old: &str, new: &str) -> String {
        format!(
            r#"<article class="product-card">
                 <div class="product-media"><img src="/img/{slug}.jpg"></div>
                 <h2 class="product-title"><a href="/proizvod/{slug}">{name}</a></h2>
                 <span class="price-before">{old}</span>
                 <span class="price-now">{new}</span>
               </article>"#
        )
    }

    #[test]
    fn extracts_price_pair_from_cards() {
        let html = card("PUMA PATIKE", "puma-1", "8.000,00 RSD", "3.200,00 RSD");
        let mut errors = Vec::new();
        let (cards, seen) = extract_cards(&html, &mut errors);
        assert_eq!(seen, 1);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].original_price, 8_000);
        assert_eq!(cards[0].sale_price, 3_200);
        assert_eq!(cards[0].url, "https://www.n-sport.net/proizvod/puma-1");
    }

    #[test]
    fn detail_sizes_skip_placeholder_and_disabled_options() {
        let html = r#"
            <div class="product">
              <select class="size-select">
                <option value="">Izaberi veličinu</option>
                <option value="s">S</option>
                <option value="m" disabled>M</option>
                <option value="l">L</option>
              </select>
            </div>"#;
        let DetailPage::Product(data) = extract_detail(html) else {
            panic!("expected product");
        };
        assert_eq!(data.sizes, vec!["S".to_string(), "L".to_string()]);
    }

    #[test]
    fn detail_on_listing_page_short_circuits() {
        let html = format!(
            "{}{}",
            card("A", "a", "8.000,00 RSD", "3.200,00 RSD"),
            card("B", "b", "8.000,00 RSD", "3.200,00 RSD")
        );
        assert_eq!(extract_detail(&html), DetailPage::Listing);
    }
}
