//! Office Shoes (officeshoes.rs).
//!
//! Plain HTTP store, `?page=N` pagination. The assortment is footwear plus
//! accessories (bags, care products); accessories legitimately have no
//! sizes, which is why this store keeps zero-size deals instead of treating
//! them as stock-outs.

use scraper::Html;
use snizenja_core::{category, gender, Store};

use super::{absolute, attr_of, finish_harvest, is_listing_page, sel, text_of, ListContext};
use crate::error::ScraperError;
use crate::pass::{PassPhase, PassTracker};
use crate::price::parse_rsd;
use crate::types::{DetailData, DetailPage, ListHarvest, RawListing};

const CARD: &str = "div.product-list-item";
const NAME_LINK: &str = "a.product-link";
const MANUFACTURER: &str = "div.manufacturer";
const IMAGE: &str = "img.product-image";
const OLD_PRICE: &str = "span.old-price";
const NEW_PRICE: &str = "span.discount-price";

pub(super) async fn scrape_list(ctx: &ListContext<'_>) -> Result<ListHarvest, ScraperError> {
    let mut tracker = PassTracker::new(Store::OfficeShoes);
    let mut raws: Vec<RawListing> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut total_seen = 0usize;

    let entries = ctx.entry_urls(Store::OfficeShoes);
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

        let url = format!("{entry}?page={page}");
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
        raws.extend(cards);
    }

    Ok(finish_harvest(
        Store::OfficeShoes,
        &mut tracker,
        raws,
        errors,
        total_seen,
        ctx.config.min_discount_percent,
    ))
}

fn extract_cards(html: &str, errors: &mut Vec<String>) -> (Vec<RawListing>, usize) {
    let document = Html::parse_document(html);
    let card_sel = sel(CARD);
    let name_sel = sel(NAME_LINK);
    let manufacturer_sel = sel(MANUFACTURER);
    let image_sel = sel(IMAGE);
    let old_sel = sel(OLD_PRICE);
    let new_sel = sel(NEW_PRICE);

    let base = Store::OfficeShoes.base_url();
    let mut out = Vec::new();
    let mut seen = 0usize;

    for card in document.select(&card_sel) {
        seen += 1;

        let Some(name) = text_of(card, &name_sel) else {
            errors.push("office-shoes: card without a product link".to_owned());
            continue;
        };
        let Some(href) = attr_of(card, &name_sel, "href") else {
            errors.push(format!("office-shoes: card '{name}' without an href"));
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
            brand_hint: text_of(card, &manufacturer_sel),
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
    let size_sel = sel("div.size-variants button");
    let description_sel = sel("div.product-info-description");
    let image_sel = sel("div.product-detail-gallery img");
    let breadcrumb_sel = sel("nav.breadcrumb a");

    let mut sizes = Vec::new();
    for button in document.select(&size_sel) {
        if button.value().attr("disabled").is_some() {
            continue;
        }
        let label = button.text().collect::<String>();
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
        .map(|src| absolute(Store::OfficeShoes.base_url(), src));

    let breadcrumbs = document
        .select(&breadcrumb_sel)
        .map(|a| a.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");

    DetailPage::Product(DetailData {
        sizes,
        description,
        detail_image_url,
        category: category::classify(&breadcrumbs),
        gender: gender::classify(&breadcrumbs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use snizenja_core::Gender;

    const LISTING_PAGE: &str = r#"
        <div class="product-list">
          <div class="product-list-item">
            <a class="product-link" href="/proizvod/guess-torba-123">GUESS torba</a>
            <div class="manufacturer">GUESS</div>
            <img class="product-image" src="https://cdn.officeshoes.rs/torba-123.jpg">
            <span class="old-price">12.990,00 RSD</span>
            <span class="discount-price">5.990,00 RSD</span>
          </div>
        </div>"#;

    #[test]
    fn extracts_accessory_card() {
        let mut errors = Vec::new();
        let (cards, seen) = extract_cards(LISTING_PAGE, &mut errors);
        assert_eq!(seen, 1);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].brand_hint.as_deref(), Some("GUESS"));
        assert_eq!(cards[0].original_price, 12_990);
        assert_eq!(cards[0].sale_price, 5_990);
    }

    #[test]
    fn detail_keeps_empty_sizes_for_accessories() {
        // An accessory page has no size buttons at all; the result is a
        // product with zero sizes, and this store's policy keeps it.
        let html = r#"
            <div class="product-detail">
              <nav class="breadcrumb"><a href="/">Office Shoes</a><a href="/torbe">Torbe</a></nav>
              <div class="product-info-description">Kožna torba.</div>
            </div>"#;
        let DetailPage::Product(data) = extract_detail(html) else {
            panic!("expected product");
        };
        assert!(data.sizes.is_empty());
        assert_eq!(data.category.map(|c| c.as_path()), Some("oprema/torbe".to_string()));
    }

    #[test]
    fn detail_excludes_disabled_size_buttons() {
        let html = r#"
            <div class="product-detail">
              <div class="size-variants">
                <button>40</button>
                <button disabled>41</button>
                <button>42</button>
              </div>
              <nav class="breadcrumb"><a href="/zenske">Ženske</a><a href="/cipele">Cipele</a></nav>
            </div>"#;
        let DetailPage::Product(data) = extract_detail(html) else {
            panic!("expected product");
        };
        assert_eq!(data.sizes, vec!["40".to_string(), "42".to_string()]);
        assert_eq!(data.gender, Some(Gender::Zenski));
    }
}
