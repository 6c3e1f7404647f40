//! Intersport (intersport.rs).
//!
//! Plain HTTP store, `?page=N` pagination. The listing cards are unusually
//! rich: a structured `data-product-type` attribute and inline size chips,
//! so the list pass already fills everything other stores need a detail
//! pass for. This is the one store without a detail scraper.

use scraper::Html;
use snizenja_core::{gender, Store};

use super::{absolute, attr_of, finish_harvest, sel, text_of, ListContext};
use crate::error::ScraperError;
use crate::pass::{PassPhase, PassTracker};
use crate::price::parse_rsd;
use crate::types::{ListHarvest, RawListing};

const CARD: &str = "div.product-card";
const NAME_LINK: &str = "a.product-card-link";
const IMAGE: &str = "img.product-card-image";
const OLD_PRICE: &str = "del.price-regular";
const NEW_PRICE: &str = "ins.price-sale";
const SIZE_CHIP: &str = "span.size-chip";

pub(super) async fn scrape_list(ctx: &ListContext<'_>) -> Result<ListHarvest, ScraperError> {
    let mut tracker = PassTracker::new(Store::Intersport);
    let mut raws: Vec<RawListing> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut total_seen = 0usize;

    let entries = ctx.entry_urls(Store::Intersport);
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
        Store::Intersport,
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
    let image_sel = sel(IMAGE);
    let old_sel = sel(OLD_PRICE);
    let new_sel = sel(NEW_PRICE);
    let size_sel = sel(SIZE_CHIP);

    let base = Store::Intersport.base_url();
    let mut out = Vec::new();
    let mut seen = 0usize;

    for card in document.select(&card_sel) {
        seen += 1;

        let Some(name) = text_of(card, &name_sel) else {
            errors.push("intersport: card without a product link".to_owned());
            continue;
        };
        let Some(href) = attr_of(card, &name_sel, "href") else {
            errors.push(format!("intersport: card '{name}' without an href"));
            continue;
        };

        let original = text_of(card, &old_sel).as_deref().and_then(parse_rsd);
        let sale = text_of(card, &new_sel).as_deref().and_then(parse_rsd);
        let (Some(original_price), Some(sale_price)) = (original, sale) else {
            continue;
        };

        // The structured product-type attribute is the category hint; the
        // audience field drives gender when present.
        let category_hint = card.value().attr("data-product-type").map(str::to_owned);
        let gender_hint = card
            .value()
            .attr("data-audience")
            .and_then(gender::classify);

        let sizes = card
            .select(&size_sel)
            .filter(|chip| {
                !chip
                    .value()
                    .attr("class")
                    .unwrap_or_default()
                    .contains("unavailable")
            })
            .map(|chip| chip.text().collect::<String>().trim().to_owned())
            .filter(|label| !label.is_empty())
            .collect();

        out.push(RawListing {
            name,
            url: absolute(base, &href),
            image_url: attr_of(card, &image_sel, "src")
                .map(|src| absolute(base, &src))
                .unwrap_or_default(),
            original_price,
            sale_price,
            brand_hint: None,
            category_hint,
            gender_hint,
            sizes,
        });
    }

    (out, seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snizenja_core::Gender;

    const LISTING_PAGE: &str = r#"
        <div class="product-grid">
          <div class="product-card" data-product-type="Kopačke" data-audience="Muškarci">
            <a class="product-card-link" href="/proizvod/adidas-predator-29">ADIDAS PREDATOR LEAGUE FG</a>
            <img class="product-card-image" src="/img/predator.jpg">
            <del class="price-regular">14.990,00 RSD</del>
            <ins class="price-sale">5.990,00 RSD</ins>
            <div class="sizes">
              <span class="size-chip">42</span>
              <span class="size-chip unavailable">43</span>
              <span class="size-chip">44</span>
            </div>
          </div>
        </div>"#;

    #[test]
    fn extracts_structured_hints_and_inline_sizes() {
        let mut errors = Vec::new();
        let (cards, seen) = extract_cards(LISTING_PAGE, &mut errors);
        assert_eq!(seen, 1);
        assert_eq!(cards.len(), 1);

        let card = &cards[0];
        assert_eq!(card.category_hint.as_deref(), Some("Kopačke"));
        assert_eq!(card.gender_hint, Some(Gender::Muski));
        assert_eq!(card.sizes, vec!["42".to_string(), "44".to_string()]);
        assert_eq!(card.original_price, 14_990);
        assert_eq!(card.sale_price, 5_990);
    }
}
