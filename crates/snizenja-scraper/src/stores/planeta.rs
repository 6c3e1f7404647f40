//! Planeta Sport (planetasport.rs).
//!
//! Plain HTTP store. The sale listing paginates via `?strana=N`; past the
//! last page the site re-serves the final page instead of an empty one, so
//! pagination stops when the first card URL repeats.

use scraper::Html;
use snizenja_core::{category, gender, Store};

use super::{
    absolute, attr_of, finish_harvest, is_listing_page, sel, sizes_are_consistent, text_of,
    ListContext,
};
use crate::error::ScraperError;
use crate::pass::{PassPhase, PassTracker};
use crate::price::parse_rsd;
use crate::types::{DetailData, DetailPage, ListHarvest, RawListing};

const CARD: &str = "li.product-item";
const NAME_LINK: &str = ".product-name a";
const IMAGE: &str = "img.product-thumb";
const OLD_PRICE: &str = ".price-old";
const NEW_PRICE: &str = ".price-new";
const BRAND: &str = ".product-brand";

pub(super) async fn scrape_list(ctx: &ListContext<'_>) -> Result<ListHarvest, ScraperError> {
    let mut tracker = PassTracker::new(Store::Planeta);
    let mut raws: Vec<RawListing> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut total_seen = 0usize;

    let entries = ctx.entry_urls(Store::Planeta);
    let entry = &entries[0];
    let mut prev_first_url: Option<String> = None;

    let mut page = 0usize;
    loop {
        page += 1;
        if page > ctx.config.max_pages_per_section {
            // The duplicate-page stop never fired; the site layout changed.
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

        let url = format!("{entry}?strana={page}");
        let html = match ctx.http.fetch_html(&url).await {
            Ok(html) => html,
            Err(e) => {
                // A fetch failure ends the pass early; what was already
                // extracted is still committed.
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
        let first_url = cards[0].url.clone();
        if prev_first_url.as_deref() == Some(first_url.as_str()) {
            break;
        }
        prev_first_url = Some(first_url);
        raws.extend(cards);
    }

    Ok(finish_harvest(
        Store::Planeta,
        &mut tracker,
        raws,
        errors,
        total_seen,
        ctx.config.min_discount_percent,
    ))
}

/// Extracts raw candidates from one listing page. Returns the candidates
/// and the number of card elements seen (including dropped ones).
fn extract_cards(html: &str, errors: &mut Vec<String>) -> (Vec<RawListing>, usize) {
    let document = Html::parse_document(html);
    let card_sel = sel(CARD);
    let name_sel = sel(NAME_LINK);
    let image_sel = sel(IMAGE);
    let old_sel = sel(OLD_PRICE);
    let new_sel = sel(NEW_PRICE);
    let brand_sel = sel(BRAND);

    let base = Store::Planeta.base_url();
    let mut out = Vec::new();
    let mut seen = 0usize;

    for card in document.select(&card_sel) {
        seen += 1;

        let Some(name) = text_of(card, &name_sel) else {
            errors.push("planeta: card without a name link".to_owned());
            continue;
        };
        let Some(href) = attr_of(card, &name_sel, "href") else {
            errors.push(format!("planeta: card '{name}' without a product URL"));
            continue;
        };

        // Unparseable or non-positive prices drop the card; zero is never
        // silently kept.
        let original = text_of(card, &old_sel).as_deref().and_then(parse_rsd);
        let sale = text_of(card, &new_sel).as_deref().and_then(parse_rsd);
        let (Some(original_price), Some(sale_price)) = (original, sale) else {
            continue;
        };

        let image_url = attr_of(card, &image_sel, "src")
            .map(|src| absolute(base, &src))
            .unwrap_or_default();

        out.push(RawListing {
            name,
            url: absolute(base, &href),
            image_url,
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
    Ok(extract_detail(&html))
}

fn extract_detail(html: &str) -> DetailPage {
    if is_listing_page(html, CARD) {
        return DetailPage::Listing;
    }

    let document = Html::parse_document(html);
    let size_sel = sel("ul.sizes li");
    let size_link_sel = sel("a");
    let description_sel = sel("div#opis");
    let gallery_sel = sel("div.product-gallery img");
    let breadcrumb_sel = sel("ul.breadcrumbs li a");

    let mut sizes: Vec<String> = Vec::new();
    for item in document.select(&size_sel) {
        let classes = item.value().attr("class").unwrap_or_default();
        if classes.contains("disabled") {
            continue;
        }
        if let Some(label) = text_of(item, &size_link_sel) {
            sizes.push(label);
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
        .select(&gallery_sel)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| absolute(Store::Planeta.base_url(), src));

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
        <ul class="products">
          <li class="product-item">
            <a class="product-thumb-link" href="/proizvod/nike-air-max-90-z">
              <img class="product-thumb" src="/images/nike-air-max-90.jpg">
            </a>
            <div class="product-brand">NIKE</div>
            <h3 class="product-name"><a href="/proizvod/nike-air-max-90-z">NIKE AIR MAX 90 PATIKE ZENSKE</a></h3>
            <div class="product-price">
              <span class="price-old">10.000,00 RSD</span>
              <span class="price-new">4.500,00 RSD</span>
            </div>
          </li>
          <li class="product-item">
            <h3 class="product-name"><a href="/proizvod/majica-bez-cene">ADIDAS MAJICA</a></h3>
            <div class="product-price">
              <span class="price-old">cena na upit</span>
              <span class="price-new">—</span>
            </div>
          </li>
        </ul>"#;

    #[test]
    fn extracts_cards_and_drops_unparseable_prices() {
        let mut errors = Vec::new();
        let (cards, seen) = extract_cards(LISTING_PAGE, &mut errors);
        assert_eq!(seen, 2);
        assert_eq!(cards.len(), 1);
        assert!(errors.is_empty());

        let card = &cards[0];
        assert_eq!(card.name, "NIKE AIR MAX 90 PATIKE ZENSKE");
        assert_eq!(
            card.url,
            "https://www.planetasport.rs/proizvod/nike-air-max-90-z"
        );
        assert_eq!(card.original_price, 10_000);
        assert_eq!(card.sale_price, 4_500);
        assert_eq!(card.brand_hint.as_deref(), Some("NIKE"));
    }

    #[test]
    fn card_without_url_is_an_error() {
        let html = r#"<li class="product-item"><h3 class="product-name"><a>X</a></h3></li>"#;
        let mut errors = Vec::new();
        let (cards, seen) = extract_cards(html, &mut errors);
        assert_eq!(seen, 1);
        assert!(cards.is_empty());
        assert_eq!(errors.len(), 1);
    }

    const DETAIL_PAGE: &str = r#"
        <div class="product-page">
          <ul class="breadcrumbs">
            <li><a href="/">Planeta Sport</a></li>
            <li><a href="/zene">Žene</a></li>
            <li><a href="/zene/patike">Patike</a></li>
          </ul>
          <div class="product-gallery"><img src="/images/full/nike-air-max-90.jpg"></div>
          <ul class="sizes">
            <li class="size"><a>38</a></li>
            <li class="size"><a>39</a></li>
            <li class="size disabled"><a>40</a></li>
          </ul>
          <div id="opis">Kultni model sa vazdušnim đonom.</div>
        </div>"#;

    #[test]
    fn extracts_detail_with_available_sizes_only() {
        let DetailPage::Product(data) = extract_detail(DETAIL_PAGE) else {
            panic!("expected a product page");
        };
        assert_eq!(data.sizes, vec!["38".to_string(), "39".to_string()]);
        assert_eq!(
            data.description.as_deref(),
            Some("Kultni model sa vazdušnim đonom.")
        );
        assert_eq!(
            data.detail_image_url.as_deref(),
            Some("https://www.planetasport.rs/images/full/nike-air-max-90.jpg")
        );
        assert_eq!(data.category.map(|c| c.as_path()), Some("obuca/patike".to_string()));
        assert_eq!(data.gender, Some(Gender::Zenski));
    }

    #[test]
    fn detail_on_listing_page_short_circuits() {
        assert_eq!(extract_detail(LISTING_PAGE), DetailPage::Listing);
    }

    #[test]
    fn mixed_size_systems_are_zeroed() {
        let html = r#"
            <ul class="sizes">
              <li class="size"><a>42</a></li>
              <li class="size"><a>M</a></li>
            </ul>"#;
        let DetailPage::Product(data) = extract_detail(html) else {
            panic!("expected a product page");
        };
        assert!(data.sizes.is_empty());
    }
}
