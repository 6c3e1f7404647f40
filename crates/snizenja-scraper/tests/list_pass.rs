//! Integration tests for the HTTP list and detail passes.
//!
//! Uses `wiremock` to stand up a local server in place of a retailer, via
//! the `ListContext` base override, so no real network traffic is made.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use snizenja_core::{AppConfig, Store};
use snizenja_scraper::{fetch_detail, scrape_list, DelayPolicy, DetailPage, HttpClient, ListContext};

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".to_string(),
        log_level: "debug".to_string(),
        min_discount_percent: 50,
        request_timeout_secs: 5,
        user_agent: "snizenja-test/0.1".to_string(),
        max_retries: 0,
        retry_backoff_base_secs: 0,
        page_delay_min_ms: 0,
        page_delay_max_ms: 0,
        max_pages_per_section: 10,
        max_load_more_clicks: 5,
        chrome_executable: None,
        cleanup_floor_min: 0,
        db_max_connections: 1,
        db_min_connections: 1,
        db_acquire_timeout_secs: 5,
    }
}

fn test_client() -> HttpClient {
    HttpClient::new(5, "snizenja-test/0.1", 0, 0).expect("failed to build test client")
}

fn planeta_card(slug: &str, name: &str, old: &str, new: &str) -> String {
    format!(
        r#"<li class="product-item">
             <h3 class="product-name"><a href="/proizvod/{slug}">{name}</a></h3>
             <img class="product-thumb" src="/img/{slug}.jpg">
             <div class="product-brand">NIKE</div>
             <span class="price-old">{old}</span>
             <span class="price-new">{new}</span>
           </li>"#
    )
}

#[tokio::test]
async fn planeta_list_pass_filters_and_stops_on_duplicate_page() {
    let server = MockServer::start().await;

    // Page 1: one qualifying deal (55%) and one below threshold (25%).
    let page1 = format!(
        "<ul>{}{}</ul>",
        planeta_card("air-max", "NIKE AIR MAX PATIKE ZENSKE", "10.000,00 RSD", "4.500,00 RSD"),
        planeta_card("pegasus", "NIKE PEGASUS PATIKE", "8.000,00 RSD", "6.000,00 RSD"),
    );
    // Page 2 re-serves page 1 (the site's behavior past the last page).
    Mock::given(method("GET"))
        .and(path("/akcija"))
        .and(query_param("strana", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page1.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/akcija"))
        .and(query_param("strana", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page1))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client();
    let config = test_config();
    let mut ctx = ListContext::new(&client, &config, DelayPolicy::NONE);
    ctx.base_override = Some(server.uri().leak());

    let harvest = scrape_list(Store::Planeta, &ctx).await.expect("harvest");

    // Two cards per page, two pages fetched before the duplicate stop.
    assert_eq!(harvest.total_scraped, 4);
    assert_eq!(harvest.deals.len(), 1);
    assert!(harvest.errors.is_empty());

    let deal = &harvest.deals[0];
    assert_eq!(deal.discount_percent, 55);
    assert_eq!(deal.brand.as_deref(), Some("NIKE"));
    assert_eq!(deal.categories, vec!["obuca/patike".to_string()]);
    assert!(deal.id.starts_with("planeta-"));
}

#[tokio::test]
async fn planeta_list_pass_commits_partial_results_on_fetch_failure() {
    let server = MockServer::start().await;

    let page1 = format!(
        "<ul>{}</ul>",
        planeta_card("air-max", "NIKE AIR MAX PATIKE", "10.000,00 RSD", "4.500,00 RSD"),
    );
    Mock::given(method("GET"))
        .and(path("/akcija"))
        .and(query_param("strana", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page1))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/akcija"))
        .and(query_param("strana", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client();
    let config = test_config();
    let mut ctx = ListContext::new(&client, &config, DelayPolicy::NONE);
    ctx.base_override = Some(server.uri().leak());

    let harvest = scrape_list(Store::Planeta, &ctx).await.expect("harvest");

    // The page-2 failure ends the pass early but keeps page-1 results.
    assert_eq!(harvest.deals.len(), 1);
    assert_eq!(harvest.errors.len(), 1);
    assert!(harvest.errors[0].contains("500"));
}

#[tokio::test]
async fn empty_first_page_yields_empty_harvest() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/akcija"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<ul></ul>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client();
    let config = test_config();
    let mut ctx = ListContext::new(&client, &config, DelayPolicy::NONE);
    ctx.base_override = Some(server.uri().leak());

    let harvest = scrape_list(Store::Planeta, &ctx).await.expect("harvest");
    assert_eq!(harvest.total_scraped, 0);
    assert!(harvest.deals.is_empty());
}

#[tokio::test]
async fn pagination_ceiling_is_recorded_as_a_run_error() {
    let server = MockServer::start().await;

    // Every page returns fresh cards, so neither the empty-page nor the
    // duplicate-page stop ever fires; the hard ceiling must end the pass
    // and record it.
    for (page, slug) in [("1", "prvi"), ("2", "drugi")] {
        let body = format!(
            "<ul>{}</ul>",
            planeta_card(slug, "NIKE PATIKE", "10.000,00 RSD", "4.500,00 RSD"),
        );
        Mock::given(method("GET"))
            .and(path("/akcija"))
            .and(query_param("strana", page))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = test_client();
    let mut config = test_config();
    config.max_pages_per_section = 2;
    let mut ctx = ListContext::new(&client, &config, DelayPolicy::NONE);
    ctx.base_override = Some(server.uri().leak());

    let harvest = scrape_list(Store::Planeta, &ctx).await.expect("harvest");
    assert_eq!(harvest.deals.len(), 2);
    assert_eq!(harvest.errors.len(), 1);
    assert!(harvest.errors[0].contains("pagination limit"));
}

#[tokio::test]
async fn n_sport_stops_paging_below_the_discount_threshold() {
    let server = MockServer::start().await;

    fn n_sport_card(slug: &str, old: &str, new: &str) -> String {
        format!(
            r#"<article class="product-card">
                 <div class="product-media"><img src="/img/{slug}.jpg"></div>
                 <h2 class="product-title"><a href="/proizvod/{slug}">PATIKE {slug}</a></h2>
                 <span class="price-before">{old}</span>
                 <span class="price-now">{new}</span>
               </article>"#
        )
    }

    // Discount-descending feed: 60%, then 40% (below the 50 threshold).
    let page1 = format!(
        "{}{}",
        n_sport_card("alpha", "10.000,00 RSD", "4.000,00 RSD"),
        n_sport_card("beta", "10.000,00 RSD", "6.000,00 RSD"),
    );
    Mock::given(method("GET"))
        .and(path("/outlet"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page1))
        .expect(1)
        .mount(&server)
        .await;
    // Page 2 must never be requested: the feed is sorted by discount and
    // page 1 already dipped below the threshold.
    Mock::given(method("GET"))
        .and(path("/outlet"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(String::new()))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client();
    let config = test_config();
    let mut ctx = ListContext::new(&client, &config, DelayPolicy::NONE);
    ctx.base_override = Some(server.uri().leak());

    let harvest = scrape_list(Store::NSport, &ctx).await.expect("harvest");
    assert_eq!(harvest.total_scraped, 2);
    assert_eq!(harvest.deals.len(), 1);
    assert_eq!(harvest.deals[0].discount_percent, 60);
}

#[tokio::test]
async fn detail_fetch_on_listing_page_is_detected() {
    let server = MockServer::start().await;

    let listing = format!(
        "<ul>{}{}</ul>",
        planeta_card("a", "A", "10.000,00 RSD", "4.000,00 RSD"),
        planeta_card("b", "B", "10.000,00 RSD", "4.000,00 RSD"),
    );
    Mock::given(method("GET"))
        .and(path("/proizvod/ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing))
        .mount(&server)
        .await;

    let client = test_client();
    let config = test_config();
    let ctx = ListContext::new(&client, &config, DelayPolicy::NONE);

    let url = format!("{}/proizvod/ghost", server.uri());
    let page = fetch_detail(Store::Planeta, &ctx, &url).await.expect("fetch");
    assert_eq!(page, DetailPage::Listing);
}

#[tokio::test]
async fn detail_fetch_extracts_product_enrichment() {
    let server = MockServer::start().await;

    let product = r#"
        <div class="product-page">
          <ul class="breadcrumbs"><li><a href="/zene">Žene</a></li><li><a href="/patike">Patike</a></li></ul>
          <div class="product-gallery"><img src="/img/full/air-max.jpg"></div>
          <ul class="sizes">
            <li class="size"><a>38</a></li>
            <li class="size disabled"><a>39</a></li>
          </ul>
          <div id="opis">Opis proizvoda.</div>
        </div>"#;
    Mock::given(method("GET"))
        .and(path("/proizvod/air-max"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product))
        .mount(&server)
        .await;

    let client = test_client();
    let config = test_config();
    let ctx = ListContext::new(&client, &config, DelayPolicy::NONE);

    let url = format!("{}/proizvod/air-max", server.uri());
    let page = fetch_detail(Store::Planeta, &ctx, &url).await.expect("fetch");
    let DetailPage::Product(data) = page else {
        panic!("expected product page");
    };
    assert_eq!(data.sizes, vec!["38".to_string()]);
    assert_eq!(data.description.as_deref(), Some("Opis proizvoda."));
}

#[tokio::test]
async fn http_client_surfaces_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client();
    let err = client
        .fetch_html(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        snizenja_scraper::ScraperError::NotFound { .. }
    ));
}

#[tokio::test]
async fn http_client_retries_rate_limiting() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/throttled"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/throttled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let client = HttpClient::new(5, "snizenja-test/0.1", 2, 0).expect("client");
    let body = client
        .fetch_html(&format!("{}/throttled", server.uri()))
        .await
        .expect("retried fetch");
    assert_eq!(body, "ok");
}
