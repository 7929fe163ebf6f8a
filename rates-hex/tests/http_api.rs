//! End-to-end tests for the REST and GraphQL surfaces, driven through
//! the router with an in-memory store.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

use rates_hex::RateService;
use rates_hex::inbound::HttpServer;
use rates_repo::MemoryStore;
use rates_types::{DateInt, RateRow, RateStore};

fn row(base: &str, date: u32, rates: &[(&str, f64)]) -> RateRow {
    RateRow {
        base_currency: base.to_string(),
        date: DateInt::new(date).unwrap(),
        rates: rates.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
    }
}

/// Ten daily USD rows for 2023-01-01 through 2023-01-10.
fn ten_daily_usd_rows() -> Vec<RateRow> {
    (1..=10)
        .map(|day| {
            row(
                "USD",
                20230100 + day,
                &[("HKD", 7.8 + day as f64 * 0.01), ("EUR", 0.93)],
            )
        })
        .collect()
}

async fn router_with(store: MemoryStore, rows: Vec<RateRow>) -> Router {
    store.batch_put(rows).await.unwrap();
    HttpServer::new(RateService::new(store)).router()
}

async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let router = router_with(MemoryStore::new(), vec![]).await;
    let (status, body) = get_json(&router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_historical_returns_all_seeded_dates() {
    let router = router_with(MemoryStore::new(), ten_daily_usd_rows()).await;

    let (status, body) = get_json(
        &router,
        "/currency/exchange/historical/USD?startDate=2023-01-01&endDate=2023-01-10",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["response_timestamp"].is_i64());

    let data = &body["data"];
    assert_eq!(data["base"], "USD");
    assert_eq!(data["from"], 20230101);
    assert_eq!(data["to"], 20230110);
    let rates = data["rates"].as_object().unwrap();
    assert_eq!(rates.len(), 10);
    assert!(rates.contains_key("20230101"));
    assert!(rates.contains_key("20230110"));
    assert_eq!(rates["20230103"]["EUR"], 0.93);
    // Fully served: no continuation token.
    assert!(data.get("next_page_token").is_none() || data["next_page_token"].is_null());
}

#[tokio::test]
async fn test_historical_paginates_with_result_set_limit_of_one() {
    let store = MemoryStore::new().with_page_limit(1);
    let router = router_with(store, ten_daily_usd_rows()).await;

    let (status, body) = get_json(
        &router,
        "/currency/exchange/historical/USD?startDate=2023-01-01&endDate=2023-01-10",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    let rates = data["rates"].as_object().unwrap();
    assert_eq!(rates.len(), 1);
    assert!(rates.contains_key("20230101"));
    let token = data["next_page_token"].as_str().unwrap().to_string();

    let (status, body) = get_json(
        &router,
        &format!(
            "/currency/exchange/historical/USD?startDate=2023-01-01&endDate=2023-01-10&pageToken={}",
            token
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rates = body["data"]["rates"].as_object().unwrap();
    assert_eq!(rates.len(), 1);
    assert!(rates.contains_key("20230102"));
    assert!(body["data"]["next_page_token"].is_string());
}

#[tokio::test]
async fn test_historical_validation_reports_all_field_problems() {
    let router = router_with(MemoryStore::new(), vec![]).await;

    let (status, body) = get_json(
        &router,
        "/currency/exchange/historical/USD?startDate=bogus",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 100);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("startDate"));
    assert!(message.contains("endDate"));
}

#[tokio::test]
async fn test_historical_rejects_inverted_range() {
    let router = router_with(MemoryStore::new(), ten_daily_usd_rows()).await;

    let (status, body) = get_json(
        &router,
        "/currency/exchange/historical/USD?startDate=2023-01-10&endDate=2023-01-01",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("endDate"));
}

#[tokio::test]
async fn test_historical_unknown_base_is_not_found() {
    let router = router_with(MemoryStore::new(), ten_daily_usd_rows()).await;

    let (status, body) = get_json(
        &router,
        "/currency/exchange/historical/XXX?startDate=2023-01-01&endDate=2023-01-10",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 202);
}

#[tokio::test]
async fn test_historical_bad_page_token_is_client_error() {
    let router = router_with(MemoryStore::new(), ten_daily_usd_rows()).await;

    let (status, body) = get_json(
        &router,
        "/currency/exchange/historical/USD?startDate=2023-01-01&endDate=2023-01-10&pageToken=garbage",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("page token"));
}

#[tokio::test]
async fn test_least_returns_most_recent_date() {
    let router = router_with(MemoryStore::new(), ten_daily_usd_rows()).await;

    let (status, body) = get_json(&router, "/currency/exchange/least/USD").await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["from"], 20230110);
    assert_eq!(data["to"], 20230110);
    let rates = data["rates"].as_object().unwrap();
    assert_eq!(rates.len(), 1);
    assert!(rates.contains_key("20230110"));
}

#[tokio::test]
async fn test_convert_historical_scales_rates() {
    let router = router_with(MemoryStore::new(), ten_daily_usd_rows()).await;

    let (status, body) = get_json(
        &router,
        "/currency/convert/historical/USD/to/EUR?startDate=2023-01-01&endDate=2023-01-10&amount=100",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["base"], "USD");
    assert_eq!(data["targetCurrency"], "EUR");
    assert_eq!(data["baseAmount"], 100.0);
    let rates = data["rates"].as_object().unwrap();
    assert_eq!(rates.len(), 10);
    assert_eq!(rates["20230101"], 0.93 * 100.0);
}

#[tokio::test]
async fn test_convert_least_defaults_amount_to_one() {
    let router = router_with(MemoryStore::new(), ten_daily_usd_rows()).await;

    let (status, body) = get_json(&router, "/currency/convert/least/USD/to/HKD").await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["baseAmount"], 1.0);
    assert_eq!(data["rates"]["20230110"], 7.8 + 10.0 * 0.01);
}

#[tokio::test]
async fn test_convert_unknown_target_is_not_found() {
    let router = router_with(MemoryStore::new(), ten_daily_usd_rows()).await;

    let (status, body) = get_json(
        &router,
        "/currency/convert/least/USD/to/JPY",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("JPY"));
}

#[tokio::test]
async fn test_convert_rejects_bad_amount() {
    let router = router_with(MemoryStore::new(), ten_daily_usd_rows()).await;

    let (status, body) = get_json(
        &router,
        "/currency/convert/least/USD/to/HKD?amount=-3",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("amount"));
}

// ─────────────────────────────────────────────────────────────────────────────
// GraphQL
// ─────────────────────────────────────────────────────────────────────────────

async fn post_graphql(router: &Router, query: &str) -> (StatusCode, Value) {
    let body = serde_json::json!({ "query": query }).to_string();
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/graphql")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_graphql_historical_exchange_rate() {
    let router = router_with(MemoryStore::new(), ten_daily_usd_rows()).await;

    let (status, body) = post_graphql(
        &router,
        r#"{
            historicalExchangeRate(
                baseCurrency: "USD",
                dateRange: {startDate: "2023-01-01", endDate: "2023-01-10"}
            ) {
                base
                from
                to
                rates { date rate currency }
                next_page_token
            }
        }"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("errors").is_none(), "unexpected errors: {}", body);
    let result = &body["data"]["historicalExchangeRate"];
    assert_eq!(result["base"], "USD");
    assert_eq!(result["from"], "20230101");
    assert_eq!(result["to"], "20230110");
    // Two currencies per day across ten days.
    assert_eq!(result["rates"].as_array().unwrap().len(), 20);
    assert!(result["next_page_token"].is_null());
}

#[tokio::test]
async fn test_graphql_least_conversion_rate() {
    let router = router_with(MemoryStore::new(), ten_daily_usd_rows()).await;

    let (status, body) = post_graphql(
        &router,
        r#"{
            leastConversionRate(
                currencyConvert: {from: "USD", to: "HKD", amount: 100.0}
            ) {
                base
                targetCurrency
                baseAmount
                from
                to
                rates { date rate currency }
            }
        }"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("errors").is_none(), "unexpected errors: {}", body);
    let result = &body["data"]["leastConversionRate"];
    assert_eq!(result["targetCurrency"], "HKD");
    assert_eq!(result["baseAmount"], 100.0);
    assert_eq!(result["from"], "20230110");
    let rates = result["rates"].as_array().unwrap();
    assert_eq!(rates.len(), 1);
    assert_eq!(rates[0]["currency"], "HKD");
    assert_eq!(rates[0]["rate"], (7.8 + 10.0 * 0.01) * 100.0);
}

#[tokio::test]
async fn test_graphql_unknown_currency_reports_error() {
    let router = router_with(MemoryStore::new(), ten_daily_usd_rows()).await;

    let (status, body) = post_graphql(
        &router,
        r#"{ leastExchangeRate(baseCurrency: "XXX") { base } }"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let errors = body["errors"].as_array().unwrap();
    assert!(errors[0]["message"].as_str().unwrap().contains("XXX"));
}
