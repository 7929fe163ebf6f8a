//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use rates_types::dto::{ConversionRateResponse, ExchangeRateResponse};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Historical exchange rates of a base currency
#[utoipa::path(
    get,
    path = "/currency/exchange/historical/{from}",
    tag = "exchange",
    params(
        ("from" = String, Path, description = "Base currency code"),
        ("startDate" = String, Query, description = "Range start, YYYY-MM-DD"),
        ("endDate" = String, Query, description = "Range end, YYYY-MM-DD; must be after startDate, both endpoints included"),
        ("pageToken" = Option<String>, Query, description = "Continuation token from a previous page"),
    ),
    responses(
        (status = 200, description = "Daily rates in the range", body = ExchangeRateResponse),
        (status = 400, description = "Invalid parameters or page token"),
        (status = 404, description = "No rates stored for the range")
    )
)]
async fn historical_exchange_rate() {}

/// Exchange rates of the most recently imported date
#[utoipa::path(
    get,
    path = "/currency/exchange/least/{from}",
    tag = "exchange",
    params(
        ("from" = String, Path, description = "Base currency code"),
        ("pageToken" = Option<String>, Query, description = "Continuation token from a previous page"),
    ),
    responses(
        (status = 200, description = "Rates of the most recent stored date", body = ExchangeRateResponse),
        (status = 404, description = "Base currency never imported")
    )
)]
async fn least_exchange_rate() {}

/// Historical conversion of an amount between two currencies
#[utoipa::path(
    get,
    path = "/currency/convert/historical/{from}/to/{to}",
    tag = "convert",
    params(
        ("from" = String, Path, description = "Base currency code"),
        ("to" = String, Path, description = "Target currency code"),
        ("startDate" = String, Query, description = "Range start, YYYY-MM-DD"),
        ("endDate" = String, Query, description = "Range end, YYYY-MM-DD; must be after startDate, both endpoints included"),
        ("amount" = Option<f64>, Query, description = "Amount of base currency to convert, defaults to 1"),
        ("pageToken" = Option<String>, Query, description = "Continuation token from a previous page"),
    ),
    responses(
        (status = 200, description = "Daily converted amounts", body = ConversionRateResponse),
        (status = 400, description = "Invalid parameters or page token"),
        (status = 404, description = "No rates stored, or target currency unknown")
    )
)]
async fn historical_conversion_rate() {}

/// Conversion against the most recently imported date
#[utoipa::path(
    get,
    path = "/currency/convert/least/{from}/to/{to}",
    tag = "convert",
    params(
        ("from" = String, Path, description = "Base currency code"),
        ("to" = String, Path, description = "Target currency code"),
        ("amount" = Option<f64>, Query, description = "Amount of base currency to convert, defaults to 1"),
        ("pageToken" = Option<String>, Query, description = "Continuation token from a previous page"),
    ),
    responses(
        (status = 200, description = "Converted amounts for the most recent stored date", body = ConversionRateResponse),
        (status = 404, description = "Base currency never imported, or target currency unknown")
    )
)]
async fn least_conversion_rate() {}

/// OpenAPI documentation for the exchange rate API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Currency Exchange Rate API",
        version = "1.0.0",
        description = "Historical and latest currency exchange and conversion rates, backed by a daily import of provider snapshots. Every response is wrapped in a `{success, response_timestamp, data | {status, code, message}}` envelope.",
        license(name = "MIT"),
    ),
    paths(
        health,
        historical_exchange_rate,
        least_exchange_rate,
        historical_conversion_rate,
        least_conversion_rate,
    ),
    components(
        schemas(
            ExchangeRateResponse,
            ConversionRateResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "exchange", description = "Exchange rate queries"),
        (name = "convert", description = "Currency conversion queries"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        assert_eq!(doc.paths.paths.len(), 5);
        assert!(doc.paths.paths.contains_key("/currency/exchange/historical/{from}"));
    }
}
