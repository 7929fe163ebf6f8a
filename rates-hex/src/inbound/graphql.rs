//! GraphQL surface: four queries mirroring the REST contract
//! field-for-field, with `rates` as a list of {date, rate, currency}.

use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql::{EmptyMutation, EmptySubscription, InputObject, Object, Schema, SimpleObject};
use axum::response::{Html, IntoResponse};
use chrono::NaiveDate;

use rates_types::{AppError, ConversionQuery, DateInt, ExchangeRateQuery, RateCollection, RateStore};

use super::handlers::AppState;

pub type RatesSchema<S> = Schema<QueryRoot<S>, EmptyMutation, EmptySubscription>;

pub fn build_schema<S: RateStore>(state: Arc<AppState<S>>) -> RatesSchema<S> {
    Schema::build(QueryRoot { state }, EmptyMutation, EmptySubscription).finish()
}

/// Serves the GraphiQL IDE.
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Date range input, dates in YYYY-MM-DD.
#[derive(InputObject)]
pub struct DateRange {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Conversion input: source and target currencies plus the base amount.
#[derive(InputObject)]
pub struct CurrencyConvert {
    pub from: String,
    pub to: String,
    pub amount: Option<f64>,
}

/// Exchange rate of one currency on one date.
#[derive(SimpleObject)]
pub struct RateEntry {
    pub date: String,
    pub rate: f64,
    pub currency: String,
}

/// Exchange rate result.
#[derive(SimpleObject)]
pub struct ExchangeRateCollection {
    pub base: String,
    pub from: String,
    pub to: String,
    pub rates: Vec<RateEntry>,
    /// Null when no more data can be provided.
    #[graphql(name = "next_page_token")]
    pub next_page_token: Option<String>,
}

/// Conversion rate result.
#[derive(SimpleObject)]
pub struct ConversionRateCollection {
    pub base: String,
    pub target_currency: String,
    pub base_amount: f64,
    pub from: String,
    pub to: String,
    pub rates: Vec<RateEntry>,
    /// Null when no more data can be provided.
    #[graphql(name = "next_page_token")]
    pub next_page_token: Option<String>,
}

pub struct QueryRoot<S: RateStore> {
    state: Arc<AppState<S>>,
}

#[Object(name = "Query")]
impl<S: RateStore> QueryRoot<S> {
    /// Exchange rates of a base currency in the given date range.
    async fn historical_exchange_rate(
        &self,
        date_range: DateRange,
        base_currency: String,
        page_token: Option<String>,
    ) -> async_graphql::Result<ExchangeRateCollection> {
        let (start, end) = parse_range(&date_range)?;
        let query = ExchangeRateQuery::base_on(&base_currency)
            .start_from(start)
            .end_of(end)
            .with_page_token(page_token);
        let collection = self
            .state
            .service
            .historical_exchange_rate(&query)
            .await
            .map_err(to_graphql_error)?;

        Ok(ExchangeRateCollection {
            base: base_currency,
            from: DateInt::from_date(start).to_string(),
            to: DateInt::from_date(end).to_string(),
            rates: rate_entries(&collection),
            next_page_token: collection.next_page_token().map(str::to_string),
        })
    }

    /// Exchange rates of the most recently imported date.
    async fn least_exchange_rate(
        &self,
        base_currency: String,
        page_token: Option<String>,
    ) -> async_graphql::Result<ExchangeRateCollection> {
        let query = ExchangeRateQuery::base_on(&base_currency).with_page_token(page_token);
        let collection = self
            .state
            .service
            .least_exchange_rate(&query)
            .await
            .map_err(to_graphql_error)?;

        Ok(ExchangeRateCollection {
            base: base_currency,
            from: collection.min_date().to_string(),
            to: collection.max_date().to_string(),
            rates: rate_entries(&collection),
            next_page_token: collection.next_page_token().map(str::to_string),
        })
    }

    /// Conversion between two currencies in the given date range.
    async fn historical_conversion_rate(
        &self,
        date_range: DateRange,
        currency_convert: CurrencyConvert,
        page_token: Option<String>,
    ) -> async_graphql::Result<ConversionRateCollection> {
        let (start, end) = parse_range(&date_range)?;
        let query = ConversionQuery::convert_from(&currency_convert.from)
            .target(&currency_convert.to)
            .start_from(start)
            .end_of(end)
            .with_amount(currency_convert.amount.unwrap_or(1.0))
            .with_page_token(page_token);
        let conversion = self
            .state
            .service
            .historical_conversion_rate(&query)
            .await
            .map_err(to_graphql_error)?;

        Ok(ConversionRateCollection {
            base: query.base_currency,
            target_currency: query.target_currency,
            base_amount: query.amount,
            from: DateInt::from_date(start).to_string(),
            to: DateInt::from_date(end).to_string(),
            rates: rate_entries(conversion.collection()),
            next_page_token: conversion.next_page_token().map(str::to_string),
        })
    }

    /// Conversion against the most recently imported date.
    async fn least_conversion_rate(
        &self,
        currency_convert: CurrencyConvert,
        page_token: Option<String>,
    ) -> async_graphql::Result<ConversionRateCollection> {
        let query = ConversionQuery::convert_from(&currency_convert.from)
            .target(&currency_convert.to)
            .with_amount(currency_convert.amount.unwrap_or(1.0))
            .with_page_token(page_token);
        let conversion = self
            .state
            .service
            .least_conversion_rate(&query)
            .await
            .map_err(to_graphql_error)?;

        Ok(ConversionRateCollection {
            base: query.base_currency,
            target_currency: query.target_currency,
            base_amount: query.amount,
            from: conversion.min_date().to_string(),
            to: conversion.max_date().to_string(),
            rates: rate_entries(conversion.collection()),
            next_page_token: conversion.next_page_token().map(str::to_string),
        })
    }
}

fn parse_range(range: &DateRange) -> async_graphql::Result<(NaiveDate, NaiveDate)> {
    let start = parse_date(range.start_date.as_deref(), "startDate")?;
    let end = parse_date(range.end_date.as_deref(), "endDate")?;
    Ok((start, end))
}

fn parse_date(value: Option<&str>, field: &str) -> async_graphql::Result<NaiveDate> {
    let raw = value.ok_or_else(|| {
        async_graphql::Error::new(format!("{} is required (YYYY-MM-DD)", field))
    })?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        async_graphql::Error::new(format!("{} mismatches YYYY-MM-DD format", field))
    })
}

fn to_graphql_error(err: AppError) -> async_graphql::Error {
    async_graphql::Error::new(err.to_string())
}

fn rate_entries(collection: &RateCollection) -> Vec<RateEntry> {
    collection
        .records()
        .iter()
        .map(|record| RateEntry {
            date: record.date.to_string(),
            rate: record.rate,
            currency: record.currency.clone(),
        })
        .collect()
}
