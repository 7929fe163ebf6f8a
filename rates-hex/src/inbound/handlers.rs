//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use rates_types::{
    AppError, ConversionQuery, ConversionRateResponse, DateInt, ExchangeRateQuery,
    ExchangeRateResponse, RateStore,
};

use crate::RateService;

/// Application state shared across handlers.
pub struct AppState<S: RateStore> {
    pub service: RateService<S>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self.0, AppError::Internal(_)) {
            tracing::error!(error = %self.0, "request failed");
        }
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = serde_json::json!({
            "success": false,
            "response_timestamp": Utc::now().timestamp_millis(),
            "status": self.0.http_status(),
            "code": self.0.code(),
            "message": self.0.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

/// Uniform success envelope wrapped around every payload.
fn success<T: serde::Serialize>(data: T) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "response_timestamp": Utc::now().timestamp_millis(),
        "data": data,
    }))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Query parameter validation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HistoricalParams {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "pageToken")]
    pub page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeastParams {
    #[serde(rename = "pageToken")]
    pub page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConvertHistoricalParams {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    pub amount: Option<String>,
    #[serde(rename = "pageToken")]
    pub page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConvertLeastParams {
    pub amount: Option<String>,
    #[serde(rename = "pageToken")]
    pub page_token: Option<String>,
}

fn parse_date_field(
    value: Option<&str>,
    field: &str,
    problems: &mut Vec<String>,
) -> Option<NaiveDate> {
    match value {
        None => {
            problems.push(format!("{} is required (YYYY-MM-DD)", field));
            None
        }
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                problems.push(format!("{} mismatches YYYY-MM-DD format", field));
                None
            }
        },
    }
}

fn parse_date_range(
    start: Option<&str>,
    end: Option<&str>,
    problems: &mut Vec<String>,
) -> Option<(NaiveDate, NaiveDate)> {
    let start = parse_date_field(start, "startDate", problems);
    let end = parse_date_field(end, "endDate", problems);
    match (start, end) {
        (Some(start), Some(end)) if end <= start => {
            problems.push("endDate should be after startDate".into());
            None
        }
        (Some(start), Some(end)) => Some((start, end)),
        _ => None,
    }
}

fn parse_amount(value: Option<&str>, problems: &mut Vec<String>) -> f64 {
    match value {
        None => 1.0,
        Some(raw) => match raw.parse::<f64>() {
            Ok(amount) if amount.is_finite() && amount > 0.0 => amount,
            _ => {
                problems.push("amount must be a positive number".into());
                1.0
            }
        },
    }
}

/// Every field problem is reported in one response, the way the original
/// validation middleware collected them.
fn reject_on_problems(problems: Vec<String>) -> Result<(), ApiError> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::BadRequest(problems.join("; ")).into())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Exchange rate endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// Historical exchange rates of a base currency.
#[tracing::instrument(skip(state, params), fields(base = %from))]
pub async fn historical_exchange_rate<S: RateStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(from): Path<String>,
    Query(params): Query<HistoricalParams>,
) -> Result<impl IntoResponse, ApiError> {
    let mut problems = Vec::new();
    let range = parse_date_range(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        &mut problems,
    );
    reject_on_problems(problems)?;
    let (start, end) = range
        .ok_or_else(|| AppError::BadRequest("startDate and endDate are required".into()))?;

    let query = ExchangeRateQuery::base_on(&from)
        .start_from(start)
        .end_of(end)
        .with_page_token(params.page_token);
    let collection = state.service.historical_exchange_rate(&query).await?;

    Ok(success(ExchangeRateResponse {
        base: query.base_currency,
        from: DateInt::from_date(start),
        to: DateInt::from_date(end),
        rates: collection.serialize(),
        next_page_token: collection.next_page_token().map(str::to_string),
    }))
}

/// Exchange rates of the most recently imported date.
#[tracing::instrument(skip(state, params), fields(base = %from))]
pub async fn least_exchange_rate<S: RateStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(from): Path<String>,
    Query(params): Query<LeastParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = ExchangeRateQuery::base_on(&from).with_page_token(params.page_token);
    let collection = state.service.least_exchange_rate(&query).await?;

    Ok(success(ExchangeRateResponse {
        base: query.base_currency,
        from: collection.min_date(),
        to: collection.max_date(),
        rates: collection.serialize(),
        next_page_token: collection.next_page_token().map(str::to_string),
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// Historical conversion of an amount from one currency into another.
#[tracing::instrument(skip(state, params), fields(base = %path.0, target = %path.1))]
pub async fn historical_conversion_rate<S: RateStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(path): Path<(String, String)>,
    Query(params): Query<ConvertHistoricalParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (from, to) = path;
    let mut problems = Vec::new();
    let range = parse_date_range(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        &mut problems,
    );
    let amount = parse_amount(params.amount.as_deref(), &mut problems);
    reject_on_problems(problems)?;
    let (start, end) = range
        .ok_or_else(|| AppError::BadRequest("startDate and endDate are required".into()))?;

    let query = ConversionQuery::convert_from(&from)
        .target(&to)
        .start_from(start)
        .end_of(end)
        .with_amount(amount)
        .with_page_token(params.page_token);
    let conversion = state.service.historical_conversion_rate(&query).await?;

    Ok(success(ConversionRateResponse {
        base: query.base_currency,
        target_currency: query.target_currency,
        base_amount: query.amount,
        from: DateInt::from_date(start),
        to: DateInt::from_date(end),
        rates: conversion.serialize(),
        next_page_token: conversion.next_page_token().map(str::to_string),
    }))
}

/// Conversion against the most recently imported date.
#[tracing::instrument(skip(state, params), fields(base = %path.0, target = %path.1))]
pub async fn least_conversion_rate<S: RateStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(path): Path<(String, String)>,
    Query(params): Query<ConvertLeastParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (from, to) = path;
    let mut problems = Vec::new();
    let amount = parse_amount(params.amount.as_deref(), &mut problems);
    reject_on_problems(problems)?;

    let query = ConversionQuery::convert_from(&from)
        .target(&to)
        .with_amount(amount)
        .with_page_token(params.page_token);
    let conversion = state.service.least_conversion_rate(&query).await?;

    Ok(success(ConversionRateResponse {
        base: query.base_currency,
        target_currency: query.target_currency,
        base_amount: query.amount,
        from: conversion.min_date(),
        to: conversion.max_date(),
        rates: conversion.serialize(),
        next_page_token: conversion.next_page_token().map(str::to_string),
    }))
}
