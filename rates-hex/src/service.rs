//! Exchange Rate Application Service
//!
//! Orchestrates store queries and conversion transforms through the
//! store port. Contains no infrastructure logic.

use rates_types::{
    AppError, ConversionQuery, ConversionRate, DateInt, ExchangeRateQuery, PageKey,
    RateCollection, RateStore, collection_from_page,
};

/// Application service for rate queries.
///
/// Generic over `S: RateStore` - the store adapter is injected at
/// construction, so tests run against the in-memory adapter.
pub struct RateService<S: RateStore> {
    store: S,
}

impl<S: RateStore> RateService<S> {
    /// Creates a new rate service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Rates for a base currency over a date range.
    ///
    /// Validation requires `endDate > startDate`; the store range itself
    /// includes both endpoints, so 2023-01-01..2023-01-10 covers ten
    /// daily rows.
    pub async fn historical_exchange_rate(
        &self,
        query: &ExchangeRateQuery,
    ) -> Result<RateCollection, AppError> {
        let (start, end) = match (query.start_date, query.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(AppError::BadRequest(
                    "startDate and endDate are required".into(),
                ));
            }
        };
        if end <= start {
            return Err(AppError::BadRequest(
                "endDate should be after startDate".into(),
            ));
        }

        let cursor = decode_page_token(query.page_token.as_deref())?;
        let page = self
            .store
            .query_range(
                &query.base_currency,
                DateInt::from_date(start),
                DateInt::from_date(end),
                cursor,
            )
            .await?;

        collection_from_page(page).ok_or_else(|| {
            AppError::NotFound(format!(
                "No exchange rate stored for {} in the requested range",
                query.base_currency
            ))
        })
    }

    /// Rates for the most recently imported date of a base currency.
    pub async fn least_exchange_rate(
        &self,
        query: &ExchangeRateQuery,
    ) -> Result<RateCollection, AppError> {
        let Some(latest) = self.store.latest_date(&query.base_currency).await? else {
            return Err(AppError::NotFound(format!(
                "No exchange rate imported for {}",
                query.base_currency
            )));
        };

        let page = self.store.query_date(&query.base_currency, latest).await?;
        collection_from_page(page).ok_or_else(|| {
            AppError::NotFound(format!(
                "No exchange rate stored for {} on {}",
                query.base_currency, latest
            ))
        })
    }

    /// Converted amounts over a date range: filter the exchange snapshot
    /// to the target currency, then scale by the requested amount.
    pub async fn historical_conversion_rate(
        &self,
        query: &ConversionQuery,
    ) -> Result<ConversionRate, AppError> {
        validate_amount(query.amount)?;
        let collection = self
            .historical_exchange_rate(&query.as_exchange_rate_query())
            .await?;
        ConversionRate::convert(&collection, &query.target_currency, query.amount)
            .map_err(Into::into)
    }

    /// Converted amounts for the most recently imported date.
    pub async fn least_conversion_rate(
        &self,
        query: &ConversionQuery,
    ) -> Result<ConversionRate, AppError> {
        validate_amount(query.amount)?;
        let collection = self
            .least_exchange_rate(&query.as_exchange_rate_query())
            .await?;
        ConversionRate::convert(&collection, &query.target_currency, query.amount)
            .map_err(Into::into)
    }
}

fn validate_amount(amount: f64) -> Result<(), AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::BadRequest("amount must be a positive number".into()));
    }
    Ok(())
}

fn decode_page_token(token: Option<&str>) -> Result<Option<PageKey>, AppError> {
    token
        .map(PageKey::from_token)
        .transpose()
        .map_err(Into::into)
}
