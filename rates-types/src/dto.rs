//! Request descriptors and response DTOs for the API boundary.
//!
//! Request descriptors are transient builder-style values: constructed
//! per inbound call, consumed by the service, and discarded.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DateInt;

// ─────────────────────────────────────────────────────────────────────────────
// Request descriptors
// ─────────────────────────────────────────────────────────────────────────────

/// Descriptor for one exchange-rate lookup.
#[derive(Debug, Clone)]
pub struct ExchangeRateQuery {
    pub base_currency: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page_token: Option<String>,
}

impl ExchangeRateQuery {
    pub fn base_on(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: base_currency.into(),
            start_date: None,
            end_date: None,
            page_token: None,
        }
    }

    pub fn start_from(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn end_of(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn with_page_token(mut self, token: Option<String>) -> Self {
        self.page_token = token;
        self
    }
}

/// Descriptor for a conversion lookup. `amount` defaults to 1, so the
/// result is the plain per-unit rate unless the caller asks otherwise.
#[derive(Debug, Clone)]
pub struct ConversionQuery {
    pub base_currency: String,
    pub target_currency: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub amount: f64,
    pub page_token: Option<String>,
}

impl ConversionQuery {
    pub fn convert_from(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: base_currency.into(),
            target_currency: String::new(),
            start_date: None,
            end_date: None,
            amount: 1.0,
            page_token: None,
        }
    }

    pub fn target(mut self, currency: impl Into<String>) -> Self {
        self.target_currency = currency.into();
        self
    }

    pub fn start_from(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn end_of(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_page_token(mut self, token: Option<String>) -> Self {
        self.page_token = token;
        self
    }

    /// The underlying exchange-rate lookup this conversion is derived
    /// from.
    pub fn as_exchange_rate_query(&self) -> ExchangeRateQuery {
        ExchangeRateQuery {
            base_currency: self.base_currency.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            page_token: self.page_token.clone(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Payload of the exchange endpoints: `rates` is the nested
/// date→currency→rate map.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRateResponse {
    /// Base currency the rates are relative to
    #[schema(example = "USD")]
    pub base: String,
    /// First date covered by this response (YYYYMMDD)
    #[schema(value_type = u32, example = 20230101)]
    pub from: DateInt,
    /// Last date covered by this response (YYYYMMDD)
    #[schema(value_type = u32, example = 20230110)]
    pub to: DateInt,
    /// Daily rates: date → currency → rate
    #[schema(value_type = Object)]
    pub rates: BTreeMap<DateInt, BTreeMap<String, f64>>,
    /// Present iff more matching rows exist beyond this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Payload of the convert endpoints: `rates` is the flat date→rate map
/// for the single target currency.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversionRateResponse {
    /// Base currency of the conversion
    #[schema(example = "USD")]
    pub base: String,
    /// Currency the base amount was converted into
    #[serde(rename = "targetCurrency")]
    #[schema(example = "HKD")]
    pub target_currency: String,
    /// Amount of base currency that was converted
    #[serde(rename = "baseAmount")]
    #[schema(example = 250.0)]
    pub base_amount: f64,
    /// First date covered by this response (YYYYMMDD)
    #[schema(value_type = u32, example = 20230101)]
    pub from: DateInt,
    /// Last date covered by this response (YYYYMMDD)
    #[schema(value_type = u32, example = 20230110)]
    pub to: DateInt,
    /// Daily converted amounts: date → rate * baseAmount
    #[schema(value_type = Object)]
    pub rates: BTreeMap<DateInt, f64>,
    /// Present iff more matching rows exist beyond this page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_amount_defaults_to_one() {
        let query = ConversionQuery::convert_from("USD").target("HKD");
        assert_eq!(query.amount, 1.0);
    }

    #[test]
    fn test_conversion_reduces_to_exchange_query() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 1, 10).unwrap();
        let query = ConversionQuery::convert_from("USD")
            .target("HKD")
            .start_from(start)
            .end_of(end)
            .with_amount(250.0)
            .with_page_token(Some("token".into()));

        let exchange = query.as_exchange_rate_query();
        assert_eq!(exchange.base_currency, "USD");
        assert_eq!(exchange.start_date, Some(start));
        assert_eq!(exchange.end_date, Some(end));
        assert_eq!(exchange.page_token.as_deref(), Some("token"));
    }
}
