//! Outbound port for the third-party exchange-rate provider.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

/// Error type for provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Request(String),

    #[error("Provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Provider payload malformed: {0}")]
    Payload(String),
}

/// One day of published rates, all relative to one unit of `base`.
#[derive(Debug, Clone, Deserialize)]
pub struct RateSnapshot {
    pub base: String,
    #[serde(default)]
    pub timestamp: i64,
    pub rates: BTreeMap<String, f64>,
}

/// Port trait for historical rate providers.
#[async_trait::async_trait]
pub trait RateProvider: Send + Sync {
    /// The published rates for one calendar day.
    async fn historical_rates(&self, date: NaiveDate) -> Result<RateSnapshot, ProviderError>;
}
