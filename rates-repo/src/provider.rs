//! HTTP client for the openexchangerates.org historical API.

use async_trait::async_trait;
use chrono::NaiveDate;

use rates_types::{ProviderError, RateProvider, RateSnapshot};

const DEFAULT_BASE_URL: &str = "https://openexchangerates.org";

/// Client for `GET /api/historical/<YYYY-MM-DD>.json?app_id=<key>`.
pub struct OpenExchangeRates {
    client: reqwest::Client,
    base_url: String,
    app_id: String,
}

impl OpenExchangeRates {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            app_id: app_id.into(),
        }
    }

    /// Points the client at a different host (a stub server in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl RateProvider for OpenExchangeRates {
    async fn historical_rates(&self, date: NaiveDate) -> Result<RateSnapshot, ProviderError> {
        let url = format!(
            "{}/api/historical/{}.json",
            self.base_url,
            date.format("%Y-%m-%d")
        );

        let response = self
            .client
            .get(&url)
            .query(&[("app_id", self.app_id.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let snapshot = response
            .json::<RateSnapshot>()
            .await
            .map_err(|e| ProviderError::Payload(e.to_string()))?;
        tracing::info!(date = %date, base = %snapshot.base, currencies = snapshot.rates.len(),
            "fetched provider snapshot");
        Ok(snapshot)
    }
}
