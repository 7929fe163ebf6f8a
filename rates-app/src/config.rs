//! Configuration loading from environment.

use std::env;

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Rows per query page; lowered to 1 in test deployments to force
    /// pagination through tiny result sets.
    pub page_limit: Option<usize>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let page_limit = match env::var("PAGE_LIMIT") {
            Ok(raw) => Some(raw.parse()?),
            Err(_) => None,
        };

        Ok(Self {
            port,
            database_url,
            page_limit,
        })
    }
}
