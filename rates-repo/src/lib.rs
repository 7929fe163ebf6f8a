//! # Rates Repo
//!
//! Outbound adapters for the exchange rate service: the SQL-backed range
//! store, an in-memory store for tests and local development, and the
//! HTTP client for the third-party rate provider.

#[cfg(not(any(feature = "sqlite", feature = "memory")))]
compile_error!("Enable a store feature: `sqlite` or `memory`.");

#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "sqlite")]
pub mod sqlite;


#[cfg(feature = "memory")]
pub use memory::MemoryStore;
pub use provider::OpenExchangeRates;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Build and initialize a store from a database URL.
///
/// Connects, runs the schema migration, and returns a ready-to-use
/// [`SqliteStore`].
#[cfg(feature = "sqlite")]
pub async fn build_store(database_url: &str) -> anyhow::Result<SqliteStore> {
    SqliteStore::connect(database_url).await
}
