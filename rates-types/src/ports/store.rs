//! Storage port: a range-queryable key-value store of daily rate rows.
//!
//! Hash key = base currency, range key = date, item value = currency→rate
//! map. Adapters (SQLite, in-memory) implement this trait; the service and
//! the importer depend only on it.

use std::collections::BTreeMap;

use crate::domain::cursor::PageKey;
use crate::domain::date::DateInt;
use crate::error::RepoError;

/// One stored item: every rate for one (base currency, date) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    pub base_currency: String,
    pub date: DateInt,
    pub rates: BTreeMap<String, f64>,
}

/// One page of query results. `last_evaluated_key` is present iff more
/// matching rows exist beyond this page.
#[derive(Debug, Clone, Default)]
pub struct RatePage {
    pub rows: Vec<RateRow>,
    pub last_evaluated_key: Option<PageKey>,
}

/// The rate store port.
#[async_trait::async_trait]
pub trait RateStore: Send + Sync + 'static {
    /// Rows for `base` with date in `[start, end]`, both endpoints
    /// inclusive, resuming strictly after `exclusive_start` when given.
    async fn query_range(
        &self,
        base: &str,
        start: DateInt,
        end: DateInt,
        exclusive_start: Option<PageKey>,
    ) -> Result<RatePage, RepoError>;

    /// All rows for exactly one date (at most one per base currency).
    async fn query_date(&self, base: &str, date: DateInt) -> Result<RatePage, RepoError>;

    /// Most recent imported date for `base`: a descending, limit-1 scan.
    async fn latest_date(&self, base: &str) -> Result<Option<DateInt>, RepoError>;

    /// Upserts a batch of rows keyed by (base currency, date). Items the
    /// store could not process are RETURNED rather than errored; batch
    /// writes are not atomic across items and the caller owns the retry
    /// policy.
    async fn batch_put(&self, rows: Vec<RateRow>) -> Result<Vec<RateRow>, RepoError>;
}
