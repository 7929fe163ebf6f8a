//! In-memory store adapter.
//!
//! Used by the test suites and for local development. Mirrors the paging
//! and batch-write reporting semantics of the real store, including a
//! hook to simulate a partially processed batch.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use rates_types::{DateInt, DomainError, PageKey, RatePage, RateRow, RateStore, RepoError};

const DEFAULT_PAGE_LIMIT: usize = 1000;

/// In-memory store implementation.
pub struct MemoryStore {
    items: Mutex<BTreeMap<(String, DateInt), BTreeMap<String, f64>>>,
    unprocessed_quota: Mutex<usize>,
    put_batch_sizes: Mutex<Vec<usize>>,
    page_limit: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            unprocessed_quota: Mutex::new(0),
            put_batch_sizes: Mutex::new(Vec::new()),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Caps the number of rows per query page.
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    /// The next `batch_put` call will report its last `count` rows as
    /// unprocessed (and not store them); subsequent calls behave
    /// normally again.
    pub fn report_unprocessed_once(&self, count: usize) {
        if let Ok(mut quota) = self.unprocessed_quota.lock() {
            *quota = count;
        }
    }

    /// Sizes of every batch handed to `batch_put`, in call order.
    pub fn put_batch_sizes(&self) -> Vec<usize> {
        self.put_batch_sizes
            .lock()
            .map(|sizes| sizes.clone())
            .unwrap_or_default()
    }

    /// Number of stored (base currency, date) rows.
    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_items(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<(String, DateInt), BTreeMap<String, f64>>>, RepoError>
    {
        self.items
            .lock()
            .map_err(|_| RepoError::Storage("store mutex poisoned".into()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateStore for MemoryStore {
    async fn query_range(
        &self,
        base: &str,
        start: DateInt,
        end: DateInt,
        exclusive_start: Option<PageKey>,
    ) -> Result<RatePage, RepoError> {
        if let Some(key) = &exclusive_start {
            if key.base_currency != base {
                return Err(RepoError::Domain(DomainError::BadPageToken));
            }
        }
        let after = exclusive_start.map(|k| k.date);
        if start > end {
            return Ok(RatePage::default());
        }

        let items = self.lock_items()?;
        let mut rows: Vec<RateRow> = items
            .range((base.to_string(), start)..=(base.to_string(), end))
            .filter(|((_, date), _)| after.is_none_or(|a| *date > a))
            .take(self.page_limit + 1)
            .map(|((base_currency, date), rates)| RateRow {
                base_currency: base_currency.clone(),
                date: *date,
                rates: rates.clone(),
            })
            .collect();

        let mut last_evaluated_key = None;
        if rows.len() > self.page_limit {
            rows.truncate(self.page_limit);
            if let Some(last) = rows.last() {
                last_evaluated_key = Some(PageKey::new(&last.base_currency, last.date));
            }
        }

        Ok(RatePage {
            rows,
            last_evaluated_key,
        })
    }

    async fn query_date(&self, base: &str, date: DateInt) -> Result<RatePage, RepoError> {
        let items = self.lock_items()?;
        let rows = items
            .get(&(base.to_string(), date))
            .map(|rates| RateRow {
                base_currency: base.to_string(),
                date,
                rates: rates.clone(),
            })
            .into_iter()
            .collect();

        Ok(RatePage {
            rows,
            last_evaluated_key: None,
        })
    }

    async fn latest_date(&self, base: &str) -> Result<Option<DateInt>, RepoError> {
        let items = self.lock_items()?;
        Ok(items
            .range((base.to_string(), DateInt::UNIX_EPOCH)..=(base.to_string(), DateInt::MAX))
            .next_back()
            .map(|((_, date), _)| *date))
    }

    async fn batch_put(&self, mut rows: Vec<RateRow>) -> Result<Vec<RateRow>, RepoError> {
        if let Ok(mut sizes) = self.put_batch_sizes.lock() {
            sizes.push(rows.len());
        }
        let quota = {
            let mut quota = self
                .unprocessed_quota
                .lock()
                .map_err(|_| RepoError::Storage("store mutex poisoned".into()))?;
            std::mem::take(&mut *quota)
        };

        let unprocessed = if quota > 0 && quota <= rows.len() {
            rows.split_off(rows.len() - quota)
        } else {
            Vec::new()
        };

        let mut items = self.lock_items()?;
        for row in rows {
            items.insert((row.base_currency, row.date), row.rates);
        }

        Ok(unprocessed)
    }
}
