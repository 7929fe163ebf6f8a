//! Import orchestration: fetch one day of provider rates, fan them out
//! into per-base-currency rows, and write them to the store in
//! capacity-bounded batches.

use chrono::NaiveDate;

use rates_types::{
    DateInt, ProviderError, RateProvider, RateRow, RateStore, RepoError, fan_out_snapshot,
    row_from_collection,
};

/// Store batch-write capacity: items per `batch_put` call.
pub const WRITE_BATCH_LIMIT: usize = 25;

/// Attempts per batch before giving up on persistently unprocessed items.
pub const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Errors from an import run.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("Every day in {start}..{end} failed to import")]
    AllDaysFailed { start: NaiveDate, end: NaiveDate },
}

/// Outcome of one day within a range import: rows written, or the error.
#[derive(Debug)]
pub struct DayOutcome {
    pub date: NaiveDate,
    pub result: Result<usize, ImportError>,
}

/// Per-day outcomes of a range import, reported individually so a single
/// bad day is visible without failing the run.
#[derive(Debug)]
pub struct RangeSummary {
    pub days: Vec<DayOutcome>,
}

impl RangeSummary {
    pub fn imported(&self) -> usize {
        self.days.iter().filter(|d| d.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.days.len() - self.imported()
    }
}

/// Drives daily and bulk imports: FETCH -> TRANSFORM -> WRITE, with the
/// write stage chunked and retried on partially processed batches.
pub struct Importer<S: RateStore, P: RateProvider> {
    store: S,
    provider: P,
    batch_limit: usize,
    max_write_attempts: u32,
}

impl<S: RateStore, P: RateProvider> Importer<S, P> {
    pub fn new(store: S, provider: P) -> Self {
        Self {
            store,
            provider,
            batch_limit: WRITE_BATCH_LIMIT,
            max_write_attempts: MAX_WRITE_ATTEMPTS,
        }
    }

    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit.max(1);
        self
    }

    pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts.max(1);
        self
    }

    /// Imports one calendar day. Returns the number of rows written (one
    /// per currency present in the provider snapshot).
    pub async fn import_date(&self, date: NaiveDate) -> Result<usize, ImportError> {
        tracing::info!(%date, "importing provider rates");
        let snapshot = self.provider.historical_rates(date).await?;

        let collections = fan_out_snapshot(DateInt::from_date(date), &snapshot);
        let mut rows = Vec::with_capacity(collections.len());
        for collection in &collections {
            rows.push(row_from_collection(collection).map_err(RepoError::Domain)?);
        }

        let written = rows.len();
        self.write_rows(rows).await?;
        tracing::info!(%date, rows = written, "import finished");
        Ok(written)
    }

    /// Imports every day in `[start, end)`, strictly in series: day k
    /// begins only after day k-1's writes (including retries) completed.
    ///
    /// A failed day is logged and reported in the summary; the run only
    /// errors when every day failed.
    pub async fn import_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RangeSummary, ImportError> {
        tracing::info!(%start, %end, "importing date range");
        let mut days = Vec::new();
        let mut current = start;
        while current < end {
            let result = self.import_date(current).await;
            if let Err(err) = &result {
                tracing::error!(date = %current, error = %err, "day import failed");
            }
            days.push(DayOutcome {
                date: current,
                result,
            });
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }

        let summary = RangeSummary { days };
        if !summary.days.is_empty() && summary.imported() == 0 {
            return Err(ImportError::AllDaysFailed { start, end });
        }
        Ok(summary)
    }

    /// Splits `rows` into batches of at most `batch_limit` and writes
    /// them in series. Items the store reports as unprocessed are retried
    /// as a fresh batch until none remain or the attempt budget is spent.
    async fn write_rows(&self, rows: Vec<RateRow>) -> Result<(), RepoError> {
        let total = rows.len();
        let mut iter = rows.into_iter().peekable();
        while iter.peek().is_some() {
            let batch: Vec<RateRow> = iter.by_ref().take(self.batch_limit).collect();

            let mut pending = batch;
            let mut attempts = 0;
            while !pending.is_empty() {
                if attempts >= self.max_write_attempts {
                    return Err(RepoError::WriteExhausted {
                        attempts,
                        remaining: pending.len(),
                    });
                }
                attempts += 1;
                pending = self.store.batch_put(pending).await?;
                if !pending.is_empty() {
                    tracing::warn!(
                        remaining = pending.len(),
                        attempt = attempts,
                        "store left items unprocessed, retrying"
                    );
                }
            }
        }
        tracing::debug!(rows = total, "all batches written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rates_repo::MemoryStore;
    use rates_types::{ProviderError, RateProvider, RateSnapshot, RateStore, RepoError};

    use super::*;

    /// Scripted provider: one canned snapshot or error per date.
    struct ScriptedProvider {
        responses: Mutex<BTreeMap<NaiveDate, Result<RateSnapshot, String>>>,
    }

    impl ScriptedProvider {
        fn new() -> Self {
            Self {
                responses: Mutex::new(BTreeMap::new()),
            }
        }

        fn snapshot(self, date: NaiveDate, base: &str, rates: &[(&str, f64)]) -> Self {
            self.responses.lock().unwrap().insert(
                date,
                Ok(RateSnapshot {
                    base: base.to_string(),
                    timestamp: 0,
                    rates: rates.iter().map(|(c, r)| (c.to_string(), *r)).collect(),
                }),
            );
            self
        }

        fn failure(self, date: NaiveDate, message: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(date, Err(message.to_string()));
            self
        }
    }

    #[async_trait]
    impl RateProvider for ScriptedProvider {
        async fn historical_rates(&self, date: NaiveDate) -> Result<RateSnapshot, ProviderError> {
            match self.responses.lock().unwrap().get(&date) {
                Some(Ok(snapshot)) => Ok(snapshot.clone()),
                Some(Err(message)) => Err(ProviderError::Request(message.clone())),
                None => Err(ProviderError::Status {
                    status: 404,
                    body: format!("no rates for {}", date),
                }),
            }
        }
    }

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[tokio::test]
    async fn test_import_writes_one_row_per_currency() {
        let date = day(2023, 1, 1);
        let provider =
            ScriptedProvider::new().snapshot(date, "USD", &[("HKD", 8.0), ("EUR", 0.5)]);
        let importer = Importer::new(MemoryStore::new(), provider);

        let written = importer.import_date(date).await.unwrap();

        // EUR, HKD, USD: the origin fans out too.
        assert_eq!(written, 3);
        let store = importer.store;
        assert_eq!(store.len(), 3);

        let page = store
            .query_date("HKD", DateInt::from_date(date))
            .await
            .unwrap();
        assert_eq!(page.rows[0].rates["USD"], 1.0 / 8.0);
        assert_eq!(page.rows[0].rates["EUR"], 0.5 / 8.0);
    }

    #[tokio::test]
    async fn test_unprocessed_items_retry_as_one_fresh_batch() {
        // A 30-currency snapshot fans out into exactly 30 rows.
        let date = day(2023, 1, 1);
        let rates: Vec<(String, f64)> = (0..30).map(|i| (format!("C{:02}", i), 1.0 + i as f64)).collect();
        let rate_refs: Vec<(&str, f64)> = rates.iter().map(|(c, r)| (c.as_str(), *r)).collect();
        let provider = ScriptedProvider::new().snapshot(date, "C00", &rate_refs);
        let store = MemoryStore::new();
        store.report_unprocessed_once(5);

        let importer = Importer::new(store, provider);
        let written = importer.import_date(date).await.unwrap();
        assert_eq!(written, 30);

        let store = importer.store;
        assert_eq!(store.len(), 30);
        // Chunks of 25 and 5; the first chunk leaves 5 unprocessed and
        // they are retried as exactly one fresh batch of 5.
        assert_eq!(store.put_batch_sizes(), vec![25, 5, 5]);
    }

    #[tokio::test]
    async fn test_write_exhaustion_fails_after_bounded_attempts() {
        struct AlwaysUnprocessed;

        #[async_trait]
        impl RateStore for AlwaysUnprocessed {
            async fn query_range(
                &self,
                _base: &str,
                _start: DateInt,
                _end: DateInt,
                _exclusive_start: Option<rates_types::PageKey>,
            ) -> Result<rates_types::RatePage, RepoError> {
                Ok(rates_types::RatePage::default())
            }

            async fn query_date(
                &self,
                _base: &str,
                _date: DateInt,
            ) -> Result<rates_types::RatePage, RepoError> {
                Ok(rates_types::RatePage::default())
            }

            async fn latest_date(&self, _base: &str) -> Result<Option<DateInt>, RepoError> {
                Ok(None)
            }

            async fn batch_put(&self, rows: Vec<RateRow>) -> Result<Vec<RateRow>, RepoError> {
                Ok(rows)
            }
        }

        let date = day(2023, 1, 1);
        let provider = ScriptedProvider::new().snapshot(date, "USD", &[("HKD", 8.0)]);
        let importer = Importer::new(AlwaysUnprocessed, provider).with_max_write_attempts(3);

        let result = importer.import_date(date).await;
        assert!(matches!(
            result,
            Err(ImportError::Repo(RepoError::WriteExhausted {
                attempts: 3,
                remaining: 2,
            }))
        ));
    }

    #[tokio::test]
    async fn test_range_import_reports_partial_failures() {
        let provider = ScriptedProvider::new()
            .snapshot(day(2023, 1, 1), "USD", &[("HKD", 8.0)])
            .failure(day(2023, 1, 2), "provider down")
            .snapshot(day(2023, 1, 3), "USD", &[("HKD", 8.1)]);
        let importer = Importer::new(MemoryStore::new(), provider);

        // End date is exclusive: days 1 through 3 run, day 4 does not.
        let summary = importer
            .import_date_range(day(2023, 1, 1), day(2023, 1, 4))
            .await
            .unwrap();

        assert_eq!(summary.days.len(), 3);
        assert_eq!(summary.imported(), 2);
        assert_eq!(summary.failed(), 1);
        assert!(summary.days[1].result.is_err());
    }

    #[tokio::test]
    async fn test_range_import_fails_only_when_every_day_failed() {
        let provider = ScriptedProvider::new()
            .failure(day(2023, 1, 1), "provider down")
            .failure(day(2023, 1, 2), "provider down");
        let importer = Importer::new(MemoryStore::new(), provider);

        let result = importer
            .import_date_range(day(2023, 1, 1), day(2023, 1, 3))
            .await;

        assert!(matches!(result, Err(ImportError::AllDaysFailed { .. })));
    }
}
