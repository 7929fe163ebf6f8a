//! SQLite store adapter.
//!
//! Emulates the range-keyed item store on a single table: hash key =
//! `base_currency`, range key = `rate_date`, value = JSON rates map.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use rates_types::{DateInt, DomainError, PageKey, RatePage, RateRow, RateStore, RepoError};

/// Rows returned per query page unless overridden. Test mode drops this
/// to 1 to force pagination through a tiny result set.
pub const DEFAULT_PAGE_LIMIT: usize = 1000;

/// SQLite store implementation.
pub struct SqliteStore {
    pool: SqlitePool,
    page_limit: usize,
}

impl SqliteStore {
    /// Connects and runs the schema migration.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // An in-memory SQLite database exists per connection; a larger
        // pool would hand out empty databases.
        let mut pool_options = SqlitePoolOptions::new();
        if database_url.contains(":memory:") {
            pool_options = pool_options.max_connections(1);
        }
        let pool = pool_options.connect_with(options).await?;

        let ddl = include_str!("../migrations/0001_create_exchange_rates.sql");
        sqlx::query(ddl).execute(&pool).await?;

        Ok(Self {
            pool,
            page_limit: DEFAULT_PAGE_LIMIT,
        })
    }

    /// Caps the number of rows per query page.
    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit.max(1);
        self
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Exchange rate row from the database.
#[derive(sqlx::FromRow)]
struct DbRateRow {
    base_currency: String,
    rate_date: i64,
    rates: String,
}

impl DbRateRow {
    fn into_row(self) -> Result<RateRow, RepoError> {
        let rates = serde_json::from_str(&self.rates)
            .map_err(|e| RepoError::Storage(format!("corrupt rates payload: {}", e)))?;
        let date = DateInt::new(self.rate_date as u32).map_err(RepoError::Domain)?;
        Ok(RateRow {
            base_currency: self.base_currency,
            date,
            rates,
        })
    }
}

#[async_trait]
impl RateStore for SqliteStore {
    async fn query_range(
        &self,
        base: &str,
        start: DateInt,
        end: DateInt,
        exclusive_start: Option<PageKey>,
    ) -> Result<RatePage, RepoError> {
        // A continuation key minted for another base currency is a caller
        // mistake, not a different page.
        if let Some(key) = &exclusive_start {
            if key.base_currency != base {
                return Err(RepoError::Domain(DomainError::BadPageToken));
            }
        }
        let after = exclusive_start.map(|k| k.date.value() as i64).unwrap_or(0);

        let db_rows: Vec<DbRateRow> = sqlx::query_as(
            r#"SELECT base_currency, rate_date, rates FROM exchange_rates
               WHERE base_currency = ? AND rate_date BETWEEN ? AND ? AND rate_date > ?
               ORDER BY rate_date ASC LIMIT ?"#,
        )
        .bind(base)
        .bind(start.value() as i64)
        .bind(end.value() as i64)
        .bind(after)
        .bind((self.page_limit + 1) as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Storage(e.to_string()))?;

        let mut rows = db_rows
            .into_iter()
            .map(DbRateRow::into_row)
            .collect::<Result<Vec<_>, _>>()?;

        // Fetching one row past the limit tells us whether a next page
        // exists without a second query.
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
        let db_rows: Vec<DbRateRow> = sqlx::query_as(
            r#"SELECT base_currency, rate_date, rates FROM exchange_rates
               WHERE base_currency = ? AND rate_date = ?"#,
        )
        .bind(base)
        .bind(date.value() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::Storage(e.to_string()))?;

        let rows = db_rows
            .into_iter()
            .map(DbRateRow::into_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RatePage {
            rows,
            last_evaluated_key: None,
        })
    }

    async fn latest_date(&self, base: &str) -> Result<Option<DateInt>, RepoError> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"SELECT rate_date FROM exchange_rates
               WHERE base_currency = ? ORDER BY rate_date DESC LIMIT 1"#,
        )
        .bind(base)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepoError::Storage(e.to_string()))?;

        row.map(|(date,)| DateInt::new(date as u32).map_err(RepoError::Domain))
            .transpose()
    }

    async fn batch_put(&self, rows: Vec<RateRow>) -> Result<Vec<RateRow>, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Storage(e.to_string()))?;

        for row in &rows {
            let rates = serde_json::to_string(&row.rates)
                .map_err(|e| RepoError::Storage(e.to_string()))?;
            sqlx::query(
                r#"INSERT INTO exchange_rates (base_currency, rate_date, rates)
                   VALUES (?, ?, ?)
                   ON CONFLICT (base_currency, rate_date) DO UPDATE SET rates = excluded.rates"#,
            )
            .bind(&row.base_currency)
            .bind(row.date.value() as i64)
            .bind(rates)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::Storage(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::Storage(e.to_string()))?;

        // The transaction is all-or-nothing; nothing is ever left
        // unprocessed.
        Ok(Vec::new())
    }
}
