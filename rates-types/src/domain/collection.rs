//! The queryable exchange-rate snapshot, its builder, and the
//! single-currency conversion view.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::date::DateInt;
use crate::error::DomainError;

/// One (date, currency, rate) triple. `rate` is units of `currency` per
/// one unit of the owning collection's base currency.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRecord {
    pub date: DateInt,
    pub currency: String,
    pub rate: f64,
}

/// Mutable accumulator for rate triples, consumed exactly once by
/// [`RateCollectionBuilder::build`].
///
/// No deduplication is performed: adding the same (date, currency) twice
/// keeps both triples, and lookups resolve the tie as first match in
/// insertion order.
#[derive(Debug)]
pub struct RateCollectionBuilder {
    base_currency: String,
    min_date: DateInt,
    max_date: DateInt,
    all_dates: BTreeSet<DateInt>,
    all_currencies: BTreeSet<String>,
    records: Vec<RateRecord>,
}

impl RateCollectionBuilder {
    /// `min_date` starts at today and only ever decreases; `max_date`
    /// starts at the Unix epoch and only ever increases.
    pub fn new(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: base_currency.into(),
            min_date: DateInt::today(),
            max_date: DateInt::UNIX_EPOCH,
            all_dates: BTreeSet::new(),
            all_currencies: BTreeSet::new(),
            records: Vec::new(),
        }
    }

    /// Import-path constructor: pre-registers the one snapshot date so
    /// that [`Self::add_record_for_single_date`] can be used.
    pub fn for_single_date(base_currency: impl Into<String>, date: DateInt) -> Self {
        let mut builder = Self::new(base_currency);
        builder.register_date(date);
        builder
    }

    pub fn add_record(&mut self, date: DateInt, currency: impl Into<String>, rate: f64) {
        let currency = currency.into();
        self.register_date(date);
        self.all_currencies.insert(currency.clone());
        self.records.push(RateRecord {
            date,
            currency,
            rate,
        });
    }

    /// Restricted variant for the single-day import transform: the record
    /// is only added while exactly one date is registered, guarding
    /// against cross-date contamination of a daily snapshot.
    pub fn add_record_for_single_date(&mut self, currency: impl Into<String>, rate: f64) {
        if self.all_dates.len() != 1 {
            return;
        }
        let Some(&date) = self.all_dates.first() else {
            return;
        };
        let currency = currency.into();
        self.all_currencies.insert(currency.clone());
        self.records.push(RateRecord {
            date,
            currency,
            rate,
        });
    }

    fn register_date(&mut self, date: DateInt) {
        self.min_date = self.min_date.min(date);
        self.max_date = self.max_date.max(date);
        self.all_dates.insert(date);
    }

    /// Materializes the immutable collection. Dates and currencies come
    /// out sorted ascending; pagination and serialization rely on that.
    pub fn build(self) -> RateCollection {
        RateCollection {
            base_currency: self.base_currency,
            all_dates: self.all_dates.into_iter().collect(),
            all_currencies: self.all_currencies.into_iter().collect(),
            records: self.records,
            min_date: self.min_date,
            max_date: self.max_date,
            next_page_token: None,
        }
    }
}

/// Immutable snapshot of exchange-rate rows for one base currency across
/// one or more dates.
///
/// [`Self::filter_by_currency`] and [`Self::multiply`] rebuild a fresh
/// collection through the builder instead of mutating in place; the same
/// collection may be referenced from several stages of one response
/// pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RateCollection {
    base_currency: String,
    all_dates: Vec<DateInt>,
    all_currencies: Vec<String>,
    records: Vec<RateRecord>,
    min_date: DateInt,
    max_date: DateInt,
    next_page_token: Option<String>,
}

impl RateCollection {
    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// All distinct dates, ascending.
    pub fn all_dates(&self) -> &[DateInt] {
        &self.all_dates
    }

    /// All distinct currencies, ascending.
    pub fn all_currencies(&self) -> &[String] {
        &self.all_currencies
    }

    pub fn records(&self) -> &[RateRecord] {
        &self.records
    }

    pub fn min_date(&self) -> DateInt {
        self.min_date
    }

    pub fn max_date(&self) -> DateInt {
        self.max_date
    }

    /// Present iff the backing query reported more matching rows beyond
    /// this page.
    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }

    pub fn with_page_token(mut self, token: Option<String>) -> Self {
        self.next_page_token = token;
        self
    }

    /// Linear scan over the triples; the first record matching both
    /// fields wins when duplicates were added. A missing rate is a data
    /// integrity problem, never a legitimate zero.
    pub fn rate_for_date(&self, date: DateInt, currency: &str) -> Result<f64, DomainError> {
        self.records
            .iter()
            .find(|r| r.date == date && r.currency == currency)
            .map(|r| r.rate)
            .ok_or(DomainError::NoResult)
    }

    /// New collection containing only the triples for `currency`,
    /// preserving the page token. Fails loudly when the currency was
    /// never part of this collection.
    pub fn filter_by_currency(&self, currency: &str) -> Result<RateCollection, DomainError> {
        if !self.all_currencies.iter().any(|c| c == currency) {
            return Err(DomainError::CurrencyNotFound(currency.to_string()));
        }
        let mut builder = RateCollectionBuilder::new(&self.base_currency);
        for record in self.records.iter().filter(|r| r.currency == currency) {
            builder.add_record(record.date, &record.currency, record.rate);
        }
        Ok(builder.build().with_page_token(self.next_page_token.clone()))
    }

    /// New collection with every rate scaled by `value`.
    pub fn multiply(&self, value: f64) -> RateCollection {
        let mut builder = RateCollectionBuilder::new(&self.base_currency);
        for record in &self.records {
            builder.add_record(record.date, &record.currency, record.rate * value);
        }
        builder.build().with_page_token(self.next_page_token.clone())
    }

    /// Nested view: one entry per date containing every currency seen
    /// that day. First insertion wins on duplicates.
    pub fn serialize(&self) -> BTreeMap<DateInt, BTreeMap<String, f64>> {
        let mut result: BTreeMap<DateInt, BTreeMap<String, f64>> = BTreeMap::new();
        for record in &self.records {
            result
                .entry(record.date)
                .or_default()
                .entry(record.currency.clone())
                .or_insert(record.rate);
        }
        result
    }

    /// Flat view for exactly one currency across all dates.
    pub fn serialize_by_currency(&self, currency: &str) -> BTreeMap<DateInt, f64> {
        let mut result = BTreeMap::new();
        for record in self.records.iter().filter(|r| r.currency == currency) {
            result.entry(record.date).or_insert(record.rate);
        }
        result
    }
}

/// Single-target-currency view over a [`RateCollection`], carrying the
/// source collection's date range and page token.
#[derive(Debug, Clone)]
pub struct ConversionRate {
    collection: RateCollection,
    min_date: DateInt,
    max_date: DateInt,
    next_page_token: Option<String>,
}

impl ConversionRate {
    /// Filters `collection` down to `target_currency`, then scales every
    /// rate by `amount`. Filtering first keeps the multiply pass from
    /// touching rates that would never be returned.
    pub fn convert(
        collection: &RateCollection,
        target_currency: &str,
        amount: f64,
    ) -> Result<Self, DomainError> {
        let filtered = collection.filter_by_currency(target_currency)?.multiply(amount);
        Ok(Self::new(filtered))
    }

    pub fn new(collection: RateCollection) -> Self {
        let min_date = collection.min_date();
        let max_date = collection.max_date();
        let next_page_token = collection.next_page_token.clone();
        Self {
            collection,
            min_date,
            max_date,
            next_page_token,
        }
    }

    pub fn collection(&self) -> &RateCollection {
        &self.collection
    }

    pub fn min_date(&self) -> DateInt {
        self.min_date
    }

    pub fn max_date(&self) -> DateInt {
        self.max_date
    }

    pub fn next_page_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }

    /// Flat date→rate map for the wrapped currency.
    pub fn serialize(&self) -> BTreeMap<DateInt, f64> {
        match self.collection.all_currencies().last() {
            Some(currency) => self.collection.serialize_by_currency(currency),
            None => BTreeMap::new(),
        }
    }
}
