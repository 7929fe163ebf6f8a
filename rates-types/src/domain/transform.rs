//! Pure transforms between store rows, provider snapshots, and
//! collections. No I/O happens here; the repository adapters and the
//! importer drive these from either side of the store boundary.

use std::collections::BTreeMap;

use crate::domain::collection::{RateCollection, RateCollectionBuilder};
use crate::domain::cursor::PageKey;
use crate::domain::date::DateInt;
use crate::error::DomainError;
use crate::ports::{RatePage, RateRow, RateSnapshot};

/// Assembles one page of store rows into a queryable collection,
/// encoding the continuation key into the collection's page token.
///
/// Returns `None` for an empty page: a query that matched nothing is a
/// not-found condition, never an empty success.
pub fn collection_from_page(page: RatePage) -> Option<RateCollection> {
    let first = page.rows.first()?;
    let mut builder = RateCollectionBuilder::new(&first.base_currency);
    for row in &page.rows {
        for (currency, rate) in &row.rates {
            builder.add_record(row.date, currency, *rate);
        }
    }
    let token = page.last_evaluated_key.as_ref().map(PageKey::to_token);
    Some(builder.build().with_page_token(token))
}

/// Fans one provider snapshot out into one collection per currency, each
/// treating that currency as the base with every other currency's rate
/// derived as `other / this`.
///
/// Importing N currencies therefore produces N base snapshots of N-1
/// cross-rates each, so any currency can later be queried as a base
/// without read-time derivation. The provider's origin currency is
/// registered at rate 1.0 when the payload omits it, which is what makes
/// the origin appear as `1/rate` under every derived base. Rates that are
/// not strictly positive and finite are dropped up front; one such rate
/// would poison a full column of cross-rates.
pub fn fan_out_snapshot(date: DateInt, snapshot: &RateSnapshot) -> Vec<RateCollection> {
    let mut rates: BTreeMap<&str, f64> = snapshot
        .rates
        .iter()
        .filter(|(_, rate)| rate.is_finite() && **rate > 0.0)
        .map(|(currency, rate)| (currency.as_str(), *rate))
        .collect();
    rates.entry(snapshot.base.as_str()).or_insert(1.0);

    rates
        .iter()
        .map(|(&base, &base_rate)| {
            let mut builder = RateCollectionBuilder::for_single_date(base, date);
            for (&currency, &rate) in &rates {
                if currency == base {
                    continue;
                }
                builder.add_record_for_single_date(currency, rate / base_rate);
            }
            builder.build()
        })
        .collect()
}

/// Maps one single-date, single-base collection to the store's put-item
/// shape, the inverse of what [`collection_from_page`] reads back.
pub fn row_from_collection(collection: &RateCollection) -> Result<RateRow, DomainError> {
    let date = collection.min_date();
    let mut rates = BTreeMap::new();
    for currency in collection.all_currencies() {
        rates.insert(
            currency.clone(),
            collection.rate_for_date(date, currency)?,
        );
    }
    Ok(RateRow {
        base_currency: collection.base_currency().to_string(),
        date,
        rates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: u32) -> DateInt {
        DateInt::new(value).unwrap()
    }

    fn snapshot(base: &str, rates: &[(&str, f64)]) -> RateSnapshot {
        RateSnapshot {
            base: base.to_string(),
            timestamp: 1_672_531_200,
            rates: rates
                .iter()
                .map(|(c, r)| (c.to_string(), *r))
                .collect(),
        }
    }

    #[test]
    fn test_assembles_collection_from_page() {
        let page = RatePage {
            rows: vec![
                RateRow {
                    base_currency: "USD".into(),
                    date: date(20230101),
                    rates: [("HKD".to_string(), 7.8), ("EUR".to_string(), 0.93)]
                        .into_iter()
                        .collect(),
                },
                RateRow {
                    base_currency: "USD".into(),
                    date: date(20230102),
                    rates: [("HKD".to_string(), 7.81)].into_iter().collect(),
                },
            ],
            last_evaluated_key: Some(PageKey::new("USD", date(20230102))),
        };

        let collection = collection_from_page(page).unwrap();
        assert_eq!(collection.base_currency(), "USD");
        assert_eq!(collection.all_dates(), &[date(20230101), date(20230102)]);
        assert_eq!(collection.rate_for_date(date(20230101), "EUR").unwrap(), 0.93);
        let token = collection.next_page_token().unwrap();
        assert_eq!(
            PageKey::from_token(token).unwrap(),
            PageKey::new("USD", date(20230102))
        );
    }

    #[test]
    fn test_empty_page_is_none() {
        assert!(collection_from_page(RatePage::default()).is_none());
    }

    #[test]
    fn test_fan_out_derives_cross_rates() {
        let snapshot = snapshot("USD", &[("HKD", 8.0), ("EUR", 0.5)]);
        let collections = fan_out_snapshot(date(20230101), &snapshot);

        // EUR, HKD, USD — one base snapshot per currency incl. the origin.
        assert_eq!(collections.len(), 3);

        let by_base = |base: &str| {
            collections
                .iter()
                .find(|c| c.base_currency() == base)
                .unwrap()
        };

        let hkd = by_base("HKD");
        assert_eq!(hkd.rate_for_date(date(20230101), "EUR").unwrap(), 0.5 / 8.0);
        assert_eq!(hkd.rate_for_date(date(20230101), "USD").unwrap(), 1.0 / 8.0);

        let eur = by_base("EUR");
        assert_eq!(eur.rate_for_date(date(20230101), "HKD").unwrap(), 8.0 / 0.5);
        assert_eq!(eur.rate_for_date(date(20230101), "USD").unwrap(), 1.0 / 0.5);

        // Cross-check: rate(A->B) * rate(B->A) == 1.
        let forward = hkd.rate_for_date(date(20230101), "EUR").unwrap();
        let backward = eur.rate_for_date(date(20230101), "HKD").unwrap();
        assert!((forward * backward - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fan_out_each_base_excludes_itself() {
        let snapshot = snapshot("USD", &[("USD", 1.0), ("HKD", 8.0)]);
        let collections = fan_out_snapshot(date(20230101), &snapshot);

        for collection in &collections {
            assert!(
                !collection
                    .all_currencies()
                    .iter()
                    .any(|c| c == collection.base_currency())
            );
            assert_eq!(collection.all_currencies().len(), 1);
        }
    }

    #[test]
    fn test_fan_out_drops_unusable_rates() {
        let snapshot = snapshot("USD", &[("HKD", 8.0), ("BAD", 0.0), ("WORSE", f64::NAN)]);
        let collections = fan_out_snapshot(date(20230101), &snapshot);

        assert_eq!(collections.len(), 2);
        assert!(collections.iter().all(|c| c.base_currency() != "BAD"));
        let usd = collections
            .iter()
            .find(|c| c.base_currency() == "USD")
            .unwrap();
        assert_eq!(usd.all_currencies(), &["HKD"]);
    }

    #[test]
    fn test_row_from_collection_inverts_the_read_path() {
        let mut builder = RateCollectionBuilder::for_single_date("HKD", date(20230101));
        builder.add_record_for_single_date("USD", 0.128);
        builder.add_record_for_single_date("EUR", 0.119);
        let row = row_from_collection(&builder.build()).unwrap();

        assert_eq!(row.base_currency, "HKD");
        assert_eq!(row.date, date(20230101));
        assert_eq!(row.rates["USD"], 0.128);
        assert_eq!(row.rates["EUR"], 0.119);
    }
}
