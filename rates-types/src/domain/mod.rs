//! Domain models for the exchange rate service.

pub mod collection;
pub mod cursor;
pub mod date;
pub mod transform;

pub use collection::{ConversionRate, RateCollection, RateCollectionBuilder, RateRecord};
pub use cursor::PageKey;
pub use date::DateInt;
