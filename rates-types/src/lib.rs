//! # Rates Types
//!
//! Domain types and port traits for the currency exchange rate service.
//! This crate has no I/O of its own - only data structures, business
//! rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate is the innermost core of the hexagonal architecture:
//! - `domain/` - Pure domain types (DateInt, RateCollection, PageKey) and
//!   the transforms between store rows, provider snapshots, and
//!   collections
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Request descriptors and response DTOs for API boundaries
//! - `error/` - Domain, repository, and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::transform::{collection_from_page, fan_out_snapshot, row_from_collection};
pub use domain::{
    ConversionRate, DateInt, PageKey, RateCollection, RateCollectionBuilder, RateRecord,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{ProviderError, RatePage, RateProvider, RateRow, RateSnapshot, RateStore};
