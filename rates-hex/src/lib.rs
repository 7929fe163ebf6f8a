//! # Rates Hex
//!
//! Application service layer, import orchestration, and HTTP adapter for
//! the exchange rate service.
//!
//! ## Architecture
//!
//! - `service` - Application service (query orchestration and validation)
//! - `import` - Import orchestrator (provider fetch, fan-out, batched writes)
//! - `inbound` - HTTP adapter (Axum REST routes and the GraphQL schema)
//!
//! The service and importer are generic over the store and provider
//! ports, so adapters are injected at compile time.

pub mod import;
pub mod inbound;
pub mod openapi;
pub mod service;


pub use import::{ImportError, Importer, RangeSummary};
pub use service::RateService;
