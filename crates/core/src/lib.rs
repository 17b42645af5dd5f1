//! FlipLedger Core - catalog, market data cache, sync orchestration and pricing.
//!
//! This crate is database-agnostic and defines the storage traits that are
//! implemented by the `storage-sqlite` crate. Marketplace access goes through
//! `flipledger-market-data`.

pub mod catalog;
pub mod constants;
pub mod errors;
pub mod market_data;
pub mod pricing;
pub mod sync;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
