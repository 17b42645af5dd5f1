//! flipledger market data crate
//!
//! Talks to the resale marketplaces (StockX and Alias) and hands back
//! normalized catalog and market data.
//!
//! # Overview
//!
//! - Price normalization: every marketplace price becomes a two-decimal
//!   major-unit [`Decimal`](rust_decimal::Decimal), whatever the wire format
//! - Rate-limited fetching: one fixed-spacing schedule per marketplace account,
//!   bounded concurrency within a batch
//! - Failure classification: rate limited, not found, or transient
//!
//! # Architecture
//!
//! ```text
//! +---------------------+
//! | MarketplaceProvider |  (StockX, Alias)
//! +---------------------+
//!            |
//!            v
//! +---------------------+     +-------------+
//! |     HttpFetcher     | --> | RateLimiter |  (per account spacing)
//! +---------------------+     +-------------+
//!            |
//!            v
//! +---------------------+
//! |   normalize_price   |  (RawPrice -> Decimal)
//! +---------------------+
//!            |
//!            v
//! +---------------------+
//! |     MarketQuote     |
//! +---------------------+
//! ```

pub mod constants;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod normalizer;
pub mod provider;

pub use errors::{FailureClass, MarketDataError};

pub use models::{
    CatalogId, CatalogMatch, Currency, MarketQuote, Marketplace, PriceUnit, ProductDetails,
    RawPrice, VariantInfo,
};

pub use normalizer::{normalize_price, round_price, NormalizedPrice};

pub use fetcher::{
    run_staggered, CredentialProvider, HttpFetcher, RateLimiter, StaticCredentials,
};

pub use provider::alias::AliasProvider;
pub use provider::stockx::StockXProvider;
pub use provider::{MarketplaceProvider, ProviderCapabilities, RateLimit};
