//! Marketplace provider abstractions and implementations.
//!
//! - The `MarketplaceProvider` trait that both marketplaces implement
//! - Provider capabilities and rate limiting configuration
//! - Concrete providers: StockX (decimal-string prices) and Alias (cent prices)

mod capabilities;
mod traits;

pub mod alias;
pub mod stockx;

pub use capabilities::{ProviderCapabilities, RateLimit};
pub use traits::MarketplaceProvider;
