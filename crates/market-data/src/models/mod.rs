//! Market data models
//!
//! - `types` - Marketplace identity and type aliases (Currency, CatalogId)
//! - `price` - Raw provider price representation (RawPrice, PriceUnit)
//! - `catalog` - Catalog search hits, product details and variants
//! - `quote` - Normalized per-variant market data (MarketQuote)

mod catalog;
mod price;
mod quote;
mod types;

pub use catalog::{CatalogMatch, ProductDetails, VariantInfo};
pub use price::{PriceUnit, RawPrice};
pub use quote::MarketQuote;
pub use types::{CatalogId, Currency, Marketplace};
