//! Market data cache - latest snapshots and the daily price history ledger.

mod market_data_model;
mod market_data_traits;

pub use market_data_model::{MarketSnapshot, PriceHistoryEntry};
pub use market_data_traits::MarketCacheStore;
