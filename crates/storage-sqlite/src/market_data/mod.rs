mod model;
mod repository;

pub use model::{MarketSnapshotDB, PriceHistoryDB};
pub use repository::MarketCacheRepository;
