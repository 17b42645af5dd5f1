use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::market_data_model::{MarketSnapshot, PriceHistoryEntry};
use crate::errors::Result;

/// The market data cache.
///
/// Each write targets a distinct key per (variant, currency), or per
/// (variant, currency, day) for history, so concurrent writers in one run
/// never contend on a row. Last writer wins.
#[async_trait]
pub trait MarketCacheStore: Send + Sync {
    /// The stored snapshot regardless of age.
    fn find_latest(&self, variant_key: &str, currency: &str) -> Result<Option<MarketSnapshot>>;

    /// The stored snapshot only if `now - updated_at < ttl`; a miss otherwise,
    /// even when the row exists.
    fn get_latest(
        &self,
        variant_key: &str,
        currency: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<Option<MarketSnapshot>> {
        Ok(self
            .find_latest(variant_key, currency)?
            .filter(|snapshot| snapshot.is_fresh(now, ttl)))
    }

    /// Every stored snapshot (all currencies) for the given variants.
    fn latest_for_variants(&self, variant_keys: &[String]) -> Result<Vec<MarketSnapshot>>;

    /// History rows for one (variant, currency) with `from <= day <= to`, oldest first.
    fn history_range(
        &self,
        variant_key: &str,
        currency: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceHistoryEntry>>;

    fn count_latest(&self) -> Result<usize>;

    fn count_history(&self) -> Result<usize>;

    async fn upsert_latest(&self, snapshot: &MarketSnapshot) -> Result<()>;

    async fn upsert_history_day(&self, entry: &PriceHistoryEntry) -> Result<()>;
}
