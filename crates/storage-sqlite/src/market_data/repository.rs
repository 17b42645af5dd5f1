use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::{MarketSnapshotDB, PriceHistoryDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::market_snapshots::dsl as snapshots_dsl;
use crate::schema::price_history::dsl as history_dsl;
use crate::utils::{chunk_for_sqlite, format_day};
use flipledger_core::market_data::{MarketCacheStore, MarketSnapshot, PriceHistoryEntry};
use flipledger_core::Result;

/// SQLite-backed market data cache. Both tables are keyed by their composite
/// id, so `REPLACE INTO` gives last-writer-wins upserts.
pub struct MarketCacheRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl MarketCacheRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl MarketCacheStore for MarketCacheRepository {
    // =========================================================================
    // Reads
    // =========================================================================

    fn find_latest(&self, variant_key: &str, currency: &str) -> Result<Option<MarketSnapshot>> {
        let mut conn = get_connection(&self.pool)?;
        let id = MarketSnapshot::make_id(variant_key, currency);

        snapshots_dsl::market_snapshots
            .find(id)
            .select(MarketSnapshotDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?
            .map(MarketSnapshot::try_from)
            .transpose()
    }

    fn latest_for_variants(&self, variant_keys: &[String]) -> Result<Vec<MarketSnapshot>> {
        if variant_keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = get_connection(&self.pool)?;
        let mut snapshots = Vec::new();

        for chunk in chunk_for_sqlite(variant_keys) {
            let rows = snapshots_dsl::market_snapshots
                .filter(snapshots_dsl::variant_key.eq_any(chunk))
                .order(snapshots_dsl::id.asc())
                .select(MarketSnapshotDB::as_select())
                .load(&mut conn)
                .into_core()?;
            for row in rows {
                snapshots.push(MarketSnapshot::try_from(row)?);
            }
        }
        Ok(snapshots)
    }

    fn history_range(
        &self,
        variant_key: &str,
        currency: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceHistoryEntry>> {
        let mut conn = get_connection(&self.pool)?;

        history_dsl::price_history
            .filter(history_dsl::variant_key.eq(variant_key))
            .filter(history_dsl::currency.eq(currency.to_uppercase()))
            .filter(history_dsl::day.ge(format_day(from)))
            .filter(history_dsl::day.le(format_day(to)))
            .order(history_dsl::day.asc())
            .select(PriceHistoryDB::as_select())
            .load(&mut conn)
            .into_core()?
            .into_iter()
            .map(PriceHistoryEntry::try_from)
            .collect()
    }

    fn count_latest(&self) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let count: i64 = snapshots_dsl::market_snapshots
            .count()
            .get_result(&mut conn)
            .into_core()?;
        Ok(count as usize)
    }

    fn count_history(&self) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        let count: i64 = history_dsl::price_history
            .count()
            .get_result(&mut conn)
            .into_core()?;
        Ok(count as usize)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    async fn upsert_latest(&self, snapshot: &MarketSnapshot) -> Result<()> {
        let row = MarketSnapshotDB::from(snapshot);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::replace_into(snapshots_dsl::market_snapshots)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn upsert_history_day(&self, entry: &PriceHistoryEntry) -> Result<()> {
        let row = PriceHistoryDB::from(entry);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::replace_into(history_dsl::price_history)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
