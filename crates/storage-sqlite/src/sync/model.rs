//! Database model for persisted sync run summaries.

use diesel::prelude::*;
use flipledger_core::sync::{SyncCounts, SyncItemError, SyncMode, SyncRunRecord};
use flipledger_core::Result;

use crate::catalog::parse_marketplace;
use crate::errors::corrupt;
use crate::utils::{format_timestamp, parse_timestamp};

#[derive(Queryable, Identifiable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::sync_runs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SyncRunDB {
    pub id: String,
    pub marketplace: String,
    pub sku: String,
    pub mode: String,
    pub success: bool,
    pub deadline_reached: bool,
    pub variants_synced: i32,
    pub market_data_refreshed: i32,
    pub price_snapshots_inserted: i32,
    pub rate_limited: i32,
    pub fresh_hits: i32,
    pub skipped: i32,
    pub unparseable_prices: i32,
    pub error_count: i32,
    /// JSON array of `SyncItemError`.
    pub errors: String,
    pub started_at: String,
    pub finished_at: String,
}

fn to_i32(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

fn to_usize(count: i32) -> usize {
    usize::try_from(count).unwrap_or(0)
}

impl From<&SyncRunRecord> for SyncRunDB {
    fn from(run: &SyncRunRecord) -> Self {
        let counts = &run.counts;
        Self {
            id: run.id.clone(),
            marketplace: run.marketplace.as_str().to_string(),
            sku: run.sku.clone(),
            mode: run.mode.as_str().to_string(),
            success: run.success,
            deadline_reached: run.deadline_reached,
            variants_synced: to_i32(counts.variants_synced),
            market_data_refreshed: to_i32(counts.market_data_refreshed),
            price_snapshots_inserted: to_i32(counts.price_snapshots_inserted),
            rate_limited: to_i32(counts.rate_limited),
            fresh_hits: to_i32(counts.fresh_hits),
            skipped: to_i32(counts.skipped),
            unparseable_prices: to_i32(counts.unparseable_prices),
            error_count: to_i32(run.errors.len()),
            errors: serde_json::to_string(&run.errors).unwrap_or_else(|_| "[]".to_string()),
            started_at: format_timestamp(run.started_at),
            finished_at: format_timestamp(run.finished_at),
        }
    }
}

impl TryFrom<SyncRunDB> for SyncRunRecord {
    type Error = flipledger_core::Error;

    fn try_from(db: SyncRunDB) -> Result<Self> {
        let mode = match db.mode.as_str() {
            "FULL" => SyncMode::Full,
            "REFRESH" => SyncMode::Refresh,
            other => return Err(corrupt(format!("sync_runs.mode: unknown '{}'", other))),
        };
        let errors: Vec<SyncItemError> = serde_json::from_str(&db.errors)
            .map_err(|e| corrupt(format!("sync_runs.errors for {}: {}", db.id, e)))?;

        Ok(SyncRunRecord {
            marketplace: parse_marketplace(&db.marketplace)?,
            mode,
            success: db.success,
            deadline_reached: db.deadline_reached,
            counts: SyncCounts {
                variants_synced: to_usize(db.variants_synced),
                market_data_refreshed: to_usize(db.market_data_refreshed),
                price_snapshots_inserted: to_usize(db.price_snapshots_inserted),
                rate_limited: to_usize(db.rate_limited),
                fresh_hits: to_usize(db.fresh_hits),
                skipped: to_usize(db.skipped),
                unparseable_prices: to_usize(db.unparseable_prices),
            },
            errors,
            started_at: parse_timestamp(&db.started_at, "sync_runs.started_at")?,
            finished_at: parse_timestamp(&db.finished_at, "sync_runs.finished_at")?,
            id: db.id,
            sku: db.sku,
        })
    }
}
