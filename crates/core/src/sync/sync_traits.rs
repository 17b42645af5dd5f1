use async_trait::async_trait;
use flipledger_market_data::Marketplace;

use super::sync_model::{SyncRequest, SyncResult, SyncRunRecord};
use crate::errors::Result;

/// Orchestrates market data sync for one marketplace.
#[async_trait]
pub trait MarketSyncServiceTrait: Send + Sync {
    fn marketplace(&self) -> Marketplace;

    /// Sync one item. Partial failures come back inside the result; `Err` is
    /// reserved for failures before any stage runs (credentials, storage).
    async fn sync_item(&self, request: &SyncRequest) -> Result<SyncResult>;
}

/// Persistence for sync run summaries (operator visibility).
#[async_trait]
pub trait SyncRunStore: Send + Sync {
    async fn record_run(&self, run: &SyncRunRecord) -> Result<()>;

    /// Most recent runs first.
    fn list_runs(&self, limit: usize) -> Result<Vec<SyncRunRecord>>;
}
