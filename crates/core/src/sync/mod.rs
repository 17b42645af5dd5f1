//! Sync module - market data orchestration, scheduled runs, and run history.

mod scheduled_sync;
mod sync_model;
mod sync_service;
mod sync_traits;

#[cfg(test)]
mod sync_service_tests;

pub use scheduled_sync::ScheduledSync;
pub use sync_model::{
    CoveragePolicy, CurrencyCoverage, ItemSyncState, ScheduledRunSummary, SyncConfig, SyncCounts,
    SyncItemError, SyncMode, SyncRequest, SyncResult, SyncRunRecord, SyncStage,
};
pub use sync_service::MarketSyncService;
pub use sync_traits::{MarketSyncServiceTrait, SyncRunStore};
