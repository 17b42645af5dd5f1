//! Budgeted sync across tracked catalog items.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{error, info, warn};

use super::sync_model::{ScheduledRunSummary, SyncRequest, SyncResult, SyncRunRecord};
use super::sync_traits::{MarketSyncServiceTrait, SyncRunStore};
use crate::catalog::{normalize_sku, CatalogItem, CatalogRepositoryTrait};
use crate::errors::{Result, ValidationError};

/// Runs every configured marketplace's orchestrator over the items due for
/// sync, within a wall-clock budget, and persists each run's summary.
pub struct ScheduledSync<C, R>
where
    C: CatalogRepositoryTrait,
    R: SyncRunStore,
{
    catalog_repo: Arc<C>,
    run_store: Arc<R>,
    services: Vec<Arc<dyn MarketSyncServiceTrait>>,
}

impl<C, R> ScheduledSync<C, R>
where
    C: CatalogRepositoryTrait + 'static,
    R: SyncRunStore + 'static,
{
    pub fn new(
        catalog_repo: Arc<C>,
        run_store: Arc<R>,
        services: Vec<Arc<dyn MarketSyncServiceTrait>>,
    ) -> Self {
        Self {
            catalog_repo,
            run_store,
            services,
        }
    }

    /// Register a SKU so the scheduler picks it up. Existing items are returned as-is.
    pub async fn ensure_tracked(&self, sku: &str) -> Result<CatalogItem> {
        let sku = normalize_sku(sku);
        if sku.is_empty() {
            return Err(ValidationError::MissingField("sku".to_string()).into());
        }
        if let Some(item) = self.catalog_repo.get_item(&sku)? {
            return Ok(item);
        }
        info!("Tracking {}", sku);
        self.catalog_repo.upsert_item(CatalogItem::new(&sku)).await
    }

    /// Sync one item on every marketplace right away.
    pub async fn sync_now(&self, request: &SyncRequest) -> Result<ScheduledRunSummary> {
        let mut summary = ScheduledRunSummary {
            items_attempted: 1,
            ..Default::default()
        };
        self.sync_on_all_marketplaces(request, &mut summary).await;
        summary.deadline_reached = summary.results.iter().any(|r| r.deadline_reached);
        Ok(summary)
    }

    /// Sync up to `max_items` items, least recently synced first, stopping
    /// when `budget` is spent.
    ///
    /// Only a failure to list items propagates; per-item failures are
    /// collected in the summary.
    pub async fn run(&self, budget: Duration, max_items: usize) -> Result<ScheduledRunSummary> {
        let deadline = Instant::now() + budget;
        let items = self.catalog_repo.list_items_due(max_items)?;
        let mut summary = ScheduledRunSummary::default();

        for (index, item) in items.iter().enumerate() {
            if Instant::now() >= deadline {
                summary.items_skipped = items.len() - index;
                summary.deadline_reached = true;
                warn!(
                    "Sync budget spent, {} of {} items skipped",
                    summary.items_skipped,
                    items.len()
                );
                break;
            }

            summary.items_attempted += 1;
            let request = SyncRequest::new(item.sku.clone()).with_deadline(deadline);
            self.sync_on_all_marketplaces(&request, &mut summary).await;
        }

        if summary.results.iter().any(|r| r.deadline_reached) {
            summary.deadline_reached = true;
        }

        info!(
            "Scheduled sync: {} items attempted, {} skipped, {}/{} runs successful, {} failures",
            summary.items_attempted,
            summary.items_skipped,
            summary.successes(),
            summary.results.len(),
            summary.failures.len()
        );
        Ok(summary)
    }

    async fn sync_on_all_marketplaces(&self, request: &SyncRequest, summary: &mut ScheduledRunSummary) {
        for service in &self.services {
            match service.sync_item(request).await {
                Ok(result) => {
                    self.persist(&result).await;
                    summary.results.push(result);
                }
                Err(e) => {
                    error!("{} sync for {} failed: {}", service.marketplace(), request.sku, e);
                    summary
                        .failures
                        .push((request.sku.clone(), format!("{}: {}", service.marketplace(), e)));
                }
            }
        }
    }

    async fn persist(&self, result: &SyncResult) {
        if let Err(e) = self.run_store.record_run(&SyncRunRecord::from(result)).await {
            warn!("Failed to record sync run for {}: {}", result.sku, e);
        }
    }
}
