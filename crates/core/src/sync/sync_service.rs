//! Market data sync orchestrator.
//!
//! # Pipeline
//!
//! ```text
//! ItemSyncState::Unknown                     ItemSyncState::Known
//!       │                                           │
//!       ├─► catalog_search   (critical)             │
//!       ├─► product_details  (critical)             │
//!       ├─► variants         (critical)             │
//!       └─────────────────────────┬─────────────────┘
//!                                 ▼
//!                   market_data (per variant × currency,
//!                   isolated failures, staggered batches)
//! ```
//!
//! One service instance serves one marketplace. Configuration is passed in at
//! construction so two services with different settings never interfere.

use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info, warn};

use flipledger_market_data::{
    run_staggered, CatalogMatch, FailureClass, MarketDataError, MarketplaceProvider, Marketplace,
};

use super::sync_model::{ItemSyncState, SyncConfig, SyncItemError, SyncRequest, SyncResult, SyncStage};
use super::sync_traits::MarketSyncServiceTrait;
use crate::catalog::{normalize_sku, normalize_style_code, CatalogItem, CatalogRepositoryTrait, Variant};
use crate::errors::{Result, ValidationError};
use crate::market_data::{MarketCacheStore, MarketSnapshot, PriceHistoryEntry};

/// One (variant, currency) piece of work in the market data stage.
#[derive(Clone, Copy)]
struct MarketUnit<'a> {
    variant: &'a Variant,
    currency: &'a str,
}

#[derive(Default)]
struct UnitReport {
    primary: bool,
    fresh: bool,
    refreshed: bool,
    history_written: bool,
    rate_limited: bool,
    unparseable: u32,
    error: Option<SyncItemError>,
}

impl UnitReport {
    fn covered(&self) -> bool {
        self.error.is_none() && (self.fresh || self.refreshed)
    }
}

/// Sync orchestrator for one marketplace.
pub struct MarketSyncService<C, M>
where
    C: CatalogRepositoryTrait,
    M: MarketCacheStore,
{
    provider: Arc<dyn MarketplaceProvider>,
    catalog_repo: Arc<C>,
    cache_store: Arc<M>,
    config: SyncConfig,
}

impl<C, M> MarketSyncService<C, M>
where
    C: CatalogRepositoryTrait + 'static,
    M: MarketCacheStore + 'static,
{
    pub fn new(
        provider: Arc<dyn MarketplaceProvider>,
        catalog_repo: Arc<C>,
        cache_store: Arc<M>,
        config: SyncConfig,
    ) -> Self {
        Self {
            provider,
            catalog_repo,
            cache_store,
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Decide between full and refresh sync from what the repository holds.
    pub fn resolve_state(&self, sku: &str) -> Result<ItemSyncState> {
        let marketplace = self.provider.marketplace();
        let Some(item) = self.catalog_repo.get_item(sku)? else {
            return Ok(ItemSyncState::Unknown);
        };
        let Some(catalog_id) = item.catalog_id(marketplace) else {
            return Ok(ItemSyncState::Unknown);
        };

        let variants: Vec<Variant> = self
            .catalog_repo
            .list_variants(&item.sku, marketplace)?
            .into_iter()
            .filter(|v| v.catalog_id == catalog_id)
            .collect();

        if variants.is_empty() {
            return Ok(ItemSyncState::Unknown);
        }
        Ok(ItemSyncState::Known {
            catalog_id: catalog_id.to_string(),
            variants,
        })
    }

    // =========================================================================
    // Critical stages
    // =========================================================================

    /// catalog_search → product_details → variants. `None` when a stage failed;
    /// the failure is already recorded on `result`.
    async fn run_catalog_stages(
        &self,
        sku: &str,
        result: &mut SyncResult,
    ) -> Option<(String, Vec<Variant>)> {
        let marketplace = self.provider.marketplace();

        let hits = match self.provider.search_catalog(sku).await {
            Ok(hits) => hits,
            Err(e) => {
                record_critical(result, SyncStage::CatalogSearch, &e);
                return None;
            }
        };
        let Some(hit) = pick_catalog_match(sku, hits) else {
            result.errors.push(
                SyncItemError::critical(
                    SyncStage::CatalogSearch,
                    format!("No {} catalog match for {}", marketplace, sku),
                )
                .with_class(FailureClass::NotFound),
            );
            return None;
        };
        let catalog_id = hit.catalog_id;
        debug!("{} resolved {} to catalog id {}", marketplace, sku, catalog_id);

        let details = match self.provider.get_product(&catalog_id).await {
            Ok(details) => details,
            Err(e) => {
                record_critical(result, SyncStage::ProductDetails, &e);
                return None;
            }
        };

        let mut item = match self.catalog_repo.get_item(sku) {
            Ok(existing) => existing.unwrap_or_else(|| CatalogItem::new(sku)),
            Err(e) => {
                result.errors.push(SyncItemError::critical(SyncStage::ProductDetails, e.to_string()));
                return None;
            }
        };
        item.apply_details(marketplace, &details);
        item.set_catalog_id(marketplace, catalog_id.clone());
        if let Err(e) = self.catalog_repo.upsert_item(item).await {
            result.errors.push(SyncItemError::critical(SyncStage::ProductDetails, e.to_string()));
            return None;
        }

        let infos = match self.provider.get_variants(&catalog_id).await {
            Ok(infos) => infos,
            Err(e) => {
                record_critical(result, SyncStage::Variants, &e);
                return None;
            }
        };
        if infos.is_empty() {
            result.errors.push(SyncItemError::critical(
                SyncStage::Variants,
                format!("{} product {} has no variants", marketplace, catalog_id),
            ));
            return None;
        }

        let variants: Vec<Variant> = infos
            .into_iter()
            .map(|info| Variant::from_info(sku, marketplace, &catalog_id, info))
            .collect();
        match self.catalog_repo.upsert_variants(variants.clone()).await {
            Ok(written) => result.counts.variants_synced = written,
            Err(e) => {
                result.errors.push(SyncItemError::critical(SyncStage::Variants, e.to_string()));
                return None;
            }
        }

        Some((catalog_id, variants))
    }

    // =========================================================================
    // market_data stage
    // =========================================================================

    /// Fan out over variants × currencies in staggered batches. Returns the
    /// number of variants covered in the primary currency.
    async fn run_market_data_stage(
        &self,
        catalog_id: &str,
        variants: &[Variant],
        request: &SyncRequest,
        result: &mut SyncResult,
    ) -> usize {
        let capabilities = self.provider.capabilities();
        let coverage = request.coverage.unwrap_or(self.config.coverage);
        let currencies = self.config.currencies_for(&capabilities, coverage);
        let primary = self.config.primary_for(&capabilities);

        // Primary currency first, so a deadline cuts secondary currencies before it.
        let units: Vec<MarketUnit<'_>> = currencies
            .iter()
            .flat_map(|currency| {
                variants.iter().map(move |variant| MarketUnit {
                    variant,
                    currency: currency.as_str(),
                })
            })
            .collect();

        // The provider's own limits are a floor under the configured pacing.
        let limits = self.provider.rate_limit();
        let batch_size = self.config.batch_size.min(limits.max_concurrency).max(1);
        let interval = self.config.rate_limit_interval.max(limits.min_interval);
        let mut last_batch = StdDuration::ZERO;
        let mut processed = 0;
        let mut primary_covered = 0;

        for batch in units.chunks(batch_size) {
            if let Some(deadline) = request.deadline {
                let estimate = (interval * batch.len() as u32).max(last_batch);
                if deadline.saturating_duration_since(Instant::now()) <= estimate {
                    result.counts.skipped = units.len() - processed;
                    result.deadline_reached = true;
                    warn!(
                        "{} {}: deadline reached, skipping {} of {} market data units",
                        self.provider.id(),
                        result.sku,
                        result.counts.skipped,
                        units.len()
                    );
                    break;
                }
            }

            let started = Instant::now();
            let reports = run_staggered(batch.to_vec(), interval, batch_size, |unit| {
                self.sync_unit(catalog_id, unit, &primary, request.force)
            })
            .await;
            last_batch = started.elapsed();
            processed += batch.len();

            for report in reports {
                if report.primary && report.covered() {
                    primary_covered += 1;
                }
                if report.fresh {
                    result.counts.fresh_hits += 1;
                }
                if report.refreshed {
                    result.counts.market_data_refreshed += 1;
                }
                if report.history_written {
                    result.counts.price_snapshots_inserted += 1;
                }
                if report.rate_limited {
                    result.counts.rate_limited += 1;
                }
                result.counts.unparseable_prices += report.unparseable as usize;
                if let Some(error) = report.error {
                    result.errors.push(error);
                }
            }
        }

        primary_covered
    }

    /// cache check → fetch → upsert latest → upsert history day.
    async fn sync_unit(
        &self,
        catalog_id: &str,
        unit: MarketUnit<'_>,
        primary: &str,
        force: bool,
    ) -> UnitReport {
        let mut report = UnitReport {
            primary: unit.currency.eq_ignore_ascii_case(primary),
            ..Default::default()
        };
        let variant = unit.variant;

        if !force {
            match self.cache_store.get_latest(
                &variant.id,
                unit.currency,
                self.config.market_ttl,
                Utc::now(),
            ) {
                Ok(Some(_)) => {
                    report.fresh = true;
                    return report;
                }
                Ok(None) => {}
                Err(e) => debug!("Cache read for {} failed, fetching: {}", variant.id, e),
            }
        }

        let quote = match self
            .provider
            .get_market_data(catalog_id, &variant.variant_id, unit.currency)
            .await
        {
            Ok(quote) => quote,
            Err(e) => {
                warn!(
                    "{} market data for {} ({}) in {} failed: {}",
                    self.provider.id(),
                    variant.variant_id,
                    variant.size_label,
                    unit.currency,
                    e
                );
                report.rate_limited = e.is_rate_limited();
                report.error = Some(
                    SyncItemError::for_unit(variant, unit.currency, e.to_string())
                        .with_class(e.failure_class()),
                );
                return report;
            }
        };

        if !quote.currency.eq_ignore_ascii_case(unit.currency) {
            report.error = Some(SyncItemError::for_unit(
                variant,
                unit.currency,
                format!("Quote came back in {}", quote.currency),
            ));
            return report;
        }
        report.unparseable = quote.unparseable_fields;

        let snapshot = MarketSnapshot::from_quote(variant, &quote, self.config.market_ttl, Utc::now());
        if let Err(e) = self.cache_store.upsert_latest(&snapshot).await {
            report.error = Some(SyncItemError::for_unit(
                variant,
                unit.currency,
                format!("Failed to write snapshot: {}", e),
            ));
            return report;
        }
        report.refreshed = true;

        let entry = PriceHistoryEntry::from_snapshot(&snapshot);
        if let Err(e) = self.cache_store.upsert_history_day(&entry).await {
            report.error = Some(SyncItemError::for_unit(
                variant,
                unit.currency,
                format!("Failed to write history: {}", e),
            ));
            return report;
        }
        report.history_written = true;

        report
    }

    async fn touch(&self, sku: &str) {
        if let Err(e) = self.catalog_repo.touch_synced(sku, Utc::now()).await {
            warn!("Failed to record sync time for {}: {}", sku, e);
        }
    }
}

#[async_trait]
impl<C, M> MarketSyncServiceTrait for MarketSyncService<C, M>
where
    C: CatalogRepositoryTrait + 'static,
    M: MarketCacheStore + 'static,
{
    fn marketplace(&self) -> Marketplace {
        self.provider.marketplace()
    }

    async fn sync_item(&self, request: &SyncRequest) -> Result<SyncResult> {
        let sku = normalize_sku(&request.sku);
        if sku.is_empty() {
            return Err(ValidationError::MissingField("sku".to_string()).into());
        }

        // Catastrophic pre-stage failures propagate.
        self.provider.check_credentials().await?;
        let state = self.resolve_state(&sku)?;

        let marketplace = self.provider.marketplace();
        let mut result = SyncResult::new(marketplace, &sku, state.mode());
        debug!("{} {} sync for {}", marketplace, state.mode().as_str(), sku);

        let (catalog_id, variants) = match state {
            ItemSyncState::Known {
                catalog_id,
                variants,
            } => (catalog_id, variants),
            ItemSyncState::Unknown => match self.run_catalog_stages(&sku, &mut result).await {
                Some(resolved) => resolved,
                None => {
                    self.touch(&sku).await;
                    result.finish(false);
                    error!("{}", result.summary());
                    return Ok(result);
                }
            },
        };

        let primary_covered = self
            .run_market_data_stage(&catalog_id, &variants, request, &mut result)
            .await;
        self.touch(&sku).await;

        let covered = self
            .config
            .coverage_policy
            .is_met(primary_covered, variants.len());
        result.finish(covered);
        info!("{}", result.summary());
        Ok(result)
    }
}

fn record_critical(result: &mut SyncResult, stage: SyncStage, error: &MarketDataError) {
    error!("{} {} failed for {}: {}", result.marketplace, stage.as_str(), result.sku, error);
    result
        .errors
        .push(SyncItemError::critical(stage, error.to_string()).with_class(error.failure_class()));
}

/// Prefer a hit whose style code matches the SKU exactly (ignoring spacing and
/// punctuation); otherwise take the marketplace's top result.
fn pick_catalog_match(sku: &str, hits: Vec<CatalogMatch>) -> Option<CatalogMatch> {
    let wanted = normalize_style_code(sku);
    let exact = hits.iter().position(|hit| {
        hit.style_id
            .as_deref()
            .map(|style| normalize_style_code(style) == wanted)
            .unwrap_or(false)
    });
    let index = exact.unwrap_or(0);
    hits.into_iter().nth(index)
}
