//! Sync orchestration models.

use std::time::{Duration as StdDuration, Instant};

use chrono::{DateTime, Duration, Utc};
use flipledger_market_data::{FailureClass, Marketplace, ProviderCapabilities};
use serde::{Deserialize, Serialize};

use crate::catalog::Variant;
use crate::constants::{
    DEFAULT_MARKET_TTL_SECS, DEFAULT_MIN_SUCCESS_PERCENT, DEFAULT_PRIMARY_CURRENCY,
    DEFAULT_RATE_LIMIT_INTERVAL_MS, DEFAULT_SMALL_RUN_CUTOFF, DEFAULT_SYNC_BATCH_SIZE,
};

// =============================================================================
// Configuration
// =============================================================================

/// Which currencies the market data stage covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurrencyCoverage {
    /// Only the primary currency.
    #[default]
    Primary,
    /// The primary currency first, then every other currency the marketplace quotes.
    All,
}

/// When a market data stage counts as successful.
///
/// Runs with fewer than `small_run_cutoff` variants need every primary-currency
/// fetch to succeed; larger runs need `min_success_percent` of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoveragePolicy {
    pub small_run_cutoff: usize,
    pub min_success_percent: u32,
}

impl Default for CoveragePolicy {
    fn default() -> Self {
        Self {
            small_run_cutoff: DEFAULT_SMALL_RUN_CUTOFF,
            min_success_percent: DEFAULT_MIN_SUCCESS_PERCENT,
        }
    }
}

impl CoveragePolicy {
    /// A run with no variants never meets coverage.
    pub fn is_met(&self, successes: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }
        if total < self.small_run_cutoff {
            return successes >= total;
        }
        successes * 100 >= total * self.min_success_percent as usize
    }
}

/// Per-orchestrator configuration, passed in at construction.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub primary_currency: String,
    pub coverage: CurrencyCoverage,
    /// Members per market data batch; also the batch's concurrency bound.
    pub batch_size: usize,
    /// Stagger between batch members.
    pub rate_limit_interval: StdDuration,
    /// Snapshots younger than this are not refetched.
    pub market_ttl: Duration,
    pub coverage_policy: CoveragePolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            primary_currency: DEFAULT_PRIMARY_CURRENCY.to_string(),
            coverage: CurrencyCoverage::Primary,
            batch_size: DEFAULT_SYNC_BATCH_SIZE,
            rate_limit_interval: StdDuration::from_millis(DEFAULT_RATE_LIMIT_INTERVAL_MS),
            market_ttl: Duration::seconds(DEFAULT_MARKET_TTL_SECS),
            coverage_policy: CoveragePolicy::default(),
        }
    }
}

impl SyncConfig {
    /// The primary currency for one marketplace: the configured one when the
    /// marketplace quotes it, its native currency otherwise.
    pub fn primary_for(&self, capabilities: &ProviderCapabilities) -> String {
        if capabilities.supports_currency(&self.primary_currency) {
            self.primary_currency.to_uppercase()
        } else {
            capabilities.native_currency().to_string()
        }
    }

    /// Currencies to sync, primary first.
    pub fn currencies_for(
        &self,
        capabilities: &ProviderCapabilities,
        coverage: CurrencyCoverage,
    ) -> Vec<String> {
        let primary = self.primary_for(capabilities);
        let mut currencies = vec![primary.clone()];
        if coverage == CurrencyCoverage::All {
            currencies.extend(
                capabilities
                    .currencies
                    .iter()
                    .filter(|c| !c.eq_ignore_ascii_case(&primary))
                    .map(|c| c.to_string()),
            );
        }
        currencies
    }
}

// =============================================================================
// Request / state
// =============================================================================

/// One sync invocation for one catalog item.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub sku: String,
    /// Refetch even when a fresh snapshot is cached.
    pub force: bool,
    /// Overrides the configured currency coverage for this call.
    pub coverage: Option<CurrencyCoverage>,
    /// Stop issuing batches when the next one can't finish before this instant.
    pub deadline: Option<Instant>,
}

impl SyncRequest {
    pub fn new(sku: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            force: false,
            coverage: None,
            deadline: None,
        }
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_coverage(mut self, coverage: CurrencyCoverage) -> Self {
        self.coverage = Some(coverage);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// What the cache already knows about an item on one marketplace.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemSyncState {
    /// Item, catalog id or variants missing: run the full pipeline.
    Unknown,
    /// Catalog id and variants known: refresh prices only.
    Known {
        catalog_id: String,
        variants: Vec<Variant>,
    },
}

impl ItemSyncState {
    pub fn mode(&self) -> SyncMode {
        match self {
            ItemSyncState::Unknown => SyncMode::Full,
            ItemSyncState::Known { .. } => SyncMode::Refresh,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncMode {
    Full,
    Refresh,
}

impl SyncMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::Full => "FULL",
            SyncMode::Refresh => "REFRESH",
        }
    }
}

/// Pipeline stage an error is tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    CatalogSearch,
    ProductDetails,
    Variants,
    MarketData,
}

impl SyncStage {
    /// Failures in these stages abort the run.
    pub fn is_critical(&self) -> bool {
        !matches!(self, SyncStage::MarketData)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStage::CatalogSearch => "catalog_search",
            SyncStage::ProductDetails => "product_details",
            SyncStage::Variants => "variants",
            SyncStage::MarketData => "market_data",
        }
    }
}

// =============================================================================
// Result
// =============================================================================

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncItemError {
    pub stage: SyncStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_class: Option<FailureClass>,
    pub error: String,
}

impl SyncItemError {
    pub fn critical(stage: SyncStage, error: impl Into<String>) -> Self {
        Self {
            stage,
            variant_id: None,
            size: None,
            currency: None,
            failure_class: None,
            error: error.into(),
        }
    }

    pub fn for_unit(variant: &Variant, currency: &str, error: impl Into<String>) -> Self {
        Self {
            stage: SyncStage::MarketData,
            variant_id: Some(variant.variant_id.clone()),
            size: Some(variant.size_label.clone()),
            currency: Some(currency.to_string()),
            failure_class: None,
            error: error.into(),
        }
    }

    pub fn with_class(mut self, class: FailureClass) -> Self {
        self.failure_class = Some(class);
        self
    }
}

/// Per-stage counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCounts {
    /// Variants written by a full sync.
    pub variants_synced: usize,
    /// Latest-snapshot rows written.
    pub market_data_refreshed: usize,
    /// History-day rows written.
    pub price_snapshots_inserted: usize,
    /// Units the marketplace throttled.
    pub rate_limited: usize,
    /// Units skipped because a fresh snapshot was cached.
    pub fresh_hits: usize,
    /// Units never attempted because the deadline arrived.
    pub skipped: usize,
    /// Price fields that were present but unparseable.
    pub unparseable_prices: usize,
}

/// Outcome of one orchestrator run for one item on one marketplace.
///
/// Always returned for partial failures; `success` carries the verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub marketplace: Marketplace,
    pub sku: String,
    pub mode: SyncMode,
    pub success: bool,
    pub counts: SyncCounts,
    pub errors: Vec<SyncItemError>,
    pub deadline_reached: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncResult {
    pub fn new(marketplace: Marketplace, sku: &str, mode: SyncMode) -> Self {
        let now = Utc::now();
        Self {
            marketplace,
            sku: sku.to_string(),
            mode,
            success: false,
            counts: SyncCounts::default(),
            errors: Vec::new(),
            deadline_reached: false,
            started_at: now,
            finished_at: now,
        }
    }

    /// Whether a critical stage aborted the run.
    pub fn aborted(&self) -> bool {
        self.errors.iter().any(|e| e.stage.is_critical())
    }

    pub fn finish(&mut self, success: bool) {
        self.success = success && !self.aborted();
        self.finished_at = Utc::now();
    }

    pub fn summary(&self) -> String {
        let verdict = if self.success { "ok" } else { "failed" };
        format!(
            "{} {} {} sync {}: {} refreshed, {} history, {} fresh, {} rate limited, {} skipped, {} errors",
            self.marketplace,
            self.sku,
            self.mode.as_str().to_lowercase(),
            verdict,
            self.counts.market_data_refreshed,
            self.counts.price_snapshots_inserted,
            self.counts.fresh_hits,
            self.counts.rate_limited,
            self.counts.skipped,
            self.errors.len()
        )
    }
}

/// Persisted summary of a [`SyncResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRunRecord {
    pub id: String,
    pub marketplace: Marketplace,
    pub sku: String,
    pub mode: SyncMode,
    pub success: bool,
    pub deadline_reached: bool,
    pub counts: SyncCounts,
    pub errors: Vec<SyncItemError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl From<&SyncResult> for SyncRunRecord {
    fn from(result: &SyncResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            marketplace: result.marketplace,
            sku: result.sku.clone(),
            mode: result.mode,
            success: result.success,
            deadline_reached: result.deadline_reached,
            counts: result.counts.clone(),
            errors: result.errors.clone(),
            started_at: result.started_at,
            finished_at: result.finished_at,
        }
    }
}

/// Outcome of one scheduled invocation across many items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledRunSummary {
    pub items_attempted: usize,
    /// Items never started because the budget ran out.
    pub items_skipped: usize,
    pub deadline_reached: bool,
    pub results: Vec<SyncResult>,
    /// (sku, error) for runs that failed before any stage.
    pub failures: Vec<(String, String)>,
}

impl ScheduledRunSummary {
    pub fn successes(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipledger_market_data::PriceUnit;

    #[test]
    fn test_small_run_needs_every_variant() {
        let policy = CoveragePolicy::default();
        assert!(policy.is_met(3, 3));
        assert!(!policy.is_met(2, 3));
        assert!(!policy.is_met(0, 1));
    }

    #[test]
    fn test_large_run_needs_half() {
        let policy = CoveragePolicy::default();
        assert!(policy.is_met(5, 10));
        assert!(!policy.is_met(4, 10));
        assert!(policy.is_met(2, 4));
        assert!(!policy.is_met(1, 4));
    }

    #[test]
    fn test_zero_variants_never_covered() {
        assert!(!CoveragePolicy::default().is_met(0, 0));
    }

    #[test]
    fn test_policy_is_configurable() {
        let strict = CoveragePolicy {
            small_run_cutoff: 0,
            min_success_percent: 100,
        };
        assert!(!strict.is_met(9, 10));
        assert!(strict.is_met(10, 10));
    }

    #[test]
    fn test_currencies_primary_first() {
        let caps = ProviderCapabilities {
            currencies: &["USD", "EUR", "GBP"],
            price_unit: PriceUnit::Major,
            supports_last_sale: false,
        };
        let config = SyncConfig {
            primary_currency: "eur".to_string(),
            ..Default::default()
        };
        assert_eq!(config.currencies_for(&caps, CurrencyCoverage::Primary), vec!["EUR"]);
        assert_eq!(
            config.currencies_for(&caps, CurrencyCoverage::All),
            vec!["EUR", "USD", "GBP"]
        );
    }

    #[test]
    fn test_unsupported_primary_falls_back_to_native() {
        let caps = ProviderCapabilities {
            currencies: &["USD"],
            price_unit: PriceUnit::Minor,
            supports_last_sale: true,
        };
        let config = SyncConfig {
            primary_currency: "EUR".to_string(),
            ..Default::default()
        };
        assert_eq!(config.primary_for(&caps), "USD");
    }

    #[test]
    fn test_critical_error_forces_failure() {
        let mut result = SyncResult::new(Marketplace::StockX, "DD1391-100", SyncMode::Full);
        result
            .errors
            .push(SyncItemError::critical(SyncStage::Variants, "no variants"));
        result.finish(true);
        assert!(!result.success);
        assert!(result.aborted());
    }
}
