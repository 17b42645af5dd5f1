//! Tests for the market data sync orchestrator.
//!
//! # Contract Points
//!
//! 1. Unknown items run catalog_search → product_details → variants → market_data
//! 2. Known items skip straight to market_data
//! 3. Critical stage failures abort with one stage-tagged error
//! 4. market_data failures are isolated per (variant, currency)
//! 5. Success follows the coverage policy over primary-currency results
//! 6. Re-running is idempotent: keyed upserts, one history row per day

#[cfg(test)]
mod tests {
    use crate::catalog::{CatalogItem, CatalogRepositoryTrait, Variant};
    use crate::errors::{DatabaseError, Result};
    use crate::market_data::{MarketCacheStore, MarketSnapshot, PriceHistoryEntry};
    use crate::sync::{
        CurrencyCoverage, MarketSyncService, MarketSyncServiceTrait, SyncConfig, SyncMode,
        SyncRequest, SyncStage,
    };
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, NaiveDate, Utc};
    use flipledger_market_data::{
        CatalogMatch, FailureClass, MarketDataError, MarketQuote, Marketplace, MarketplaceProvider,
        PriceUnit, ProductDetails, ProviderCapabilities, RateLimit, VariantInfo,
    };
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration as StdDuration, Instant};

    const SKU: &str = "DD1391-100";
    const CATALOG_ID: &str = "p-dunk";

    // =========================================================================
    // Mock provider
    // =========================================================================

    #[derive(Clone, Copy)]
    enum Fail {
        RateLimited,
        Transient,
        NotFound,
    }

    impl Fail {
        fn error(self) -> MarketDataError {
            match self {
                Fail::RateLimited => MarketDataError::RateLimited {
                    provider: "STOCKX".to_string(),
                },
                Fail::Transient => MarketDataError::ProviderError {
                    provider: "STOCKX".to_string(),
                    message: "HTTP error: 502 Bad Gateway".to_string(),
                },
                Fail::NotFound => MarketDataError::NotFound("variant".to_string()),
            }
        }
    }

    struct MockProvider {
        currencies: &'static [&'static str],
        credentials_ok: bool,
        hits: Vec<CatalogMatch>,
        search_fails: bool,
        variants: Vec<VariantInfo>,
        /// (variant_id, currency) → failure
        market_failures: Mutex<HashMap<(String, String), Fail>>,
        unparseable: u32,
        rate_limit: RateLimit,
        calls: Mutex<Vec<String>>,
    }

    impl MockProvider {
        fn with_variants(count: usize) -> Self {
            let variants = (0..count)
                .map(|i| VariantInfo {
                    variant_id: format!("v-{}", i),
                    size_label: format!("US M {}", 4 + i),
                    barcodes: vec![],
                })
                .collect();
            Self {
                currencies: &["USD", "EUR"],
                credentials_ok: true,
                hits: vec![CatalogMatch {
                    marketplace: Marketplace::StockX,
                    catalog_id: CATALOG_ID.to_string(),
                    style_id: Some(SKU.to_string()),
                    title: Some("Nike Dunk Low Panda".to_string()),
                    brand: Some("Nike".to_string()),
                }],
                search_fails: false,
                variants,
                market_failures: Mutex::new(HashMap::new()),
                unparseable: 0,
                rate_limit: RateLimit {
                    min_interval: StdDuration::ZERO,
                    max_concurrency: 16,
                },
                calls: Mutex::new(Vec::new()),
            }
        }

        fn fail_unit(&self, index: usize, currency: &str, fail: Fail) {
            self.market_failures
                .lock()
                .unwrap()
                .insert((format!("v-{}", index), currency.to_string()), fail);
        }

        fn calls_to(&self, method: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.starts_with(method))
                .count()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl MarketplaceProvider for MockProvider {
        fn marketplace(&self) -> Marketplace {
            Marketplace::StockX
        }

        fn capabilities(&self) -> ProviderCapabilities {
            ProviderCapabilities {
                currencies: self.currencies,
                price_unit: PriceUnit::Major,
                supports_last_sale: false,
            }
        }

        fn rate_limit(&self) -> RateLimit {
            self.rate_limit.clone()
        }

        async fn check_credentials(&self) -> std::result::Result<(), MarketDataError> {
            if self.credentials_ok {
                Ok(())
            } else {
                Err(MarketDataError::Unauthorized {
                    provider: "STOCKX".to_string(),
                    message: "No bearer token configured".to_string(),
                })
            }
        }

        async fn search_catalog(
            &self,
            query: &str,
        ) -> std::result::Result<Vec<CatalogMatch>, MarketDataError> {
            self.record(format!("search:{}", query));
            if self.search_fails {
                return Err(Fail::Transient.error());
            }
            Ok(self.hits.clone())
        }

        async fn get_product(
            &self,
            catalog_id: &str,
        ) -> std::result::Result<ProductDetails, MarketDataError> {
            self.record(format!("product:{}", catalog_id));
            Ok(ProductDetails {
                catalog_id: catalog_id.to_string(),
                style_id: Some(SKU.to_string()),
                title: Some("Nike Dunk Low Retro White Black".to_string()),
                brand: Some("Nike".to_string()),
                colorway: Some("White/Black".to_string()),
                image_url: None,
            })
        }

        async fn get_variants(
            &self,
            catalog_id: &str,
        ) -> std::result::Result<Vec<VariantInfo>, MarketDataError> {
            self.record(format!("variants:{}", catalog_id));
            Ok(self.variants.clone())
        }

        async fn get_market_data(
            &self,
            _catalog_id: &str,
            variant_id: &str,
            currency: &str,
        ) -> std::result::Result<MarketQuote, MarketDataError> {
            self.record(format!("market:{}:{}", variant_id, currency));
            let failure = self
                .market_failures
                .lock()
                .unwrap()
                .get(&(variant_id.to_string(), currency.to_string()))
                .copied();
            if let Some(fail) = failure {
                return Err(fail.error());
            }
            let mut quote = MarketQuote::new(Marketplace::StockX, variant_id, currency);
            quote.lowest_ask = Some(dec!(120.00));
            quote.highest_bid = Some(dec!(95.50));
            quote.unparseable_fields = self.unparseable;
            Ok(quote)
        }
    }

    // =========================================================================
    // Mock catalog repository
    // =========================================================================

    #[derive(Default)]
    struct MockCatalogRepo {
        items: Mutex<HashMap<String, CatalogItem>>,
        variants: Mutex<HashMap<String, Variant>>,
    }

    impl MockCatalogRepo {
        fn item(&self, sku: &str) -> Option<CatalogItem> {
            self.items.lock().unwrap().get(sku).cloned()
        }

        fn variant_count(&self) -> usize {
            self.variants.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CatalogRepositoryTrait for MockCatalogRepo {
        fn get_item(&self, sku: &str) -> Result<Option<CatalogItem>> {
            Ok(self.item(sku))
        }

        fn list_items_due(&self, limit: usize) -> Result<Vec<CatalogItem>> {
            let mut items: Vec<CatalogItem> = self.items.lock().unwrap().values().cloned().collect();
            items.sort_by_key(|i| i.last_synced_at);
            items.truncate(limit);
            Ok(items)
        }

        fn list_variants(&self, sku: &str, marketplace: Marketplace) -> Result<Vec<Variant>> {
            let mut variants: Vec<Variant> = self
                .variants
                .lock()
                .unwrap()
                .values()
                .filter(|v| v.sku == sku && v.marketplace == marketplace)
                .cloned()
                .collect();
            variants.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(variants)
        }

        async fn upsert_item(&self, item: CatalogItem) -> Result<CatalogItem> {
            let mut items = self.items.lock().unwrap();
            let merged = match items.remove(&item.sku) {
                Some(existing) => existing.merged_with(item),
                None => item,
            };
            items.insert(merged.sku.clone(), merged.clone());
            Ok(merged)
        }

        async fn upsert_variants(&self, variants: Vec<Variant>) -> Result<usize> {
            let mut stored = self.variants.lock().unwrap();
            let count = variants.len();
            for variant in variants {
                stored.insert(variant.id.clone(), variant);
            }
            Ok(count)
        }

        async fn touch_synced(&self, sku: &str, at: DateTime<Utc>) -> Result<()> {
            if let Some(item) = self.items.lock().unwrap().get_mut(sku) {
                item.last_synced_at = Some(at);
            }
            Ok(())
        }
    }

    // =========================================================================
    // Mock cache store
    // =========================================================================

    #[derive(Default)]
    struct MockCacheStore {
        latest: Mutex<HashMap<String, MarketSnapshot>>,
        history: Mutex<HashMap<String, PriceHistoryEntry>>,
        /// Variant keys whose writes fail.
        failing_keys: Mutex<HashSet<String>>,
    }

    impl MockCacheStore {
        fn fail_writes_for(&self, variant_key: &str) {
            self.failing_keys
                .lock()
                .unwrap()
                .insert(variant_key.to_string());
        }

        fn check(&self, variant_key: &str) -> Result<()> {
            if self.failing_keys.lock().unwrap().contains(variant_key) {
                return Err(DatabaseError::QueryFailed("disk I/O error".to_string()).into());
            }
            Ok(())
        }
    }

    #[async_trait]
    impl MarketCacheStore for MockCacheStore {
        fn find_latest(&self, variant_key: &str, currency: &str) -> Result<Option<MarketSnapshot>> {
            Ok(self
                .latest
                .lock()
                .unwrap()
                .get(&MarketSnapshot::make_id(variant_key, currency))
                .cloned())
        }

        fn latest_for_variants(&self, variant_keys: &[String]) -> Result<Vec<MarketSnapshot>> {
            Ok(self
                .latest
                .lock()
                .unwrap()
                .values()
                .filter(|s| variant_keys.contains(&s.variant_key))
                .cloned()
                .collect())
        }

        fn history_range(
            &self,
            variant_key: &str,
            currency: &str,
            from: NaiveDate,
            to: NaiveDate,
        ) -> Result<Vec<PriceHistoryEntry>> {
            let mut rows: Vec<PriceHistoryEntry> = self
                .history
                .lock()
                .unwrap()
                .values()
                .filter(|h| {
                    h.variant_key == variant_key && h.currency == currency && h.day >= from && h.day <= to
                })
                .cloned()
                .collect();
            rows.sort_by_key(|h| h.day);
            Ok(rows)
        }

        fn count_latest(&self) -> Result<usize> {
            Ok(self.latest.lock().unwrap().len())
        }

        fn count_history(&self) -> Result<usize> {
            Ok(self.history.lock().unwrap().len())
        }

        async fn upsert_latest(&self, snapshot: &MarketSnapshot) -> Result<()> {
            self.check(&snapshot.variant_key)?;
            self.latest
                .lock()
                .unwrap()
                .insert(snapshot.id.clone(), snapshot.clone());
            Ok(())
        }

        async fn upsert_history_day(&self, entry: &PriceHistoryEntry) -> Result<()> {
            self.check(&entry.variant_key)?;
            self.history
                .lock()
                .unwrap()
                .insert(entry.id.clone(), entry.clone());
            Ok(())
        }
    }

    // =========================================================================
    // Harness
    // =========================================================================

    struct Harness {
        provider: Arc<MockProvider>,
        catalog: Arc<MockCatalogRepo>,
        cache: Arc<MockCacheStore>,
        service: MarketSyncService<MockCatalogRepo, MockCacheStore>,
    }

    fn test_config() -> SyncConfig {
        SyncConfig {
            rate_limit_interval: StdDuration::ZERO,
            ..Default::default()
        }
    }

    fn harness(provider: MockProvider, config: SyncConfig) -> Harness {
        let provider = Arc::new(provider);
        let catalog = Arc::new(MockCatalogRepo::default());
        let cache = Arc::new(MockCacheStore::default());
        let service = MarketSyncService::new(
            provider.clone(),
            catalog.clone(),
            cache.clone(),
            config,
        );
        Harness {
            provider,
            catalog,
            cache,
            service,
        }
    }

    fn variant_key(index: usize) -> String {
        Variant::make_id(Marketplace::StockX, CATALOG_ID, &format!("v-{}", index))
    }

    // =========================================================================
    // Full vs refresh
    // =========================================================================

    #[tokio::test]
    async fn test_unknown_item_runs_full_pipeline() {
        let h = harness(MockProvider::with_variants(3), test_config());

        let result = h.service.sync_item(&SyncRequest::new("dd1391-100")).await.unwrap();

        assert!(result.success);
        assert_eq!(result.mode, SyncMode::Full);
        assert_eq!(result.sku, SKU);
        assert_eq!(result.counts.variants_synced, 3);
        assert_eq!(result.counts.market_data_refreshed, 3);
        assert_eq!(result.counts.price_snapshots_inserted, 3);
        assert!(result.errors.is_empty());
        assert_eq!(h.provider.calls_to("search"), 1);
        assert_eq!(h.provider.calls_to("product"), 1);
        assert_eq!(h.provider.calls_to("variants"), 1);
        assert_eq!(h.provider.calls_to("market"), 3);

        let item = h.catalog.item(SKU).unwrap();
        assert_eq!(item.catalog_id(Marketplace::StockX), Some(CATALOG_ID));
        assert_eq!(item.colorway.as_deref(), Some("White/Black"));
        assert!(item.last_synced_at.is_some());
    }

    #[tokio::test]
    async fn test_known_item_refreshes_prices_only() {
        let h = harness(MockProvider::with_variants(3), test_config());
        h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();

        let result = h
            .service
            .sync_item(&SyncRequest::new(SKU).force(true))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.mode, SyncMode::Refresh);
        assert_eq!(result.counts.variants_synced, 0);
        assert_eq!(result.counts.market_data_refreshed, 3);
        assert_eq!(h.provider.calls_to("search"), 1);
        assert_eq!(h.provider.calls_to("variants"), 1);
        assert_eq!(h.provider.calls_to("market"), 6);
    }

    #[tokio::test]
    async fn test_item_without_variants_is_unknown() {
        let h = harness(MockProvider::with_variants(2), test_config());
        let mut item = CatalogItem::new(SKU);
        item.stockx_catalog_id = Some(CATALOG_ID.to_string());
        h.catalog.upsert_item(item).await.unwrap();

        let result = h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();
        assert_eq!(result.mode, SyncMode::Full);
        assert!(result.success);
    }

    // =========================================================================
    // Idempotence and TTL
    // =========================================================================

    #[tokio::test]
    async fn test_resync_is_idempotent() {
        let h = harness(MockProvider::with_variants(4), test_config());

        h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();
        let latest_after_first = h.cache.count_latest().unwrap();
        let history_after_first = h.cache.count_history().unwrap();

        h.service
            .sync_item(&SyncRequest::new(SKU).force(true))
            .await
            .unwrap();

        assert_eq!(h.cache.count_latest().unwrap(), latest_after_first);
        assert_eq!(h.cache.count_history().unwrap(), history_after_first);
        assert_eq!(h.cache.count_history().unwrap(), 4);
        assert_eq!(h.catalog.variant_count(), 4);
    }

    #[tokio::test]
    async fn test_fresh_snapshot_skips_fetch() {
        let h = harness(MockProvider::with_variants(3), test_config());
        h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();

        let result = h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();

        assert!(result.success);
        assert_eq!(result.counts.fresh_hits, 3);
        assert_eq!(result.counts.market_data_refreshed, 0);
        assert_eq!(h.provider.calls_to("market"), 3);
    }

    #[tokio::test]
    async fn test_expired_snapshot_is_refetched() {
        let config = SyncConfig {
            market_ttl: Duration::zero(),
            ..test_config()
        };
        let h = harness(MockProvider::with_variants(2), config);
        h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();

        let result = h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();

        assert_eq!(result.counts.fresh_hits, 0);
        assert_eq!(result.counts.market_data_refreshed, 2);
        assert_eq!(h.provider.calls_to("market"), 4);
    }

    // =========================================================================
    // Failure isolation and coverage threshold
    // =========================================================================

    #[tokio::test]
    async fn test_partial_failures_are_isolated() {
        let provider = MockProvider::with_variants(10);
        provider.fail_unit(1, "USD", Fail::Transient);
        provider.fail_unit(4, "USD", Fail::NotFound);
        provider.fail_unit(8, "USD", Fail::RateLimited);
        let h = harness(provider, test_config());

        let result = h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();

        assert!(result.success);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.counts.market_data_refreshed, 7);
        assert_eq!(result.counts.rate_limited, 1);
        for error in &result.errors {
            assert_eq!(error.stage, SyncStage::MarketData);
            assert!(error.variant_id.is_some());
            assert!(error.size.is_some());
            assert_eq!(error.currency.as_deref(), Some("USD"));
        }
        let classes: HashSet<_> = result.errors.iter().filter_map(|e| e.failure_class).collect();
        assert!(classes.contains(&FailureClass::NotFound));
        assert!(classes.contains(&FailureClass::RateLimited));
        assert!(classes.contains(&FailureClass::Transient));
    }

    #[tokio::test]
    async fn test_small_run_single_failure_fails() {
        let provider = MockProvider::with_variants(3);
        provider.fail_unit(2, "USD", Fail::Transient);
        let h = harness(provider, test_config());

        let result = h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.counts.market_data_refreshed, 2);
    }

    #[tokio::test]
    async fn test_ten_variants_five_failures_succeeds() {
        let provider = MockProvider::with_variants(10);
        for i in [0, 2, 4, 6, 8] {
            provider.fail_unit(i, "USD", Fail::Transient);
        }
        let h = harness(provider, test_config());

        let result = h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();

        assert!(result.success);
        assert_eq!(result.errors.len(), 5);
    }

    #[tokio::test]
    async fn test_ten_variants_six_failures_fails() {
        let provider = MockProvider::with_variants(10);
        for i in [0, 1, 2, 3, 4, 9] {
            provider.fail_unit(i, "USD", Fail::RateLimited);
        }
        let h = harness(provider, test_config());

        let result = h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.errors.len(), 6);
        assert_eq!(result.counts.rate_limited, 6);
    }

    #[tokio::test]
    async fn test_secondary_currency_failures_do_not_affect_coverage() {
        let provider = MockProvider::with_variants(2);
        provider.fail_unit(0, "EUR", Fail::Transient);
        provider.fail_unit(1, "EUR", Fail::Transient);
        let h = harness(provider, test_config());

        let result = h
            .service
            .sync_item(&SyncRequest::new(SKU).with_coverage(CurrencyCoverage::All))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.counts.market_data_refreshed, 2);
        assert_eq!(result.errors.len(), 2);
        assert!(result
            .errors
            .iter()
            .all(|e| e.currency.as_deref() == Some("EUR")));
    }

    #[tokio::test]
    async fn test_all_currencies_cover_cross_product() {
        let h = harness(MockProvider::with_variants(3), test_config());

        let result = h
            .service
            .sync_item(&SyncRequest::new(SKU).with_coverage(CurrencyCoverage::All))
            .await
            .unwrap();

        assert_eq!(result.counts.market_data_refreshed, 6);
        assert_eq!(h.cache.count_latest().unwrap(), 6);
    }

    #[tokio::test]
    async fn test_cache_write_failure_aborts_only_that_unit() {
        let h = harness(MockProvider::with_variants(5), test_config());
        h.cache.fail_writes_for(&variant_key(3));

        let result = h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();

        assert!(result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].variant_id.as_deref(), Some("v-3"));
        assert_eq!(result.counts.market_data_refreshed, 4);
        assert_eq!(h.cache.count_latest().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_unparseable_prices_are_counted() {
        let mut provider = MockProvider::with_variants(2);
        provider.unparseable = 1;
        let h = harness(provider, test_config());

        let result = h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();

        assert!(result.success);
        assert_eq!(result.counts.unparseable_prices, 2);
    }

    // =========================================================================
    // Critical stages
    // =========================================================================

    #[tokio::test]
    async fn test_catalog_search_failure_aborts() {
        let mut provider = MockProvider::with_variants(3);
        provider.search_fails = true;
        let h = harness(provider, test_config());

        let result = h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].stage, SyncStage::CatalogSearch);
        assert_eq!(h.provider.calls_to("product"), 0);
        assert_eq!(h.provider.calls_to("market"), 0);
        assert_eq!(h.cache.count_latest().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_no_catalog_match_is_critical_not_found() {
        let mut provider = MockProvider::with_variants(3);
        provider.hits.clear();
        let h = harness(provider, test_config());

        let result = h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.errors[0].stage, SyncStage::CatalogSearch);
        assert_eq!(result.errors[0].failure_class, Some(FailureClass::NotFound));
        assert!(h.catalog.item(SKU).is_none());
    }

    #[tokio::test]
    async fn test_zero_variants_is_hard_failure() {
        let h = harness(MockProvider::with_variants(0), test_config());

        let result = h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].stage, SyncStage::Variants);
        assert_eq!(h.provider.calls_to("market"), 0);
    }

    #[tokio::test]
    async fn test_missing_credentials_propagate() {
        let mut provider = MockProvider::with_variants(3);
        provider.credentials_ok = false;
        let h = harness(provider, test_config());

        let err = h.service.sync_item(&SyncRequest::new(SKU)).await.unwrap_err();

        assert!(matches!(err, crate::Error::MarketData(MarketDataError::Unauthorized { .. })));
        assert_eq!(h.provider.calls_to("search"), 0);
    }

    #[tokio::test]
    async fn test_blank_sku_is_rejected() {
        let h = harness(MockProvider::with_variants(1), test_config());
        assert!(h.service.sync_item(&SyncRequest::new("   ")).await.is_err());
    }

    // =========================================================================
    // Deadline
    // =========================================================================

    #[tokio::test]
    async fn test_passed_deadline_skips_every_batch() {
        let h = harness(MockProvider::with_variants(7), test_config());

        let result = h
            .service
            .sync_item(&SyncRequest::new(SKU).with_deadline(Instant::now()))
            .await
            .unwrap();

        assert!(result.deadline_reached);
        assert_eq!(result.counts.skipped, 7);
        assert_eq!(result.counts.market_data_refreshed, 0);
        assert!(!result.success);
        assert!(result.errors.is_empty());
        assert_eq!(h.provider.calls_to("market"), 0);
    }

    #[tokio::test]
    async fn test_distant_deadline_processes_everything() {
        let h = harness(MockProvider::with_variants(7), test_config());

        let result = h
            .service
            .sync_item(
                &SyncRequest::new(SKU).with_deadline(Instant::now() + StdDuration::from_secs(60)),
            )
            .await
            .unwrap();

        assert!(!result.deadline_reached);
        assert_eq!(result.counts.skipped, 0);
        assert_eq!(result.counts.market_data_refreshed, 7);
    }

    #[tokio::test]
    async fn test_deadline_stops_between_batches() {
        // Two batches of five at 200ms spacing; the budget fits only the first.
        let config = SyncConfig {
            rate_limit_interval: StdDuration::from_millis(200),
            batch_size: 5,
            ..test_config()
        };
        let h = harness(MockProvider::with_variants(10), config);
        let deadline = Instant::now() + StdDuration::from_millis(1500);

        let result = h
            .service
            .sync_item(&SyncRequest::new(SKU).with_deadline(deadline))
            .await
            .unwrap();

        assert!(result.deadline_reached);
        assert_eq!(result.counts.market_data_refreshed, 5);
        assert_eq!(result.counts.skipped, 5);
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_provider_rate_limit_floors_pacing_and_batch_size() {
        // Config asks for no spacing and batches of ten; the provider needs
        // 200ms spacing and at most five at once, so only one batch fits.
        let config = SyncConfig {
            rate_limit_interval: StdDuration::ZERO,
            batch_size: 10,
            ..test_config()
        };
        let mut provider = MockProvider::with_variants(10);
        provider.rate_limit = RateLimit {
            min_interval: StdDuration::from_millis(200),
            max_concurrency: 5,
        };
        let h = harness(provider, config);
        let deadline = Instant::now() + StdDuration::from_millis(1500);

        let result = h
            .service
            .sync_item(&SyncRequest::new(SKU).with_deadline(deadline))
            .await
            .unwrap();

        assert!(result.deadline_reached);
        assert_eq!(result.counts.market_data_refreshed, 5);
        assert_eq!(result.counts.skipped, 5);
    }
}
