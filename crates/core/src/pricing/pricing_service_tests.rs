//! Tests for the pricing read path.

#[cfg(test)]
mod tests {
    use crate::catalog::{CatalogItem, CatalogRepositoryTrait, Variant};
    use crate::errors::Result;
    use crate::market_data::{MarketCacheStore, MarketSnapshot, PriceHistoryEntry};
    use crate::pricing::{FeeProfile, FeeSchedule, FxRates, PricingService, StaticFeeConfig};
    use crate::Error;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use flipledger_market_data::{Marketplace, VariantInfo};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    // =========================================================================
    // Mocks
    // =========================================================================

    #[derive(Default)]
    struct MockCatalogRepo {
        items: Mutex<Vec<CatalogItem>>,
        variants: Mutex<Vec<Variant>>,
    }

    #[async_trait]
    impl CatalogRepositoryTrait for MockCatalogRepo {
        fn get_item(&self, sku: &str) -> Result<Option<CatalogItem>> {
            Ok(self.items.lock().unwrap().iter().find(|i| i.sku == sku).cloned())
        }

        fn list_items_due(&self, limit: usize) -> Result<Vec<CatalogItem>> {
            let mut items = self.items.lock().unwrap().clone();
            items.truncate(limit);
            Ok(items)
        }

        fn list_variants(&self, sku: &str, marketplace: Marketplace) -> Result<Vec<Variant>> {
            Ok(self
                .variants
                .lock()
                .unwrap()
                .iter()
                .filter(|v| v.sku == sku && v.marketplace == marketplace)
                .cloned()
                .collect())
        }

        async fn upsert_item(&self, item: CatalogItem) -> Result<CatalogItem> {
            self.items.lock().unwrap().push(item.clone());
            Ok(item)
        }

        async fn upsert_variants(&self, variants: Vec<Variant>) -> Result<usize> {
            let count = variants.len();
            self.variants.lock().unwrap().extend(variants);
            Ok(count)
        }

        async fn touch_synced(&self, _sku: &str, _at: DateTime<Utc>) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockCacheStore {
        latest: Mutex<Vec<MarketSnapshot>>,
        history: Mutex<Vec<PriceHistoryEntry>>,
    }

    #[async_trait]
    impl MarketCacheStore for MockCacheStore {
        fn find_latest(&self, variant_key: &str, currency: &str) -> Result<Option<MarketSnapshot>> {
            Ok(self
                .latest
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.variant_key == variant_key && s.currency == currency)
                .cloned())
        }

        fn latest_for_variants(&self, variant_keys: &[String]) -> Result<Vec<MarketSnapshot>> {
            Ok(self
                .latest
                .lock()
                .unwrap()
                .iter()
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
                .iter()
                .filter(|h| h.variant_key == variant_key && h.currency == currency)
                .filter(|h| h.day >= from && h.day <= to)
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
            let mut latest = self.latest.lock().unwrap();
            latest.retain(|s| s.id != snapshot.id);
            latest.push(snapshot.clone());
            Ok(())
        }

        async fn upsert_history_day(&self, entry: &PriceHistoryEntry) -> Result<()> {
            let mut history = self.history.lock().unwrap();
            history.retain(|h| h.id != entry.id);
            history.push(entry.clone());
            Ok(())
        }
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    const SKU: &str = "DD1391-100";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn variant(marketplace: Marketplace, catalog_id: &str, variant_id: &str, size: &str) -> Variant {
        Variant::from_info(
            SKU,
            marketplace,
            catalog_id,
            VariantInfo {
                variant_id: variant_id.to_string(),
                size_label: size.to_string(),
                barcodes: vec![],
            },
        )
    }

    fn snapshot(
        variant: &Variant,
        currency: &str,
        ask: Option<Decimal>,
        age: Duration,
    ) -> MarketSnapshot {
        let captured_at = now() - age;
        MarketSnapshot {
            id: MarketSnapshot::make_id(&variant.id, currency),
            variant_key: variant.id.clone(),
            sku: variant.sku.clone(),
            marketplace: variant.marketplace,
            currency: currency.to_string(),
            lowest_ask: ask,
            highest_bid: None,
            last_sale: None,
            captured_at,
            updated_at: captured_at,
            expires_at: captured_at + Duration::hours(1),
        }
    }

    struct Harness {
        catalog: Arc<MockCatalogRepo>,
        cache: Arc<MockCacheStore>,
        service: PricingService<MockCatalogRepo, MockCacheStore>,
        stockx_10: Variant,
        alias_10: Variant,
    }

    async fn harness() -> Harness {
        let catalog = Arc::new(MockCatalogRepo::default());
        let cache = Arc::new(MockCacheStore::default());
        catalog.upsert_item(CatalogItem::new(SKU)).await.unwrap();

        let stockx_10 = variant(Marketplace::StockX, "p-1", "v-10", "US M 10");
        let stockx_11 = variant(Marketplace::StockX, "p-1", "v-11", "US M 11");
        let alias_10 = variant(Marketplace::Alias, "a-1", "10", "10");
        catalog
            .upsert_variants(vec![stockx_10.clone(), stockx_11, alias_10.clone()])
            .await
            .unwrap();

        let fees = StaticFeeConfig::new(
            FeeProfile::new(FeeSchedule::new(dec!(10)), FeeSchedule::new(dec!(5))),
            FxRates::new("USD").with_rate("EUR", dec!(1.10)),
        );
        let service = PricingService::new(
            catalog.clone(),
            cache.clone(),
            Arc::new(fees),
            Duration::hours(24),
        );

        Harness {
            catalog,
            cache,
            service,
            stockx_10,
            alias_10,
        }
    }

    // =========================================================================
    // Tests
    // =========================================================================

    #[tokio::test]
    async fn test_prices_size_across_marketplaces() {
        let h = harness().await;
        h.cache
            .upsert_latest(&snapshot(&h.stockx_10, "USD", Some(dec!(100)), Duration::hours(1)))
            .await
            .unwrap();
        h.cache
            .upsert_latest(&snapshot(&h.alias_10, "USD", Some(dec!(90)), Duration::hours(1)))
            .await
            .unwrap();

        let result = h
            .service
            .price_item_at("dd1391-100", "10", Some(dec!(60)), now())
            .unwrap();

        assert_eq!(result.best_platform_to_sell, Some(Marketplace::StockX));
        assert_eq!(result.best_net_proceeds, Some(dec!(90.00)));
        assert_eq!(result.real_profit, Some(dec!(30.00)));
        assert_eq!(result.marketplaces.len(), 2);
    }

    #[tokio::test]
    async fn test_size_labels_match_across_formats() {
        let h = harness().await;
        h.cache
            .upsert_latest(&snapshot(&h.alias_10, "USD", Some(dec!(200)), Duration::minutes(5)))
            .await
            .unwrap();

        let result = h.service.price_item_at(SKU, "US 10.0", None, now()).unwrap();
        assert_eq!(result.best_platform_to_sell, Some(Marketplace::Alias));
        assert_eq!(result.best_net_proceeds, Some(dec!(190.00)));

        let other_size = h.service.price_item_at(SKU, "11", None, now()).unwrap();
        assert_eq!(other_size.best_platform_to_sell, None);
    }

    #[tokio::test]
    async fn test_size_of_other_gender_is_not_priced() {
        let h = harness().await;
        h.cache
            .upsert_latest(&snapshot(&h.stockx_10, "USD", Some(dec!(100)), Duration::hours(1)))
            .await
            .unwrap();
        h.cache
            .upsert_latest(&snapshot(&h.alias_10, "USD", Some(dec!(90)), Duration::hours(1)))
            .await
            .unwrap();

        // "US M 10" on StockX is a different shoe; Alias' bare "10" still matches.
        let result = h.service.price_item_at(SKU, "US W 10", None, now()).unwrap();

        assert_eq!(result.best_platform_to_sell, Some(Marketplace::Alias));
        assert_eq!(result.marketplaces.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_snapshots_count_as_no_data() {
        let h = harness().await;
        h.cache
            .upsert_latest(&snapshot(&h.stockx_10, "USD", Some(dec!(100)), Duration::hours(24)))
            .await
            .unwrap();
        h.cache
            .upsert_latest(&snapshot(&h.alias_10, "USD", Some(dec!(95)), Duration::hours(2)))
            .await
            .unwrap();

        let result = h.service.price_item_at(SKU, "10", None, now()).unwrap();

        assert_eq!(result.best_platform_to_sell, Some(Marketplace::Alias));
        assert_eq!(result.marketplaces.len(), 1);
    }

    #[tokio::test]
    async fn test_known_item_without_data_yields_nulls() {
        let h = harness().await;
        h.cache
            .upsert_latest(&snapshot(&h.stockx_10, "USD", None, Duration::minutes(1)))
            .await
            .unwrap();

        let result = h
            .service
            .price_item_at(SKU, "10", Some(dec!(100)), now())
            .unwrap();

        assert_eq!(result.best_platform_to_sell, None);
        assert_eq!(result.best_net_proceeds, None);
        assert_eq!(result.real_profit, None);
        assert_eq!(result.real_profit_percent, None);
    }

    #[tokio::test]
    async fn test_unknown_sku_is_not_found() {
        let h = harness().await;
        let err = h.service.price_item_at("NOPE-1", "10", None, now()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_blank_size_is_rejected() {
        let h = harness().await;
        let err = h.service.price_item_at(SKU, "  ", None, now()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_foreign_currency_snapshot_is_converted() {
        let h = harness().await;
        h.cache
            .upsert_latest(&snapshot(&h.stockx_10, "EUR", Some(dec!(100)), Duration::minutes(1)))
            .await
            .unwrap();

        let result = h.service.price_item_at(SKU, "10", None, now()).unwrap();

        assert_eq!(result.currency.as_deref(), Some("USD"));
        assert_eq!(result.marketplaces[0].sale_price, dec!(110.00));
        assert_eq!(result.best_net_proceeds, Some(dec!(99.00)));
    }

    #[tokio::test]
    async fn test_history_merges_marketplaces_by_day() {
        let h = harness().await;
        for (variant, days_ago, ask) in [
            (&h.stockx_10, 2, dec!(100)),
            (&h.alias_10, 2, dec!(95)),
            (&h.stockx_10, 1, dec!(104)),
            (&h.stockx_10, 9, dec!(80)),
        ] {
            let snap = snapshot(variant, "USD", Some(ask), Duration::days(days_ago));
            h.cache
                .upsert_history_day(&PriceHistoryEntry::from_snapshot(&snap))
                .await
                .unwrap();
        }

        let from = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let rows = h.service.history(SKU, "10", "usd", from, to).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].marketplace, Marketplace::StockX);
        assert_eq!(rows[1].marketplace, Marketplace::Alias);
        assert_eq!(rows[0].day, rows[1].day);
        assert_eq!(rows[2].lowest_ask, Some(dec!(104)));

        assert!(h.service.history(SKU, "10", "USD", to, from).is_err());
        assert_eq!(h.catalog.list_items_due(10).unwrap().len(), 1);
    }
}
