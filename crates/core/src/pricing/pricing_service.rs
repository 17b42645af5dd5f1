use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use flipledger_market_data::Marketplace;
use log::debug;
use rust_decimal::Decimal;

use super::fees::FeeProfile;
use super::fx::FxRates;
use super::pricing_model::{MarketplaceQuote, PricingInput, PricingResult};
use super::resolver::resolve_pricing;
use crate::catalog::{
    normalize_size_label, normalize_sku, size_keys_match, CatalogItem, CatalogRepositoryTrait, Variant,
};
use crate::errors::{Error, Result, ValidationError};
use crate::market_data::{MarketCacheStore, PriceHistoryEntry};

/// Where fee schedules and FX multipliers come from.
pub trait FeeConfigSource: Send + Sync {
    fn fee_profile(&self) -> Result<FeeProfile>;
    fn fx_rates(&self) -> Result<FxRates>;
}

/// Fee and FX configuration fixed at startup.
#[derive(Debug, Clone)]
pub struct StaticFeeConfig {
    profile: FeeProfile,
    fx: FxRates,
}

impl StaticFeeConfig {
    pub fn new(profile: FeeProfile, fx: FxRates) -> Self {
        Self { profile, fx }
    }
}

impl FeeConfigSource for StaticFeeConfig {
    fn fee_profile(&self) -> Result<FeeProfile> {
        Ok(self.profile.clone())
    }

    fn fx_rates(&self) -> Result<FxRates> {
        Ok(self.fx.clone())
    }
}

/// Read path for pricing: cached snapshots in, [`PricingResult`] out.
///
/// Never calls a marketplace. Snapshots older than the pricing TTL count as
/// no data.
pub struct PricingService<C, M>
where
    C: CatalogRepositoryTrait,
    M: MarketCacheStore,
{
    catalog_repo: Arc<C>,
    cache_store: Arc<M>,
    fee_config: Arc<dyn FeeConfigSource>,
    pricing_ttl: Duration,
}

impl<C, M> PricingService<C, M>
where
    C: CatalogRepositoryTrait,
    M: MarketCacheStore,
{
    pub fn new(
        catalog_repo: Arc<C>,
        cache_store: Arc<M>,
        fee_config: Arc<dyn FeeConfigSource>,
        pricing_ttl: Duration,
    ) -> Self {
        Self {
            catalog_repo,
            cache_store,
            fee_config,
            pricing_ttl,
        }
    }

    pub fn price_item(
        &self,
        sku: &str,
        size: &str,
        cost_basis: Option<Decimal>,
    ) -> Result<PricingResult> {
        self.price_item_at(sku, size, cost_basis, Utc::now())
    }

    pub fn price_item_at(
        &self,
        sku: &str,
        size: &str,
        cost_basis: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<PricingResult> {
        let item = self.require_item(sku)?;
        let variants = self.matching_variants(&item.sku, size)?;
        let keys: Vec<String> = variants.iter().map(|v| v.id.clone()).collect();

        let quotes: Vec<MarketplaceQuote> = if keys.is_empty() {
            Vec::new()
        } else {
            self.cache_store
                .latest_for_variants(&keys)?
                .iter()
                .filter(|s| s.has_prices() && s.is_fresh(now, self.pricing_ttl))
                .map(MarketplaceQuote::from)
                .collect()
        };
        debug!(
            "Pricing {} size {}: {} variants, {} fresh quotes",
            item.sku,
            size,
            variants.len(),
            quotes.len()
        );

        let input = PricingInput {
            quotes,
            cost_basis,
            fees: self.fee_config.fee_profile()?,
            fx: self.fee_config.fx_rates()?,
        };
        Ok(resolve_pricing(&input))
    }

    /// Daily history for one size in one currency, across marketplaces,
    /// ordered by day then marketplace.
    pub fn history(
        &self,
        sku: &str,
        size: &str,
        currency: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceHistoryEntry>> {
        if from > to {
            return Err(ValidationError::InvalidInput(format!(
                "History range starts after it ends: {} > {}",
                from, to
            ))
            .into());
        }
        let item = self.require_item(sku)?;
        let currency = currency.trim().to_uppercase();

        let mut rows = Vec::new();
        for variant in self.matching_variants(&item.sku, size)? {
            rows.extend(
                self.cache_store
                    .history_range(&variant.id, &currency, from, to)?,
            );
        }
        rows.sort_by(|a, b| a.day.cmp(&b.day).then(a.marketplace.cmp(&b.marketplace)));
        Ok(rows)
    }

    fn require_item(&self, sku: &str) -> Result<CatalogItem> {
        let sku = normalize_sku(sku);
        if sku.is_empty() {
            return Err(ValidationError::MissingField("sku".to_string()).into());
        }
        self.catalog_repo
            .get_item(&sku)?
            .ok_or_else(|| Error::NotFound(format!("Catalog item {}", sku)))
    }

    fn matching_variants(&self, sku: &str, size: &str) -> Result<Vec<Variant>> {
        let size_key = normalize_size_label(size);
        if size_key.is_empty() {
            return Err(ValidationError::MissingField("size".to_string()).into());
        }
        let mut matched = Vec::new();
        for marketplace in Marketplace::ALL {
            matched.extend(
                self.catalog_repo
                    .list_variants(sku, marketplace)?
                    .into_iter()
                    .filter(|v| size_keys_match(&v.size_key, &size_key)),
            );
        }
        Ok(matched)
    }
}
