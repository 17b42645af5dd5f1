use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use flipledger_core::{
    pricing::{AliasRegion, FeeProfile, FeeSchedule, FxRates, PricingService, StaticFeeConfig},
    sync::{
        CoveragePolicy, CurrencyCoverage, MarketSyncService, MarketSyncServiceTrait,
        ScheduledSync, SyncConfig,
    },
};
use flipledger_market_data::{
    AliasProvider, Marketplace, MarketplaceProvider, RateLimiter, StaticCredentials,
    StockXProvider,
};
use flipledger_storage_sqlite::{
    db, CatalogRepository, MarketCacheRepository, SyncRunRepository,
};

pub type AppScheduledSync = ScheduledSync<CatalogRepository, SyncRunRepository>;
pub type AppPricingService = PricingService<CatalogRepository, MarketCacheRepository>;

pub struct AppState {
    pub scheduled_sync: Arc<AppScheduledSync>,
    pub pricing_service: Arc<AppPricingService>,
    pub run_store: Arc<SyncRunRepository>,
    /// Marketplaces with credentials configured, in sync order.
    pub marketplaces: Vec<Marketplace>,
    pub primary_currency: String,
    /// Interactive syncs must finish inside this.
    pub request_timeout: Duration,
    pub sync_budget: Duration,
    pub sync_max_items: usize,
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("FL_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

fn sync_config(config: &Config) -> SyncConfig {
    SyncConfig {
        primary_currency: config.primary_currency.clone(),
        coverage: if config.sync_all_currencies {
            CurrencyCoverage::All
        } else {
            CurrencyCoverage::Primary
        },
        batch_size: config.sync_batch_size,
        rate_limit_interval: config.rate_limit_interval,
        market_ttl: chrono::Duration::seconds(config.market_ttl_secs),
        coverage_policy: CoveragePolicy {
            small_run_cutoff: config.coverage_small_run,
            min_success_percent: config.coverage_min_percent,
        },
    }
}

fn fee_config(config: &Config) -> anyhow::Result<StaticFeeConfig> {
    let region: AliasRegion = config.alias_region.parse()?;

    let mut fx = FxRates::new(&config.display_currency);
    fx.multipliers
        .extend(FxRates::parse_multipliers(&config.fx_multipliers)?);

    let profile = FeeProfile::new(
        FeeSchedule::stockx_level(config.stockx_seller_level).with_shipping(config.shipping_cost),
        FeeSchedule::alias_in(region, &fx)?.with_shipping(config.shipping_cost),
    );

    Ok(StaticFeeConfig::new(profile, fx))
}

/// Build the marketplace providers that have credentials. The others are
/// left out of scheduled runs rather than failing every one of them.
fn providers(config: &Config, limiter: Arc<RateLimiter>) -> Vec<Arc<dyn MarketplaceProvider>> {
    let mut credentials = StaticCredentials::new();
    if let Some(token) = &config.stockx_token {
        credentials = credentials.with_token(Marketplace::StockX, token.clone());
    }
    if let Some(token) = &config.alias_token {
        credentials = credentials.with_token(Marketplace::Alias, token.clone());
    }
    let credentials = Arc::new(credentials);

    let mut providers: Vec<Arc<dyn MarketplaceProvider>> = Vec::new();
    match (&config.stockx_api_key, credentials.has_token(Marketplace::StockX)) {
        (Some(api_key), true) => providers.push(Arc::new(StockXProvider::new(
            api_key.clone(),
            limiter.clone(),
            credentials.clone(),
        ))),
        _ => tracing::warn!("StockX sync disabled: FL_STOCKX_API_KEY and FL_STOCKX_TOKEN are required"),
    }
    if credentials.has_token(Marketplace::Alias) {
        providers.push(Arc::new(AliasProvider::new(limiter, credentials.clone())));
    } else {
        tracing::warn!("Alias sync disabled: FL_ALIAS_TOKEN is not set");
    }
    providers
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer(pool.as_ref().clone());

    let catalog_repo = Arc::new(CatalogRepository::new(pool.clone(), writer.clone()));
    let cache_store = Arc::new(MarketCacheRepository::new(pool.clone(), writer.clone()));
    let run_store = Arc::new(SyncRunRepository::new(pool.clone(), writer.clone()));

    let limiter = Arc::new(RateLimiter::with_interval(config.rate_limit_interval));
    let sync_config = sync_config(config);
    let services: Vec<Arc<dyn MarketSyncServiceTrait>> = providers(config, limiter)
        .into_iter()
        .map(|provider| {
            Arc::new(MarketSyncService::new(
                provider,
                catalog_repo.clone(),
                cache_store.clone(),
                sync_config.clone(),
            )) as Arc<dyn MarketSyncServiceTrait>
        })
        .collect();
    let marketplaces = services.iter().map(|s| s.marketplace()).collect();

    let scheduled_sync = Arc::new(ScheduledSync::new(
        catalog_repo.clone(),
        run_store.clone(),
        services,
    ));

    let pricing_service = Arc::new(PricingService::new(
        catalog_repo,
        cache_store,
        Arc::new(fee_config(config)?),
        chrono::Duration::seconds(config.pricing_ttl_secs),
    ));

    Ok(Arc::new(AppState {
        scheduled_sync,
        pricing_service,
        run_store,
        marketplaces,
        primary_currency: config.primary_currency.clone(),
        request_timeout: config.request_timeout,
        sync_budget: config.sync_budget,
        sync_max_items: config.sync_max_items,
    }))
}
