use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use rust_decimal::Decimal;

use flipledger_core::constants::{
    DEFAULT_DISPLAY_CURRENCY, DEFAULT_MARKET_TTL_SECS, DEFAULT_MIN_SUCCESS_PERCENT,
    DEFAULT_PRICING_TTL_SECS, DEFAULT_PRIMARY_CURRENCY, DEFAULT_RATE_LIMIT_INTERVAL_MS,
    DEFAULT_SMALL_RUN_CUTOFF, DEFAULT_SYNC_BATCH_SIZE, DEFAULT_SYNC_BUDGET_SECS,
    DEFAULT_SYNC_MAX_ITEMS,
};

const DEFAULT_FX_MULTIPLIERS: &str = "EUR=1.08,GBP=1.27";

/// Server configuration, read once from `FL_*` environment variables
/// (a `.env` file is honoured).
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,

    pub stockx_api_key: Option<String>,
    pub stockx_token: Option<String>,
    pub alias_token: Option<String>,

    pub primary_currency: String,
    pub sync_all_currencies: bool,
    pub sync_batch_size: usize,
    pub rate_limit_interval: Duration,
    pub market_ttl_secs: i64,
    pub pricing_ttl_secs: i64,
    pub coverage_min_percent: u32,
    pub coverage_small_run: usize,

    /// Zero disables the background scheduler.
    pub sync_interval: Duration,
    pub sync_initial_delay: Duration,
    pub sync_budget: Duration,
    pub sync_max_items: usize,

    pub display_currency: String,
    /// `CCY=multiplier` pairs, parsed when state is built.
    pub fx_multipliers: String,
    pub stockx_seller_level: u8,
    pub alias_region: String,
    pub shipping_cost: Decimal,
}

fn var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(name) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid {}: '{}'", name, raw)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let cors_allow = var("FL_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            listen_addr: parse_var("FL_LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            db_path: var("FL_DB_PATH").unwrap_or_else(|| "./db/app.db".into()),
            cors_allow,
            request_timeout: Duration::from_millis(parse_var("FL_REQUEST_TIMEOUT_MS", 30_000)?),

            stockx_api_key: var("FL_STOCKX_API_KEY"),
            stockx_token: var("FL_STOCKX_TOKEN"),
            alias_token: var("FL_ALIAS_TOKEN"),

            primary_currency: var("FL_PRIMARY_CURRENCY")
                .unwrap_or_else(|| DEFAULT_PRIMARY_CURRENCY.into())
                .to_uppercase(),
            sync_all_currencies: parse_var("FL_SYNC_ALL_CURRENCIES", false)?,
            sync_batch_size: parse_var("FL_SYNC_BATCH_SIZE", DEFAULT_SYNC_BATCH_SIZE)?.max(1),
            rate_limit_interval: Duration::from_millis(parse_var(
                "FL_RATE_LIMIT_INTERVAL_MS",
                DEFAULT_RATE_LIMIT_INTERVAL_MS,
            )?),
            market_ttl_secs: parse_var("FL_MARKET_TTL_SECS", DEFAULT_MARKET_TTL_SECS)?,
            pricing_ttl_secs: parse_var("FL_PRICING_TTL_SECS", DEFAULT_PRICING_TTL_SECS)?,
            coverage_min_percent: parse_var("FL_COVERAGE_MIN_PERCENT", DEFAULT_MIN_SUCCESS_PERCENT)?
                .min(100),
            coverage_small_run: parse_var("FL_COVERAGE_SMALL_RUN", DEFAULT_SMALL_RUN_CUTOFF)?,

            sync_interval: Duration::from_secs(parse_var("FL_SYNC_INTERVAL_SECS", 3_600)?),
            sync_initial_delay: Duration::from_secs(parse_var("FL_SYNC_INITIAL_DELAY_SECS", 60)?),
            sync_budget: Duration::from_secs(parse_var(
                "FL_SYNC_BUDGET_SECS",
                DEFAULT_SYNC_BUDGET_SECS,
            )?),
            sync_max_items: parse_var("FL_SYNC_MAX_ITEMS", DEFAULT_SYNC_MAX_ITEMS)?,

            display_currency: var("FL_DISPLAY_CURRENCY")
                .unwrap_or_else(|| DEFAULT_DISPLAY_CURRENCY.into())
                .to_uppercase(),
            fx_multipliers: var("FL_FX_MULTIPLIERS").unwrap_or_else(|| DEFAULT_FX_MULTIPLIERS.into()),
            stockx_seller_level: parse_var("FL_STOCKX_SELLER_LEVEL", 1)?,
            alias_region: var("FL_ALIAS_REGION").unwrap_or_else(|| "us".into()),
            shipping_cost: parse_var("FL_SHIPPING_COST", Decimal::ZERO)?,
        })
    }
}
