/// Primary currency when none is configured.
pub const DEFAULT_PRIMARY_CURRENCY: &str = "USD";

/// Display currency for pricing when none is configured.
pub const DEFAULT_DISPLAY_CURRENCY: &str = "USD";

/// Members per market data batch.
pub const DEFAULT_SYNC_BATCH_SIZE: usize = 5;

/// Spacing between requests on one marketplace account, in milliseconds.
pub const DEFAULT_RATE_LIMIT_INTERVAL_MS: u64 = 1100;

/// A cached snapshot younger than this is not refetched.
pub const DEFAULT_MARKET_TTL_SECS: i64 = 3600;

/// A snapshot older than this is treated as missing when pricing.
pub const DEFAULT_PRICING_TTL_SECS: i64 = 86_400;

/// Below this many variants every primary-currency fetch must succeed.
pub const DEFAULT_SMALL_RUN_CUTOFF: usize = 4;

/// Minimum primary-currency success rate for larger size runs.
pub const DEFAULT_MIN_SUCCESS_PERCENT: u32 = 50;

/// Wall-clock budget for one scheduled sync invocation.
pub const DEFAULT_SYNC_BUDGET_SECS: u64 = 240;

/// Catalog items per scheduled sync invocation.
pub const DEFAULT_SYNC_MAX_ITEMS: usize = 25;

