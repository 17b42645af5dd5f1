//! Defaults shared by the fetcher and providers.

use std::time::Duration;

/// Spacing between requests on one marketplace account. Chosen to stay just
/// under a one-request-per-second published limit.
pub const DEFAULT_RATE_LIMIT_INTERVAL: Duration = Duration::from_millis(1100);

/// Maximum in-flight requests within one batch.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// HTTP request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Account key used when a marketplace is configured with a single account.
pub const DEFAULT_ACCOUNT: &str = "default";
