//! Provider capabilities and rate limiting configuration.

use std::time::Duration;

use crate::constants::{DEFAULT_MAX_CONCURRENCY, DEFAULT_RATE_LIMIT_INTERVAL};
use crate::models::PriceUnit;

/// Describes what a marketplace provider can do.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    /// ISO 4217 codes the marketplace can quote in. The first entry is its
    /// native currency.
    pub currencies: &'static [&'static str],

    /// Unit of the marketplace's raw price fields.
    pub price_unit: PriceUnit,

    /// Whether market data includes the last sale price.
    pub supports_last_sale: bool,
}

impl ProviderCapabilities {
    pub fn native_currency(&self) -> &'static str {
        self.currencies.first().copied().unwrap_or("USD")
    }

    pub fn supports_currency(&self, currency: &str) -> bool {
        self.currencies
            .iter()
            .any(|c| c.eq_ignore_ascii_case(currency))
    }
}

/// Rate limiting configuration for a provider.
#[derive(Clone, Debug)]
pub struct RateLimit {
    /// Minimum spacing between requests on one account.
    pub min_interval: Duration,

    /// Maximum concurrent requests within a batch.
    pub max_concurrency: usize,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_RATE_LIMIT_INTERVAL,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_currency_is_case_insensitive() {
        let caps = ProviderCapabilities {
            currencies: &["USD", "EUR"],
            price_unit: PriceUnit::Major,
            supports_last_sale: false,
        };
        assert!(caps.supports_currency("eur"));
        assert!(!caps.supports_currency("GBP"));
        assert_eq!(caps.native_currency(), "USD");
    }
}
