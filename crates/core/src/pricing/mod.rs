//! Unified price resolver: fee schedules, FX, and the best-place-to-sell read path.

mod fees;
mod fx;
mod pricing_model;
mod pricing_service;
mod resolver;

#[cfg(test)]
mod pricing_service_tests;

pub use fees::{AliasRegion, FeeProfile, FeeSchedule};
pub use fx::FxRates;
pub use pricing_model::{MarketplaceNet, MarketplaceQuote, PricingInput, PricingResult};
pub use pricing_service::{FeeConfigSource, PricingService, StaticFeeConfig};
pub use resolver::resolve_pricing;
