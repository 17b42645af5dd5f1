//! Pricing inputs and results.

use chrono::{DateTime, Utc};
use flipledger_market_data::Marketplace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fees::FeeProfile;
use super::fx::FxRates;
use crate::market_data::MarketSnapshot;

/// One marketplace's latest prices, in the marketplace's own currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceQuote {
    pub marketplace: Marketplace,
    pub currency: String,
    pub lowest_ask: Option<Decimal>,
    pub highest_bid: Option<Decimal>,
    pub captured_at: DateTime<Utc>,
}

impl From<&MarketSnapshot> for MarketplaceQuote {
    fn from(snapshot: &MarketSnapshot) -> Self {
        Self {
            marketplace: snapshot.marketplace,
            currency: snapshot.currency.clone(),
            lowest_ask: snapshot.lowest_ask,
            highest_bid: snapshot.highest_bid,
            captured_at: snapshot.captured_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PricingInput {
    pub quotes: Vec<MarketplaceQuote>,
    pub cost_basis: Option<Decimal>,
    pub fees: FeeProfile,
    pub fx: FxRates,
}

/// Net proceeds on one marketplace, in the display currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceNet {
    pub marketplace: Marketplace,
    pub source_currency: String,
    pub sale_price: Decimal,
    pub net_proceeds: Decimal,
    pub captured_at: DateTime<Utc>,
}

/// Derived on every read, never cached. Every scalar is `None` when no
/// marketplace has usable data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub best_platform_to_sell: Option<Marketplace>,
    pub best_net_proceeds: Option<Decimal>,
    pub currency: Option<String>,
    pub real_profit: Option<Decimal>,
    pub real_profit_percent: Option<Decimal>,
    pub marketplaces: Vec<MarketplaceNet>,
}
