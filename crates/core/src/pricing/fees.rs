//! Marketplace fee schedules.

use std::fmt;
use std::str::FromStr;

use flipledger_market_data::{round_price, Marketplace};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::FxRates;
use crate::errors::{Error, Result};

const HUNDRED: Decimal = dec!(100);

/// StockX transaction fee by seller level 1..=5.
const STOCKX_LEVEL_FEES: [Decimal; 5] = [dec!(9.0), dec!(8.5), dec!(8.0), dec!(7.5), dec!(7.0)];
const STOCKX_PROCESSING_PERCENT: Decimal = dec!(3.0);

const ALIAS_COMMISSION_PERCENT: Decimal = dec!(9.5);
/// Alias quotes its regional seller fee in this currency.
const ALIAS_FEE_CURRENCY: &str = "USD";

/// Fees a marketplace takes from one sale. Flat amounts are in the display currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSchedule {
    /// Commission / transaction fee, percent of the sale price.
    pub percent_fee: Decimal,
    /// Payment processing, percent of the sale price.
    pub payment_processing_percent: Decimal,
    /// Fixed per-sale fee.
    pub flat_fee: Decimal,
    /// Seller-paid shipping.
    pub shipping_cost: Decimal,
}

impl FeeSchedule {
    pub fn new(percent_fee: Decimal) -> Self {
        Self {
            percent_fee,
            payment_processing_percent: Decimal::ZERO,
            flat_fee: Decimal::ZERO,
            shipping_cost: Decimal::ZERO,
        }
    }

    /// StockX seller level schedule. Levels outside 1..=5 clamp to the nearest one.
    pub fn stockx_level(level: u8) -> Self {
        let index = level.clamp(1, 5) as usize - 1;
        Self {
            percent_fee: STOCKX_LEVEL_FEES[index],
            payment_processing_percent: STOCKX_PROCESSING_PERCENT,
            flat_fee: Decimal::ZERO,
            shipping_cost: Decimal::ZERO,
        }
    }

    /// Alias commission plus the regional seller fee, for a USD display currency.
    pub fn alias(region: AliasRegion) -> Self {
        Self {
            percent_fee: ALIAS_COMMISSION_PERCENT,
            payment_processing_percent: Decimal::ZERO,
            flat_fee: region.seller_fee(),
            shipping_cost: Decimal::ZERO,
        }
    }

    /// Alias schedule with the seller fee converted from USD into `fx`'s display
    /// currency. Fails when there is no USD multiplier.
    pub fn alias_in(region: AliasRegion, fx: &FxRates) -> Result<Self> {
        let fee = fx
            .convert(region.seller_fee(), ALIAS_FEE_CURRENCY)
            .ok_or_else(|| {
                Error::InvalidConfigValue(format!(
                    "Alias seller fee is in {} but there is no {} multiplier for display currency {}",
                    ALIAS_FEE_CURRENCY, ALIAS_FEE_CURRENCY, fx.display_currency
                ))
            })?;
        Ok(Self::alias(region).with_flat_fee(round_price(fee)))
    }

    pub fn with_shipping(mut self, shipping_cost: Decimal) -> Self {
        self.shipping_cost = shipping_cost;
        self
    }

    pub fn with_flat_fee(mut self, flat_fee: Decimal) -> Self {
        self.flat_fee = flat_fee;
        self
    }

    /// `price − price × (percent + processing) / 100 − flat − shipping`, to 2 dp.
    pub fn net_proceeds(&self, price: Decimal) -> Decimal {
        let percent = self.percent_fee + self.payment_processing_percent;
        let fees = price * percent / HUNDRED;
        round_price(price - fees - self.flat_fee - self.shipping_cost)
    }
}

/// Seller region for Alias' fixed seller fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AliasRegion {
    #[default]
    Us,
    Eu,
    Uk,
    Other,
}

impl AliasRegion {
    pub fn seller_fee(&self) -> Decimal {
        match self {
            AliasRegion::Us => dec!(5),
            AliasRegion::Eu | AliasRegion::Uk => dec!(12),
            AliasRegion::Other => dec!(25),
        }
    }
}

impl fmt::Display for AliasRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AliasRegion::Us => "us",
            AliasRegion::Eu => "eu",
            AliasRegion::Uk => "uk",
            AliasRegion::Other => "other",
        };
        f.write_str(s)
    }
}

impl FromStr for AliasRegion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "us" | "usa" => Ok(AliasRegion::Us),
            "eu" => Ok(AliasRegion::Eu),
            "uk" | "gb" => Ok(AliasRegion::Uk),
            "other" | "row" => Ok(AliasRegion::Other),
            other => Err(Error::InvalidConfigValue(format!("Unknown Alias region: {}", other))),
        }
    }
}

/// One fee schedule per marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeProfile {
    pub stockx: FeeSchedule,
    pub alias: FeeSchedule,
}

impl Default for FeeProfile {
    fn default() -> Self {
        Self {
            stockx: FeeSchedule::stockx_level(1),
            alias: FeeSchedule::alias(AliasRegion::Us),
        }
    }
}

impl FeeProfile {
    pub fn new(stockx: FeeSchedule, alias: FeeSchedule) -> Self {
        Self { stockx, alias }
    }

    pub fn schedule_for(&self, marketplace: Marketplace) -> &FeeSchedule {
        match marketplace {
            Marketplace::StockX => &self.stockx,
            Marketplace::Alias => &self.alias,
        }
    }
}
