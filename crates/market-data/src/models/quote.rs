use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::Marketplace;

/// Market data for one (variant, currency), already normalized to major units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    pub marketplace: Marketplace,
    pub variant_id: String,
    pub currency: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_ask: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_bid: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sale: Option<Decimal>,

    /// When we received the quote.
    pub captured_at: DateTime<Utc>,

    /// Number of price fields that were present but could not be parsed.
    #[serde(default)]
    pub unparseable_fields: u32,
}

impl MarketQuote {
    /// Create an empty quote captured now.
    pub fn new(marketplace: Marketplace, variant_id: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            marketplace,
            variant_id: variant_id.into(),
            currency: currency.into(),
            lowest_ask: None,
            highest_bid: None,
            last_sale: None,
            captured_at: Utc::now(),
            unparseable_fields: 0,
        }
    }

    /// True when the marketplace has no active ask, bid or sale for this variant.
    pub fn is_empty(&self) -> bool {
        self.lowest_ask.is_none() && self.highest_bid.is_none() && self.last_sale.is_none()
    }
}
