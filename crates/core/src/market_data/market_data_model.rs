//! Market data cache models.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use flipledger_market_data::{MarketQuote, Marketplace};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Variant;

/// Latest known quote for one (variant, currency).
///
/// At most one row exists per key; upserts replace it in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    /// `{variant_key}:{currency}`
    pub id: String,
    /// [`Variant::id`] this snapshot prices.
    pub variant_key: String,
    pub sku: String,
    pub marketplace: Marketplace,
    pub currency: String,
    pub lowest_ask: Option<Decimal>,
    pub highest_bid: Option<Decimal>,
    pub last_sale: Option<Decimal>,
    pub captured_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn make_id(variant_key: &str, currency: &str) -> String {
        format!("{}:{}", variant_key, currency.to_uppercase())
    }

    /// Build the snapshot written after a successful fetch.
    pub fn from_quote(variant: &Variant, quote: &MarketQuote, ttl: Duration, now: DateTime<Utc>) -> Self {
        let currency = quote.currency.to_uppercase();
        Self {
            id: Self::make_id(&variant.id, &currency),
            variant_key: variant.id.clone(),
            sku: variant.sku.clone(),
            marketplace: variant.marketplace,
            currency,
            lowest_ask: quote.lowest_ask,
            highest_bid: quote.highest_bid,
            last_sale: quote.last_sale,
            captured_at: quote.captured_at,
            updated_at: now,
            expires_at: quote.captured_at + ttl,
        }
    }

    /// Fresh while strictly younger than `ttl`; exactly `ttl` old is stale.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.updated_at < ttl
    }

    pub fn has_prices(&self) -> bool {
        self.lowest_ask.is_some() || self.highest_bid.is_some() || self.last_sale.is_some()
    }
}

/// One row per (variant, currency, calendar day). Re-syncing a day overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryEntry {
    /// `{variant_key}:{currency}:{YYYY-MM-DD}`
    pub id: String,
    pub variant_key: String,
    pub sku: String,
    pub marketplace: Marketplace,
    pub currency: String,
    pub day: NaiveDate,
    pub lowest_ask: Option<Decimal>,
    pub highest_bid: Option<Decimal>,
    pub last_sale: Option<Decimal>,
    pub captured_at: DateTime<Utc>,
}

impl PriceHistoryEntry {
    pub fn make_id(variant_key: &str, currency: &str, day: NaiveDate) -> String {
        format!("{}:{}:{}", variant_key, currency.to_uppercase(), day.format("%Y-%m-%d"))
    }

    /// The history row for the snapshot's UTC capture day.
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Self {
        let day = snapshot.captured_at.date_naive();
        Self {
            id: Self::make_id(&snapshot.variant_key, &snapshot.currency, day),
            variant_key: snapshot.variant_key.clone(),
            sku: snapshot.sku.clone(),
            marketplace: snapshot.marketplace,
            currency: snapshot.currency.clone(),
            day,
            lowest_ask: snapshot.lowest_ask,
            highest_bid: snapshot.highest_bid,
            last_sale: snapshot.last_sale,
            captured_at: snapshot.captured_at,
        }
    }
}
