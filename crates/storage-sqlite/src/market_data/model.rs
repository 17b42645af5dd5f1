//! Database models for the market data cache.

use diesel::prelude::*;
use flipledger_core::market_data::{MarketSnapshot, PriceHistoryEntry};
use flipledger_core::Result;

use crate::catalog::parse_marketplace;
use crate::utils::{format_day, format_price, format_timestamp, parse_day, parse_price, parse_timestamp};

#[derive(
    Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq,
)]
#[diesel(table_name = crate::schema::market_snapshots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketSnapshotDB {
    pub id: String,
    pub variant_key: String,
    pub sku: String,
    pub marketplace: String,
    pub currency: String,
    pub lowest_ask: Option<String>,
    pub highest_bid: Option<String>,
    pub last_sale: Option<String>,
    pub captured_at: String,
    pub updated_at: String,
    pub expires_at: String,
}

#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::price_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceHistoryDB {
    pub id: String,
    pub variant_key: String,
    pub sku: String,
    pub marketplace: String,
    pub currency: String,
    pub day: String,
    pub lowest_ask: Option<String>,
    pub highest_bid: Option<String>,
    pub last_sale: Option<String>,
    pub captured_at: String,
}

impl From<&MarketSnapshot> for MarketSnapshotDB {
    fn from(snapshot: &MarketSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            variant_key: snapshot.variant_key.clone(),
            sku: snapshot.sku.clone(),
            marketplace: snapshot.marketplace.as_str().to_string(),
            currency: snapshot.currency.clone(),
            lowest_ask: format_price(snapshot.lowest_ask),
            highest_bid: format_price(snapshot.highest_bid),
            last_sale: format_price(snapshot.last_sale),
            captured_at: format_timestamp(snapshot.captured_at),
            updated_at: format_timestamp(snapshot.updated_at),
            expires_at: format_timestamp(snapshot.expires_at),
        }
    }
}

impl TryFrom<MarketSnapshotDB> for MarketSnapshot {
    type Error = flipledger_core::Error;

    fn try_from(db: MarketSnapshotDB) -> Result<Self> {
        Ok(MarketSnapshot {
            marketplace: parse_marketplace(&db.marketplace)?,
            lowest_ask: parse_price(db.lowest_ask.as_deref(), "market_snapshots.lowest_ask")?,
            highest_bid: parse_price(db.highest_bid.as_deref(), "market_snapshots.highest_bid")?,
            last_sale: parse_price(db.last_sale.as_deref(), "market_snapshots.last_sale")?,
            captured_at: parse_timestamp(&db.captured_at, "market_snapshots.captured_at")?,
            updated_at: parse_timestamp(&db.updated_at, "market_snapshots.updated_at")?,
            expires_at: parse_timestamp(&db.expires_at, "market_snapshots.expires_at")?,
            id: db.id,
            variant_key: db.variant_key,
            sku: db.sku,
            currency: db.currency,
        })
    }
}

impl From<&PriceHistoryEntry> for PriceHistoryDB {
    fn from(entry: &PriceHistoryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            variant_key: entry.variant_key.clone(),
            sku: entry.sku.clone(),
            marketplace: entry.marketplace.as_str().to_string(),
            currency: entry.currency.clone(),
            day: format_day(entry.day),
            lowest_ask: format_price(entry.lowest_ask),
            highest_bid: format_price(entry.highest_bid),
            last_sale: format_price(entry.last_sale),
            captured_at: format_timestamp(entry.captured_at),
        }
    }
}

impl TryFrom<PriceHistoryDB> for PriceHistoryEntry {
    type Error = flipledger_core::Error;

    fn try_from(db: PriceHistoryDB) -> Result<Self> {
        Ok(PriceHistoryEntry {
            marketplace: parse_marketplace(&db.marketplace)?,
            day: parse_day(&db.day, "price_history.day")?,
            lowest_ask: parse_price(db.lowest_ask.as_deref(), "price_history.lowest_ask")?,
            highest_bid: parse_price(db.highest_bid.as_deref(), "price_history.highest_bid")?,
            last_sale: parse_price(db.last_sale.as_deref(), "price_history.last_sale")?,
            captured_at: parse_timestamp(&db.captured_at, "price_history.captured_at")?,
            id: db.id,
            variant_key: db.variant_key,
            sku: db.sku,
            currency: db.currency,
        })
    }
}
