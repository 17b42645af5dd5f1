//! Helpers shared by the repositories: parameter chunking and the text
//! encodings used for decimals and timestamps.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::errors::corrupt;
use flipledger_core::Result;

/// Stay well under SQLite's bound-parameter limit (999 on older builds) for `IN (...)` lists.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

/// Timestamps are stored as RFC 3339 text so they sort lexically.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339()
}

pub fn parse_timestamp(text: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(format!("{}: bad timestamp '{}': {}", column, text, e)))
}

pub fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

pub fn parse_day(text: &str, column: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|e| corrupt(format!("{}: bad date '{}': {}", column, text, e)))
}

/// Prices are stored as decimal text to keep them exact.
pub fn format_price(price: Option<Decimal>) -> Option<String> {
    price.map(|p| p.to_string())
}

pub fn parse_price(text: Option<&str>, column: &str) -> Result<Option<Decimal>> {
    text.map(|t| {
        Decimal::from_str(t).map_err(|e| corrupt(format!("{}: bad decimal '{}': {}", column, t, e)))
    })
    .transpose()
}
