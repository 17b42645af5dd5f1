use serde::{Deserialize, Serialize};

/// A price exactly as a marketplace sent it.
///
/// StockX sends decimal strings in major units (`"27.50"`); Alias sends cents,
/// sometimes as a JSON number and sometimes as a string (`"2750"`). Both arms
/// deserialize here so nothing downstream sees an untyped JSON value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Integer(i64),
    Text(String),
}

impl From<&str> for RawPrice {
    fn from(value: &str) -> Self {
        RawPrice::Text(value.to_string())
    }
}

impl From<i64> for RawPrice {
    fn from(value: i64) -> Self {
        RawPrice::Integer(value)
    }
}

/// The unit a marketplace declares for its price fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceUnit {
    /// Whole currency units, e.g. dollars.
    Major,
    /// Hundredths of a currency unit, e.g. cents.
    Minor,
}
