use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Currency code (ISO 4217) - mostly static
pub type Currency = Cow<'static, str>;

/// Marketplace-native catalog identifier (StockX product id, Alias catalog id)
pub type CatalogId = String;

/// The two marketplaces we sync from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Marketplace {
    StockX,
    Alias,
}

impl Marketplace {
    pub const ALL: [Marketplace; 2] = [Marketplace::StockX, Marketplace::Alias];

    /// Stable identifier used in logs, database rows and rate-limit keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Marketplace::StockX => "STOCKX",
            Marketplace::Alias => "ALIAS",
        }
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Marketplace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STOCKX" => Ok(Marketplace::StockX),
            "ALIAS" | "GOAT" => Ok(Marketplace::Alias),
            other => Err(format!("Unknown marketplace: {}", other)),
        }
    }
}
