//! Currency multipliers into the display currency.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Multipliers that turn an amount in a source currency into the display
/// currency: `display = amount × multiplier[source]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FxRates {
    pub display_currency: String,
    pub multipliers: HashMap<String, Decimal>,
}

impl FxRates {
    pub fn new(display_currency: &str) -> Self {
        Self {
            display_currency: display_currency.trim().to_uppercase(),
            multipliers: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, currency: &str, multiplier: Decimal) -> Self {
        self.multipliers
            .insert(currency.trim().to_uppercase(), multiplier);
        self
    }

    /// Identity for the display currency; `None` when no multiplier is known.
    pub fn multiplier(&self, currency: &str) -> Option<Decimal> {
        if currency.eq_ignore_ascii_case(&self.display_currency) {
            return Some(Decimal::ONE);
        }
        self.multipliers.get(&currency.to_uppercase()).copied()
    }

    pub fn convert(&self, amount: Decimal, from: &str) -> Option<Decimal> {
        self.multiplier(from).map(|m| amount * m)
    }

    /// Parse `"EUR=1.08,GBP=1.27"`. Blank input yields no multipliers.
    pub fn parse_multipliers(spec: &str) -> Result<HashMap<String, Decimal>> {
        let mut multipliers = HashMap::new();
        for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (currency, value) = pair.split_once('=').ok_or_else(|| {
                Error::InvalidConfigValue(format!("Expected CCY=multiplier, got '{}'", pair))
            })?;
            let multiplier = Decimal::from_str(value.trim())?;
            if multiplier <= Decimal::ZERO {
                return Err(Error::InvalidConfigValue(format!(
                    "Multiplier for {} must be positive",
                    currency.trim()
                )));
            }
            multipliers.insert(currency.trim().to_uppercase(), multiplier);
        }
        Ok(multipliers)
    }
}
