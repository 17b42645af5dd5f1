//! Price normalization.
//!
//! Converts a marketplace's raw price field into a major-unit [`Decimal`] rounded
//! to two places. Bad input never aborts a batch: it comes back as
//! [`NormalizedPrice::Unparseable`] so the caller can count it and move on.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{PriceUnit, RawPrice};

const MINOR_UNITS_PER_MAJOR: i64 = 100;
const PRICE_SCALE: u32 = 2;

/// Outcome of normalizing one price field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NormalizedPrice {
    /// Major-unit value, rounded to two decimals.
    Value(Decimal),
    /// The field was absent, null or blank.
    Missing,
    /// The field was present but not a usable price.
    Unparseable(String),
}

impl NormalizedPrice {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            NormalizedPrice::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_unparseable(&self) -> bool {
        matches!(self, NormalizedPrice::Unparseable(_))
    }
}

/// Normalize a raw price declared in `unit` into major units.
///
/// ```
/// use flipledger_market_data::{normalize_price, PriceUnit, RawPrice};
/// use rust_decimal::Decimal;
///
/// let from_text = normalize_price(Some(&RawPrice::from("27")), PriceUnit::Major);
/// let from_cents = normalize_price(Some(&RawPrice::from(2700)), PriceUnit::Minor);
/// assert_eq!(from_text.value(), Some(Decimal::new(2700, 2)));
/// assert_eq!(from_text, from_cents);
/// assert_eq!(normalize_price(None, PriceUnit::Major).value(), None);
/// ```
pub fn normalize_price(raw: Option<&RawPrice>, unit: PriceUnit) -> NormalizedPrice {
    let amount = match raw {
        None => return NormalizedPrice::Missing,
        Some(RawPrice::Integer(v)) => Decimal::from(*v),
        Some(RawPrice::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                return NormalizedPrice::Missing;
            }
            match Decimal::from_str(trimmed) {
                Ok(v) => v,
                Err(_) => return NormalizedPrice::Unparseable(text.clone()),
            }
        }
    };

    if amount.is_sign_negative() && !amount.is_zero() {
        return NormalizedPrice::Unparseable(amount.to_string());
    }

    let major = match unit {
        PriceUnit::Major => amount,
        PriceUnit::Minor => amount / Decimal::from(MINOR_UNITS_PER_MAJOR),
    };

    NormalizedPrice::Value(round_price(major))
}

/// Round a monetary amount to two decimal places, halves away from zero.
pub fn round_price(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(PRICE_SCALE);
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_major_decimal_string() {
        let price = normalize_price(Some(&RawPrice::from("27")), PriceUnit::Major);
        assert_eq!(price, NormalizedPrice::Value(dec!(27.00)));
        assert_eq!(price.value().map(|v| v.to_string()), Some("27.00".to_string()));
    }

    #[test]
    fn test_minor_integer() {
        let price = normalize_price(Some(&RawPrice::from(2700)), PriceUnit::Minor);
        assert_eq!(price.value(), Some(dec!(27.00)));
    }

    #[test]
    fn test_minor_integer_as_string() {
        let price = normalize_price(Some(&RawPrice::from("12050")), PriceUnit::Minor);
        assert_eq!(price.value(), Some(dec!(120.50)));
    }

    #[test]
    fn test_null_input_yields_missing() {
        let price = normalize_price(None, PriceUnit::Major);
        assert_eq!(price, NormalizedPrice::Missing);
        assert_eq!(price.value(), None);
        assert!(!price.is_unparseable());
    }

    #[test]
    fn test_blank_string_is_missing() {
        assert_eq!(
            normalize_price(Some(&RawPrice::from("  ")), PriceUnit::Major),
            NormalizedPrice::Missing
        );
    }

    #[test]
    fn test_garbage_is_unparseable_not_panic() {
        let price = normalize_price(Some(&RawPrice::from("twenty")), PriceUnit::Major);
        assert!(price.is_unparseable());
        assert_eq!(price.value(), None);
    }

    #[test]
    fn test_negative_is_unparseable() {
        let price = normalize_price(Some(&RawPrice::from(-500)), PriceUnit::Minor);
        assert!(price.is_unparseable());
    }

    #[test]
    fn test_rounds_to_two_places() {
        let price = normalize_price(Some(&RawPrice::from("19.995")), PriceUnit::Major);
        assert_eq!(price.value(), Some(dec!(20.00)));

        let price = normalize_price(Some(&RawPrice::from("19.994")), PriceUnit::Major);
        assert_eq!(price.value(), Some(dec!(19.99)));

        let price = normalize_price(Some(&RawPrice::from(1999)), PriceUnit::Minor);
        assert_eq!(price.value(), Some(dec!(19.99)));
    }

    #[test]
    fn test_zero_is_a_value() {
        let price = normalize_price(Some(&RawPrice::from(0)), PriceUnit::Minor);
        assert_eq!(price.value(), Some(dec!(0.00)));
    }

    #[test]
    fn test_raw_price_deserializes_both_encodings() {
        let text: RawPrice = serde_json::from_str("\"27\"").unwrap();
        let int: RawPrice = serde_json::from_str("2700").unwrap();
        assert_eq!(text, RawPrice::Text("27".to_string()));
        assert_eq!(int, RawPrice::Integer(2700));
        assert_eq!(
            normalize_price(Some(&text), PriceUnit::Major),
            normalize_price(Some(&int), PriceUnit::Minor)
        );
    }
}
