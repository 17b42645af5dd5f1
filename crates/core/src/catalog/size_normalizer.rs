//! Best-effort size matching across marketplaces.

use std::str::FromStr;

use rust_decimal::Decimal;

const REGION_PREFIXES: &[&str] = &["US"];
const GENDER_MARKERS: &[char] = &['M', 'W', 'Y', 'C'];
const MARKER_SEPARATOR: char = ':';

/// Reduce a marketplace size label to a comparison key.
///
/// Strips the US region prefix and whitespace, then canonicalises numeric
/// sizes (`"10.0"` → `"10"`). A gender/youth marker on either side of a
/// numeric size is kept in front of it (`"US W 8.5"` → `"W:8.5"`).
/// Non-numeric labels ("XL", "OS") are upper-cased and kept.
///
/// Compare keys with [`size_keys_match`], not `==`.
///
/// ```
/// use flipledger_core::catalog::{normalize_size_label, size_keys_match};
///
/// assert_eq!(normalize_size_label("US M 10"), "M:10");
/// assert_eq!(normalize_size_label("10.5W"), "W:10.5");
/// assert_eq!(normalize_size_label("10.0"), "10");
/// assert_eq!(normalize_size_label("xl"), "XL");
/// assert!(size_keys_match("M:10", "10"));
/// assert!(!size_keys_match("M:10", "W:10"));
/// ```
pub fn normalize_size_label(label: &str) -> String {
    let mut key: String = label
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    for prefix in REGION_PREFIXES {
        if let Some(rest) = key.strip_prefix(prefix) {
            key = rest.to_string();
        }
    }

    let marked = strip_marker(&key, true).or_else(|| strip_marker(&key, false));

    match marked {
        Some((m, size)) => format!("{}{}{}", m, MARKER_SEPARATOR, size),
        None => canonical_size(&key),
    }
}

/// Whether two keys from [`normalize_size_label`] name the same size.
///
/// The sizes must be equal. Markers must agree when both keys carry one; a key
/// without a marker matches any marker.
pub fn size_keys_match(a: &str, b: &str) -> bool {
    let (marker_a, size_a) = split_key(a);
    let (marker_b, size_b) = split_key(b);
    if size_a != size_b {
        return false;
    }
    match (marker_a, marker_b) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}

/// Split a leading or trailing marker off a numeric size.
fn strip_marker(key: &str, leading: bool) -> Option<(char, String)> {
    let (marker, rest) = if leading {
        let m = key.chars().next()?;
        (m, key.get(m.len_utf8()..)?)
    } else {
        let m = key.chars().last()?;
        (m, key.get(..key.len() - m.len_utf8())?)
    };
    (GENDER_MARKERS.contains(&marker) && is_numeric(rest)).then(|| (marker, canonical_size(rest)))
}

fn split_key(key: &str) -> (Option<char>, &str) {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(m), Some(MARKER_SEPARATOR)) if GENDER_MARKERS.contains(&m) => (Some(m), &key[2..]),
        _ => (None, key),
    }
}

fn canonical_size(text: &str) -> String {
    match Decimal::from_str(text) {
        Ok(size) => size.normalize().to_string(),
        Err(_) => text.to_string(),
    }
}

fn is_numeric(text: &str) -> bool {
    !text.is_empty() && Decimal::from_str(text).is_ok()
}
