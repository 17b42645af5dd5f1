//! Catalog domain models.

use chrono::{DateTime, Utc};
use flipledger_market_data::{Marketplace, ProductDetails, VariantInfo};
use serde::{Deserialize, Serialize};

use super::size_normalizer::normalize_size_label;

/// A product identity shared by both marketplaces through its style code.
///
/// Created on first successful catalog resolution (or registered bare by
/// `ensure_tracked`), enriched by later syncs, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Canonical SKU, also the primary key.
    pub sku: String,
    pub brand: Option<String>,
    pub title: Option<String>,
    pub colorway: Option<String>,
    pub image_url: Option<String>,
    pub stockx_catalog_id: Option<String>,
    pub alias_catalog_id: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    pub fn new(sku: &str) -> Self {
        let now = Utc::now();
        Self {
            sku: normalize_sku(sku),
            brand: None,
            title: None,
            colorway: None,
            image_url: None,
            stockx_catalog_id: None,
            alias_catalog_id: None,
            last_synced_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// This marketplace's catalog id, once mapped.
    pub fn catalog_id(&self, marketplace: Marketplace) -> Option<&str> {
        match marketplace {
            Marketplace::StockX => self.stockx_catalog_id.as_deref(),
            Marketplace::Alias => self.alias_catalog_id.as_deref(),
        }
    }

    pub fn set_catalog_id(&mut self, marketplace: Marketplace, catalog_id: impl Into<String>) {
        let catalog_id = Some(catalog_id.into());
        match marketplace {
            Marketplace::StockX => self.stockx_catalog_id = catalog_id,
            Marketplace::Alias => self.alias_catalog_id = catalog_id,
        }
    }

    /// Fill metadata gaps from a marketplace's product details.
    pub fn apply_details(&mut self, marketplace: Marketplace, details: &ProductDetails) {
        self.set_catalog_id(marketplace, details.catalog_id.clone());
        fill(&mut self.brand, &details.brand);
        fill(&mut self.title, &details.title);
        fill(&mut self.colorway, &details.colorway);
        fill(&mut self.image_url, &details.image_url);
        self.updated_at = Utc::now();
    }

    /// Merge an incoming version over a stored one.
    ///
    /// Known values are never replaced by absent ones; incoming catalog ids
    /// win when present.
    pub fn merged_with(mut self, incoming: CatalogItem) -> CatalogItem {
        take(&mut self.brand, incoming.brand);
        take(&mut self.title, incoming.title);
        take(&mut self.colorway, incoming.colorway);
        take(&mut self.image_url, incoming.image_url);
        take(&mut self.stockx_catalog_id, incoming.stockx_catalog_id);
        take(&mut self.alias_catalog_id, incoming.alias_catalog_id);
        if incoming.last_synced_at > self.last_synced_at {
            self.last_synced_at = incoming.last_synced_at;
        }
        self.updated_at = self.updated_at.max(incoming.updated_at);
        self
    }
}

fn fill(slot: &mut Option<String>, value: &Option<String>) {
    if slot.is_none() {
        if let Some(v) = value.as_ref().filter(|v| !v.trim().is_empty()) {
            *slot = Some(v.clone());
        }
    }
}

fn take(slot: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        *slot = Some(v);
    }
}

/// A sellable size of a catalog item on one marketplace.
///
/// Variants are never shared across marketplaces; the id embeds the
/// marketplace and its catalog id so that Alias' size-valued ids stay unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub sku: String,
    pub marketplace: Marketplace,
    pub catalog_id: String,
    /// Marketplace-native variant identifier.
    pub variant_id: String,
    /// Marketplace-native size label.
    pub size_label: String,
    /// Cross-marketplace match key, see [`normalize_size_label`] and
    /// [`size_keys_match`](super::size_keys_match).
    pub size_key: String,
    pub barcodes: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl Variant {
    pub fn make_id(marketplace: Marketplace, catalog_id: &str, variant_id: &str) -> String {
        format!("{}:{}:{}", marketplace.as_str(), catalog_id, variant_id)
    }

    pub fn from_info(sku: &str, marketplace: Marketplace, catalog_id: &str, info: VariantInfo) -> Self {
        Self {
            id: Self::make_id(marketplace, catalog_id, &info.variant_id),
            sku: normalize_sku(sku),
            marketplace,
            catalog_id: catalog_id.to_string(),
            size_key: normalize_size_label(&info.size_label),
            variant_id: info.variant_id,
            size_label: info.size_label,
            barcodes: info.barcodes,
            updated_at: Utc::now(),
        }
    }
}

/// Canonical SKU form used as the catalog key: trimmed and upper-cased.
pub fn normalize_sku(sku: &str) -> String {
    sku.trim().to_uppercase()
}

/// Style-code comparison key: alphanumerics only, upper-cased.
///
/// `"dz5485 612"`, `"DZ5485-612"` and `"DZ5485612"` all compare equal.
pub fn normalize_style_code(code: &str) -> String {
    code.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
