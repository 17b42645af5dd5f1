use serde::{Deserialize, Serialize};

use super::types::{CatalogId, Marketplace};

/// One hit from a marketplace catalog search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMatch {
    pub marketplace: Marketplace,
    pub catalog_id: CatalogId,
    /// Style code / SKU as the marketplace spells it (e.g. "DD1391-100").
    pub style_id: Option<String>,
    pub title: Option<String>,
    pub brand: Option<String>,
}

/// Product metadata returned by the details endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetails {
    pub catalog_id: CatalogId,
    pub style_id: Option<String>,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub colorway: Option<String>,
    pub image_url: Option<String>,
}

/// A sellable size/configuration as the marketplace describes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInfo {
    /// Marketplace-native variant identifier.
    pub variant_id: String,
    /// Marketplace-native size label ("10", "US M 10", "10.5W").
    pub size_label: String,
    #[serde(default)]
    pub barcodes: Vec<String>,
}
