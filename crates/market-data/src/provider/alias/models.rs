//! Alias API v1 response models.
//!
//! Prices are integer cents, sometimes encoded as strings. Errors come back as
//! gRPC-gateway bodies (`{"code": 8, "message": "..."}`).

use serde::Deserialize;

use crate::models::RawPrice;

/// `GET /catalog?query=`
#[derive(Debug, Deserialize)]
pub struct AliasSearchResponse {
    #[serde(default)]
    pub catalog_items: Vec<AliasCatalogItem>,
}

/// `GET /catalog/{catalog_id}`
#[derive(Debug, Deserialize)]
pub struct AliasCatalogItemResponse {
    pub catalog_item: AliasCatalogItem,
}

#[derive(Debug, Deserialize)]
pub struct AliasCatalogItem {
    pub catalog_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub colorway: Option<String>,
    #[serde(default)]
    pub main_picture_url: Option<String>,
    #[serde(default)]
    pub allowed_sizes: Vec<AliasSize>,
}

#[derive(Debug, Deserialize)]
pub struct AliasSize {
    pub value: f64,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// `GET /pricing_insights/availability`
#[derive(Debug, Deserialize)]
pub struct AliasAvailabilityResponse {
    pub availability: AliasAvailability,
}

#[derive(Debug, Deserialize)]
pub struct AliasAvailability {
    #[serde(default)]
    pub lowest_listing_price_cents: Option<RawPrice>,
    #[serde(default)]
    pub highest_offer_price_cents: Option<RawPrice>,
    #[serde(default)]
    pub last_sold_listing_price_cents: Option<RawPrice>,
}

/// gRPC-gateway error body.
#[derive(Debug, Deserialize)]
pub struct AliasErrorBody {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
}
