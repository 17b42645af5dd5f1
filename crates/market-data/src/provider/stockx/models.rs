//! StockX catalog API v2 response models.
//!
//! Prices are decimal strings in major units. Any field we rely on is
//! required here so a shape change fails at decode time.

use serde::Deserialize;

use crate::models::RawPrice;

/// `GET /catalog/search`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockXSearchResponse {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub products: Vec<StockXProduct>,
}

/// `GET /catalog/products/{productId}` and each search hit
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockXProduct {
    pub product_id: String,
    #[serde(default)]
    pub style_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub product_attributes: Option<StockXProductAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockXProductAttributes {
    #[serde(default)]
    pub colorway: Option<String>,
}

/// Element of `GET /catalog/products/{productId}/variants`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockXVariant {
    pub product_id: String,
    pub variant_id: String,
    #[serde(default)]
    pub variant_name: Option<String>,
    #[serde(default)]
    pub variant_value: Option<String>,
    #[serde(default)]
    pub size_chart: Option<StockXSizeChart>,
    #[serde(default)]
    pub gtins: Vec<StockXGtin>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockXSizeChart {
    #[serde(default)]
    pub default_conversion: Option<StockXSizeConversion>,
}

#[derive(Debug, Deserialize)]
pub struct StockXSizeConversion {
    pub size: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StockXGtin {
    pub identifier: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// `GET /catalog/products/{productId}/variants/{variantId}/market-data`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockXMarketData {
    pub product_id: String,
    pub variant_id: String,
    pub currency_code: String,
    #[serde(default)]
    pub lowest_ask_amount: Option<RawPrice>,
    #[serde(default)]
    pub highest_bid_amount: Option<RawPrice>,
    #[serde(default)]
    pub sell_faster_amount: Option<RawPrice>,
    #[serde(default)]
    pub earn_more_amount: Option<RawPrice>,
}
