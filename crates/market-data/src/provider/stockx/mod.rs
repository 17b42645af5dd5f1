//! StockX provider implementation.
//!
//! # API Endpoints
//!
//! - Search: `GET /v2/catalog/search?query={q}&pageNumber=1&pageSize={n}`
//! - Product: `GET /v2/catalog/products/{productId}`
//! - Variants: `GET /v2/catalog/products/{productId}/variants`
//! - Market data: `GET /v2/catalog/products/{productId}/variants/{variantId}/market-data?currencyCode={ccy}`
//!
//! Requests carry a bearer token and the `x-api-key` header. Prices are
//! decimal strings in major units.

pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use log::warn;

use self::models::{StockXMarketData, StockXProduct, StockXSearchResponse, StockXVariant};
use crate::errors::MarketDataError;
use crate::fetcher::{CredentialProvider, HttpFetcher, RateLimiter};
use crate::models::{
    CatalogMatch, MarketQuote, Marketplace, PriceUnit, ProductDetails, RawPrice, VariantInfo,
};
use crate::normalizer::{normalize_price, NormalizedPrice};
use crate::provider::{MarketplaceProvider, ProviderCapabilities, RateLimit};

const BASE_URL: &str = "https://api.stockx.com/v2";
const SEARCH_PAGE_SIZE: u32 = 10;

const CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "CAD", "AUD", "JPY", "CHF", "HKD", "SGD", "KRW", "NZD", "MXN", "CNY",
];

/// StockX catalog and market data provider.
pub struct StockXProvider {
    fetcher: HttpFetcher,
    rate_limit: RateLimit,
}

impl StockXProvider {
    pub fn new(
        api_key: impl Into<String>,
        limiter: Arc<RateLimiter>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self::with_base_url(BASE_URL, api_key, limiter, credentials)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        limiter: Arc<RateLimiter>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let fetcher = HttpFetcher::new(Marketplace::StockX, base_url, limiter, credentials)
            .with_header("x-api-key", api_key);
        let rate_limit = RateLimit {
            min_interval: fetcher.request_interval(),
            ..RateLimit::default()
        };
        Self {
            fetcher,
            rate_limit,
        }
    }

    /// Override the provider's limits. The spacing is also set on the shared limiter.
    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.fetcher.set_request_interval(rate_limit.min_interval);
        self.rate_limit = rate_limit;
        self
    }

    fn to_catalog_match(product: StockXProduct) -> CatalogMatch {
        CatalogMatch {
            marketplace: Marketplace::StockX,
            catalog_id: product.product_id,
            style_id: product.style_id,
            title: product.title,
            brand: product.brand,
        }
    }

    fn to_product_details(product: StockXProduct) -> ProductDetails {
        let colorway = product
            .product_attributes
            .as_ref()
            .and_then(|a| a.colorway.clone());
        ProductDetails {
            catalog_id: product.product_id,
            style_id: product.style_id,
            title: product.title,
            brand: product.brand,
            colorway,
            image_url: None,
        }
    }

    fn to_variant_info(variant: StockXVariant) -> VariantInfo {
        // Prefer the default size-chart conversion ("US M 10"), then the raw value.
        let size_label = variant
            .size_chart
            .as_ref()
            .and_then(|c| c.default_conversion.as_ref())
            .map(|c| c.size.clone())
            .or(variant.variant_value)
            .or(variant.variant_name)
            .unwrap_or_default();

        VariantInfo {
            variant_id: variant.variant_id,
            size_label,
            barcodes: variant.gtins.into_iter().map(|g| g.identifier).collect(),
        }
    }

    /// Build a quote from a market data payload.
    pub fn to_market_quote(data: StockXMarketData) -> MarketQuote {
        let mut quote = MarketQuote::new(Marketplace::StockX, data.variant_id, data.currency_code);
        quote.captured_at = Utc::now();

        let mut field = |raw: Option<&RawPrice>, name: &str| match normalize_price(raw, PriceUnit::Major) {
            NormalizedPrice::Value(v) => Some(v),
            NormalizedPrice::Missing => None,
            NormalizedPrice::Unparseable(text) => {
                warn!("STOCKX {} for product {}: unparseable '{}'", name, data.product_id, text);
                quote.unparseable_fields += 1;
                None
            }
        };

        let lowest_ask = field(data.lowest_ask_amount.as_ref(), "lowestAskAmount");
        let highest_bid = field(data.highest_bid_amount.as_ref(), "highestBidAmount");

        quote.lowest_ask = lowest_ask;
        quote.highest_bid = highest_bid;
        quote
    }
}

#[async_trait]
impl MarketplaceProvider for StockXProvider {
    fn marketplace(&self) -> Marketplace {
        Marketplace::StockX
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            currencies: CURRENCIES,
            price_unit: PriceUnit::Major,
            supports_last_sale: false,
        }
    }

    fn rate_limit(&self) -> RateLimit {
        self.rate_limit.clone()
    }

    async fn check_credentials(&self) -> Result<(), MarketDataError> {
        self.fetcher.check_credentials().await
    }

    async fn search_catalog(&self, query: &str) -> Result<Vec<CatalogMatch>, MarketDataError> {
        let response: StockXSearchResponse = self
            .fetcher
            .get_json(
                "/catalog/search",
                &[
                    ("query", query.to_string()),
                    ("pageNumber", "1".to_string()),
                    ("pageSize", SEARCH_PAGE_SIZE.to_string()),
                ],
            )
            .await?;

        Ok(response
            .products
            .into_iter()
            .map(Self::to_catalog_match)
            .collect())
    }

    async fn get_product(&self, catalog_id: &str) -> Result<ProductDetails, MarketDataError> {
        let path = format!("/catalog/products/{}", urlencoding::encode(catalog_id));
        let product: StockXProduct = self.fetcher.get_json(&path, &[]).await?;
        Ok(Self::to_product_details(product))
    }

    async fn get_variants(&self, catalog_id: &str) -> Result<Vec<VariantInfo>, MarketDataError> {
        let path = format!("/catalog/products/{}/variants", urlencoding::encode(catalog_id));
        let variants: Vec<StockXVariant> = self.fetcher.get_json(&path, &[]).await?;
        Ok(variants.into_iter().map(Self::to_variant_info).collect())
    }

    async fn get_market_data(
        &self,
        catalog_id: &str,
        variant_id: &str,
        currency: &str,
    ) -> Result<MarketQuote, MarketDataError> {
        if !self.capabilities().supports_currency(currency) {
            return Err(MarketDataError::UnsupportedCurrency {
                provider: self.id().to_string(),
                currency: currency.to_string(),
            });
        }

        let path = format!(
            "/catalog/products/{}/variants/{}/market-data",
            urlencoding::encode(catalog_id),
            urlencoding::encode(variant_id)
        );
        let data: StockXMarketData = self
            .fetcher
            .get_json(&path, &[("currencyCode", currency.to_uppercase())])
            .await?;

        if data.variant_id != variant_id {
            return Err(MarketDataError::InvalidResponse {
                provider: self.id().to_string(),
                message: format!("asked for variant {}, got {}", variant_id, data.variant_id),
            });
        }

        Ok(Self::to_market_quote(data))
    }
}
