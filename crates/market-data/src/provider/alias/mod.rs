//! Alias provider implementation.
//!
//! # API Endpoints
//!
//! - Search: `GET /api/v1/catalog?query={q}&limit={n}`
//! - Catalog item: `GET /api/v1/catalog/{catalog_id}` (sizes are the variants)
//! - Pricing: `GET /api/v1/pricing_insights/availability?catalog_id=..&size=..&product_condition=..&packaging_condition=..`
//!
//! Alias quotes in USD only and reports prices in cents. The size value
//! doubles as the variant id.

pub mod models;

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use log::warn;
use reqwest::StatusCode;

use self::models::{
    AliasAvailability, AliasAvailabilityResponse, AliasCatalogItem, AliasCatalogItemResponse,
    AliasErrorBody, AliasSearchResponse, AliasSize,
};
use crate::errors::{FailureClass, MarketDataError};
use crate::fetcher::{CredentialProvider, HttpFetcher, RateLimiter};
use crate::models::{
    CatalogMatch, MarketQuote, Marketplace, PriceUnit, ProductDetails, RawPrice, VariantInfo,
};
use crate::normalizer::{normalize_price, NormalizedPrice};
use crate::provider::{MarketplaceProvider, ProviderCapabilities, RateLimit};

const BASE_URL: &str = "https://api.alias.org/api/v1";
const SEARCH_LIMIT: u32 = 10;
const PRODUCT_CONDITION_NEW: &str = "PRODUCT_CONDITION_NEW";
const PACKAGING_CONDITION_GOOD: &str = "PACKAGING_CONDITION_GOOD_CONDITION";

/// gRPC status codes surfaced by the gateway.
const GRPC_NOT_FOUND: i32 = 5;
const GRPC_RESOURCE_EXHAUSTED: i32 = 8;

/// Alias catalog and pricing provider.
pub struct AliasProvider {
    fetcher: HttpFetcher,
    rate_limit: RateLimit,
    /// Sizes from the last `get_product`, used once by `get_variants` for the same item.
    pending_sizes: Mutex<Option<(String, Vec<AliasSize>)>>,
}

impl AliasProvider {
    pub fn new(limiter: Arc<RateLimiter>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self::with_base_url(BASE_URL, limiter, credentials)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        limiter: Arc<RateLimiter>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        let fetcher = HttpFetcher::new(Marketplace::Alias, base_url, limiter, credentials)
            .with_body_classifier(classify_grpc_body);
        let rate_limit = RateLimit {
            min_interval: fetcher.request_interval(),
            ..RateLimit::default()
        };
        Self {
            fetcher,
            rate_limit,
            pending_sizes: Mutex::new(None),
        }
    }

    /// Override the provider's limits. The spacing is also set on the shared limiter.
    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.fetcher.set_request_interval(rate_limit.min_interval);
        self.rate_limit = rate_limit;
        self
    }

    fn lock_pending_sizes(&self) -> MutexGuard<'_, Option<(String, Vec<AliasSize>)>> {
        self.pending_sizes.lock().unwrap_or_else(|poisoned| {
            warn!("Alias pending sizes mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    async fn fetch_catalog_item(&self, catalog_id: &str) -> Result<AliasCatalogItem, MarketDataError> {
        let path = format!("/catalog/{}", urlencoding::encode(catalog_id));
        let response: AliasCatalogItemResponse = self.fetcher.get_json(&path, &[]).await?;
        Ok(response.catalog_item)
    }

    fn to_catalog_match(item: AliasCatalogItem) -> CatalogMatch {
        CatalogMatch {
            marketplace: Marketplace::Alias,
            catalog_id: item.catalog_id,
            style_id: item.sku,
            title: item.name,
            brand: item.brand,
        }
    }

    fn to_product_details(item: AliasCatalogItem) -> ProductDetails {
        ProductDetails {
            catalog_id: item.catalog_id,
            style_id: item.sku,
            title: item.name,
            brand: item.brand,
            colorway: item.colorway,
            image_url: item.main_picture_url,
        }
    }

    fn to_variant_info(size: &AliasSize) -> VariantInfo {
        let variant_id = size_value_to_id(size.value);
        VariantInfo {
            size_label: size.display_name.clone().unwrap_or_else(|| variant_id.clone()),
            variant_id,
            barcodes: Vec::new(),
        }
    }

    /// Build a quote from an availability payload.
    pub fn to_market_quote(variant_id: &str, availability: AliasAvailability) -> MarketQuote {
        let mut quote = MarketQuote::new(Marketplace::Alias, variant_id, "USD");
        quote.captured_at = Utc::now();

        let mut field = |raw: Option<&RawPrice>, name: &str| match normalize_price(raw, PriceUnit::Minor) {
            NormalizedPrice::Value(v) => Some(v),
            NormalizedPrice::Missing => None,
            NormalizedPrice::Unparseable(text) => {
                warn!("ALIAS {} for size {}: unparseable '{}'", name, variant_id, text);
                quote.unparseable_fields += 1;
                None
            }
        };

        let lowest_ask = field(
            availability.lowest_listing_price_cents.as_ref(),
            "lowest_listing_price_cents",
        );
        let highest_bid = field(
            availability.highest_offer_price_cents.as_ref(),
            "highest_offer_price_cents",
        );
        let last_sale = field(
            availability.last_sold_listing_price_cents.as_ref(),
            "last_sold_listing_price_cents",
        );

        quote.lowest_ask = lowest_ask;
        quote.highest_bid = highest_bid;
        quote.last_sale = last_sale;
        quote
    }
}

/// Canonical variant id for a numeric size: `10.0` → `"10"`, `10.5` → `"10.5"`.
pub fn size_value_to_id(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Map gRPC-gateway error codes onto failure classes.
fn classify_grpc_body(status: StatusCode, body: &str) -> Option<FailureClass> {
    if status.is_success() && !body.contains("\"code\"") {
        return None;
    }
    let parsed: AliasErrorBody = serde_json::from_str(body).ok()?;
    match parsed.code {
        GRPC_RESOURCE_EXHAUSTED => Some(FailureClass::RateLimited),
        GRPC_NOT_FOUND => Some(FailureClass::NotFound),
        0 => None,
        _ if status.is_success() => Some(FailureClass::Transient),
        _ => None,
    }
}

#[async_trait]
impl MarketplaceProvider for AliasProvider {
    fn marketplace(&self) -> Marketplace {
        Marketplace::Alias
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            currencies: &["USD"],
            price_unit: PriceUnit::Minor,
            supports_last_sale: true,
        }
    }

    fn rate_limit(&self) -> RateLimit {
        self.rate_limit.clone()
    }

    async fn check_credentials(&self) -> Result<(), MarketDataError> {
        self.fetcher.check_credentials().await
    }

    async fn search_catalog(&self, query: &str) -> Result<Vec<CatalogMatch>, MarketDataError> {
        let response: AliasSearchResponse = self
            .fetcher
            .get_json(
                "/catalog",
                &[
                    ("query", query.to_string()),
                    ("limit", SEARCH_LIMIT.to_string()),
                ],
            )
            .await?;

        Ok(response
            .catalog_items
            .into_iter()
            .map(Self::to_catalog_match)
            .collect())
    }

    async fn get_product(&self, catalog_id: &str) -> Result<ProductDetails, MarketDataError> {
        let mut item = self.fetch_catalog_item(catalog_id).await?;
        let sizes = std::mem::take(&mut item.allowed_sizes);
        *self.lock_pending_sizes() = Some((catalog_id.to_string(), sizes));
        Ok(Self::to_product_details(item))
    }

    /// Sizes come from the same catalog item as the product, so a call right
    /// after `get_product` for that item reuses its response.
    async fn get_variants(&self, catalog_id: &str) -> Result<Vec<VariantInfo>, MarketDataError> {
        let pending = self.lock_pending_sizes().take();
        let sizes = match pending {
            Some((id, sizes)) if id == catalog_id => sizes,
            _ => self.fetch_catalog_item(catalog_id).await?.allowed_sizes,
        };
        Ok(sizes.iter().map(Self::to_variant_info).collect())
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

        let response: AliasAvailabilityResponse = self
            .fetcher
            .get_json(
                "/pricing_insights/availability",
                &[
                    ("catalog_id", catalog_id.to_string()),
                    ("size", variant_id.to_string()),
                    ("product_condition", PRODUCT_CONDITION_NEW.to_string()),
                    ("packaging_condition", PACKAGING_CONDITION_GOOD.to_string()),
                ],
            )
            .await?;

        Ok(Self::to_market_quote(variant_id, response.availability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{decode_body, StaticCredentials};
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog_item_body() -> serde_json::Value {
        serde_json::json!({"catalog_item": {
            "catalog_id": "c-1",
            "name": "Air Jordan 1 Retro High OG 'Chicago Lost and Found'",
            "sku": "DZ5485 612",
            "brand": "Air Jordan",
            "allowed_sizes": [
                {"value": 10.0, "display_name": "10"},
                {"value": 10.5}
            ]
        }})
    }

    fn provider_for(server: &MockServer) -> AliasProvider {
        AliasProvider::with_base_url(
            server.uri(),
            Arc::new(RateLimiter::with_interval(Duration::ZERO)),
            Arc::new(StaticCredentials::new().with_token(Marketplace::Alias, "token")),
        )
    }

    #[test]
    fn test_availability_cents_normalize() {
        let body = r#"{"availability": {
            "lowest_listing_price_cents": "12000",
            "highest_offer_price_cents": 9550,
            "last_sold_listing_price_cents": null
        }}"#;
        let response: AliasAvailabilityResponse = decode_body(Marketplace::Alias, body).unwrap();
        let quote = AliasProvider::to_market_quote("10.5", response.availability);

        assert_eq!(quote.marketplace, Marketplace::Alias);
        assert_eq!(quote.variant_id, "10.5");
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.lowest_ask, Some(dec!(120.00)));
        assert_eq!(quote.highest_bid, Some(dec!(95.50)));
        assert_eq!(quote.last_sale, None);
    }

    #[test]
    fn test_missing_availability_fails_at_ingestion() {
        let err = decode_body::<AliasAvailabilityResponse>(Marketplace::Alias, "{}").unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidResponse { .. }));
    }

    #[test]
    fn test_sizes_become_variants() {
        let body = r#"{"catalog_item": {
            "catalog_id": "air-jordan-1-retro-high-og-chicago-2022-dz5485-612",
            "name": "Air Jordan 1 Retro High OG 'Chicago Lost and Found'",
            "sku": "DZ5485 612",
            "brand": "Air Jordan",
            "size_unit": "SIZE_UNIT_US",
            "allowed_sizes": [
                {"value": 10.0, "display_name": "10"},
                {"value": 10.5}
            ]
        }}"#;
        let response: AliasCatalogItemResponse = decode_body(Marketplace::Alias, body).unwrap();
        let variants: Vec<VariantInfo> = response
            .catalog_item
            .allowed_sizes
            .iter()
            .map(AliasProvider::to_variant_info)
            .collect();

        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].variant_id, "10");
        assert_eq!(variants[0].size_label, "10");
        assert_eq!(variants[1].variant_id, "10.5");
        assert_eq!(variants[1].size_label, "10.5");
    }

    #[test]
    fn test_size_value_to_id() {
        assert_eq!(size_value_to_id(4.0), "4");
        assert_eq!(size_value_to_id(4.5), "4.5");
        assert_eq!(size_value_to_id(13.25), "13.25");
    }

    #[test]
    fn test_grpc_throttle_body() {
        assert_eq!(
            classify_grpc_body(
                StatusCode::TOO_MANY_REQUESTS,
                r#"{"code":8,"message":"rate limit"}"#
            ),
            Some(FailureClass::RateLimited)
        );
        assert_eq!(
            classify_grpc_body(StatusCode::OK, r#"{"code":8,"message":"rate limit"}"#),
            Some(FailureClass::RateLimited)
        );
        assert_eq!(
            classify_grpc_body(StatusCode::BAD_REQUEST, r#"{"code":5,"message":"missing"}"#),
            Some(FailureClass::NotFound)
        );
        assert_eq!(classify_grpc_body(StatusCode::OK, r#"{"availability":{}}"#), None);
        assert_eq!(classify_grpc_body(StatusCode::BAD_GATEWAY, "<html>"), None);
    }

    #[tokio::test]
    async fn test_product_then_variants_fetches_catalog_item_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/catalog/c-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(catalog_item_body()))
            .expect(1)
            .mount(&server)
            .await;
        let provider = provider_for(&server);

        let product = provider.get_product("c-1").await.unwrap();
        let variants = provider.get_variants("c-1").await.unwrap();

        assert_eq!(product.style_id.as_deref(), Some("DZ5485 612"));
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[1].variant_id, "10.5");
    }

    #[tokio::test]
    async fn test_variants_refetch_once_sizes_are_used() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/catalog/c-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(catalog_item_body()))
            .expect(2)
            .mount(&server)
            .await;
        let provider = provider_for(&server);

        provider.get_product("c-1").await.unwrap();
        provider.get_variants("c-1").await.unwrap();
        let again = provider.get_variants("c-1").await.unwrap();

        assert_eq!(again.len(), 2);
    }
}
