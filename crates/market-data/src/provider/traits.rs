//! Marketplace provider trait definition.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{CatalogMatch, Marketplace, MarketQuote, ProductDetails, VariantInfo};

use super::capabilities::{ProviderCapabilities, RateLimit};

/// Trait for marketplace catalogs.
///
/// Implementations own their HTTP plumbing (normally an
/// [`HttpFetcher`](crate::fetcher::HttpFetcher)) and hand back normalized
/// models; nothing raw crosses this boundary.
///
/// # Example
///
/// ```ignore
/// let provider = StockXProvider::new(api_key, limiter, credentials);
/// let hits = provider.search_catalog("DD1391-100").await?;
/// let variants = provider.get_variants(&hits[0].catalog_id).await?;
/// let quote = provider
///     .get_market_data(&hits[0].catalog_id, &variants[0].variant_id, "USD")
///     .await?;
/// ```
#[async_trait]
pub trait MarketplaceProvider: Send + Sync {
    /// Which marketplace this provider talks to.
    fn marketplace(&self) -> Marketplace;

    /// Identifier used for logging and rate-limit keys.
    fn id(&self) -> &'static str {
        self.marketplace().as_str()
    }

    fn capabilities(&self) -> ProviderCapabilities;

    fn rate_limit(&self) -> RateLimit;

    /// Confirm a credential can be obtained before any stage runs.
    async fn check_credentials(&self) -> Result<(), MarketDataError>;

    /// Search the catalog for a style code or free-text query.
    async fn search_catalog(&self, query: &str) -> Result<Vec<CatalogMatch>, MarketDataError>;

    /// Fetch product metadata for a resolved catalog id.
    async fn get_product(&self, catalog_id: &str) -> Result<ProductDetails, MarketDataError>;

    /// List the sellable variants (sizes) of a product.
    async fn get_variants(&self, catalog_id: &str) -> Result<Vec<VariantInfo>, MarketDataError>;

    /// Fetch market data for one variant in one currency.
    async fn get_market_data(
        &self,
        catalog_id: &str,
        variant_id: &str,
        currency: &str,
    ) -> Result<MarketQuote, MarketDataError>;
}
