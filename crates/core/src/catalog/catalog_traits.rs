use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flipledger_market_data::Marketplace;

use super::catalog_model::{CatalogItem, Variant};
use crate::errors::Result;

/// Storage interface for catalog items and their marketplace variants.
///
/// Reads are synchronous (pooled connections); writes go through the storage
/// layer's single writer and are async. Every write is a keyed upsert.
#[async_trait]
pub trait CatalogRepositoryTrait: Send + Sync {
    fn get_item(&self, sku: &str) -> Result<Option<CatalogItem>>;

    /// Items ordered for scheduling: never-synced first, then oldest sync.
    fn list_items_due(&self, limit: usize) -> Result<Vec<CatalogItem>>;

    fn list_variants(&self, sku: &str, marketplace: Marketplace) -> Result<Vec<Variant>>;

    /// Insert or merge an item; known metadata is never cleared.
    async fn upsert_item(&self, item: CatalogItem) -> Result<CatalogItem>;

    /// Insert or update variants by id. Returns the number written.
    async fn upsert_variants(&self, variants: Vec<Variant>) -> Result<usize>;

    async fn touch_synced(&self, sku: &str, at: DateTime<Utc>) -> Result<()>;
}
