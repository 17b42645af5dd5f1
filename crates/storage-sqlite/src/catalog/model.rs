//! Database models for catalog items and variants.

use diesel::prelude::*;
use flipledger_core::catalog::{CatalogItem, Variant};
use flipledger_core::Result;
use flipledger_market_data::Marketplace;

use crate::errors::corrupt;
use crate::utils::{format_timestamp, parse_timestamp};

#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::catalog_items)]
#[diesel(primary_key(sku))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CatalogItemDB {
    pub sku: String,
    pub brand: Option<String>,
    pub title: Option<String>,
    pub colorway: Option<String>,
    pub image_url: Option<String>,
    pub stockx_catalog_id: Option<String>,
    pub alias_catalog_id: Option<String>,
    pub last_synced_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Queryable, Identifiable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::variants)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct VariantDB {
    pub id: String,
    pub sku: String,
    pub marketplace: String,
    pub catalog_id: String,
    pub variant_id: String,
    pub size_label: String,
    pub size_key: String,
    /// JSON array of barcodes.
    pub barcodes: String,
    pub updated_at: String,
}

impl From<&CatalogItem> for CatalogItemDB {
    fn from(item: &CatalogItem) -> Self {
        Self {
            sku: item.sku.clone(),
            brand: item.brand.clone(),
            title: item.title.clone(),
            colorway: item.colorway.clone(),
            image_url: item.image_url.clone(),
            stockx_catalog_id: item.stockx_catalog_id.clone(),
            alias_catalog_id: item.alias_catalog_id.clone(),
            last_synced_at: item.last_synced_at.map(format_timestamp),
            created_at: format_timestamp(item.created_at),
            updated_at: format_timestamp(item.updated_at),
        }
    }
}

impl TryFrom<CatalogItemDB> for CatalogItem {
    type Error = flipledger_core::Error;

    fn try_from(db: CatalogItemDB) -> Result<Self> {
        Ok(CatalogItem {
            last_synced_at: db
                .last_synced_at
                .as_deref()
                .map(|t| parse_timestamp(t, "catalog_items.last_synced_at"))
                .transpose()?,
            created_at: parse_timestamp(&db.created_at, "catalog_items.created_at")?,
            updated_at: parse_timestamp(&db.updated_at, "catalog_items.updated_at")?,
            sku: db.sku,
            brand: db.brand,
            title: db.title,
            colorway: db.colorway,
            image_url: db.image_url,
            stockx_catalog_id: db.stockx_catalog_id,
            alias_catalog_id: db.alias_catalog_id,
        })
    }
}

impl From<&Variant> for VariantDB {
    fn from(variant: &Variant) -> Self {
        Self {
            id: variant.id.clone(),
            sku: variant.sku.clone(),
            marketplace: variant.marketplace.as_str().to_string(),
            catalog_id: variant.catalog_id.clone(),
            variant_id: variant.variant_id.clone(),
            size_label: variant.size_label.clone(),
            size_key: variant.size_key.clone(),
            barcodes: serde_json::to_string(&variant.barcodes).unwrap_or_else(|_| "[]".to_string()),
            updated_at: format_timestamp(variant.updated_at),
        }
    }
}

impl TryFrom<VariantDB> for Variant {
    type Error = flipledger_core::Error;

    fn try_from(db: VariantDB) -> Result<Self> {
        let marketplace = parse_marketplace(&db.marketplace)?;
        let barcodes: Vec<String> = serde_json::from_str(&db.barcodes)
            .map_err(|e| corrupt(format!("variants.barcodes for {}: {}", db.id, e)))?;
        Ok(Variant {
            updated_at: parse_timestamp(&db.updated_at, "variants.updated_at")?,
            id: db.id,
            sku: db.sku,
            marketplace,
            catalog_id: db.catalog_id,
            variant_id: db.variant_id,
            size_label: db.size_label,
            size_key: db.size_key,
            barcodes,
        })
    }
}

pub(crate) fn parse_marketplace(text: &str) -> Result<Marketplace> {
    text.parse::<Marketplace>().map_err(corrupt)
}
