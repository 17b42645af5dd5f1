use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::{CatalogItemDB, VariantDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::{catalog_items, variants};
use crate::utils::format_timestamp;
use flipledger_core::catalog::{CatalogItem, CatalogRepositoryTrait, Variant};
use flipledger_core::Result;
use flipledger_market_data::Marketplace;

pub struct CatalogRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CatalogRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn find_item(conn: &mut SqliteConnection, sku: &str) -> Result<Option<CatalogItem>> {
    catalog_items::table
        .find(sku)
        .select(CatalogItemDB::as_select())
        .first(conn)
        .optional()
        .into_core()?
        .map(CatalogItem::try_from)
        .transpose()
}

#[async_trait]
impl CatalogRepositoryTrait for CatalogRepository {
    fn get_item(&self, sku: &str) -> Result<Option<CatalogItem>> {
        let mut conn = get_connection(&self.pool)?;
        find_item(&mut conn, sku)
    }

    fn list_items_due(&self, limit: usize) -> Result<Vec<CatalogItem>> {
        let mut conn = get_connection(&self.pool)?;
        // NULLs sort first in ascending order: never-synced items lead.
        catalog_items::table
            .order((catalog_items::last_synced_at.asc(), catalog_items::sku.asc()))
            .limit(limit as i64)
            .select(CatalogItemDB::as_select())
            .load(&mut conn)
            .into_core()?
            .into_iter()
            .map(CatalogItem::try_from)
            .collect()
    }

    fn list_variants(&self, sku: &str, marketplace: Marketplace) -> Result<Vec<Variant>> {
        let mut conn = get_connection(&self.pool)?;
        variants::table
            .filter(variants::sku.eq(sku))
            .filter(variants::marketplace.eq(marketplace.as_str()))
            .order(variants::id.asc())
            .select(VariantDB::as_select())
            .load(&mut conn)
            .into_core()?
            .into_iter()
            .map(Variant::try_from)
            .collect()
    }

    async fn upsert_item(&self, item: CatalogItem) -> Result<CatalogItem> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CatalogItem> {
                let merged = match find_item(conn, &item.sku)? {
                    Some(existing) => existing.merged_with(item),
                    None => item,
                };
                let row = CatalogItemDB::from(&merged);

                diesel::insert_into(catalog_items::table)
                    .values(&row)
                    .on_conflict(catalog_items::sku)
                    .do_update()
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;

                Ok(merged)
            })
            .await
    }

    async fn upsert_variants(&self, input: Vec<Variant>) -> Result<usize> {
        if input.is_empty() {
            return Ok(0);
        }
        let rows: Vec<VariantDB> = input.iter().map(VariantDB::from).collect();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut written = 0;
                for row in &rows {
                    written += diesel::insert_into(variants::table)
                        .values(row)
                        .on_conflict(variants::id)
                        .do_update()
                        .set(row)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(written)
            })
            .await
    }

    async fn touch_synced(&self, sku: &str, at: DateTime<Utc>) -> Result<()> {
        let sku = sku.to_string();
        let stamp = format_timestamp(at);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::update(catalog_items::table.find(sku.as_str()))
                    .set((
                        catalog_items::last_synced_at.eq(stamp.clone()),
                        catalog_items::updated_at.eq(stamp),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}
