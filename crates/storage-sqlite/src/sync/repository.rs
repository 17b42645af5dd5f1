use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::model::SyncRunDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::sync_runs::dsl as runs_dsl;
use flipledger_core::sync::{SyncRunRecord, SyncRunStore};
use flipledger_core::Result;

pub struct SyncRunRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl SyncRunRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl SyncRunStore for SyncRunRepository {
    async fn record_run(&self, run: &SyncRunRecord) -> Result<()> {
        let row = SyncRunDB::from(run);

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(runs_dsl::sync_runs)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    fn list_runs(&self, limit: usize) -> Result<Vec<SyncRunRecord>> {
        let mut conn = get_connection(&self.pool)?;
        runs_dsl::sync_runs
            .order((runs_dsl::finished_at.desc(), runs_dsl::id.desc()))
            .limit(limit as i64)
            .select(SyncRunDB::as_select())
            .load(&mut conn)
            .into_core()?
            .into_iter()
            .map(SyncRunRecord::try_from)
            .collect()
    }
}
