use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};
use flipledger_core::sync::{SyncRunRecord, SyncRunStore};

const DEFAULT_RUNS_LIMIT: usize = 50;
const MAX_RUNS_LIMIT: usize = 500;

#[derive(Deserialize)]
struct RunsQuery {
    limit: Option<usize>,
}

async fn list_sync_runs(
    State(state): State<Arc<AppState>>,
    Query(q): Query<RunsQuery>,
) -> ApiResult<Json<Vec<SyncRunRecord>>> {
    let limit = q.limit.unwrap_or(DEFAULT_RUNS_LIMIT).clamp(1, MAX_RUNS_LIMIT);
    Ok(Json(state.run_store.list_runs(limit)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/sync/runs", get(list_sync_runs))
}
