use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::main_lib::AppState;
use flipledger_market_data::Marketplace;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadyStatus {
    status: &'static str,
    marketplaces: Vec<Marketplace>,
}

async fn healthz() -> &'static str {
    "ok"
}

/// Lists the marketplaces that scheduled syncs will cover.
async fn readyz(State(state): State<Arc<AppState>>) -> Json<ReadyStatus> {
    Json(ReadyStatus {
        status: "ok",
        marketplaces: state.marketplaces.clone(),
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
