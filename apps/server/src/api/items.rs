use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use flipledger_core::{
    catalog::CatalogItem,
    market_data::PriceHistoryEntry,
    pricing::PricingResult,
    sync::{CurrencyCoverage, ScheduledRunSummary, SyncRequest},
};

const DEFAULT_HISTORY_DAYS: i64 = 30;

async fn track_item(
    State(state): State<Arc<AppState>>,
    Path(sku): Path<String>,
) -> ApiResult<Json<CatalogItem>> {
    let item = state.scheduled_sync.ensure_tracked(&sku).await?;
    Ok(Json(item))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SyncBody {
    #[serde(default)]
    force: bool,
    #[serde(default)]
    all_currencies: bool,
}

/// An on-demand sync runs on the request path, so it gets a deadline well
/// inside the request timeout. Work past it is reported as skipped.
fn interactive_sync_request(
    sku: String,
    body: &SyncBody,
    request_timeout: StdDuration,
) -> SyncRequest {
    let budget = request_timeout * 2 / 3;
    let mut request = SyncRequest::new(sku)
        .force(body.force)
        .with_deadline(Instant::now() + budget);
    if body.all_currencies {
        request = request.with_coverage(CurrencyCoverage::All);
    }
    request
}

async fn sync_item(
    State(state): State<Arc<AppState>>,
    Path(sku): Path<String>,
    body: Option<Json<SyncBody>>,
) -> ApiResult<Json<ScheduledRunSummary>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let item = state.scheduled_sync.ensure_tracked(&sku).await?;

    let request = interactive_sync_request(item.sku, &body, state.request_timeout);
    let summary = state.scheduled_sync.sync_now(&request).await?;
    Ok(Json(summary))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricingQuery {
    size: String,
    cost_basis: Option<String>,
}

fn parse_decimal(name: &str, raw: &str) -> ApiResult<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}: '{}'", name, raw)))
}

async fn get_pricing(
    State(state): State<Arc<AppState>>,
    Path(sku): Path<String>,
    Query(q): Query<PricingQuery>,
) -> ApiResult<Json<PricingResult>> {
    let cost_basis = match q.cost_basis.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => Some(parse_decimal("costBasis", raw)?),
        None => None,
    };
    let result = state.pricing_service.price_item(&sku, &q.size, cost_basis)?;
    Ok(Json(result))
}

#[derive(Deserialize)]
struct HistoryQuery {
    size: String,
    currency: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

fn parse_day(name: &str, raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}: '{}'", name, raw)))
}

async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(sku): Path<String>,
    Query(q): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<PriceHistoryEntry>>> {
    let to = match q.to.as_deref() {
        Some(raw) => parse_day("to", raw)?,
        None => Utc::now().date_naive(),
    };
    let from = match q.from.as_deref() {
        Some(raw) => parse_day("from", raw)?,
        None => to - Duration::days(DEFAULT_HISTORY_DAYS),
    };
    let currency = q.currency.as_deref().unwrap_or(&state.primary_currency);

    let rows = state
        .pricing_service
        .history(&sku, &q.size, currency, from, to)?;
    Ok(Json(rows))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/items/{sku}/track", post(track_item))
        .route("/items/{sku}/sync", post(sync_item))
        .route("/items/{sku}/pricing", get(get_pricing))
        .route("/items/{sku}/history", get(get_history))
}
