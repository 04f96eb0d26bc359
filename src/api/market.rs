use super::{fetch_control, ApiResponse};
use crate::error::Result;
use crate::services::Resource;
use crate::types::{
    Candle, ChartData, Coin, CoinSearchResult, Consistency, OhlcProvider, ProviderPreference,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

fn default_vs_currency() -> String {
    "usd".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_page() -> u32 {
    1
}

fn default_days() -> u32 {
    7
}

#[derive(Debug, Deserialize)]
pub struct MarketsQuery {
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_page")]
    pub page: u32,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct OhlcQuery {
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    #[serde(default)]
    pub provider: ProviderPreference,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub timeout_ms: Option<u64>,
}

/// Candles plus provider details.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OhlcResponse {
    pub candles: Vec<Candle>,
    pub provider: OhlcProvider,
    pub granularity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency: Option<Consistency>,
}

/// GET /api/markets
async fn get_markets(
    State(state): State<AppState>,
    Query(query): Query<MarketsQuery>,
) -> Result<Json<ApiResponse<Vec<Coin>>>> {
    let control = fetch_control(query.timeout_ms);
    let coins = state
        .market_data
        .get_market_list(&query.vs_currency, query.per_page, query.page, &control)
        .await?;

    Ok(Json(ApiResponse::from_cached(
        coins,
        state.market_data.ttl(Resource::Markets),
    )))
}

/// GET /api/coins/:id/history
async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<ChartData>>> {
    let control = fetch_control(query.timeout_ms);
    let chart = state
        .market_data
        .get_history(&id, query.days, &query.vs_currency, &control)
        .await?;

    Ok(Json(ApiResponse::from_cached(
        chart,
        state.market_data.ttl(Resource::History),
    )))
}

/// GET /api/coins/:id/ohlc
async fn get_ohlc(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<OhlcQuery>,
) -> Result<Json<ApiResponse<OhlcResponse>>> {
    let control = fetch_control(query.timeout_ms);
    let result = state
        .market_data
        .get_ohlc(&id, query.days, &query.vs_currency, query.provider, &control)
        .await?;

    let consistency = result.consistency;
    let series = result.series.map(|series| OhlcResponse {
        candles: series.candles,
        provider: series.provider,
        granularity: series.granularity,
        consistency,
    });

    Ok(Json(ApiResponse::from_cached(
        series,
        state.market_data.ttl(Resource::Ohlc),
    )))
}

/// GET /api/search
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<CoinSearchResult>>>> {
    let control = fetch_control(query.timeout_ms);
    let results = state.market_data.search(&query.q, &control).await?;

    Ok(Json(ApiResponse::from_cached(
        results,
        state.market_data.ttl(Resource::SearchIndex),
    )))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/markets", get(get_markets))
        .route("/api/coins/:id/history", get(get_history))
        .route("/api/coins/:id/ohlc", get(get_ohlc))
        .route("/api/search", get(search))
}
