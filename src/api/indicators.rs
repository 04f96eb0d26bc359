use super::{fetch_control, ApiMeta, ApiResponse};
use crate::error::{AppError, Result};
use crate::services::indicators::describe;
use crate::services::{compute_indicators, parse_indicator_set, Resource};
use crate::types::{IndicatorBundle, IndicatorKind, IndicatorSet, Timeframe, TimeframeConfig};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_vs_currency() -> String {
    "usd".to_string()
}

fn default_days() -> u32 {
    7
}

#[derive(Debug, Deserialize)]
pub struct CoinIndicatorsQuery {
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    /// Comma-separated list, e.g. `rsi,macd`. Missing means all.
    pub indicators: Option<String>,
    /// Timeframe key overriding the one derived from `days`.
    pub timeframe: Option<String>,
    pub timeout_ms: Option<u64>,
}

/// Body of POST /api/indicators.
#[derive(Debug, Deserialize)]
pub struct ComputeRequest {
    pub prices: Vec<f64>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub indicators: Option<Vec<String>>,
}

/// Indicators aligned index-for-index with `prices`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorsResponse {
    pub timeframe: Timeframe,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub timestamps: Vec<i64>,
    pub prices: Vec<f64>,
    pub indicators: IndicatorBundle,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframeInfo {
    pub timeframe: Timeframe,
    pub label: &'static str,
    pub config: TimeframeConfig,
    pub descriptions: BTreeMap<&'static str, String>,
}

fn resolve_timeframe(key: Option<&str>, days: u32) -> Result<Timeframe> {
    match key {
        Some(key) => Timeframe::parse(key),
        None => Ok(Timeframe::for_days(days)),
    }
}

/// Run CPU-bound work on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("indicator task failed: {}", e)))?
}

/// Compute indicators off the async workers, handing the prices back.
async fn compute_blocking(
    prices: Vec<f64>,
    timeframe: Timeframe,
    enabled: IndicatorSet,
) -> Result<(Vec<f64>, IndicatorBundle)> {
    run_blocking(move || {
        let indicators = compute_indicators(&prices, timeframe, &enabled)?;
        Ok((prices, indicators))
    })
    .await
}

/// GET /api/coins/:id/indicators
async fn get_coin_indicators(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CoinIndicatorsQuery>,
) -> Result<Json<ApiResponse<IndicatorsResponse>>> {
    let timeframe = resolve_timeframe(query.timeframe.as_deref(), query.days)?;
    let control = fetch_control(query.timeout_ms);
    let chart = state
        .market_data
        .get_history(&id, query.days, &query.vs_currency, &control)
        .await?;

    let enabled = parse_indicator_set(query.indicators.as_deref());
    let (prices, indicators) =
        compute_blocking(chart.data.price_values(), timeframe, enabled).await?;

    let timestamps = chart.data.prices.iter().map(|p| p.timestamp).collect();
    let response = chart.map(|_| IndicatorsResponse {
        timeframe,
        timestamps,
        prices,
        indicators,
    });

    Ok(Json(ApiResponse::from_cached(
        response,
        state.market_data.ttl(Resource::History),
    )))
}

/// POST /api/indicators
async fn compute(
    Json(request): Json<ComputeRequest>,
) -> Result<Json<ApiResponse<IndicatorsResponse>>> {
    let timeframe =
        Timeframe::from_key_or_default(request.timeframe.as_deref().unwrap_or_default());
    let enabled = parse_indicator_set(
        request
            .indicators
            .map(|names| names.join(","))
            .as_deref(),
    );
    let (prices, indicators) = compute_blocking(request.prices, timeframe, enabled).await?;

    Ok(Json(ApiResponse {
        data: IndicatorsResponse {
            timeframe,
            timestamps: Vec::new(),
            prices,
            indicators,
        },
        meta: ApiMeta::simple(),
    }))
}

/// GET /api/indicators/config
async fn get_config() -> Json<ApiResponse<Vec<TimeframeInfo>>> {
    let data = Timeframe::ALL
        .into_iter()
        .map(|timeframe| TimeframeInfo {
            timeframe,
            label: timeframe.label(),
            config: timeframe.config(),
            descriptions: IndicatorKind::ALL
                .into_iter()
                .map(|kind| (kind.id(), describe(kind, timeframe)))
                .collect(),
        })
        .collect();

    Json(ApiResponse {
        data,
        meta: ApiMeta::simple(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/coins/:id/indicators", get(get_coin_indicators))
        .route("/api/indicators", post(compute))
        .route("/api/indicators/config", get(get_config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_timeframe() {
        assert_eq!(resolve_timeframe(None, 1).unwrap(), Timeframe::OneDay);
        assert_eq!(resolve_timeframe(None, 90).unwrap(), Timeframe::OneYear);
        assert_eq!(resolve_timeframe(Some("30"), 1).unwrap(), Timeframe::ThirtyDays);
        assert!(resolve_timeframe(Some("weekly"), 1).is_err());
    }

    #[tokio::test]
    async fn test_failed_task_is_internal_error() {
        let result: Result<()> = run_blocking(|| panic!("boom")).await;
        assert!(matches!(result, Err(AppError::Internal(_))));

        let result = run_blocking(|| Ok(7)).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_compute_selected_indicators() {
        let request = ComputeRequest {
            prices: (1..=40).map(|i| i as f64).collect(),
            timeframe: Some("1".to_string()),
            indicators: Some(vec!["sma".to_string(), "rsi".to_string()]),
        };

        let Json(response) = compute(Json(request)).await.unwrap();
        let data = response.data;
        assert_eq!(data.timeframe, Timeframe::OneDay);
        assert!(data.indicators.macd.is_none());
        assert!(data.indicators.bollinger.is_none());

        let sma = data.indicators.sma.unwrap();
        assert_eq!(sma.len(), 40);
        // One-day SMA period is 10
        assert!(sma[8].is_none());
        assert_eq!(sma[9], Some(5.5));
    }

    #[tokio::test]
    async fn test_compute_defaults_to_all_indicators() {
        let request: ComputeRequest =
            serde_json::from_str(r#"{"prices": [1.0, 2.0, 3.0]}"#).unwrap();
        let Json(response) = compute(Json(request)).await.unwrap();
        let indicators = response.data.indicators;
        assert_eq!(response.data.timeframe, Timeframe::SevenDays);
        assert!(indicators.rsi.unwrap().is_empty());
        assert_eq!(indicators.sma.unwrap(), vec![None, None, None]);
        assert!(indicators.macd.is_some());
        assert!(indicators.bollinger.is_some());
    }

    #[tokio::test]
    async fn test_config_lists_every_timeframe() {
        let Json(response) = get_config().await;
        assert_eq!(response.data.len(), Timeframe::ALL.len());
        for info in &response.data {
            assert_eq!(info.descriptions.len(), 4);
        }

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["data"][0]["timeframe"], "1");
        assert_eq!(json["data"][0]["config"]["rsiPeriod"], 9);
    }
}
