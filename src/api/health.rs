use crate::services::Resource;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Keys held per cached resource.
    caches: BTreeMap<&'static str, usize>,
}

fn resource_name(resource: Resource) -> &'static str {
    match resource {
        Resource::Markets => "markets",
        Resource::History => "history",
        Resource::Ohlc => "ohlc",
        Resource::SearchIndex => "search",
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let caches = state
        .market_data
        .cache_sizes()
        .into_iter()
        .map(|(resource, size)| (resource_name(resource), size))
        .collect();

    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        caches,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}
