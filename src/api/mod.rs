pub mod health;
pub mod indicators;
pub mod market;

use crate::services::{Cached, FetchControl};
use crate::types::FreshnessVerdict;
use crate::AppState;
use axum::Router;
use serde::Serialize;
use std::time::Duration;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(market::router())
        .merge(indicators::router())
}

/// API response wrapper matching frontend expectations
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub meta: ApiMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMeta {
    pub cached: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freshness: Option<FreshnessVerdict>,
}

impl ApiMeta {
    /// Meta for computed responses that never touch the cache.
    pub fn simple() -> Self {
        Self {
            cached: false,
            stale: false,
            fetched_at: None,
            freshness: None,
        }
    }

    /// Meta for cached data, judged fresh against `threshold`.
    pub fn from_cached<T>(cached: &Cached<T>, threshold: Duration) -> Self {
        Self {
            cached: cached.cached,
            stale: cached.stale,
            fetched_at: Some(cached.fetched_at),
            freshness: Some(cached.freshness(threshold)),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn from_cached(cached: Cached<T>, threshold: Duration) -> Self {
        let meta = ApiMeta::from_cached(&cached, threshold);
        Self {
            data: cached.data,
            meta,
        }
    }
}

/// Fetch control for a request carrying an optional `timeout_ms`.
pub(crate) fn fetch_control(timeout_ms: Option<u64>) -> FetchControl {
    match timeout_ms {
        Some(ms) => FetchControl::none().with_timeout(Duration::from_millis(ms)),
        None => FetchControl::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_omits_stale_when_false() {
        let json = serde_json::to_value(ApiMeta::simple()).unwrap();
        assert_eq!(json, serde_json::json!({ "cached": false }));
    }

    #[test]
    fn test_meta_from_stale_entry() {
        let cached = Cached {
            data: (),
            cached: true,
            stale: true,
            fetched_at: 1_000,
        };
        let meta = ApiMeta::from_cached(&cached, Duration::from_secs(30));
        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(json["cached"], true);
        assert_eq!(json["stale"], true);
        assert_eq!(json["fetchedAt"], 1_000);
        assert_eq!(json["freshness"]["isFresh"], false);
    }

    #[test]
    fn test_fetch_control_deadline() {
        assert!(!fetch_control(None).is_cancelled());
        assert!(!fetch_control(Some(5_000)).is_cancelled());
    }
}
