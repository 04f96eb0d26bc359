use serde::{Deserialize, Serialize};

/// Age verdict for a cached observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessVerdict {
    pub is_fresh: bool,
    pub age_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Relative price difference between two observations of the same asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDrift {
    pub drift_percent: f64,
    pub acceptable: bool,
}

/// Absolute timestamp difference between two observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestampDrift {
    pub drift_ms: i64,
    pub acceptable: bool,
}

/// Cross-check between a candle series and the market snapshot for the same coin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consistency {
    pub price: PriceDrift,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<TimestampDrift>,
}
