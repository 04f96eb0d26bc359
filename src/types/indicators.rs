use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Indicator output aligned 1:1 with the input prices. `None` marks warm-up.
pub type IndicatorSeries = Vec<Option<f64>>;

/// MACD line, signal line and histogram, each aligned with the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    pub macd: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

/// Bollinger envelope, each band aligned with the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BollingerSeries {
    pub upper: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub lower: IndicatorSeries,
}

/// Indicators the dashboard can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Rsi,
    Sma,
    Macd,
    Bollinger,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 4] = [
        IndicatorKind::Rsi,
        IndicatorKind::Sma,
        IndicatorKind::Macd,
        IndicatorKind::Bollinger,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "rsi" => Some(IndicatorKind::Rsi),
            "sma" => Some(IndicatorKind::Sma),
            "macd" => Some(IndicatorKind::Macd),
            "bollinger" | "bb" => Some(IndicatorKind::Bollinger),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Sma => "sma",
            IndicatorKind::Macd => "macd",
            IndicatorKind::Bollinger => "bollinger",
        }
    }
}

/// Set of enabled indicators.
pub type IndicatorSet = BTreeSet<IndicatorKind>;

/// Output of `compute_indicators`. Disabled indicators are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<IndicatorSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma: Option<IndicatorSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<BollingerSeries>,
}

/// Dashboard chart timeframe, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1")]
    OneDay,
    #[default]
    #[serde(rename = "7")]
    SevenDays,
    #[serde(rename = "30")]
    ThirtyDays,
    #[serde(rename = "365")]
    OneYear,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::OneDay,
        Timeframe::SevenDays,
        Timeframe::ThirtyDays,
        Timeframe::OneYear,
    ];

    /// Strict lookup by day-count key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "1" => Some(Timeframe::OneDay),
            "7" => Some(Timeframe::SevenDays),
            "30" => Some(Timeframe::ThirtyDays),
            "365" => Some(Timeframe::OneYear),
            _ => None,
        }
    }

    /// Strict parse: unknown keys are an invalid request.
    pub fn parse(key: &str) -> crate::error::Result<Self> {
        Self::from_key(key).ok_or_else(|| {
            crate::error::AppError::InvalidRequest(format!(
                "unknown timeframe {:?}, expected one of 1, 7, 30, 365",
                key
            ))
        })
    }

    /// Lenient lookup: unknown keys fall back to seven days.
    pub fn from_key_or_default(key: &str) -> Self {
        Self::from_key(key).unwrap_or_default()
    }

    /// Closest configured timeframe for an arbitrary day span.
    pub fn for_days(days: u32) -> Self {
        match days {
            0..=1 => Timeframe::OneDay,
            2..=7 => Timeframe::SevenDays,
            8..=30 => Timeframe::ThirtyDays,
            _ => Timeframe::OneYear,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1",
            Timeframe::SevenDays => "7",
            Timeframe::ThirtyDays => "30",
            Timeframe::OneYear => "365",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BollingerParams {
    pub period: usize,
    pub multiplier: f64,
}

/// Indicator parameters for one timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeframeConfig {
    pub rsi_period: usize,
    pub sma_period: usize,
    pub macd: MacdParams,
    pub bollinger: BollingerParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_strict_and_lenient() {
        assert_eq!(Timeframe::parse(" 30 ").unwrap(), Timeframe::ThirtyDays);
        assert!(matches!(
            Timeframe::parse("weekly"),
            Err(crate::error::AppError::InvalidRequest(_))
        ));
        assert_eq!(Timeframe::from_key_or_default("weekly"), Timeframe::SevenDays);
    }

    #[test]
    fn test_timeframe_keys_round_trip() {
        for tf in Timeframe::ALL {
            assert_eq!(Timeframe::from_key(tf.key()), Some(tf));
        }
    }

    #[test]
    fn test_timeframe_unknown_key() {
        assert_eq!(Timeframe::from_key("90"), None);
        assert_eq!(Timeframe::from_key_or_default("90"), Timeframe::SevenDays);
    }

    #[test]
    fn test_timeframe_for_days() {
        assert_eq!(Timeframe::for_days(1), Timeframe::OneDay);
        assert_eq!(Timeframe::for_days(14), Timeframe::ThirtyDays);
        assert_eq!(Timeframe::for_days(90), Timeframe::OneYear);
    }

    #[test]
    fn test_timeframe_serde_uses_day_keys() {
        assert_eq!(serde_json::to_string(&Timeframe::ThirtyDays).unwrap(), "\"30\"");
        let tf: Timeframe = serde_json::from_str("\"365\"").unwrap();
        assert_eq!(tf, Timeframe::OneYear);
    }

    #[test]
    fn test_indicator_kind_from_str() {
        assert_eq!(IndicatorKind::from_str("RSI"), Some(IndicatorKind::Rsi));
        assert_eq!(IndicatorKind::from_str(" bb "), Some(IndicatorKind::Bollinger));
        assert_eq!(IndicatorKind::from_str("vwap"), None);
    }

    #[test]
    fn test_bundle_skips_disabled() {
        let bundle = IndicatorBundle {
            rsi: Some(vec![None, Some(50.0)]),
            ..Default::default()
        };
        let json = serde_json::to_string(&bundle).unwrap();
        assert_eq!(json, r#"{"rsi":[null,50.0]}"#);
    }
}
