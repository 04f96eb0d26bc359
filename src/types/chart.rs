use serde::{Deserialize, Serialize};

/// A single `(timestamp, value)` observation, timestamp in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: i64,
    pub value: f64,
}

impl From<[f64; 2]> for PriceSample {
    fn from([timestamp, value]: [f64; 2]) -> Self {
        Self {
            timestamp: timestamp as i64,
            value,
        }
    }
}

/// Historical series for one coin, as returned by the market chart endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub prices: Vec<PriceSample>,
    pub market_caps: Vec<PriceSample>,
    pub total_volumes: Vec<PriceSample>,
}

impl ChartData {
    /// Price values in upstream order, ready for the indicator engine.
    pub fn price_values(&self) -> Vec<f64> {
        self.prices.iter().map(|p| p.value).collect()
    }
}

/// OHLC candle, timestamp in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Candle {
    /// Check the OHLC envelope: every value finite, `low <= min(open, close)`
    /// and `high >= max(open, close)`.
    pub fn is_valid(&self) -> bool {
        let finite = [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
            && self.volume.map(|v| v.is_finite() && v >= 0.0).unwrap_or(true);

        finite
            && self.low <= self.open.min(self.close)
            && self.high >= self.open.max(self.close)
    }
}

/// Which upstream produced a set of candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OhlcProvider {
    Binance,
    CoinGecko,
}

impl std::fmt::Display for OhlcProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OhlcProvider::Binance => write!(f, "binance"),
            OhlcProvider::CoinGecko => write!(f, "coingecko"),
        }
    }
}

/// Caller preference for OHLC provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderPreference {
    /// Use the low-latency venue whenever it supports the pair.
    #[default]
    Auto,
    /// Same as auto; kept distinct so clients can state intent.
    Fast,
    /// Always use the general-purpose provider.
    General,
}

impl ProviderPreference {
    pub fn allows_fast_venue(&self) -> bool {
        !matches!(self, ProviderPreference::General)
    }
}
