use super::coingecko::retain_valid;
use crate::error::{AppError, Result};
use crate::types::Candle;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Binance caps a single klines request at 1000 candles.
const MAX_KLINES: u32 = 1000;

/// CoinGecko id to Binance base asset.
pub const COIN_BASE_ASSETS: &[(&str, &str)] = &[
    ("bitcoin", "BTC"),
    ("ethereum", "ETH"),
    ("binancecoin", "BNB"),
    ("solana", "SOL"),
    ("ripple", "XRP"),
    ("dogecoin", "DOGE"),
    ("cardano", "ADA"),
    ("avalanche-2", "AVAX"),
    ("polkadot", "DOT"),
    ("chainlink", "LINK"),
    ("shiba-inu", "SHIB"),
    ("litecoin", "LTC"),
    ("tron", "TRX"),
    ("cosmos", "ATOM"),
    ("uniswap", "UNI"),
    ("stellar", "XLM"),
    ("bitcoin-cash", "BCH"),
    ("near", "NEAR"),
    ("aptos", "APT"),
    ("arbitrum", "ARB"),
    ("optimism", "OP"),
    ("sui", "SUI"),
    ("pepe", "PEPE"),
];

/// Binance trading pair for a coin and quote currency, if the venue lists it.
pub fn trading_pair(coin_id: &str, vs_currency: &str) -> Option<String> {
    let quote = match vs_currency.to_lowercase().as_str() {
        "usd" | "usdt" => "USDT",
        _ => return None,
    };

    COIN_BASE_ASSETS
        .iter()
        .find(|(id, _)| *id == coin_id)
        .map(|(_, base)| format!("{}{}", base, quote))
}

/// Kline interval and candle count covering `days`.
pub fn kline_plan(days: u32) -> (&'static str, u32) {
    let days = days.max(1);
    let (interval, per_day) = match days {
        1 => ("15m", 96),
        2..=7 => ("1h", 24),
        8..=30 => ("4h", 6),
        _ => ("1d", 1),
    };
    (interval, (days * per_day).min(MAX_KLINES))
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Parse one kline row: `[openTime, "open", "high", "low", "close", "volume", ...]`.
fn parse_kline(row: &[Value]) -> Option<Candle> {
    if row.len() < 6 {
        return None;
    }
    Some(Candle {
        timestamp: row[0].as_i64()?,
        open: parse_number(&row[1])?,
        high: parse_number(&row[2])?,
        low: parse_number(&row[3])?,
        close: parse_number(&row[4])?,
        volume: parse_number(&row[5]),
    })
}

/// Binance REST client for candle data.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
}

impl BinanceClient {
    /// Create a new Binance client.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent("Wraith/1.0")
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch candles for `pair` covering `days`.
    pub async fn klines(&self, pair: &str, days: u32) -> Result<Vec<Candle>> {
        let (interval, limit) = kline_plan(days);
        let url = format!("{}/klines", self.base_url);
        debug!("Binance klines {} {} x{}", pair, interval, limit);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", pair.to_string()),
                ("interval", interval.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("Binance: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "Binance API returned {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            );
            return Err(AppError::from_upstream_status(status, &text));
        }

        let text = response.text().await?;
        let rows: Vec<Vec<Value>> = serde_json::from_str(&text)?;
        let total = rows.len();
        let candles: Vec<Candle> = rows.iter().filter_map(|row| parse_kline(row)).collect();
        if candles.len() < total {
            warn!("Binance returned {} unparseable klines", total - candles.len());
        }

        Ok(retain_valid("Binance", candles))
    }
}
