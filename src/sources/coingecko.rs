use crate::error::{AppError, Result};
use crate::types::{Candle, ChartData, Coin, PriceSample};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// CoinGecko market chart response.
#[derive(Debug, Deserialize)]
struct CoinGeckoMarketChart {
    prices: Vec<[f64; 2]>, // [[timestamp, price], ...]
    #[serde(default)]
    market_caps: Vec<[f64; 2]>,
    #[serde(default)]
    total_volumes: Vec<[f64; 2]>,
}

impl From<CoinGeckoMarketChart> for ChartData {
    fn from(chart: CoinGeckoMarketChart) -> Self {
        let convert = |points: Vec<[f64; 2]>| -> Vec<PriceSample> {
            points.into_iter().map(PriceSample::from).collect()
        };
        ChartData {
            prices: convert(chart.prices),
            market_caps: convert(chart.market_caps),
            total_volumes: convert(chart.total_volumes),
        }
    }
}

/// CoinGecko OHLC response format: [[timestamp, open, high, low, close], ...]
type CoinGeckoOhlc = Vec<[f64; 5]>;

/// Candle granularity CoinGecko picks automatically for a day span.
pub fn ohlc_granularity(days: u32) -> &'static str {
    match days {
        0..=2 => "30m",
        3..=30 => "4h",
        _ => "4d",
    }
}

/// Keep only candles with a consistent OHLC envelope.
pub(crate) fn retain_valid(source: &str, candles: Vec<Candle>) -> Vec<Candle> {
    let total = candles.len();
    let valid: Vec<Candle> = candles.into_iter().filter(Candle::is_valid).collect();
    if valid.len() < total {
        warn!(
            "{} returned {} malformed candles, dropped",
            source,
            total - valid.len()
        );
    }
    valid
}

/// CoinGecko REST client.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    /// Create a new CoinGecko client.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        // Create client with proper User-Agent
        let client = Client::builder()
            .user_agent("Wraith/1.0 (Cryptocurrency Dashboard)")
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("CoinGecko GET {} {:?}", url, query);

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(query);

        if let Some(ref key) = self.api_key {
            request = request.header("x-cg-pro-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::UpstreamUnavailable(format!("CoinGecko: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "CoinGecko API returned {}: {}",
                status,
                text.chars().take(200).collect::<String>()
            );
            return Err(AppError::from_upstream_status(status, &text));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(
                "CoinGecko returned an undecodable body for {}: {}",
                path,
                text.chars().take(200).collect::<String>()
            );
            AppError::from(e)
        })
    }

    /// Fetch one page of the market list, ordered by market cap.
    pub async fn markets(&self, vs_currency: &str, per_page: u32, page: u32) -> Result<Vec<Coin>> {
        self.get_json(
            "/coins/markets",
            &[
                ("vs_currency", vs_currency.to_string()),
                ("order", "market_cap_desc".to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
                ("sparkline", "false".to_string()),
                ("price_change_percentage", "24h".to_string()),
            ],
        )
        .await
    }

    /// Fetch the historical price, market cap and volume series for a coin.
    pub async fn market_chart(
        &self,
        coin_id: &str,
        days: u32,
        vs_currency: &str,
    ) -> Result<ChartData> {
        let chart: CoinGeckoMarketChart = self
            .get_json(
                &format!("/coins/{}/market_chart", coin_id),
                &[
                    ("vs_currency", vs_currency.to_string()),
                    ("days", days.to_string()),
                ],
            )
            .await?;

        Ok(chart.into())
    }

    /// Fetch OHLC candles for a coin. CoinGecko does not report volume here.
    pub async fn ohlc(&self, coin_id: &str, days: u32, vs_currency: &str) -> Result<Vec<Candle>> {
        let raw: CoinGeckoOhlc = self
            .get_json(
                &format!("/coins/{}/ohlc", coin_id),
                &[
                    ("vs_currency", vs_currency.to_string()),
                    ("days", days.to_string()),
                ],
            )
            .await?;

        let candles = raw
            .into_iter()
            .map(|[time, open, high, low, close]| Candle {
                timestamp: time as i64,
                open,
                high,
                low,
                close,
                volume: None,
            })
            .collect();

        Ok(retain_valid("CoinGecko", candles))
    }
}
