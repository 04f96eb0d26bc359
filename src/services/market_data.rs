//! Cached access to upstream market data.
//!
//! One [`CachedResource`] per upstream resource type, each with its own TTL.
//! Identifiers are validated before any cache lookup so malformed requests
//! fail fast.

use super::freshness::{detect_price_drift, detect_timestamp_drift};
use super::proxy::{Cached, CachedResource};
use super::retry::{FetchControl, RetryPolicy};
use crate::config::{Config, SearchConfig};
use crate::error::{AppError, Result};
use crate::sources::binance::trading_pair;
use crate::sources::coingecko::ohlc_granularity;
use crate::sources::{BinanceClient, CoinGeckoClient};
use crate::types::{
    Candle, ChartData, Coin, CoinSearchResult, Consistency, OhlcProvider, ProviderPreference,
};
use tracing::{debug, info, warn};

/// Size of the master list backing search.
const SEARCH_INDEX_SIZE: u32 = 250;
const SEARCH_INDEX_KEY: &str = "search:top250:usd";
const MAX_PER_PAGE: u32 = 250;

/// Candles plus where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcSeries {
    pub candles: Vec<Candle>,
    pub provider: OhlcProvider,
    pub granularity: String,
}

/// OHLC result with an optional cross-check against the market snapshot.
#[derive(Debug, Clone)]
pub struct OhlcResult {
    pub series: Cached<OhlcSeries>,
    pub consistency: Option<Consistency>,
}

/// Resource selector for cache maintenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Markets,
    History,
    Ohlc,
    SearchIndex,
}

fn validate_coin_id(coin_id: &str) -> Result<String> {
    let id = coin_id.trim().to_lowercase();
    if id.is_empty() {
        return Err(AppError::InvalidRequest("coin id is required".to_string()));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(AppError::InvalidRequest(format!("invalid coin id: {}", coin_id)));
    }
    Ok(id)
}

fn validate_currency(vs_currency: &str) -> Result<String> {
    let currency = vs_currency.trim().to_lowercase();
    if currency.is_empty()
        || currency.len() > 10
        || !currency.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(AppError::InvalidRequest(format!(
            "invalid vs_currency: {:?}",
            vs_currency
        )));
    }
    Ok(currency)
}

fn validate_days(days: u32) -> Result<u32> {
    if days == 0 {
        return Err(AppError::InvalidRequest("days must be at least 1".to_string()));
    }
    Ok(days)
}

/// Filter the master list for `query`.
///
/// An empty query returns the first `default_limit` coins. Otherwise coins
/// whose name, symbol or id contain the query are returned, exact symbol or
/// id matches first, capped at `max_results`.
pub fn filter_coins(coins: &[Coin], query: &str, search: &SearchConfig) -> Vec<CoinSearchResult> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return coins
            .iter()
            .take(search.default_limit)
            .map(CoinSearchResult::from)
            .collect();
    }

    let mut hits: Vec<&Coin> = coins.iter().filter(|c| c.matches(&query)).collect();
    // Stable sort keeps market-cap order within each group
    hits.sort_by_key(|c| !(c.symbol.eq_ignore_ascii_case(&query) || c.id == query));

    hits.into_iter()
        .take(search.max_results)
        .map(CoinSearchResult::from)
        .collect()
}

/// Upstream market data behind per-resource caches.
pub struct MarketDataService {
    coingecko: CoinGeckoClient,
    binance: BinanceClient,
    markets: CachedResource<Vec<Coin>>,
    history: CachedResource<ChartData>,
    ohlc: CachedResource<OhlcSeries>,
    search_index: CachedResource<Vec<Coin>>,
    search: SearchConfig,
}

impl MarketDataService {
    pub fn new(config: &Config) -> Self {
        let retry = RetryPolicy::from(&config.retry);
        let max_entries = config.cache.max_entries;

        Self {
            coingecko: CoinGeckoClient::new(
                config.coingecko_base_url.clone(),
                config.coingecko_api_key.clone(),
                config.upstream_timeout,
            ),
            binance: BinanceClient::new(config.binance_base_url.clone(), config.upstream_timeout),
            markets: CachedResource::new(
                "markets",
                config.cache.market_ttl,
                max_entries,
                retry.clone(),
            ),
            history: CachedResource::new(
                "history",
                config.cache.history_ttl,
                max_entries,
                retry.clone(),
            ),
            ohlc: CachedResource::new("ohlc", config.cache.ohlc_ttl, max_entries, retry.clone()),
            search_index: CachedResource::new(
                "search",
                config.cache.search_ttl,
                max_entries,
                retry,
            ),
            search: config.search.clone(),
        }
    }

    /// TTL of a resource, also used as its freshness threshold.
    pub fn ttl(&self, resource: Resource) -> std::time::Duration {
        match resource {
            Resource::Markets => self.markets.ttl(),
            Resource::History => self.history.ttl(),
            Resource::Ohlc => self.ohlc.ttl(),
            Resource::SearchIndex => self.search_index.ttl(),
        }
    }

    /// One page of coins ordered by market cap.
    pub async fn get_market_list(
        &self,
        vs_currency: &str,
        per_page: u32,
        page: u32,
        control: &FetchControl,
    ) -> Result<Cached<Vec<Coin>>> {
        let vs_currency = validate_currency(vs_currency)?;
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(AppError::InvalidRequest(format!(
                "per_page must be between 1 and {}",
                MAX_PER_PAGE
            )));
        }
        if page == 0 {
            return Err(AppError::InvalidRequest("page must be at least 1".to_string()));
        }

        let key = format!("markets:{}:{}:{}", vs_currency, per_page, page);
        self.markets
            .get(&key, control, || self.coingecko.markets(&vs_currency, per_page, page))
            .await
    }

    /// Historical price, market cap and volume series for a coin.
    pub async fn get_history(
        &self,
        coin_id: &str,
        days: u32,
        vs_currency: &str,
        control: &FetchControl,
    ) -> Result<Cached<ChartData>> {
        let coin_id = validate_coin_id(coin_id)?;
        let days = validate_days(days)?;
        let vs_currency = validate_currency(vs_currency)?;

        let key = format!("history:{}:{}:{}", coin_id, days, vs_currency);
        self.history
            .get(&key, control, || {
                self.coingecko.market_chart(&coin_id, days, &vs_currency)
            })
            .await
    }

    /// OHLC candles, from Binance when it lists the pair and the caller
    /// allows it, otherwise from CoinGecko.
    pub async fn get_ohlc(
        &self,
        coin_id: &str,
        days: u32,
        vs_currency: &str,
        preference: ProviderPreference,
        control: &FetchControl,
    ) -> Result<OhlcResult> {
        let coin_id = validate_coin_id(coin_id)?;
        let days = validate_days(days)?;
        let vs_currency = validate_currency(vs_currency)?;

        let pair = if preference.allows_fast_venue() {
            trading_pair(&coin_id, &vs_currency)
        } else {
            None
        };

        // Keyed by the venue actually used
        let venue = pair.as_deref().unwrap_or("coingecko");
        let key = format!("ohlc:{}:{}:{}:{}", coin_id, days, vs_currency, venue);

        let series = self
            .ohlc
            .get(&key, control, || {
                self.fetch_ohlc(&coin_id, days, &vs_currency, pair.as_deref())
            })
            .await?;

        let consistency = self.cross_check(&coin_id, &vs_currency, &series.data.candles);

        Ok(OhlcResult {
            series,
            consistency,
        })
    }

    /// One fetch attempt: the preferred venue first, then the fallback.
    async fn fetch_ohlc(
        &self,
        coin_id: &str,
        days: u32,
        vs_currency: &str,
        pair: Option<&str>,
    ) -> Result<OhlcSeries> {
        if let Some(pair) = pair {
            match self.binance.klines(pair, days).await {
                Ok(candles) if !candles.is_empty() => {
                    let (interval, _) = crate::sources::binance::kline_plan(days);
                    return Ok(OhlcSeries {
                        candles,
                        provider: OhlcProvider::Binance,
                        granularity: interval.to_string(),
                    });
                }
                Ok(_) => debug!("Binance returned no candles for {}, using CoinGecko", pair),
                Err(e) => warn!(
                    "Binance OHLC failed for {}, falling back to CoinGecko: {}",
                    pair, e
                ),
            }
        }

        let candles = self.coingecko.ohlc(coin_id, days, vs_currency).await?;
        Ok(OhlcSeries {
            candles,
            provider: OhlcProvider::CoinGecko,
            granularity: ohlc_granularity(days).to_string(),
        })
    }

    /// Compare the latest candle with the newest cached market-list row for
    /// the same coin and currency. Never fetches.
    fn cross_check(
        &self,
        coin_id: &str,
        vs_currency: &str,
        candles: &[Candle],
    ) -> Option<Consistency> {
        let last = candles.last()?;
        let prefix = format!("markets:{}:", vs_currency);

        let mut newest: Option<(i64, Coin)> = None;
        self.markets.cache().for_each(|entry| {
            if !entry.key.starts_with(&prefix) {
                return;
            }
            if newest.as_ref().map(|(t, _)| entry.fetched_at > *t).unwrap_or(true) {
                if let Some(coin) = entry.data.iter().find(|c| c.id == coin_id) {
                    newest = Some((entry.fetched_at, coin.clone()));
                }
            }
        });

        let (_, coin) = newest?;
        let reference = coin.current_price?;

        Some(Consistency {
            price: detect_price_drift(reference, last.close),
            timestamp: coin
                .last_updated_ms()
                .map(|quoted_at| detect_timestamp_drift(quoted_at, last.timestamp)),
        })
    }

    /// Search the cached master list.
    pub async fn search(
        &self,
        query: &str,
        control: &FetchControl,
    ) -> Result<Cached<Vec<CoinSearchResult>>> {
        let index = self
            .search_index
            .get(SEARCH_INDEX_KEY, control, || {
                self.coingecko.markets("usd", SEARCH_INDEX_SIZE, 1)
            })
            .await?;

        Ok(index.map(|coins| filter_coins(&coins, query, &self.search)))
    }

    /// Drop one cached key.
    pub fn evict(&self, resource: Resource, key: &str) {
        match resource {
            Resource::Markets => self.markets.evict(key),
            Resource::History => self.history.evict(key),
            Resource::Ohlc => self.ohlc.evict(key),
            Resource::SearchIndex => self.search_index.evict(key),
        }
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.markets.clear();
        self.history.clear();
        self.ohlc.clear();
        self.search_index.clear();
        info!("Cleared all market data caches");
    }

    /// Number of keys held per resource.
    pub fn cache_sizes(&self) -> [(Resource, usize); 4] {
        [
            (Resource::Markets, self.markets.cache().len()),
            (Resource::History, self.history.cache().len()),
            (Resource::Ohlc, self.ohlc.cache().len()),
            (Resource::SearchIndex, self.search_index.cache().len()),
        ]
    }
}
