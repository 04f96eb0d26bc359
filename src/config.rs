use std::env;
use std::time::Duration;

pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
pub const COINGECKO_PRO_API_URL: &str = "https://pro-api.coingecko.com/api/v3";
pub const BINANCE_API_URL: &str = "https://api.binance.com/api/v3";

/// Per-resource cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Market list TTL (default: 30s).
    pub market_ttl: Duration,
    /// Historical series TTL (default: 5 min).
    pub history_ttl: Duration,
    /// OHLC candles TTL (default: 60s).
    pub ohlc_ttl: Duration,
    /// Search index TTL (default: 1h).
    pub search_ttl: Duration,
    /// Maximum number of keys held by each cache.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            market_ttl: Duration::from_secs(30),
            history_ttl: Duration::from_secs(300),
            ohlc_ttl: Duration::from_secs(60),
            search_ttl: Duration::from_secs(3600),
            max_entries: 1000,
        }
    }
}

/// Upstream retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after every failure.
    pub initial_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1000),
        }
    }
}

/// Search configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Number of coins returned for an empty query.
    pub default_limit: usize,
    /// Cap on results for a non-empty query.
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_results: 20,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// CoinGecko API key (optional, for pro tier).
    pub coingecko_api_key: Option<String>,
    /// CoinGecko REST base URL.
    pub coingecko_base_url: String,
    /// Binance REST base URL.
    pub binance_base_url: String,
    /// Per-request upstream HTTP timeout.
    pub upstream_timeout: Duration,
    pub cache: CacheConfig,
    pub retry: RetryConfig,
    pub search: SearchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            coingecko_api_key: None,
            coingecko_base_url: COINGECKO_API_URL.to_string(),
            binance_base_url: BINANCE_API_URL.to_string(),
            upstream_timeout: Duration::from_secs(10),
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let coingecko_api_key = env::var("COINGECKO_API_KEY").ok().filter(|k| !k.is_empty());

        // The pro tier lives on a separate host
        let coingecko_base_url = env::var("COINGECKO_BASE_URL").unwrap_or_else(|_| {
            if coingecko_api_key.is_some() {
                COINGECKO_PRO_API_URL.to_string()
            } else {
                COINGECKO_API_URL.to_string()
            }
        });

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT").unwrap_or(defaults.port),
            coingecko_api_key,
            coingecko_base_url,
            binance_base_url: env::var("BINANCE_BASE_URL").unwrap_or(defaults.binance_base_url),
            upstream_timeout: env_parse("UPSTREAM_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.upstream_timeout),
            cache: CacheConfig {
                market_ttl: env_parse("MARKET_TTL_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.cache.market_ttl),
                history_ttl: env_parse("HISTORY_TTL_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.cache.history_ttl),
                ohlc_ttl: env_parse("OHLC_TTL_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.cache.ohlc_ttl),
                search_ttl: env_parse("SEARCH_TTL_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.cache.search_ttl),
                max_entries: env_parse("CACHE_MAX_ENTRIES").unwrap_or(defaults.cache.max_entries),
            },
            retry: RetryConfig {
                max_attempts: env_parse("RETRY_MAX_ATTEMPTS")
                    .filter(|n: &u32| *n >= 1)
                    .unwrap_or(defaults.retry.max_attempts),
                initial_backoff: env_parse("RETRY_INITIAL_BACKOFF_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.retry.initial_backoff),
            },
            search: SearchConfig {
                default_limit: env_parse("SEARCH_DEFAULT_LIMIT")
                    .unwrap_or(defaults.search.default_limit),
                max_results: env_parse("SEARCH_MAX_RESULTS")
                    .unwrap_or(defaults.search.max_results),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        let cache = CacheConfig::default();
        assert_eq!(cache.market_ttl, Duration::from_secs(30));
        assert_eq!(cache.history_ttl, Duration::from_secs(300));
        assert_eq!(cache.ohlc_ttl, Duration::from_secs(60));
        assert_eq!(cache.search_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_default_retry_policy() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.initial_backoff, Duration::from_millis(1000));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.coingecko_base_url, COINGECKO_API_URL);
        assert_eq!(config.binance_base_url, BINANCE_API_URL);
        assert!(config.coingecko_api_key.is_none());
        assert_eq!(config.search.default_limit, 10);
        assert_eq!(config.search.max_results, 20);
    }
}
