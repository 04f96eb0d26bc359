pub mod cache;
pub mod freshness;
pub mod indicators;
pub mod market_data;
pub mod proxy;
pub mod retry;

pub use cache::{CacheEntry, TtlCache};
pub use freshness::{
    detect_price_drift, detect_timestamp_drift, detect_timestamp_drift_with, evaluate_freshness,
    evaluate_freshness_at,
};
pub use indicators::{compute_indicators, parse_indicator_set};
pub use market_data::{MarketDataService, OhlcResult, OhlcSeries, Resource};
pub use proxy::{Cached, CachedResource};
pub use retry::{with_retry, CancelHandle, FetchControl, RetryPolicy};
