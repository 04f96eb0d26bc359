//! Technical indicator implementations.
//!
//! Every function here is pure: output series are aligned index-for-index
//! with the input prices, and warm-up positions are `None`.

pub mod bollinger;
pub mod macd;
pub mod rsi;
pub mod series;
pub mod timeframe;

pub use bollinger::bollinger;
pub use macd::macd;
pub use rsi::rsi;
pub use series::{ema, sma};
pub use timeframe::describe;

use crate::error::Result;
use crate::types::{IndicatorBundle, IndicatorKind, IndicatorSet, Timeframe};

/// Compute the enabled indicators for `prices` using the timeframe's parameters.
pub fn compute_indicators(
    prices: &[f64],
    timeframe: Timeframe,
    enabled: &IndicatorSet,
) -> Result<IndicatorBundle> {
    let config = timeframe.config();
    let mut bundle = IndicatorBundle::default();

    for kind in enabled {
        match kind {
            IndicatorKind::Rsi => bundle.rsi = Some(rsi(prices, config.rsi_period)?),
            IndicatorKind::Sma => bundle.sma = Some(sma(prices, config.sma_period)?),
            IndicatorKind::Macd => bundle.macd = Some(macd(prices, config.macd)?),
            IndicatorKind::Bollinger => {
                bundle.bollinger = Some(bollinger(prices, config.bollinger)?)
            }
        }
    }

    Ok(bundle)
}

/// Parse a comma-separated indicator list. Unknown names are ignored; an
/// empty or missing list enables everything.
pub fn parse_indicator_set(raw: Option<&str>) -> IndicatorSet {
    let parsed: IndicatorSet = raw
        .unwrap_or_default()
        .split(',')
        .filter_map(IndicatorKind::from_str)
        .collect();

    if parsed.is_empty() {
        IndicatorKind::ALL.into_iter().collect()
    } else {
        parsed
    }
}
