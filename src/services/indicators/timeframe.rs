//! Fixed indicator parameters per dashboard timeframe.

use crate::types::{BollingerParams, IndicatorKind, MacdParams, Timeframe, TimeframeConfig};

const STANDARD_MACD: MacdParams = MacdParams {
    fast: 12,
    slow: 26,
    signal: 9,
};

impl Timeframe {
    /// Indicator parameters for this timeframe.
    pub fn config(&self) -> TimeframeConfig {
        match self {
            // Intraday charts carry few points, so every window is shorter
            Timeframe::OneDay => TimeframeConfig {
                rsi_period: 9,
                sma_period: 10,
                macd: MacdParams {
                    fast: 6,
                    slow: 13,
                    signal: 5,
                },
                bollinger: BollingerParams {
                    period: 10,
                    multiplier: 2.0,
                },
            },
            Timeframe::SevenDays | Timeframe::ThirtyDays => TimeframeConfig {
                rsi_period: 14,
                sma_period: 20,
                macd: STANDARD_MACD,
                bollinger: BollingerParams {
                    period: 20,
                    multiplier: 2.0,
                },
            },
            Timeframe::OneYear => TimeframeConfig {
                rsi_period: 21,
                sma_period: 50,
                macd: STANDARD_MACD,
                bollinger: BollingerParams {
                    period: 20,
                    multiplier: 2.5,
                },
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "24 hours",
            Timeframe::SevenDays => "7 days",
            Timeframe::ThirtyDays => "30 days",
            Timeframe::OneYear => "1 year",
        }
    }
}

/// Human-readable description of an indicator as configured for `timeframe`.
pub fn describe(kind: IndicatorKind, timeframe: Timeframe) -> String {
    let config = timeframe.config();
    match kind {
        IndicatorKind::Rsi => format!(
            "RSI ({}): momentum oscillator from 0 to 100. \
             Above 70 is overbought, below 30 is oversold.",
            config.rsi_period
        ),
        IndicatorKind::Sma => format!(
            "SMA ({}): average price over the last {} points; price above it suggests an uptrend.",
            config.sma_period, config.sma_period
        ),
        IndicatorKind::Macd => format!(
            "MACD ({}, {}, {}): difference of two EMAs with a signal line. \
             A positive histogram means bullish momentum.",
            config.macd.fast, config.macd.slow, config.macd.signal
        ),
        IndicatorKind::Bollinger => format!(
            "Bollinger Bands ({}, {}): SMA envelope at {} standard deviations. \
             Narrow bands signal low volatility.",
            config.bollinger.period, config.bollinger.multiplier, config.bollinger.multiplier
        ),
    }
}
