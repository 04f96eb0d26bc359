//! Relative Strength Index (RSI) with Wilder smoothing.

use super::series::check_period;
use crate::error::Result;
use crate::types::IndicatorSeries;

/// RSI from the average gain to average loss ratio.
///
/// Values range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

/// Calculate RSI aligned with `prices`.
///
/// The first value sits at index `period`. Fewer than `period + 1` prices
/// yields an empty series, meaning the indicator is not yet computable.
pub fn rsi(prices: &[f64], period: usize) -> Result<IndicatorSeries> {
    check_period("RSI", period)?;

    if prices.len() < period + 1 {
        return Ok(Vec::new());
    }

    let mut gains = Vec::with_capacity(prices.len() - 1);
    let mut losses = Vec::with_capacity(prices.len() - 1);

    for i in 1..prices.len() {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    let mut out = vec![None; prices.len()];

    // Calculate initial averages
    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    // gains[i] is the change ending at price index i + 1
    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        out[i + 1] = Some(rsi_value(avg_gain, avg_loss));
    }

    Ok(out)
}
