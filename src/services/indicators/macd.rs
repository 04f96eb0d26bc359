//! MACD (Moving Average Convergence Divergence) indicator.

use super::series::{check_period, ema};
use crate::error::{AppError, Result};
use crate::types::{IndicatorSeries, MacdParams, MacdSeries};

/// MACD over `prices`.
///
/// - MACD Line = EMA(fast) - EMA(slow)
/// - Signal Line = EMA(signal) of MACD Line
/// - Histogram = MACD Line - Signal Line
///
/// The MACD line has `slow - 1` leading gaps, so its defined values are
/// compacted before the signal EMA runs and scattered back afterwards.
pub fn macd(prices: &[f64], params: MacdParams) -> Result<MacdSeries> {
    let MacdParams { fast, slow, signal } = params;
    check_period("MACD fast", fast)?;
    check_period("MACD slow", slow)?;
    check_period("MACD signal", signal)?;
    if fast >= slow {
        return Err(AppError::InvalidParameter(format!(
            "MACD fast period ({}) must be shorter than slow period ({})",
            fast, slow
        )));
    }

    let n = prices.len();
    let fast_ema = ema(prices, fast)?;
    let slow_ema = ema(prices, slow)?;

    let macd_line: IndicatorSeries = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let mut signal_line = vec![None; n];
    let mut histogram = vec![None; n];

    if n < slow + signal {
        return Ok(MacdSeries {
            macd: macd_line,
            signal: signal_line,
            histogram,
        });
    }

    let (indices, values): (Vec<usize>, Vec<f64>) = macd_line
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .unzip();

    let compact_signal = ema(&values, signal)?;
    for (&i, s) in indices.iter().zip(compact_signal) {
        signal_line[i] = s;
    }

    for i in 0..n {
        if let (Some(m), Some(s)) = (macd_line[i], signal_line[i]) {
            histogram[i] = Some(m - s);
        }
    }

    Ok(MacdSeries {
        macd: macd_line,
        signal: signal_line,
        histogram,
    })
}
