//! Moving averages over plain price slices.

use crate::error::{AppError, Result};
use crate::types::IndicatorSeries;

pub(crate) fn check_period(name: &str, period: usize) -> Result<()> {
    if period == 0 {
        return Err(AppError::InvalidParameter(format!(
            "{} period must be at least 1",
            name
        )));
    }
    Ok(())
}

/// Simple moving average.
///
/// Index `i` holds the mean of the `period` values ending at `i`; the first
/// `period - 1` positions are `None`.
pub fn sma(series: &[f64], period: usize) -> Result<IndicatorSeries> {
    check_period("SMA", period)?;

    let mut out = vec![None; series.len()];
    if series.len() < period {
        return Ok(out);
    }

    // Summed per window, no running total
    for i in (period - 1)..series.len() {
        let window = &series[i + 1 - period..=i];
        out[i] = Some(window.iter().sum::<f64>() / period as f64);
    }

    Ok(out)
}

/// Exponential moving average seeded with the SMA of the first `period` values.
pub fn ema(series: &[f64], period: usize) -> Result<IndicatorSeries> {
    check_period("EMA", period)?;

    let mut out = vec![None; series.len()];
    if series.len() < period {
        return Ok(out);
    }

    let multiplier = 2.0 / (period as f64 + 1.0);

    // First EMA is SMA
    let mut prev = series[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(prev);

    for i in period..series.len() {
        prev = (series[i] - prev) * multiplier + prev;
        out[i] = Some(prev);
    }

    Ok(out)
}
