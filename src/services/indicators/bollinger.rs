//! Bollinger Bands indicator.

use super::series::{check_period, sma};
use crate::error::{AppError, Result};
use crate::types::{BollingerParams, BollingerSeries};

/// Population standard deviation (divides by N, not N - 1).
fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance: f64 =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Bollinger Bands over `prices`.
///
/// - Middle band: SMA(period)
/// - Upper band: SMA + multiplier * StdDev
/// - Lower band: SMA - multiplier * StdDev
pub fn bollinger(prices: &[f64], params: BollingerParams) -> Result<BollingerSeries> {
    let BollingerParams { period, multiplier } = params;
    check_period("Bollinger", period)?;
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(AppError::InvalidParameter(format!(
            "Bollinger multiplier must be a non-negative number, got {}",
            multiplier
        )));
    }

    let middle = sma(prices, period)?;
    let mut upper = vec![None; prices.len()];
    let mut lower = vec![None; prices.len()];

    for (i, mean) in middle.iter().enumerate() {
        let Some(mean) = *mean else { continue };
        let window = &prices[i + 1 - period..=i];
        let width = multiplier * std_dev(window, mean);
        upper[i] = Some(mean + width);
        lower[i] = Some(mean - width);
    }

    Ok(BollingerSeries {
        upper,
        middle,
        lower,
    })
}
