//! Property tests for the indicator engine over realistic price paths.

use wraith::error::AppError;
use wraith::services::indicators::{bollinger, ema, macd, rsi, sma};
use wraith::services::{compute_indicators, parse_indicator_set};
use wraith::types::{BollingerParams, IndicatorKind, IndicatorSet, MacdParams, Timeframe};

/// Deterministic noisy walk around 100.
fn price_path(count: usize) -> Vec<f64> {
    let mut price = 100.0;
    (0..count)
        .map(|i| {
            let step = ((i * 7919) % 13) as f64 - 6.0;
            price = (price + step * 0.37 + (i as f64 / 9.0).sin()).max(1.0);
            price
        })
        .collect()
}

fn all() -> IndicatorSet {
    IndicatorKind::ALL.into_iter().collect()
}

#[test]
fn test_every_series_aligned_with_input() {
    for timeframe in Timeframe::ALL {
        let prices = price_path(200);
        let bundle = compute_indicators(&prices, timeframe, &all()).unwrap();

        assert_eq!(bundle.rsi.as_ref().unwrap().len(), prices.len());
        assert_eq!(bundle.sma.as_ref().unwrap().len(), prices.len());

        let macd = bundle.macd.as_ref().unwrap();
        assert_eq!(macd.macd.len(), prices.len());
        assert_eq!(macd.signal.len(), prices.len());
        assert_eq!(macd.histogram.len(), prices.len());

        let bands = bundle.bollinger.as_ref().unwrap();
        assert_eq!(bands.upper.len(), prices.len());
        assert_eq!(bands.middle.len(), prices.len());
        assert_eq!(bands.lower.len(), prices.len());
    }
}

#[test]
fn test_compute_is_idempotent() {
    let prices = price_path(120);
    let first = compute_indicators(&prices, Timeframe::ThirtyDays, &all()).unwrap();
    let second = compute_indicators(&prices, Timeframe::ThirtyDays, &all()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_warm_up_prefix_then_defined() {
    let prices = price_path(100);
    let period = 20;
    let out = sma(&prices, period).unwrap();

    assert!(out[..period - 1].iter().all(Option::is_none));
    assert!(out[period - 1..].iter().all(Option::is_some));

    let out = ema(&prices, period).unwrap();
    assert!(out[..period - 1].iter().all(Option::is_none));
    assert!(out[period - 1..].iter().all(Option::is_some));
}

#[test]
fn test_rsi_bounded() {
    let prices = price_path(300);
    for period in [2, 9, 14, 21] {
        let out = rsi(&prices, period).unwrap();
        assert!(out[..period].iter().all(Option::is_none));
        for value in out.iter().flatten() {
            assert!((0.0..=100.0).contains(value), "rsi {} out of range", value);
        }
    }
}

#[test]
fn test_rsi_too_short_is_empty() {
    assert!(rsi(&price_path(14), 14).unwrap().is_empty());
    assert_eq!(rsi(&price_path(15), 14).unwrap().len(), 15);
}

#[test]
fn test_bollinger_bands_ordered() {
    let prices = price_path(150);
    let bands = bollinger(
        &prices,
        BollingerParams {
            period: 20,
            multiplier: 2.0,
        },
    )
    .unwrap();

    for i in 0..prices.len() {
        match (bands.lower[i], bands.middle[i], bands.upper[i]) {
            (Some(lower), Some(middle), Some(upper)) => {
                assert!(lower <= middle && middle <= upper);
            }
            (None, None, None) => assert!(i < 19),
            other => panic!("misaligned bands at {}: {:?}", i, other),
        }
    }
}

#[test]
fn test_bollinger_bands_symmetric() {
    let prices: Vec<f64> = (0..200)
        .map(|i| 100.0 + (i as f64 / 7.0).sin() * 5.0 + i as f64 * 0.1)
        .collect();
    let bands = bollinger(
        &prices,
        BollingerParams {
            period: 20,
            multiplier: 2.0,
        },
    )
    .unwrap();

    let mut defined = 0;
    for i in 0..prices.len() {
        if let (Some(lower), Some(middle), Some(upper)) =
            (bands.lower[i], bands.middle[i], bands.upper[i])
        {
            // Equal widths up to rounding
            assert!(
                ((middle - lower) - (upper - middle)).abs() < 1e-9,
                "asymmetric bands at {}",
                i
            );
            assert!(upper > lower);
            defined += 1;
        }
    }
    assert_eq!(defined, 181);
}

#[test]
fn test_bollinger_middle_is_sma() {
    let prices = price_path(60);
    let bands = bollinger(
        &prices,
        BollingerParams {
            period: 10,
            multiplier: 2.5,
        },
    )
    .unwrap();
    assert_eq!(bands.middle, sma(&prices, 10).unwrap());
}

#[test]
fn test_macd_histogram_is_difference() {
    let prices = price_path(200);
    let out = macd(
        &prices,
        MacdParams {
            fast: 12,
            slow: 26,
            signal: 9,
        },
    )
    .unwrap();

    for i in 0..prices.len() {
        match (out.macd[i], out.signal[i], out.histogram[i]) {
            (Some(m), Some(s), Some(h)) => assert!((h - (m - s)).abs() < 1e-9),
            (_, None, None) => {}
            other => panic!("histogram without signal at {}: {:?}", i, other),
        }
    }

    assert!(out.macd[24].is_none());
    assert!(out.macd[25].is_some());
    assert!(out.signal[32].is_none());
    assert!(out.signal[33].is_some());
}

#[test]
fn test_constant_prices() {
    let prices = vec![50.0; 40];

    let averages = sma(&prices, 5).unwrap();
    assert!(averages.iter().flatten().all(|v| (*v - 50.0).abs() < 1e-12));

    let bands = bollinger(
        &prices,
        BollingerParams {
            period: 5,
            multiplier: 2.0,
        },
    )
    .unwrap();
    assert_eq!(bands.upper, bands.lower);

    let out = macd(
        &prices,
        MacdParams {
            fast: 3,
            slow: 6,
            signal: 3,
        },
    )
    .unwrap();
    assert!(out.histogram.iter().flatten().all(|h| h.abs() < 1e-12));
}

#[test]
fn test_empty_input() {
    let bundle = compute_indicators(&[], Timeframe::SevenDays, &all()).unwrap();
    assert!(bundle.rsi.unwrap().is_empty());
    assert!(bundle.sma.unwrap().is_empty());
    assert!(bundle.macd.unwrap().macd.is_empty());
    assert!(bundle.bollinger.unwrap().middle.is_empty());
}

#[test]
fn test_invalid_parameters_rejected() {
    let prices = price_path(50);
    assert!(matches!(sma(&prices, 0), Err(AppError::InvalidParameter(_))));
    assert!(matches!(rsi(&prices, 0), Err(AppError::InvalidParameter(_))));
    assert!(matches!(
        macd(
            &prices,
            MacdParams {
                fast: 26,
                slow: 12,
                signal: 9
            }
        ),
        Err(AppError::InvalidParameter(_))
    ));
    assert!(matches!(
        bollinger(
            &prices,
            BollingerParams {
                period: 20,
                multiplier: -1.0
            }
        ),
        Err(AppError::InvalidParameter(_))
    ));
}

#[test]
fn test_indicator_selection() {
    let enabled = parse_indicator_set(Some("MACD, bb, unknown"));
    let bundle = compute_indicators(&price_path(80), Timeframe::OneDay, &enabled).unwrap();
    assert!(bundle.macd.is_some());
    assert!(bundle.bollinger.is_some());
    assert!(bundle.rsi.is_none());
    assert!(bundle.sma.is_none());

    assert_eq!(parse_indicator_set(None).len(), 4);
    assert_eq!(parse_indicator_set(Some("nonsense")).len(), 4);
}

#[test]
fn test_timeframe_parameters_drive_output() {
    let prices = price_path(100);
    let day = compute_indicators(&prices, Timeframe::OneDay, &all()).unwrap();
    let year = compute_indicators(&prices, Timeframe::OneYear, &all()).unwrap();

    // SMA 10 vs SMA 50
    let day_sma = day.sma.unwrap();
    let year_sma = year.sma.unwrap();
    assert!(day_sma[9].is_some());
    assert!(year_sma[48].is_none());
    assert!(year_sma[49].is_some());
}
