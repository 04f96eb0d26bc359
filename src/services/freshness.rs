//! Freshness and drift checks for upstream observations.

use crate::types::{FreshnessVerdict, PriceDrift, TimestampDrift};

/// Largest relative price difference (percent) treated as the same quote.
pub const MAX_PRICE_DRIFT_PERCENT: f64 = 1.0;

/// Largest timestamp difference treated as the same moment.
pub const MAX_TIMESTAMP_DRIFT_MS: i64 = 120_000;

/// Classify data fetched at `fetched_at` (epoch ms) against the wall clock.
///
/// Not cached: calling again later can flip the verdict from fresh to stale.
pub fn evaluate_freshness(fetched_at: i64, threshold_ms: i64) -> FreshnessVerdict {
    evaluate_freshness_at(fetched_at, threshold_ms, chrono::Utc::now().timestamp_millis())
}

/// Same as [`evaluate_freshness`] with an explicit `now`.
pub fn evaluate_freshness_at(fetched_at: i64, threshold_ms: i64, now: i64) -> FreshnessVerdict {
    let age_ms = now.saturating_sub(fetched_at);
    let is_fresh = age_ms <= threshold_ms;

    let reason = if age_ms < 0 {
        Some(format!("fetch time is {}ms in the future", age_ms.unsigned_abs()))
    } else if !is_fresh {
        Some(format!(
            "data is {}ms old, threshold is {}ms",
            age_ms, threshold_ms
        ))
    } else {
        None
    };

    FreshnessVerdict {
        is_fresh,
        age_ms,
        reason,
    }
}

/// Relative drift of `b` from the reference price `a`, in percent.
pub fn detect_price_drift(a: f64, b: f64) -> PriceDrift {
    if a == 0.0 {
        return PriceDrift {
            drift_percent: 0.0,
            acceptable: true,
        };
    }

    let drift_percent = (a - b).abs() * 100.0 / a.abs();
    PriceDrift {
        drift_percent,
        acceptable: drift_percent <= MAX_PRICE_DRIFT_PERCENT,
    }
}

/// Absolute drift between two epoch-ms timestamps.
pub fn detect_timestamp_drift(t1: i64, t2: i64) -> TimestampDrift {
    detect_timestamp_drift_with(t1, t2, MAX_TIMESTAMP_DRIFT_MS)
}

pub fn detect_timestamp_drift_with(t1: i64, t2: i64, max_drift_ms: i64) -> TimestampDrift {
    let drift_ms = i64::try_from(t1.abs_diff(t2)).unwrap_or(i64::MAX);
    TimestampDrift {
        drift_ms,
        acceptable: drift_ms <= max_drift_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_freshness_boundary() {
        assert!(evaluate_freshness_at(NOW - 59_999, 60_000, NOW).is_fresh);
        assert!(evaluate_freshness_at(NOW - 60_000, 60_000, NOW).is_fresh);
        let stale = evaluate_freshness_at(NOW - 60_001, 60_000, NOW);
        assert!(!stale.is_fresh);
        assert_eq!(stale.age_ms, 60_001);
        assert!(stale.reason.is_some());
    }

    #[test]
    fn test_fresh_has_no_reason() {
        let verdict = evaluate_freshness_at(NOW - 10, 60_000, NOW);
        assert_eq!(verdict.age_ms, 10);
        assert!(verdict.reason.is_none());
    }

    #[test]
    fn test_future_timestamp_is_flagged() {
        let verdict = evaluate_freshness_at(NOW + 5_000, 60_000, NOW);
        assert!(verdict.is_fresh);
        assert_eq!(verdict.age_ms, -5_000);
        assert!(verdict.reason.unwrap().contains("future"));
    }

    #[test]
    fn test_wall_clock_freshness() {
        let now = chrono::Utc::now().timestamp_millis();
        assert!(evaluate_freshness(now - 1_000, 60_000).is_fresh);
        assert!(!evaluate_freshness(now - 120_000, 60_000).is_fresh);
    }

    #[test]
    fn test_price_drift_boundary() {
        let exact = detect_price_drift(100.0, 101.0);
        assert_eq!(exact.drift_percent, 1.0);
        assert!(exact.acceptable);
        assert!(!detect_price_drift(100.0, 101.01).acceptable);
        assert!(detect_price_drift(100.0, 99.5).acceptable);
    }

    #[test]
    fn test_price_drift_zero_reference() {
        let drift = detect_price_drift(0.0, 50.0);
        assert_eq!(drift.drift_percent, 0.0);
        assert!(drift.acceptable);
    }

    #[test]
    fn test_timestamp_drift() {
        let ok = detect_timestamp_drift(NOW, NOW - 120_000);
        assert_eq!(ok.drift_ms, 120_000);
        assert!(ok.acceptable);
        assert!(!detect_timestamp_drift(NOW - 120_001, NOW).acceptable);
        assert!(!detect_timestamp_drift_with(NOW, NOW + 10, 5).acceptable);
    }

    #[test]
    fn test_extreme_timestamps_saturate() {
        let ancient = evaluate_freshness_at(i64::MIN, 60_000, NOW);
        assert_eq!(ancient.age_ms, i64::MAX);
        assert!(!ancient.is_fresh);

        let far_future = evaluate_freshness_at(i64::MAX, 60_000, i64::MIN);
        assert_eq!(far_future.age_ms, i64::MIN);
        assert!(far_future.reason.unwrap().contains("future"));

        let drift = detect_timestamp_drift(i64::MIN, i64::MAX);
        assert_eq!(drift.drift_ms, i64::MAX);
        assert!(!drift.acceptable);
        assert_eq!(detect_timestamp_drift(i64::MAX, i64::MAX).drift_ms, 0);
    }
}
