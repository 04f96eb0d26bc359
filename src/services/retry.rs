//! Retry with exponential backoff, bounded by a caller deadline and
//! cancellation signal.

use crate::config::RetryConfig;
use crate::error::{AppError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::warn;

/// Why a fetch stopped before the upstream answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    TimedOut,
    Cancelled,
}

impl From<Interrupt> for AppError {
    fn from(interrupt: Interrupt) -> Self {
        match interrupt {
            Interrupt::TimedOut => AppError::UpstreamUnavailable("request timed out".to_string()),
            Interrupt::Cancelled => AppError::Cancelled,
        }
    }
}

/// Handle used by the caller to abandon a fetch.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.0.send(true);
    }
}

/// Caller-side limits on an upstream fetch: an overall deadline and a
/// cancellation signal. Both also interrupt backoff sleeps.
#[derive(Debug, Clone, Default)]
pub struct FetchControl {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

impl FetchControl {
    /// No deadline, never cancelled.
    pub fn none() -> Self {
        Self::default()
    }

    /// A control plus the handle that cancels it.
    pub fn cancellable() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                deadline: None,
                cancel: Some(rx),
            },
            CancelHandle(tx),
        )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Resolves once the deadline passes or the fetch is cancelled.
    async fn interrupted(&self) -> Interrupt {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        let cancelled = async {
            match self.cancel.clone() {
                Some(mut rx) => loop {
                    if *rx.borrow_and_update() {
                        break;
                    }
                    // A dropped handle can never cancel
                    if rx.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                },
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            _ = cancelled => Interrupt::Cancelled,
            _ = deadline => Interrupt::TimedOut,
        }
    }
}

/// Backoff policy for upstream calls.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: config.initial_backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`, given `attempt` failures so far.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or runs
/// out of attempts. A rate limit that persists through every attempt is
/// reported as `UpstreamUnavailable`.
pub async fn with_retry<T, F, Fut>(
    label: &str,
    policy: &RetryPolicy,
    control: &FetchControl,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let result = tokio::select! {
            biased;
            interrupt = control.interrupted() => return Err(interrupt.into()),
            result = op() => result,
        };

        let err = match result {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => e,
        };

        if attempt >= policy.max_attempts {
            warn!("{}: giving up after {} attempts: {}", label, attempt, err);
            return Err(match err {
                AppError::UpstreamRateLimited => AppError::UpstreamUnavailable(format!(
                    "rate limited after {} attempts",
                    attempt
                )),
                other => other,
            });
        }

        let delay = policy.backoff(attempt);
        warn!(
            "{}: attempt {}/{} failed ({}), retrying in {:?}",
            label, attempt, policy.max_attempts, err, delay
        );

        tokio::select! {
            biased;
            interrupt = control.interrupted() => return Err(interrupt.into()),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
