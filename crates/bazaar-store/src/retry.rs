//! Bounded retry with exponential back-off and jitter for remote calls.
//!
//! Retries happen inside a single logical remote attempt. Once they are
//! exhausted the attempt counts as one failure and the collection store
//! downgrades.

use std::future::Future;
use std::time::Duration;

use crate::error::TransportError;

/// Which failures a request may be re-sent after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryPolicy {
    /// Reads: any transient failure.
    Read,
    /// Writes are not idempotent, so only failures where the server cannot
    /// have applied the request are retried.
    Write,
}

impl RetryPolicy {
    pub(crate) fn allows(self, err: &TransportError) -> bool {
        match self {
            RetryPolicy::Read => is_retriable(err),
            RetryPolicy::Write => is_undelivered(err),
        }
    }
}

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 429 and 5xx.
///
/// **Not retriable:** other statuses, malformed bodies, bad base URLs.
pub(crate) fn is_retriable(err: &TransportError) -> bool {
    match err {
        TransportError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        TransportError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        TransportError::MalformedBody { .. } | TransportError::InvalidBaseUrl { .. } => false,
    }
}

/// Returns `true` only when the request never reached the server: the
/// connection could not be opened, or the server refused it with 429.
/// Timeouts and 5xx are excluded since the write may already be applied.
pub(crate) fn is_undelivered(err: &TransportError) -> bool {
    match err {
        TransportError::Http(e) => e.is_connect(),
        TransportError::UnexpectedStatus { status, .. } => *status == 429,
        TransportError::MalformedBody { .. } | TransportError::InvalidBaseUrl { .. } => false,
    }
}

/// Delay schedule between retries: `base_ms * 2^(n-1)` before retry *n*,
/// capped, then scaled by a random factor in `[0.75, 1.25)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Backoff {
    base_ms: u64,
    cap_ms: u64,
}

impl Backoff {
    pub(crate) fn new(base_ms: u64) -> Self {
        Self {
            base_ms,
            cap_ms: 10_000,
        }
    }

    /// Un-jittered delay before retry number `retry` (1-based).
    pub(crate) fn nominal_ms(self, retry: u32) -> u64 {
        let shift = retry.saturating_sub(1).min(16);
        self.base_ms.saturating_mul(1u64 << shift).min(self.cap_ms)
    }

    fn jittered(self, retry: u32) -> Duration {
        let factor = 0.75 + rand::random::<f64>() * 0.5;
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let ms = (self.nominal_ms(retry) as f64 * factor) as u64;
        Duration::from_millis(ms)
    }
}

/// Runs `operation`, retrying failures `policy` allows up to `max_retries`
/// times. Other errors and the last failure are returned as-is.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let backoff = Backoff::new(backoff_base_ms);
    let mut retry = 0u32;
    let mut outcome = operation().await;
    while let Err(err) = &outcome {
        if retry == max_retries || !policy.allows(err) {
            break;
        }
        retry += 1;
        let delay = backoff.jittered(retry);
        tracing::debug!(
            retry,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient remote error; backing off"
        );
        tokio::time::sleep(delay).await;
        outcome = operation().await;
    }
    outcome
}
