//! Retry strategy module.
//!
//! Linear-backoff retry for idempotent requests:
//! - attempt `i` (0-indexed) is followed by a pause of `delay * (i + 1)`
//! - client errors (4xx) are terminal, except 408 and 429
//! - cancellation and failures marked terminal are not retried
//! - the last observed error is propagated once attempts run out

use crate::cancellation::CancellationSources;
use crate::error::{ApiError, ConfigValidationError, ErrorCode, Result, ValidationResult};
use reqwest::Method;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// Upper bound accepted by [`RetryPolicy::validate`].
pub const MAX_ATTEMPTS: u32 = 10;

/// Retry configuration for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, the first one included.
    pub attempts: u32,
    /// Base delay; the pause after attempt `i` is `delay * (i + 1)`.
    pub delay: Duration,
    /// Restrict the policy to read-only (GET) requests.
    pub only_read_only: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::read_default()
    }
}

impl RetryPolicy {
    /// Creates a read-only policy with `attempts` attempts and base `delay`.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts,
            delay,
            only_read_only: true,
        }
    }

    /// Default policy of `get`: 3 attempts, 1000 ms base delay, reads only.
    pub fn read_default() -> Self {
        Self::new(3, Duration::from_millis(1000))
    }

    /// A single attempt, i.e. no retry.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Lets the policy apply to non-idempotent methods too.
    #[must_use]
    pub fn allow_non_idempotent(mut self) -> Self {
        self.only_read_only = false;
        self
    }

    /// Returns `true` if the policy may be applied to `method`.
    pub fn applies_to(&self, method: &Method) -> bool {
        !self.only_read_only || *method == Method::GET
    }

    /// Pause after the failed attempt `attempt` (0-indexed).
    ///
    /// ```rust
    /// use resilient_api_core::retry_strategy::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::read_default();
    /// assert_eq!(policy.backoff(0), Duration::from_millis(1000));
    /// assert_eq!(policy.backoff(1), Duration::from_millis(2000));
    /// ```
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.delay.saturating_mul(attempt.saturating_add(1))
    }

    /// Validates the policy.
    ///
    /// # Validation Rules
    ///
    /// - `attempts` must be within `1..=10`
    /// - a base delay below 10 ms produces a warning
    pub fn validate(&self) -> std::result::Result<ValidationResult, ConfigValidationError> {
        if self.attempts == 0 {
            return Err(ConfigValidationError::too_low("attempts", 0, 1));
        }
        if self.attempts > MAX_ATTEMPTS {
            return Err(ConfigValidationError::too_high(
                "attempts",
                self.attempts,
                MAX_ATTEMPTS,
            ));
        }

        let mut result = ValidationResult::new();
        if self.attempts > 1 && self.delay < Duration::from_millis(10) {
            result.add_warning(format!(
                "retry delay {:?} is very short, retries will hammer the server",
                self.delay
            ));
        }
        Ok(result)
    }
}

/// Class-based retry decision on an HTTP status.
///
/// Client errors are deterministic for the same input, so 4xx is terminal;
/// 408 (request timeout) and 429 (rate limited) are the exceptions. Every
/// other outcome, including failures without a status, is retryable.
///
/// ```rust
/// use resilient_api_core::retry_strategy::is_retryable_status;
///
/// assert!(is_retryable_status(Some(500)));
/// assert!(is_retryable_status(Some(429)));
/// assert!(is_retryable_status(None));
/// assert!(!is_retryable_status(Some(404)));
/// ```
pub fn is_retryable_status(status: Option<u16>) -> bool {
    match status {
        Some(408 | 429) => true,
        Some(status) => !(400..500).contains(&status),
        None => true,
    }
}

/// Returns `true` if another attempt may follow `error`.
///
/// Cancellation is never retried: the source that fired stays fired. Neither
/// is a failure marked [`ApiError::terminal`].
pub fn should_retry(error: &ApiError) -> bool {
    error.code != Some(ErrorCode::Aborted)
        && !error.is_terminal()
        && is_retryable_status(error.status)
}

/// Runs `operation` under `policy`.
///
/// `operation` receives the 0-indexed attempt number. Backoff pauses are cut
/// short with `ABORTED` as soon as one of `sources` fires.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    sources: &CancellationSources,
    mut operation: F,
) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            Ok(value) => {
                debug!(attempt = attempt + 1, "Operation completed successfully");
                return Ok(value);
            }
            Err(err) => {
                let retryable = should_retry(&err);
                if !retryable || attempt + 1 >= attempts {
                    error!(
                        attempt = attempt + 1,
                        attempts,
                        error = %err,
                        status = ?err.status,
                        code = ?err.code,
                        is_retryable = retryable,
                        "Operation failed, not retrying"
                    );
                    return Err(err);
                }

                let delay = policy.backoff(attempt);
                warn!(
                    attempt = attempt + 1,
                    attempts,
                    delay_ms = %delay.as_millis(),
                    error = %err,
                    status = ?err.status,
                    "Operation failed, retrying after delay"
                );

                tokio::select! {
                    biased;
                    () = sources.cancelled() => return Err(ApiError::aborted()),
                    () = sleep(delay) => {}
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.delay, Duration::from_millis(1000));
        assert!(policy.only_read_only);
    }

    #[test]
    fn test_applies_to() {
        let policy = RetryPolicy::read_default();
        assert!(policy.applies_to(&Method::GET));
        assert!(!policy.applies_to(&Method::POST));
        assert!(!policy.applies_to(&Method::DELETE));

        let policy = policy.allow_non_idempotent();
        assert!(policy.applies_to(&Method::POST));
        assert!(policy.applies_to(&Method::PUT));
    }

    #[test]
    fn test_backoff_is_linear() {
        let policy = RetryPolicy::new(5, Duration::from_millis(500));
        assert_eq!(policy.backoff(0), Duration::from_millis(500));
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(2), Duration::from_millis(1500));
        assert_eq!(policy.backoff(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_validate() {
        assert!(RetryPolicy::read_default().validate().is_ok());
        assert!(RetryPolicy::none().validate().is_ok());
        assert!(RetryPolicy::new(0, Duration::from_secs(1)).validate().is_err());
        assert!(RetryPolicy::new(11, Duration::from_secs(1)).validate().is_err());
        assert!(
            RetryPolicy::new(3, Duration::from_millis(1))
                .validate()
                .unwrap()
                .has_warnings()
        );
    }

    #[test]
    fn test_retryable_statuses() {
        for status in [408, 429, 500, 502, 503, 504, 302, 200] {
            assert!(is_retryable_status(Some(status)), "{status}");
        }
        for status in [400, 401, 403, 404, 409, 422, 499] {
            assert!(!is_retryable_status(Some(status)), "{status}");
        }
        assert!(is_retryable_status(None));
    }

    #[test]
    fn test_should_retry() {
        assert!(should_retry(&ApiError::server_error()));
        assert!(should_retry(&ApiError::network()));
        assert!(should_retry(&ApiError::timeout(Duration::from_secs(1))));
        assert!(should_retry(&ApiError::rate_limited().with_status(429)));
        assert!(!should_retry(&ApiError::unauthorized()));
        assert!(!should_retry(&ApiError::http(404, "Not found.")));
        assert!(!should_retry(&ApiError::aborted()));
        assert!(!should_retry(&ApiError::response_too_large()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausts_attempts_with_linear_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();
        let policy = RetryPolicy::read_default();

        let counter = Arc::clone(&calls);
        let result: Result<()> = retry(&policy, &CancellationSources::default(), |_| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::server_error())
            }
        })
        .await;

        assert_eq!(result.unwrap_err().code, Some(ErrorCode::ServerError));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1000 ms after the first failure, 2000 ms after the second.
        assert_eq!(start.elapsed(), Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_stops_on_terminal_status() {
        let calls = Arc::new(AtomicU32::new(0));

        let counter = Arc::clone(&calls);
        let result: Result<()> = retry(
            &RetryPolicy::read_default(),
            &CancellationSources::default(),
            |_| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ApiError::http(404, "Not found."))
                }
            },
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.status, Some(404));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_after_transient_failure() {
        let result = retry(
            &RetryPolicy::new(3, Duration::from_millis(100)),
            &CancellationSources::default(),
            |attempt| async move {
                if attempt < 2 {
                    Err(ApiError::http(503, "The request failed with status 503."))
                } else {
                    Ok(attempt)
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let result: Result<()> = retry(
            &RetryPolicy::new(0, Duration::from_millis(100)),
            &CancellationSources::default(),
            |_| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ApiError::network())
                }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_backoff() {
        let external = CancellationToken::new();
        let sources = CancellationSources::new(Some(external.clone()), None);
        let start = Instant::now();

        let canceller = tokio::spawn(async move {
            sleep(Duration::from_millis(300)).await;
            external.cancel();
        });

        let result: Result<()> = retry(&RetryPolicy::read_default(), &sources, |_| async {
            Err(ApiError::server_error())
        })
        .await;

        canceller.await.unwrap();
        assert_eq!(result.unwrap_err().code, Some(ErrorCode::Aborted));
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }
}
