//! Timeout enforcement.
//!
//! [`guard`] is the single settlement point of an attempt: cancellation, the
//! operation and the deadline race, the first to finish decides the outcome
//! and the other branches are dropped. A transport result that arrives after
//! the deadline is never observed, and the deadline can no longer fire once
//! the operation settled.

use crate::cancellation::CompositeSignal;
use crate::error::{ApiError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Runs `operation` under `signal` with a deadline of `deadline`.
///
/// - a constituent of `signal` fires first: `ABORTED`
/// - the operation settles first: its own result
/// - the deadline elapses first: the internal token of `signal` fires and the
///   result is `TIMEOUT`
pub async fn guard<T, F>(deadline: Duration, signal: &CompositeSignal, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        () = signal.cancelled() => Err(ApiError::aborted()),
        result = operation => result,
        () = sleep(deadline) => {
            warn!(timeout_ms = %deadline.as_millis(), "Request deadline elapsed");
            signal.cancel();
            Err(ApiError::timeout(deadline))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationSources;
    use crate::error::ErrorCode;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio_util::sync::CancellationToken;

    #[tokio::test(start_paused = true)]
    async fn test_fast_operation_wins() {
        let signal = CancellationSources::default().compose();
        let result = guard(Duration::from_millis(50), &signal, async {
            sleep(Duration::from_millis(5)).await;
            Ok(7)
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert!(!signal.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_operation_times_out_and_is_abandoned() {
        let completed = Arc::new(AtomicBool::new(false));
        let signal = CancellationSources::default().compose();

        let flag = Arc::clone(&completed);
        let result: Result<()> = guard(Duration::from_millis(5), &signal, async move {
            sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.code, Some(ErrorCode::Timeout));
        assert!(signal.is_cancelled());

        // The abandoned operation never runs to completion.
        sleep(Duration::from_millis(100)).await;
        assert!(!completed.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_error_passes_through() {
        let signal = CancellationSources::default().compose();
        let result: Result<()> = guard(Duration::from_secs(1), &signal, async {
            Err(ApiError::forbidden())
        })
        .await;

        assert_eq!(result.unwrap_err(), ApiError::forbidden());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_beats_deadline() {
        let external = CancellationToken::new();
        let signal = CancellationSources::new(Some(external.clone()), None).compose();

        let canceller = tokio::spawn(async move {
            sleep(Duration::from_millis(10)).await;
            external.cancel();
        });

        let result: Result<()> = guard(Duration::from_secs(30), &signal, async {
            sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        canceller.await.unwrap();
        assert_eq!(result.unwrap_err().code, Some(ErrorCode::Aborted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_timeout_after_success() {
        let signal = CancellationSources::default().compose();
        let result = guard(Duration::from_millis(20), &signal, async { Ok("done") }).await;
        assert_eq!(result.unwrap(), "done");

        sleep(Duration::from_millis(100)).await;
        assert!(!signal.is_cancelled());
    }
}
