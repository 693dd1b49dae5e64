//! Composite cancellation.
//!
//! A request can be cancelled from three places: the caller's own
//! [`CancellationToken`], the deduplicator (a newer request under the same
//! key), and the request itself (the timeout guard). [`CancellationSources`]
//! holds the first two for the lifetime of a call; [`CancellationSources::compose`]
//! adds a fresh internal token per attempt and yields a [`CompositeSignal`]
//! that fires as soon as any of them does.

use futures_util::future::select_all;
use std::future::pending;
use tokio_util::sync::CancellationToken;

/// The long-lived cancellation sources of one call.
#[derive(Debug, Clone, Default)]
pub struct CancellationSources {
    external: Option<CancellationToken>,
    dedupe: Option<CancellationToken>,
}

impl CancellationSources {
    /// Creates the sources from an optional caller handle and an optional
    /// deduplication handle.
    pub fn new(external: Option<CancellationToken>, dedupe: Option<CancellationToken>) -> Self {
        Self { external, dedupe }
    }

    /// Returns `true` if any source already fired.
    pub fn is_cancelled(&self) -> bool {
        self.tokens().any(CancellationToken::is_cancelled)
    }

    /// Resolves once any source fires. Never resolves without sources.
    pub async fn cancelled(&self) {
        wait_any(self.tokens()).await;
    }

    /// Builds the signal for one attempt.
    pub fn compose(&self) -> CompositeSignal {
        CompositeSignal {
            internal: CancellationToken::new(),
            sources: self.clone(),
        }
    }

    fn tokens(&self) -> impl Iterator<Item = &CancellationToken> {
        self.external.iter().chain(self.dedupe.iter())
    }
}

/// Effective cancellation signal of a single attempt.
///
/// Fires when the caller's handle, the deduplication handle or the internal
/// token fires. A signal is never reused across attempts.
#[derive(Debug)]
pub struct CompositeSignal {
    internal: CancellationToken,
    sources: CancellationSources,
}

impl CompositeSignal {
    /// Fires the internal token.
    pub fn cancel(&self) {
        self.internal.cancel();
    }

    /// Returns `true` if any constituent fired.
    pub fn is_cancelled(&self) -> bool {
        self.internal.is_cancelled() || self.sources.is_cancelled()
    }

    /// Resolves the instant any constituent fires.
    ///
    /// Waiters are dropped together with the returned future, so nothing
    /// stays registered on the tokens after the attempt settles.
    pub async fn cancelled(&self) {
        wait_any(std::iter::once(&self.internal).chain(self.sources.tokens())).await;
    }
}

async fn wait_any<'a>(tokens: impl Iterator<Item = &'a CancellationToken>) {
    let waiters: Vec<_> = tokens.map(|token| Box::pin(token.cancelled())).collect();
    if waiters.is_empty() {
        pending::<()>().await;
    } else {
        select_all(waiters).await;
    }
}
