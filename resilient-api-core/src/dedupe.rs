//! Request deduplication for non-idempotent requests.
//!
//! Only one request per `METHOD:endpoint` key may be in flight. Acquiring a
//! handle for a key that already has one cancels the earlier request
//! (last writer wins).
//!
//! Entries are dropped a fixed time after issuance rather than on completion.
//! A slow request can therefore escape cancellation once its entry expired.

use dashmap::DashMap;
use reqwest::Method;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Default time an entry stays in the store after issuance.
pub const DEFAULT_DEDUPE_TTL: Duration = Duration::from_millis(1000);

/// Builds the dedupe key for a request.
///
/// ```rust
/// use resilient_api_core::dedupe::dedupe_key;
/// use reqwest::Method;
///
/// assert_eq!(dedupe_key(&Method::POST, "/sessions"), "POST:/sessions");
/// ```
pub fn dedupe_key(method: &Method, endpoint: &str) -> String {
    format!("{method}:{endpoint}")
}

/// Returns `true` if requests with `method` take part in deduplication.
///
/// Reads never do.
pub fn participates(method: &Method) -> bool {
    *method != Method::GET
}

#[derive(Debug)]
struct InflightEntry {
    id: u64,
    token: CancellationToken,
}

/// Store of in-flight cancellation handles keyed by dedupe key.
///
/// Clones share one store.
#[derive(Debug, Clone)]
pub struct RequestDeduplicator {
    inflight: Arc<DashMap<String, InflightEntry>>,
    next_id: Arc<AtomicU64>,
    ttl: Duration,
}

impl RequestDeduplicator {
    /// Creates an empty store whose entries expire `ttl` after issuance.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inflight: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(0)),
            ttl,
        }
    }

    /// Returns the entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a fresh handle for `key`, cancelling the previous one if any.
    ///
    /// The swap is a single map operation, so two concurrent acquires always
    /// leave exactly one live handle behind.
    pub fn acquire(&self, key: &str) -> CancellationToken {
        let token = CancellationToken::new();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let previous = self.inflight.insert(
            key.to_string(),
            InflightEntry {
                id,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            debug!(key = %key, "Cancelling superseded in-flight request");
            previous.token.cancel();
        }

        self.schedule_expiry(key.to_string(), id);
        token
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.inflight.len()
    }

    /// Returns `true` if no key is tracked.
    pub fn is_empty(&self) -> bool {
        self.inflight.is_empty()
    }

    /// Returns `true` if `key` currently has a tracked handle.
    pub fn contains(&self, key: &str) -> bool {
        self.inflight.contains_key(key)
    }

    fn schedule_expiry(&self, key: String, id: u64) {
        // Outside a runtime the entry simply lives until it is superseded.
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let inflight = Arc::clone(&self.inflight);
        let ttl = self.ttl;

        runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            // A newer handle under the same key keeps its own timer.
            if inflight.remove_if(&key, |_, entry| entry.id == id).is_some() {
                trace!(key = %key, "Dedupe entry expired");
            }
        });
    }
}

impl Default for RequestDeduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUPE_TTL)
    }
}
