use crate::retry_strategy::RetryPolicy;
use reqwest::Method;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Per-call options.
///
/// Every field is optional; unset fields fall back to the client
/// configuration or to the verb's defaults.
///
/// # Example
///
/// ```rust
/// use resilient_api_core::http_client::RequestOptions;
/// use resilient_api_core::retry_strategy::RetryPolicy;
/// use std::time::Duration;
///
/// let options = RequestOptions::new()
///     .with_timeout(Duration::from_secs(5))
///     .with_retry(RetryPolicy::none())
///     .skip_auth();
/// assert!(options.skip_auth);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Per-attempt deadline; defaults to the client timeout.
    pub timeout: Option<Duration>,
    /// Retry policy; defaults to [`RetryPolicy::read_default`] for `get` and
    /// to a single attempt otherwise.
    pub retry: Option<RetryPolicy>,
    /// Do not attach authentication headers.
    pub skip_auth: bool,
    /// Bypass the rate limiter.
    pub skip_rate_limit: bool,
    /// Caller-supplied cancellation handle.
    pub cancel: Option<CancellationToken>,
    /// Extra headers; fixed headers win on conflicts.
    pub headers: HeaderMap,
    /// Replaces the verb's method. Deduplication and the retry default
    /// follow the overriding method.
    pub method: Option<Method>,
}

impl RequestOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-attempt deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Sends the request without authentication headers.
    pub fn skip_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    /// Sends the request without consuming rate-limit quota.
    pub fn skip_rate_limit(mut self) -> Self {
        self.skip_rate_limit = true;
        self
    }

    /// Attaches a cancellation handle.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Overrides the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Replaces the extra headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}
