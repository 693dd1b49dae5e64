//! Rate Limiter Module
//!
//! Per-endpoint sliding-window admission control. Each endpoint key keeps the
//! instants of its recently admitted requests; a request is admitted while
//! fewer than `max_requests` instants fall inside the trailing `window`.
//!
//! # Behavior
//!
//! - **No queuing**: rejection is immediate, the caller decides when to retry
//! - **Rejections are free**: a rejected request is not recorded
//! - **Lazy pruning**: expired instants are dropped on each check
//! - **Shared state**: clones of a [`RateLimiter`] share one window store
//!
//! # Example
//!
//! ```rust
//! use resilient_api_core::rate_limiter::{RateLimiter, RateLimiterConfig, endpoint_key};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let limiter = RateLimiter::new(RateLimiterConfig::new(2, Duration::from_secs(60)));
//!
//! let key = endpoint_key("/sessions?page=2");
//! assert_eq!(key, "/sessions");
//!
//! assert!(limiter.admit(key).await);
//! assert!(limiter.admit(key).await);
//! assert!(!limiter.admit(key).await);
//! # }
//! ```

use crate::error::{ConfigValidationError, ValidationResult};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Returns the rate-limit bucket for an endpoint: the path with its query
/// string removed.
pub fn endpoint_key(endpoint: &str) -> &str {
    endpoint
        .split_once('?')
        .map_or(endpoint, |(path, _query)| path)
}

/// Rate limiter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Maximum number of requests admitted per key inside one window
    pub max_requests: usize,
    /// Length of the trailing window
    pub window: Duration,
}

impl RateLimiterConfig {
    /// Create a new rate limiter configuration
    ///
    /// # Example
    ///
    /// ```rust
    /// use resilient_api_core::rate_limiter::RateLimiterConfig;
    /// use std::time::Duration;
    ///
    /// // 100 requests per minute
    /// let config = RateLimiterConfig::new(100, Duration::from_secs(60));
    /// assert_eq!(config, RateLimiterConfig::default());
    /// ```
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    /// Validates the quota.
    ///
    /// A zero quota or zero window would reject or admit everything.
    pub fn validate(&self) -> Result<ValidationResult, ConfigValidationError> {
        if self.max_requests == 0 {
            return Err(ConfigValidationError::invalid(
                "rate_limit.max_requests",
                "max_requests cannot be zero",
            ));
        }
        if self.window.is_zero() {
            return Err(ConfigValidationError::invalid(
                "rate_limit.window",
                "window cannot be zero",
            ));
        }

        let mut result = ValidationResult::new();
        if self.window < Duration::from_secs(1) {
            result.add_warning(format!(
                "rate limit window {:?} is very short, quota will barely throttle",
                self.window
            ));
        }
        Ok(result)
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self::new(100, Duration::from_secs(60))
    }
}

/// Sliding-window rate limiter keyed by endpoint.
///
/// Admission check and recording happen under one lock acquisition with no
/// await point in between, so concurrent callers never over-admit.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    windows: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Admits or rejects one request for `key`.
    ///
    /// Returns `true` and records the request if fewer than `max_requests`
    /// requests were admitted for `key` during the trailing window.
    pub async fn admit(&self, key: &str) -> bool {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        let window = windows.entry(key.to_string()).or_default();
        prune(window, now, self.config.window);

        if window.len() < self.config.max_requests {
            window.push_back(now);
            debug!(
                key = %key,
                in_window = window.len(),
                max_requests = self.config.max_requests,
                "Request admitted"
            );
            true
        } else {
            warn!(
                key = %key,
                max_requests = self.config.max_requests,
                window_ms = %self.config.window.as_millis(),
                "Rate limit exceeded, request rejected"
            );
            false
        }
    }

    /// Number of admitted requests for `key` still inside the window.
    pub async fn in_window(&self, key: &str) -> usize {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();
        windows.get_mut(key).map_or(0, |window| {
            prune(window, now, self.config.window);
            window.len()
        })
    }

    /// Forgets every recorded request.
    pub async fn reset(&self) {
        self.windows.lock().await.clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}

fn prune(window: &mut VecDeque<Instant>, now: Instant, length: Duration) {
    while let Some(&oldest) = window.front() {
        if now.duration_since(oldest) >= length {
            window.pop_front();
        } else {
            break;
        }
    }
}
