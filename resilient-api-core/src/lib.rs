//! Resilient API Core Library
//!
//! The request pipeline behind the `resilient-api` client: every call passes
//! through rate limiting, deduplication, composite cancellation, a
//! per-attempt deadline and retry, and every failure surfaces as a single
//! normalized [`ApiError`].
//!
//! # Features
//!
//! - **Rate limiting**: sliding-window quota per endpoint, immediate rejection
//! - **Deduplication**: a newer write to the same endpoint cancels the older one
//! - **Timeouts**: one settlement point per attempt, late results are discarded
//! - **Retry**: linear backoff for reads, 4xx (except 408/429) is terminal
//! - **Error Handling**: closed set of machine-readable codes with `thiserror`
//!
//! # Example
//!
//! ```rust,no_run
//! use resilient_api_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<()> {
//! let session = Arc::new(MemorySessionStore::new(Environment::Production).with_auth_token("token"));
//! let client = ApiClient::new(ClientConfig::new("https://api.example.com"), session)?;
//!
//! let cancel = CancellationToken::new();
//! let created: serde_json::Value = client
//!     .post(
//!         "/sessions",
//!         &serde_json::json!({ "name": "standup" }),
//!         RequestOptions::new().with_cancel(cancel.clone()),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// =============================================================================
// Global Clippy Lint Suppressions
// =============================================================================
// - module_name_repetitions: RateLimiterConfig in rate_limiter, ApiError in error
// - missing_errors_doc: every public operation returns the same ApiError
// - must_use_candidate: not all return values need #[must_use]
// - doc_markdown: header and code names in docs don't need backticks
// - return_self_not_must_use: builder methods return Self without must_use
// =============================================================================
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]

// Re-exports of external dependencies
pub use serde;
pub use serde_json;

// Core modules
pub mod cancellation;
pub mod config;
pub mod credentials;
pub mod dedupe;
pub mod error;
pub mod http_client;
pub mod logging;
pub mod rate_limiter;
pub mod retry_strategy;
pub mod session;
pub mod timeout;
pub mod transport;

// Re-exports of core types for convenience
pub use cancellation::{CancellationSources, CompositeSignal};
pub use config::ProxyConfig;
pub use credentials::SecretString;
pub use dedupe::RequestDeduplicator;
pub use error::{ApiError, ConfigValidationError, ErrorCode, Result, ValidationResult};
pub use http_client::{ApiClient, ClientConfig, ClientConfigBuilder, RequestOptions};
pub use rate_limiter::{RateLimiter, RateLimiterConfig};
pub use retry_strategy::RetryPolicy;
pub use session::{Environment, MemorySessionStore, SessionStore};
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
// Re-export CancellationToken for convenient access
pub use tokio_util::sync::CancellationToken;

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```rust
/// use resilient_api_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::ProxyConfig;
    pub use crate::credentials::SecretString;
    pub use crate::error::{ApiError, ErrorCode, Result};
    pub use crate::http_client::{ApiClient, ClientConfig, ClientConfigBuilder, RequestOptions};
    pub use crate::logging::{LogConfig, LogFormat, LogLevel, init_logging, try_init_logging};
    pub use crate::rate_limiter::{RateLimiter, RateLimiterConfig};
    pub use crate::retry_strategy::RetryPolicy;
    pub use crate::session::{Environment, MemorySessionStore, SessionStore};
    pub use crate::transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
    pub use serde::{Deserialize, Serialize};
    pub use tokio_util::sync::CancellationToken;
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "resilient-api-core");
    }
}
