//! # Resilient API
//!
//! A client-side HTTP request layer for a single JSON API. Every call is
//! rate limited per endpoint, deduplicated when it is a write, bounded by a
//! deadline, retried when idempotent, and fails with one uniform error shape.
//!
//! ## Features
//!
//! - **Async/Await**: Built on tokio and reqwest
//! - **Uniform errors**: `ApiError { detail, status, code }` for every failure
//! - **Cancellation**: caller handles compose with deduplication and timeouts
//! - **Pluggable**: swap the transport or the session store behind traits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resilient_api::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&LogConfig::development());
//!
//!     let session = Arc::new(MemorySessionStore::new(Environment::Local).with_user_identity("dev-1"));
//!     let client = ApiClient::new(ClientConfig::from_env()?, session)?;
//!
//!     let me: serde_json::Value = client.get("/me", RequestOptions::new()).await?;
//!     println!("{me}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

// Re-export core types and modules
pub use resilient_api_core::{
    ApiClient, ApiError, CancellationToken, ClientConfig, ClientConfigBuilder, Environment,
    ErrorCode, MemorySessionStore, RequestOptions, Result, RetryPolicy, SessionStore, Transport,
    cancellation, config, credentials, dedupe, error, http_client, logging, rate_limiter,
    retry_strategy, session, timeout, transport,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use resilient_api_core::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_matches_core() {
        assert_eq!(VERSION, resilient_api_core::VERSION);
    }
}
