//! API client facade
//!
//! [`ApiClient`] exposes `get`, `post`, `put` and `delete` over a configured
//! base URL and runs every call through the same pipeline:
//! - Per-endpoint sliding-window rate limiting (no queuing)
//! - Last-writer-wins deduplication of non-GET requests
//! - Composite cancellation (caller handle, deduplication, deadline)
//! - A per-attempt timeout with a single settlement point
//! - Linear-backoff retry of idempotent requests
//! - Normalization of every failure into [`ApiError`](crate::error::ApiError)
//!
//! # Example
//!
//! ```rust,no_run
//! use resilient_api_core::http_client::{ApiClient, ClientConfig, RequestOptions};
//! use resilient_api_core::session::{Environment, MemorySessionStore};
//! use serde_json::Value;
//! use std::sync::Arc;
//!
//! # async fn example() -> resilient_api_core::error::Result<()> {
//! let session = Arc::new(MemorySessionStore::new(Environment::Production).with_auth_token("token"));
//! let client = ApiClient::new(ClientConfig::new("https://api.example.com"), session)?;
//!
//! let sessions: Value = client.get("/sessions?page=1", RequestOptions::new()).await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod headers;
mod options;
mod request;
mod response;
mod retry;


pub use builder::ApiClient;
pub use config::{
    ClientConfig, ClientConfigBuilder, ENV_BASE_URL, ENV_CLIENT_VERSION, ENV_CONNECT_TIMEOUT_MS,
    ENV_DEFAULT_LOCALE, ENV_RATE_LIMIT_MAX_REQUESTS, ENV_RATE_LIMIT_WINDOW_MS, ENV_TIMEOUT_MS,
};
pub use headers::{CLIENT_VERSION_HEADER, DEV_USER_ID_HEADER};
pub use options::RequestOptions;
