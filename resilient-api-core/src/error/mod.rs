//! # Error Handling
//!
//! Every failure path of the request pipeline converges on one value,
//! [`ApiError`]: a human-readable `detail`, an optional HTTP `status` and an
//! optional machine-readable [`ErrorCode`] drawn from a closed set.
//!
//! ## Taxonomy
//!
//! ```text
//! ApiError.code
//! ├── RATE_LIMIT_EXCEEDED - pre-flight quota rejection or HTTP 429
//! ├── ABORTED             - a cancellation source fired
//! ├── TIMEOUT             - the deadline guard fired
//! ├── UNAUTHORIZED        - HTTP 401 (stored token is cleared)
//! ├── FORBIDDEN           - HTTP 403
//! ├── SERVER_ERROR        - HTTP 500
//! ├── NETWORK_ERROR       - transport fault with no usable HTTP response,
//! │                         including a response over the size limit
//! └── (none)
//!     ├── with status     - any other HTTP status, server detail passed through
//!     └── without status  - pre-flight rejection: invalid configuration,
//!                           malformed header value, oversized request body
//! ```
//!
//! A pre-flight rejection happens before anything is sent, so it is never
//! retried and a caller can tell it apart by `status` and `code` both being
//! `None`.
//!
//! ## Quick Start
//!
//! ```rust
//! use resilient_api_core::error::{ApiError, ErrorCode};
//!
//! let err = ApiError::timeout(std::time::Duration::from_millis(5));
//! assert_eq!(err.code, Some(ErrorCode::Timeout));
//! assert!(err.status.is_none());
//! assert!(err.to_string().ends_with('.'));
//! ```
//!
//! Configuration problems found before any request is sent are reported as
//! [`ConfigValidationError`]; they only become an [`ApiError`] when a client
//! is constructed from an invalid configuration.

mod config;
mod convert;
pub mod normalize;

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use config::{ConfigValidationError, ValidationResult};
pub(crate) use convert::truncate_message;

/// Result type alias for all request operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Machine-readable error codes.
///
/// The set is closed: statuses without a dedicated code surface as an
/// [`ApiError`] whose `code` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Pre-flight quota rejection or HTTP 429.
    RateLimitExceeded,
    /// A cancellation source fired before the request settled.
    Aborted,
    /// The request did not settle within its deadline.
    Timeout,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 403.
    Forbidden,
    /// HTTP 500.
    ServerError,
    /// Transport-level fault with no HTTP response.
    NetworkError,
}

impl ErrorCode {
    /// Returns the wire representation of the code.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ErrorCode::Aborted => "ABORTED",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::ServerError => "SERVER_ERROR",
            ErrorCode::NetworkError => "NETWORK_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The uniform failure value returned by every request operation.
///
/// `detail` is always a sentence suitable for direct display. Diagnostic
/// causes (transport errors, response bodies) are logged with `tracing`
/// instead of being folded into it.
///
/// # Example
///
/// ```rust
/// use resilient_api_core::error::{ApiError, ErrorCode};
///
/// let err = ApiError::http(404, "Session not found.");
/// assert_eq!(err.status, Some(404));
/// assert_eq!(err.code, None);
/// assert_eq!(err.to_string(), "Session not found.");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{detail}")]
pub struct ApiError {
    /// Human-readable description.
    pub detail: Cow<'static, str>,
    /// HTTP status, when the failure came from a response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Machine-readable code, when the failure belongs to a known class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    /// Set when repeating the request cannot change the outcome.
    #[serde(skip)]
    terminal: bool,
}

impl ApiError {
    // ==================== Constructor Methods ====================

    /// Creates an error with only a detail message.
    pub fn new(detail: impl Into<Cow<'static, str>>) -> Self {
        Self {
            detail: detail.into(),
            status: None,
            code: None,
            terminal: false,
        }
    }

    /// Sets the HTTP status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Marks the failure as deterministic so no further attempt is made.
    #[must_use]
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    /// Sets the error code.
    #[must_use]
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Pre-flight rate-limit rejection.
    pub fn rate_limited() -> Self {
        Self::new("Too many requests. Please wait a moment and try again.")
            .with_code(ErrorCode::RateLimitExceeded)
    }

    /// A cancellation source fired.
    pub fn aborted() -> Self {
        Self::new("The request was cancelled.").with_code(ErrorCode::Aborted)
    }

    /// The deadline guard fired after `after`.
    pub fn timeout(after: Duration) -> Self {
        Self::new(format!(
            "The request timed out after {} ms. Please try again.",
            after.as_millis()
        ))
        .with_code(ErrorCode::Timeout)
    }

    /// HTTP 401.
    pub fn unauthorized() -> Self {
        Self::new("Your session has expired. Please sign in again.")
            .with_status(401)
            .with_code(ErrorCode::Unauthorized)
    }

    /// HTTP 403.
    pub fn forbidden() -> Self {
        Self::new("You do not have permission to perform this action.")
            .with_status(403)
            .with_code(ErrorCode::Forbidden)
    }

    /// HTTP 500.
    pub fn server_error() -> Self {
        Self::new("The server encountered an error. Please try again later.")
            .with_status(500)
            .with_code(ErrorCode::ServerError)
    }

    /// Transport-level fault with no usable HTTP response.
    pub fn network() -> Self {
        Self::new("Unable to reach the server. Please check your connection and try again.")
            .with_code(ErrorCode::NetworkError)
    }

    /// The response body exceeded the configured size limit.
    ///
    /// A transport-level fault that the same request would hit again, so it
    /// is never retried.
    pub fn response_too_large() -> Self {
        Self::new("The server response was too large to process.")
            .with_code(ErrorCode::NetworkError)
            .terminal()
    }

    /// Unlabeled pass-through for any other HTTP status.
    pub fn http(status: u16, detail: impl Into<String>) -> Self {
        Self::new(truncate_message(detail.into())).with_status(status)
    }

    /// The request could not be prepared (bad header value, oversized body,
    /// invalid configuration). Carries neither status nor code.
    pub fn invalid_request(detail: impl Into<Cow<'static, str>>) -> Self {
        Self::new(detail)
    }

    // ==================== Helper Methods ====================

    /// Returns `true` if the error carries `code`.
    #[must_use]
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == Some(code)
    }

    /// Returns `true` if a cancellation source fired.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.is(ErrorCode::Aborted)
    }

    /// Returns `true` if the deadline guard fired.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        self.is(ErrorCode::Timeout)
    }

    /// Returns `true` if the failure was marked deterministic.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Returns `true` if the failure is worth another attempt.
    ///
    /// See [`crate::retry_strategy::should_retry`].
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        crate::retry_strategy::should_retry(self)
    }
}

impl From<ConfigValidationError> for ApiError {
    fn from(e: ConfigValidationError) -> Self {
        ApiError::invalid_request(format!("The client configuration is invalid: {e}."))
    }
}

#[cfg(test)]
mod tests;
