//! Secret values with automatic memory zeroization.
//!
//! Bearer tokens and proxy passwords travel through the client as
//! [`SecretString`]. The backing memory is overwritten with zeros on drop and
//! neither `Debug` nor `Display` reveals the value, so a token never ends up
//! in a log line by accident.
//!
//! # Example
//!
//! ```rust
//! use resilient_api_core::credentials::SecretString;
//!
//! let token = SecretString::new("eyJhbGciOi...");
//! assert_eq!(format!("{token:?}"), "[REDACTED]");
//! assert!(token.bearer_header().is_ok());
//! ```

use reqwest::header::{HeaderValue, InvalidHeaderValue};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string that is zeroed when dropped and redacted when formatted.
#[derive(Clone, Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Creates a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the secret value.
    ///
    /// # Security
    ///
    /// Use the returned reference immediately; do not copy it into a
    /// longer-lived `String`.
    #[inline]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns the length of the secret.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the secret is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds a `Bearer <token>` header value marked as sensitive.
    ///
    /// Sensitive values are skipped by reqwest's and hyper's debug output.
    ///
    /// # Errors
    ///
    /// Fails if the token contains characters that are not valid in a header.
    pub fn bearer_header(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut raw = format!("Bearer {}", self.0);
        let value = HeaderValue::from_str(&raw);
        raw.zeroize();
        let mut value = value?;
        value.set_sensitive(true);
        Ok(value)
    }
}

// Prevent accidental logging of tokens
impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
