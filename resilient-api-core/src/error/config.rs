//! Pre-flight checks of client, quota and retry settings.
//!
//! A bad setting is reported once, when the client is built, instead of on
//! every request. Findings that do not block construction (a very short
//! timeout, a tiny rate window) are collected as warnings.
//!
//! # Example
//!
//! ```rust
//! use resilient_api_core::error::{ConfigValidationError, ValidationResult};
//! use std::time::Duration;
//!
//! fn check_window(window: Duration) -> Result<ValidationResult, ConfigValidationError> {
//!     if window.is_zero() {
//!         return Err(ConfigValidationError::invalid("rate_limit.window", "window cannot be zero"));
//!     }
//!     Ok(ValidationResult::new())
//! }
//!
//! assert_eq!(
//!     check_window(Duration::ZERO).unwrap_err().field_name(),
//!     "rate_limit.window"
//! );
//! ```

use std::fmt;
use thiserror::Error;

/// A setting that prevents the client from being built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigValidationError {
    /// Above the accepted range, e.g. `timeout` over five minutes.
    #[error("field '{field}' value {value} exceeds maximum {max}")]
    ValueTooHigh {
        /// Setting name, dotted for nested settings
        field: &'static str,
        /// Rejected value as text
        value: String,
        /// Upper bound as text
        max: String,
    },

    /// Below the accepted range, e.g. zero retry attempts.
    #[error("field '{field}' value {value} is below minimum {min}")]
    ValueTooLow {
        /// Setting name, dotted for nested settings
        field: &'static str,
        /// Rejected value as text
        value: String,
        /// Lower bound as text
        min: String,
    },

    /// Malformed or nonsensical, e.g. a `base_url` that is not http(s).
    #[error("field '{field}' has invalid value: {reason}")]
    ValueInvalid {
        /// Setting name, dotted for nested settings
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// Empty where a value is required, e.g. `default_locale`.
    #[error("required field '{field}' is missing")]
    ValueMissing {
        /// Setting name, dotted for nested settings
        field: &'static str,
    },
}

impl ConfigValidationError {
    /// Name of the offending setting.
    #[must_use]
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::ValueTooHigh { field, .. }
            | Self::ValueTooLow { field, .. }
            | Self::ValueInvalid { field, .. }
            | Self::ValueMissing { field } => field,
        }
    }

    /// `field` is above `max`.
    pub fn too_high(field: &'static str, value: impl fmt::Display, max: impl fmt::Display) -> Self {
        Self::ValueTooHigh {
            field,
            value: value.to_string(),
            max: max.to_string(),
        }
    }

    /// `field` is below `min`.
    pub fn too_low(field: &'static str, value: impl fmt::Display, min: impl fmt::Display) -> Self {
        Self::ValueTooLow {
            field,
            value: value.to_string(),
            min: min.to_string(),
        }
    }

    /// `field` is malformed for `reason`.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::ValueInvalid {
            field,
            reason: reason.into(),
        }
    }

    /// `field` is required but empty.
    pub fn missing(field: &'static str) -> Self {
        Self::ValueMissing { field }
    }
}

/// Warnings from a check that passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// One sentence per questionable setting.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// No warnings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from existing warnings.
    #[must_use]
    pub fn with_warnings(warnings: Vec<String>) -> Self {
        Self { warnings }
    }

    /// Records one warning.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Returns `true` if anything was recorded.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Appends the warnings of a nested check, e.g. the rate-limit quota
    /// inside the client configuration.
    pub fn merge(&mut self, other: ValidationResult) {
        self.warnings.extend(other.warnings);
    }
}
