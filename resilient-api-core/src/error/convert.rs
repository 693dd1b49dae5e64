//! Conversions from transport-level errors into [`ApiError`].

use super::ApiError;
use tracing::error;

/// Maximum length for error details to prevent memory bloat from large HTTP responses.
pub(crate) const MAX_ERROR_MESSAGE_LEN: usize = 1024;

/// Truncates a string to a maximum length, adding "... (truncated)" if needed.
pub(crate) fn truncate_message(mut msg: String) -> String {
    if msg.len() > MAX_ERROR_MESSAGE_LEN {
        let mut cut = MAX_ERROR_MESSAGE_LEN;
        while !msg.is_char_boundary(cut) {
            cut -= 1;
        }
        msg.truncate(cut);
        msg.push_str("... (truncated)");
    }
    msg
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        error!(
            error = %e,
            is_timeout = e.is_timeout(),
            is_connect = e.is_connect(),
            "HTTP transport failure"
        );
        if e.is_timeout() {
            // reqwest's own per-client timeout rather than the deadline guard
            ApiError::new("The request timed out. Please try again.")
                .with_code(super::ErrorCode::Timeout)
        } else {
            ApiError::network()
        }
    }
}
