//! Mapping of non-2xx HTTP responses onto [`ApiError`].
//!
//! The mapping is a pure function of the status and body. Side effects tied
//! to a status (clearing the stored token on 401) belong to the caller; see
//! `http_client::response`.

use super::ApiError;
use serde_json::Value;

/// Builds the error for a non-success response.
///
/// | Status | Code |
/// |---|---|
/// | 401 | `UNAUTHORIZED` |
/// | 403 | `FORBIDDEN` |
/// | 429 | `RATE_LIMIT_EXCEEDED` |
/// | 500 | `SERVER_ERROR` |
/// | other | none, server `detail` passed through |
///
/// # Example
///
/// ```rust
/// use resilient_api_core::error::{ErrorCode, normalize::from_status};
///
/// assert_eq!(from_status(403, b"").code, Some(ErrorCode::Forbidden));
///
/// let err = from_status(409, br#"{"detail": "Session already exists."}"#);
/// assert_eq!(err.code, None);
/// assert_eq!(err.status, Some(409));
/// assert_eq!(err.detail, "Session already exists.");
/// ```
pub fn from_status(status: u16, body: &[u8]) -> ApiError {
    match status {
        401 => ApiError::unauthorized(),
        403 => ApiError::forbidden(),
        429 => ApiError::rate_limited().with_status(429),
        500 => ApiError::server_error(),
        _ => {
            let detail = server_detail(body)
                .unwrap_or_else(|| format!("The request failed with status {status}."));
            ApiError::http(status, detail)
        }
    }
}

/// Extracts the server-supplied `detail` (or `message`) string from a JSON body.
pub fn server_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["detail", "message"]
        .iter()
        .filter_map(|field| value.get(field).and_then(Value::as_str))
        .map(str::trim)
        .find(|detail| !detail.is_empty())
        .map(str::to_string)
}
