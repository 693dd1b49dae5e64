use crate::error::normalize;
use crate::error::{ApiError, Result};
use crate::transport::TransportResponse;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use super::builder::ApiClient;

const BODY_PREVIEW_SIZE: usize = 200;

impl ApiClient {
    /// Passes 2xx responses through and normalizes everything else.
    ///
    /// Runs inside the timeout guard, so the 401 side effect only happens
    /// for a response that actually settled the attempt.
    pub(crate) fn check_status(&self, response: TransportResponse) -> Result<TransportResponse> {
        if response.is_success() {
            return Ok(response);
        }

        let status = response.status;
        let err = normalize::from_status(status, &response.body);
        let preview = body_preview(&response.body);

        match status {
            401 => {
                warn!("Session rejected, clearing stored auth token");
                self.session().clear_auth_token();
            }
            403 | 429 => warn!(status, error = %err, "HTTP error response"),
            400..=499 => info!(status, body_preview = %preview, "HTTP client error response"),
            _ => error!(status, body_preview = %preview, "HTTP error response"),
        }

        Err(err)
    }
}

/// Decodes a 2xx body. An empty body decodes as JSON `null`.
pub(crate) fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        b"null".as_slice()
    } else {
        body
    };

    serde_json::from_slice(body).map_err(|e| {
        error!(
            error = %e,
            body_preview = %body_preview(body),
            "Failed to decode response body"
        );
        ApiError::network()
    })
}

fn body_preview(body: &[u8]) -> String {
    let end = body.len().min(BODY_PREVIEW_SIZE);
    let preview = String::from_utf8_lossy(&body[..end]).into_owned();
    if end < body.len() {
        debug!(body_length = body.len(), "Body preview truncated");
    }
    preview
}
