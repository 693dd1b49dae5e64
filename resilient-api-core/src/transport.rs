//! Network seam of the client.
//!
//! [`Transport`] performs exactly one HTTP exchange. Retry, timeout,
//! cancellation and status normalization all live above it, so a test can
//! script responses without a socket and a caller can swap in another HTTP
//! stack.

use crate::error::{ApiError, Result};
use crate::http_client::ClientConfig;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response};
use std::fmt;
use tracing::{debug, error, instrument, warn};

/// A fully built request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Final header set.
    pub headers: HeaderMap,
    /// JSON-encoded body, if any.
    pub body: Option<Vec<u8>>,
}

/// The raw outcome of one exchange.
#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Creates a response with the given status and body and no headers.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and returns the raw response.
///
/// Implementations must not interpret the status code; a 500 response is a
/// successful exchange at this level. Errors are reserved for failures where
/// no response was obtained. Dropping the returned future abandons the
/// exchange.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Performs the exchange.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    max_response_size: usize,
}

impl ReqwestTransport {
    /// Builds the underlying client from `config`.
    ///
    /// The request deadline is enforced above the transport, so only the
    /// connect timeout is applied here.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy URL is invalid or the client cannot be
    /// built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .gzip(true)
            .user_agent(&config.user_agent);

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(proxy.to_reqwest()?);
        }

        let client = builder.build().map_err(|e| {
            error!(error = %e, "Failed to build HTTP client");
            ApiError::invalid_request("The HTTP client could not be initialised.")
        })?;

        Ok(Self {
            client,
            max_response_size: config.max_response_size,
        })
    }

    /// Wraps an existing `reqwest` client.
    pub fn with_client(client: Client, max_response_size: usize) -> Self {
        Self {
            client,
            max_response_size,
        }
    }

    async fn read_body_with_limit(&self, response: Response, url: &str) -> Result<Vec<u8>> {
        use futures_util::StreamExt;

        let max_size = self.max_response_size;
        if let Some(content_length) = response.content_length()
            && content_length > max_size as u64
        {
            warn!(
                url = %url,
                content_length = content_length,
                max_size = max_size,
                "Response exceeds size limit (Content-Length check)"
            );
            return Err(ApiError::response_too_large());
        }

        #[allow(clippy::cast_possible_truncation)]
        let initial_capacity = response
            .content_length()
            .map_or(8 * 1024, |len| std::cmp::min(len as usize, max_size));

        let mut stream = response.bytes_stream();
        let mut body = Vec::with_capacity(initial_capacity);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if body.len().saturating_add(chunk.len()) > max_size {
                warn!(
                    url = %url,
                    received = body.len() + chunk.len(),
                    max_size = max_size,
                    "Response exceeds size limit during streaming"
                );
                return Err(ApiError::response_too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(
        name = "transport_send",
        skip(self, request),
        fields(method = %request.method, url = %request.url, status = tracing::field::Empty)
    )]
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let TransportRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method, &url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        tracing::Span::current().record("status", status);

        let headers = response.headers().clone();
        let body = self.read_body_with_limit(response, &url).await?;
        debug!(status, body_length = body.len(), "HTTP response received");

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProxyConfig;

    #[test]
    fn test_transport_response_success_range() {
        assert!(TransportResponse::new(200, "{}").is_success());
        assert!(TransportResponse::new(204, Vec::new()).is_success());
        assert!(!TransportResponse::new(302, Vec::new()).is_success());
        assert!(!TransportResponse::new(500, Vec::new()).is_success());
    }

    #[test]
    fn test_reqwest_transport_builds_from_default_config() {
        assert!(ReqwestTransport::new(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn test_reqwest_transport_rejects_invalid_proxy() {
        let config = ClientConfig {
            proxy: Some(ProxyConfig::new("not a url")),
            ..Default::default()
        };
        assert!(ReqwestTransport::new(&config).is_err());
    }
}
