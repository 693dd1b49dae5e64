use crate::cancellation::CancellationSources;
use crate::dedupe::{dedupe_key, participates};
use crate::error::{ApiError, Result};
use crate::rate_limiter::endpoint_key;
use crate::retry_strategy::retry;
use crate::timeout::guard;
use crate::transport::{TransportRequest, TransportResponse};
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use super::builder::ApiClient;
use super::headers::build_headers;
use super::options::RequestOptions;
use super::response::decode_body;
use super::retry::effective_policy;

impl ApiClient {
    /// Executes a request through the full pipeline and decodes the JSON
    /// response into `T`.
    ///
    /// `options.method`, when set, replaces `method` before any other step.
    ///
    /// Order of operations:
    /// 1. an already-cancelled handle in `options` fails with `ABORTED`
    /// 2. the rate limiter admits the call (unless `skip_rate_limit`)
    /// 3. writes take a deduplication handle, cancelling an older one
    /// 4. headers are built once
    /// 5. each attempt runs under a fresh composite signal and the deadline
    /// 6. failed attempts are retried per the effective policy
    ///
    /// # Errors
    ///
    /// Every failure is an [`ApiError`]; see [`crate::error`] for the codes.
    #[instrument(
        name = "api_request",
        skip(self, body, options),
        fields(method = %method, endpoint = %endpoint)
    )]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Vec<u8>>,
        mut options: RequestOptions,
    ) -> Result<T> {
        let method = options.method.take().unwrap_or(method);
        let response = self.execute(method, endpoint, body, options).await?;
        decode_body(&response.body)
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Vec<u8>>,
        options: RequestOptions,
    ) -> Result<TransportResponse> {
        if options
            .cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            debug!("Request cancelled before it was issued");
            return Err(ApiError::aborted());
        }

        if !options.skip_rate_limit && !self.rate_limiter().admit(endpoint_key(endpoint)).await {
            return Err(ApiError::rate_limited());
        }

        let dedupe = participates(&method)
            .then(|| self.deduplicator().acquire(&dedupe_key(&method, endpoint)));
        let sources = CancellationSources::new(options.cancel.clone(), dedupe);

        let headers = build_headers(
            self.config(),
            self.session().as_ref(),
            &options.headers,
            options.skip_auth,
        )?;

        if self.config().verbose
            && let Some(body) = &body
        {
            debug!(body = %String::from_utf8_lossy(body), "HTTP request with body");
        }

        let request = TransportRequest {
            url: format!("{}{}", self.config().base_url, endpoint),
            method,
            headers,
            body,
        };
        let deadline = options.timeout.unwrap_or(self.config().timeout);
        let policy = effective_policy(&request.method, options.retry);

        retry(&policy, &sources, |attempt| {
            self.attempt(&request, &sources, deadline, attempt)
        })
        .await
    }

    #[instrument(
        name = "api_attempt",
        skip(self, request, sources),
        fields(attempt = attempt + 1, timeout_ms = %deadline.as_millis())
    )]
    async fn attempt(
        &self,
        request: &TransportRequest,
        sources: &CancellationSources,
        deadline: Duration,
        attempt: u32,
    ) -> Result<TransportResponse> {
        let signal = sources.compose();
        guard(deadline, &signal, async {
            let response = self.transport().send(request.clone()).await?;
            self.check_status(response)
        })
        .await
    }

    /// Executes a GET request.
    ///
    /// Retries transient failures with [`RetryPolicy::read_default`]
    /// unless `options.retry` says otherwise.
    ///
    /// [`RetryPolicy::read_default`]: crate::retry_strategy::RetryPolicy::read_default
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.request(Method::GET, endpoint, None, options).await
    }

    /// Executes a POST request with a JSON body.
    pub async fn post<T, B>(&self, endpoint: &str, body: &B, options: RequestOptions) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.encode_body(body)?;
        self.request(Method::POST, endpoint, Some(body), options).await
    }

    /// Executes a PUT request with a JSON body.
    pub async fn put<T, B>(&self, endpoint: &str, body: &B, options: RequestOptions) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = self.encode_body(body)?;
        self.request(Method::PUT, endpoint, Some(body), options).await
    }

    /// Executes a DELETE request.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        self.request(Method::DELETE, endpoint, None, options).await
    }

    fn encode_body<B: Serialize + ?Sized>(&self, body: &B) -> Result<Vec<u8>> {
        let encoded = serde_json::to_vec(body).map_err(|e| {
            warn!(error = %e, "JSON serialization of request body failed");
            ApiError::invalid_request("The request body could not be encoded.")
        })?;

        let limit = self.config().max_request_size;
        if encoded.len() > limit {
            warn!(
                size = encoded.len(),
                max_size = limit,
                "Request body exceeds size limit"
            );
            return Err(ApiError::invalid_request(format!(
                "The request body is too large ({} bytes, limit {limit} bytes).",
                encoded.len()
            )));
        }
        Ok(encoded)
    }
}
