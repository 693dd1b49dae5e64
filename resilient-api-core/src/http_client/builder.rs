use crate::dedupe::RequestDeduplicator;
use crate::error::{ApiError, Result};
use crate::rate_limiter::RateLimiter;
use crate::session::{MemorySessionStore, SessionStore};
use crate::transport::{ReqwestTransport, Transport};
use std::sync::Arc;
use tracing::warn;

use super::config::ClientConfig;

/// Resilient API client.
///
/// Clones share the configuration, the transport, the session store and both
/// mutable stores, so a cloned client draws from the same rate-limit quota
/// and cancels the same in-flight writes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
    rate_limiter: RateLimiter,
    deduplicator: RequestDeduplicator,
}

impl ApiClient {
    /// Creates a new client with the given configuration and session store.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration does not validate
    /// - The proxy URL is invalid
    /// - The HTTP client cannot be built
    pub fn new(config: ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        validate(&config)?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::assemble(config, Arc::new(transport), session))
    }

    /// Creates a client over a custom transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        validate(&config)?;
        Ok(Self::assemble(config, transport, session))
    }

    /// Creates an anonymous client for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URL.
    pub fn anonymous(base_url: impl Into<String>) -> Result<Self> {
        Self::new(
            ClientConfig::new(base_url),
            Arc::new(MemorySessionStore::default()),
        )
    }

    fn assemble(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        let rate_limiter = RateLimiter::new(config.rate_limit);
        let deduplicator = RequestDeduplicator::new(config.dedupe_ttl);
        Self {
            config: Arc::new(config),
            transport,
            session,
            rate_limiter,
            deduplicator,
        }
    }

    /// Replaces the rate limiter, e.g. to share one quota between clients.
    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Replaces the deduplicator, e.g. to share in-flight tracking between
    /// clients.
    #[must_use]
    pub fn with_deduplicator(mut self, deduplicator: RequestDeduplicator) -> Self {
        self.deduplicator = deduplicator;
        self
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the session store.
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Returns the rate limiter.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Returns the deduplicator.
    pub fn deduplicator(&self) -> &RequestDeduplicator {
        &self.deduplicator
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}

fn validate(config: &ClientConfig) -> Result<()> {
    let result = config.validate().map_err(ApiError::from)?;
    for warning in &result.warnings {
        warn!(warning = %warning, "Client configuration warning");
    }
    Ok(())
}
