//! Outbound proxy configuration.

use crate::credentials::SecretString;
use crate::error::{ApiError, Result};

/// Proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy URL (e.g., "http://127.0.0.1:8080").
    pub url: String,
    /// Optional username for authentication.
    pub username: Option<String>,
    /// Optional password for authentication.
    pub password: Option<SecretString>,
}

impl ProxyConfig {
    /// Create a new proxy configuration with just a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// Set credentials for the proxy.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<SecretString>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Converts into a reqwest proxy applied to every scheme.
    pub(crate) fn to_reqwest(&self) -> Result<reqwest::Proxy> {
        let proxy = reqwest::Proxy::all(&self.url).map_err(|e| {
            ApiError::invalid_request(format!("The proxy URL '{}' is invalid: {e}.", self.url))
        })?;
        Ok(match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                proxy.basic_auth(username, password.expose_secret())
            }
            _ => proxy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_with_credentials() {
        let proxy = ProxyConfig::new("http://127.0.0.1:8080").with_credentials("user", "pass");
        assert_eq!(proxy.username.as_deref(), Some("user"));
        assert!(format!("{proxy:?}").contains("[REDACTED]"));
        assert!(proxy.to_reqwest().is_ok());
    }

    #[test]
    fn test_invalid_proxy_url() {
        let err = ProxyConfig::new("not a url").to_reqwest().unwrap_err();
        assert!(err.detail.contains("not a url"));
    }
}
