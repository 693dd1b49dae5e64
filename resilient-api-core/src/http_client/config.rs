use crate::config::ProxyConfig;
use crate::dedupe::DEFAULT_DEDUPE_TTL;
use crate::error::{ConfigValidationError, ValidationResult};
use crate::rate_limiter::RateLimiterConfig;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the base URL.
pub const ENV_BASE_URL: &str = "API_BASE_URL";
/// Environment variable holding the request timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "API_TIMEOUT_MS";
/// Environment variable holding the connect timeout in milliseconds.
pub const ENV_CONNECT_TIMEOUT_MS: &str = "API_CONNECT_TIMEOUT_MS";
/// Environment variable overriding the reported client version.
pub const ENV_CLIENT_VERSION: &str = "API_CLIENT_VERSION";
/// Environment variable holding the fallback locale.
pub const ENV_DEFAULT_LOCALE: &str = "API_DEFAULT_LOCALE";
/// Environment variable holding the per-endpoint quota.
pub const ENV_RATE_LIMIT_MAX_REQUESTS: &str = "API_RATE_LIMIT_MAX_REQUESTS";
/// Environment variable holding the rate-limit window in milliseconds.
pub const ENV_RATE_LIMIT_WINDOW_MS: &str = "API_RATE_LIMIT_WINDOW_MS";

const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// API client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Prefix prepended verbatim to every endpoint
    pub base_url: String,
    /// Default per-attempt deadline (default: 30 seconds)
    pub timeout: Duration,
    /// TCP connection timeout (default: 10 seconds)
    pub connect_timeout: Duration,
    /// Value of the `x-client-version` header
    pub client_version: String,
    /// `accept-language` value used when the session has no locale
    pub default_locale: String,
    /// Default User-Agent header value
    pub user_agent: String,
    /// Optional proxy configuration
    pub proxy: Option<ProxyConfig>,
    /// Per-endpoint sliding-window quota
    pub rate_limit: RateLimiterConfig,
    /// Lifetime of a deduplication entry, measured from issuance
    pub dedupe_ttl: Duration,
    /// Maximum encoded request body size in bytes (default: 10MB)
    pub max_request_size: usize,
    /// Maximum response body size in bytes (default: 10MB)
    pub max_response_size: usize,
    /// Maximum number of idle connections per host (default: 10)
    pub pool_max_idle_per_host: usize,
    /// Timeout for idle pooled connections (default: 90 seconds)
    pub pool_idle_timeout: Duration,
    /// Log request bodies at debug level
    pub verbose: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            default_locale: "en".to_string(),
            user_agent: format!("resilient-api/{}", env!("CARGO_PKG_VERSION")),
            proxy: None,
            rate_limit: RateLimiterConfig::default(),
            dedupe_ttl: DEFAULT_DEDUPE_TTL,
            max_request_size: DEFAULT_BODY_LIMIT,
            max_response_size: DEFAULT_BODY_LIMIT,
            pool_max_idle_per_host: 10,
            pool_idle_timeout: Duration::from_secs(90),
            verbose: false,
        }
    }
}

impl ClientConfig {
    /// Creates a default configuration for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Create a new configuration builder
    ///
    /// # Example
    ///
    /// ```rust
    /// use resilient_api_core::http_client::ClientConfig;
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::builder()
    ///     .base_url("https://api.example.com")
    ///     .timeout(Duration::from_secs(5))
    ///     .build();
    /// assert_eq!(config.timeout, Duration::from_secs(5));
    /// ```
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Validates the client configuration.
    ///
    /// # Validation Rules
    ///
    /// - `base_url` must be an absolute http(s) URL
    /// - `timeout` > 5 minutes returns an error (excessive timeout)
    /// - `timeout` < 1 second generates a warning (may cause frequent timeouts)
    /// - body size limits cannot be zero
    /// - the rate limit quota and window cannot be zero
    ///
    /// # Example
    ///
    /// ```rust
    /// use resilient_api_core::http_client::ClientConfig;
    /// use std::time::Duration;
    ///
    /// assert!(ClientConfig::default().validate().is_ok());
    ///
    /// let invalid = ClientConfig {
    ///     timeout: Duration::from_secs(600),
    ///     ..Default::default()
    /// };
    /// assert!(invalid.validate().is_err());
    /// ```
    pub fn validate(&self) -> std::result::Result<ValidationResult, ConfigValidationError> {
        const MAX_REASONABLE_BODY_SIZE: usize = 100 * 1024 * 1024;

        match reqwest::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigValidationError::invalid(
                    "base_url",
                    format!("unsupported scheme '{}'", url.scheme()),
                ));
            }
            Err(e) => {
                return Err(ConfigValidationError::invalid(
                    "base_url",
                    format!("'{}' is not a valid URL: {e}", self.base_url),
                ));
            }
        }

        let mut warnings = Vec::new();
        let max_timeout = Duration::from_secs(300);
        if self.timeout > max_timeout {
            return Err(ConfigValidationError::too_high(
                "timeout",
                format!("{:?}", self.timeout),
                "5 minutes",
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigValidationError::invalid(
                "timeout",
                "timeout cannot be zero",
            ));
        }
        if self.timeout < Duration::from_secs(1) {
            warnings.push(format!(
                "timeout {:?} is very short, may cause frequent timeouts",
                self.timeout
            ));
        }

        for (field, size) in [
            ("max_request_size", self.max_request_size),
            ("max_response_size", self.max_response_size),
        ] {
            if size == 0 {
                return Err(ConfigValidationError::invalid(
                    field,
                    format!("{field} cannot be zero"),
                ));
            }
            if size > MAX_REASONABLE_BODY_SIZE {
                return Err(ConfigValidationError::too_high(
                    field,
                    size,
                    "100MB (104857600 bytes)",
                ));
            }
        }

        if self.default_locale.trim().is_empty() {
            return Err(ConfigValidationError::missing("default_locale"));
        }

        let mut result = ValidationResult::with_warnings(warnings);
        result.merge(self.rate_limit.validate()?);
        Ok(result)
    }

    /// Loads the configuration from `API_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_env() -> std::result::Result<Self, ConfigValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration from a `.env` file, falling back to the
    /// process environment for keys the file does not define.
    ///
    /// The process environment is not modified.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value cannot be
    /// parsed.
    pub fn from_dotenv(
        path: impl AsRef<Path>,
    ) -> std::result::Result<Self, ConfigValidationError> {
        let path = path.as_ref();
        let invalid = |e: dotenvy::Error| {
            ConfigValidationError::invalid("dotenv", format!("{}: {e}", path.display()))
        };

        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path).map_err(invalid)? {
            let (key, value) = item.map_err(invalid)?;
            vars.insert(key, value);
        }

        Self::from_lookup(|key| vars.get(key).cloned().or_else(|| std::env::var(key).ok()))
    }

    /// Loads the configuration through an arbitrary variable lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> std::result::Result<Self, ConfigValidationError> {
        let mut config = Self::default();

        if let Some(val) = lookup(ENV_BASE_URL) {
            config.base_url = val;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_TIMEOUT_MS, "timeout")? {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_CONNECT_TIMEOUT_MS, "connect_timeout")? {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(val) = lookup(ENV_CLIENT_VERSION) {
            config.client_version = val;
        }
        if let Some(val) = lookup(ENV_DEFAULT_LOCALE) {
            config.default_locale = val;
        }
        if let Some(max) = parse_var::<usize>(
            &lookup,
            ENV_RATE_LIMIT_MAX_REQUESTS,
            "rate_limit.max_requests",
        )? {
            config.rate_limit.max_requests = max;
        }
        if let Some(ms) =
            parse_var::<u64>(&lookup, ENV_RATE_LIMIT_WINDOW_MS, "rate_limit.window")?
        {
            config.rate_limit.window = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    field: &'static str,
) -> std::result::Result<Option<T>, ConfigValidationError> {
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|_| {
                ConfigValidationError::invalid(field, format!("{key}='{raw}' is not a number"))
            })
        })
        .transpose()
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the default per-attempt deadline
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the TCP connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the reported client version
    pub fn client_version(mut self, version: impl Into<String>) -> Self {
        self.config.client_version = version.into();
        self
    }

    /// Set the fallback locale
    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.config.default_locale = locale.into();
        self
    }

    /// Set the User-Agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the proxy
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Set the per-endpoint quota
    pub fn rate_limit(mut self, max_requests: usize, window: Duration) -> Self {
        self.config.rate_limit = RateLimiterConfig::new(max_requests, window);
        self
    }

    /// Set the deduplication entry lifetime
    pub fn dedupe_ttl(mut self, ttl: Duration) -> Self {
        self.config.dedupe_ttl = ttl;
        self
    }

    /// Set the maximum request body size
    pub fn max_request_size(mut self, bytes: usize) -> Self {
        self.config.max_request_size = bytes;
        self
    }

    /// Set the maximum response body size
    pub fn max_response_size(mut self, bytes: usize) -> Self {
        self.config.max_response_size = bytes;
        self
    }

    /// Enable verbose logging
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.client_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.dedupe_ttl, Duration::from_millis(1000));
        assert_eq!(config.max_request_size, 10 * 1024 * 1024);
        assert_eq!(config.max_response_size, 10 * 1024 * 1024);
        assert_eq!(config.pool_max_idle_per_host, 10);
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(90));
        assert_eq!(config.rate_limit, RateLimiterConfig::default());
    }

    #[test]
    fn test_validate_default() {
        let result = ClientConfig::default().validate().unwrap();
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_validate_base_url() {
        let err = ClientConfig::new("not a url").validate().unwrap_err();
        assert_eq!(err.field_name(), "base_url");

        let err = ClientConfig::new("ftp://example.com").validate().unwrap_err();
        assert_eq!(err.field_name(), "base_url");

        assert!(ClientConfig::new("https://api.example.com/v1").validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let too_long = ClientConfig {
            timeout: Duration::from_secs(301),
            ..Default::default()
        };
        assert!(matches!(
            too_long.validate(),
            Err(ConfigValidationError::ValueTooHigh { field: "timeout", .. })
        ));

        let boundary = ClientConfig {
            timeout: Duration::from_secs(300),
            ..Default::default()
        };
        assert!(boundary.validate().is_ok());

        let short = ClientConfig {
            timeout: Duration::from_millis(500),
            ..Default::default()
        };
        assert!(short.validate().unwrap().has_warnings());

        let zero = ClientConfig {
            timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_validate_body_sizes() {
        let zero = ClientConfig {
            max_response_size: 0,
            ..Default::default()
        };
        assert_eq!(zero.validate().unwrap_err().field_name(), "max_response_size");

        let huge = ClientConfig {
            max_request_size: 100 * 1024 * 1024 + 1,
            ..Default::default()
        };
        assert_eq!(huge.validate().unwrap_err().field_name(), "max_request_size");
    }

    #[test]
    fn test_validate_rate_limit() {
        let config = ClientConfig::builder()
            .rate_limit(0, Duration::from_secs(60))
            .build();
        assert_eq!(
            config.validate().unwrap_err().field_name(),
            "rate_limit.max_requests"
        );

        let short_window = ClientConfig::builder()
            .rate_limit(10, Duration::from_millis(100))
            .build();
        assert!(short_window.validate().unwrap().has_warnings());
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder()
            .base_url("https://api.example.com")
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(2))
            .client_version("9.9.9")
            .default_locale("fr")
            .user_agent("test-agent")
            .proxy(ProxyConfig::new("http://127.0.0.1:3128"))
            .dedupe_ttl(Duration::from_millis(250))
            .max_request_size(1024)
            .max_response_size(2048)
            .verbose(true)
            .build();

        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.client_version, "9.9.9");
        assert_eq!(config.default_locale, "fr");
        assert_eq!(config.user_agent, "test-agent");
        assert!(config.proxy.is_some());
        assert_eq!(config.dedupe_ttl, Duration::from_millis(250));
        assert_eq!(config.max_request_size, 1024);
        assert_eq!(config.max_response_size, 2048);
        assert!(config.verbose);
    }

    #[test]
    fn test_from_lookup() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://api.example.com"),
            (ENV_TIMEOUT_MS, "5000"),
            (ENV_CONNECT_TIMEOUT_MS, " 1500 "),
            (ENV_CLIENT_VERSION, "2.0.0"),
            (ENV_DEFAULT_LOCALE, "es"),
            (ENV_RATE_LIMIT_MAX_REQUESTS, "20"),
            (ENV_RATE_LIMIT_WINDOW_MS, "1000"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.timeout, Duration::from_millis(5000));
        assert_eq!(config.connect_timeout, Duration::from_millis(1500));
        assert_eq!(config.client_version, "2.0.0");
        assert_eq!(config.default_locale, "es");
        assert_eq!(
            config.rate_limit,
            RateLimiterConfig::new(20, Duration::from_secs(1))
        );
    }

    #[test]
    fn test_from_lookup_keeps_defaults_for_unset_keys() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.timeout, ClientConfig::default().timeout);
        assert_eq!(config.base_url, ClientConfig::default().base_url);
    }

    #[test]
    fn test_from_lookup_rejects_garbage_numbers() {
        let err = ClientConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT_MS, "soon")])).unwrap_err();
        assert_eq!(err.field_name(), "timeout");
    }

    #[test]
    fn test_from_dotenv() {
        let path = std::env::temp_dir().join(format!(
            "resilient-api-core-{}-from-dotenv.env",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "API_BASE_URL=https://dotenv.example.com\nAPI_RATE_LIMIT_MAX_REQUESTS=7\n",
        )
        .unwrap();

        let config = ClientConfig::from_dotenv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.base_url, "https://dotenv.example.com");
        assert_eq!(config.rate_limit.max_requests, 7);
    }

    #[test]
    fn test_from_dotenv_missing_file() {
        let err = ClientConfig::from_dotenv("/definitely/not/here.env").unwrap_err();
        assert_eq!(err.field_name(), "dotenv");
    }
}
