//! Structured logging system.
//!
//! The request pipeline emits `tracing` events and spans (`api_request`,
//! `api_attempt`, `transport_send`). This module wires them to a
//! `tracing-subscriber` formatter with:
//! - Multi-level logging (TRACE, DEBUG, INFO, WARN, ERROR)
//! - `RUST_LOG` override through [`EnvFilter`]
//! - Pretty, compact and JSON output

use std::fmt;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self as tracing_fmt, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Trace level: per-attempt and dedupe bookkeeping.
    Trace,
    /// Debug level: admissions, responses, decoded bodies.
    Debug,
    /// Info level: client errors worth noting.
    Info,
    /// Warn level: retries, rejections, timeouts.
    Warn,
    /// Error level: terminal failures.
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("Invalid log level: {other}")),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable formatted output.
    Pretty,
    /// Compact format.
    Compact,
    /// JSON format for production environments.
    Json,
}

/// Log configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level.
    pub level: LogLevel,
    /// Log format.
    pub format: LogFormat,
    /// Whether to show timestamps.
    pub show_time: bool,
    /// Whether to show thread IDs.
    pub show_thread_ids: bool,
    /// Whether to show target module.
    pub show_target: bool,
    /// Whether to show span events (span enter/close).
    pub show_span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            show_time: true,
            show_thread_ids: false,
            show_target: true,
            show_span_events: false,
        }
    }
}

impl LogConfig {
    /// Creates a log configuration for development environments.
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            show_span_events: true,
            ..Self::default()
        }
    }

    /// Creates a log configuration for production environments.
    pub fn production() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            show_thread_ids: true,
            ..Self::default()
        }
    }

    /// Creates a log configuration for test environments.
    pub fn test() -> Self {
        Self {
            level: LogLevel::Warn,
            format: LogFormat::Compact,
            show_time: false,
            show_thread_ids: false,
            show_target: false,
            show_span_events: false,
        }
    }

    /// Filter applied when `RUST_LOG` is unset.
    pub fn default_filter(&self) -> String {
        format!(
            "resilient_api_core={level},resilient_api={level}",
            level = self.level
        )
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn filtered<L>(layer: L, filter: EnvFilter) -> BoxedLayer
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    layer.with_filter(filter).boxed()
}

fn build_layer(config: &LogConfig) -> BoxedLayer {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter()));

    let base = tracing_fmt::layer()
        .with_thread_ids(config.show_thread_ids)
        .with_target(config.show_target)
        .with_span_events(if config.show_span_events {
            FmtSpan::ENTER | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    match (config.format, config.show_time) {
        (LogFormat::Pretty, true) => filtered(base.pretty(), filter),
        (LogFormat::Pretty, false) => filtered(base.pretty().without_time(), filter),
        (LogFormat::Compact, true) => filtered(base.compact(), filter),
        (LogFormat::Compact, false) => filtered(base.compact().without_time(), filter),
        (LogFormat::Json, true) => filtered(base.json(), filter),
        (LogFormat::Json, false) => filtered(base.json().without_time(), filter),
    }
}

/// Initializes the logging system.
///
/// # Panics
///
/// Panics if a global subscriber is already installed; use
/// [`try_init_logging`] where that can happen.
///
/// # Examples
///
/// ```no_run
/// use resilient_api_core::logging::{init_logging, LogConfig};
///
/// init_logging(&LogConfig::development());
/// ```
pub fn init_logging(config: &LogConfig) {
    tracing_subscriber::registry()
        .with(build_layer(config))
        .init();
}

/// Attempts to initialize the logging system.
///
/// Suitable for test environments where multiple calls should not panic.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn try_init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(build_layer(config))
        .try_init()
}
