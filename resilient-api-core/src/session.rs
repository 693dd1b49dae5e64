//! Session state consumed by the client.
//!
//! The client never owns the user's session. It asks a [`SessionStore`] for
//! the bearer token, the preferred locale, the deployment environment and a
//! development identity, and tells it to forget the token when the server
//! answers 401.

use crate::credentials::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

/// Deployment environment the client runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// A developer machine.
    Local,
    /// Shared development deployment.
    Development,
    /// Pre-production.
    Staging,
    /// Production.
    #[default]
    Production,
}

impl Environment {
    /// Returns `true` if the development identity header may be sent.
    pub fn allows_dev_identity(self) -> bool {
        matches!(self, Self::Local | Self::Development)
    }

    /// Lowercase name of the environment.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "dev" | "development" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "prod" | "production" => Ok(Self::Production),
            other => Err(format!("Invalid environment: {other}")),
        }
    }
}

/// Read access to the session plus the single mutation the client performs.
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Current bearer token, if signed in.
    fn auth_token(&self) -> Option<SecretString>;

    /// Forgets the bearer token. Called when the server answers 401.
    fn clear_auth_token(&self);

    /// Preferred locale, e.g. `"en"` or `"fr-CA"`.
    fn locale(&self) -> Option<String>;

    /// Deployment environment.
    fn environment(&self) -> Environment;

    /// Identity sent as `x-dev-user-id` when no token is available in
    /// local and development environments.
    fn user_identity(&self) -> Option<String>;
}

#[derive(Debug, Default)]
struct SessionState {
    auth_token: Option<SecretString>,
    locale: Option<String>,
    user_identity: Option<String>,
}

/// In-memory [`SessionStore`].
///
/// # Example
///
/// ```rust
/// use resilient_api_core::session::{Environment, MemorySessionStore, SessionStore};
///
/// let session = MemorySessionStore::new(Environment::Local)
///     .with_auth_token("token")
///     .with_locale("fr");
///
/// assert_eq!(session.locale().as_deref(), Some("fr"));
/// session.clear_auth_token();
/// assert!(session.auth_token().is_none());
/// ```
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    environment: Environment,
    state: RwLock<SessionState>,
}

impl MemorySessionStore {
    /// Creates an empty session for `environment`.
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Sets the bearer token.
    pub fn with_auth_token(self, token: impl Into<SecretString>) -> Self {
        self.set_auth_token(token);
        self
    }

    /// Sets the preferred locale.
    pub fn with_locale(self, locale: impl Into<String>) -> Self {
        self.write(|state| state.locale = Some(locale.into()));
        self
    }

    /// Sets the development identity.
    pub fn with_user_identity(self, identity: impl Into<String>) -> Self {
        self.write(|state| state.user_identity = Some(identity.into()));
        self
    }

    /// Replaces the bearer token, e.g. after signing in again.
    pub fn set_auth_token(&self, token: impl Into<SecretString>) {
        self.write(|state| state.auth_token = Some(token.into()));
    }

    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn write(&self, f: impl FnOnce(&mut SessionState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }
}

impl SessionStore for MemorySessionStore {
    fn auth_token(&self) -> Option<SecretString> {
        self.read(|state| state.auth_token.clone())
    }

    fn clear_auth_token(&self) {
        self.write(|state| state.auth_token = None);
    }

    fn locale(&self) -> Option<String> {
        self.read(|state| state.locale.clone())
    }

    fn environment(&self) -> Environment {
        self.environment
    }

    fn user_identity(&self) -> Option<String> {
        self.read(|state| state.user_identity.clone())
    }
}
