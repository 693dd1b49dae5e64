use crate::error::{ApiError, Result};
use crate::session::SessionStore;
use reqwest::header::{
    ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue,
};
use tracing::{debug, warn};

use super::config::ClientConfig;

/// Header carrying the client version.
pub const CLIENT_VERSION_HEADER: HeaderName = HeaderName::from_static("x-client-version");

/// Header carrying the development identity when no token is available.
pub const DEV_USER_ID_HEADER: HeaderName = HeaderName::from_static("x-dev-user-id");

/// Builds the final header set of a request.
///
/// Caller headers come first; `content-type`, `x-client-version` and
/// `accept-language` then overwrite any caller value. Unless `skip_auth` is
/// set, a bearer token from the session is attached, or, without one and
/// only in local and development environments, the development identity.
pub(crate) fn build_headers(
    config: &ClientConfig,
    session: &dyn SessionStore,
    extra: &HeaderMap,
    skip_auth: bool,
) -> Result<HeaderMap> {
    let mut headers = extra.clone();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        CLIENT_VERSION_HEADER,
        header_value("x-client-version", &config.client_version)?,
    );
    let locale = session
        .locale()
        .filter(|locale| !locale.trim().is_empty())
        .unwrap_or_else(|| config.default_locale.clone());
    headers.insert(ACCEPT_LANGUAGE, header_value("accept-language", &locale)?);

    if skip_auth {
        return Ok(headers);
    }

    if let Some(token) = session.auth_token().filter(|token| !token.is_empty()) {
        let value = token.bearer_header().map_err(|_| {
            warn!("Stored auth token is not a valid header value");
            ApiError::invalid_request("The stored session token is malformed.")
        })?;
        headers.insert(AUTHORIZATION, value);
    } else if session.environment().allows_dev_identity()
        && let Some(identity) = session.user_identity()
    {
        debug!(environment = %session.environment(), "Attaching development identity");
        headers.insert(DEV_USER_ID_HEADER, header_value("x-dev-user-id", &identity)?);
    }

    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        ApiError::invalid_request(format!("The {name} header value is not valid."))
    })
}
