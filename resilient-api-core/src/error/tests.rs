#![allow(clippy::disallowed_methods)] // unwrap() is acceptable in tests

use super::*;
use std::time::Duration;

#[test]
fn test_error_code_wire_names() {
    assert_eq!(ErrorCode::RateLimitExceeded.as_str(), "RATE_LIMIT_EXCEEDED");
    assert_eq!(ErrorCode::Aborted.as_str(), "ABORTED");
    assert_eq!(ErrorCode::Timeout.as_str(), "TIMEOUT");
    assert_eq!(ErrorCode::Unauthorized.as_str(), "UNAUTHORIZED");
    assert_eq!(ErrorCode::Forbidden.as_str(), "FORBIDDEN");
    assert_eq!(ErrorCode::ServerError.as_str(), "SERVER_ERROR");
    assert_eq!(ErrorCode::NetworkError.as_str(), "NETWORK_ERROR");
    assert_eq!(ErrorCode::Aborted.to_string(), "ABORTED");
}

#[test]
fn test_error_code_serializes_as_wire_name() {
    let json = serde_json::to_value(ErrorCode::RateLimitExceeded).unwrap();
    assert_eq!(json, serde_json::json!("RATE_LIMIT_EXCEEDED"));
}

#[test]
fn test_api_error_serialization_skips_missing_fields() {
    let json = serde_json::to_value(ApiError::aborted()).unwrap();
    assert_eq!(json["code"], "ABORTED");
    assert!(json.get("status").is_none());

    let json = serde_json::to_value(ApiError::http(404, "Not found.")).unwrap();
    assert_eq!(json["status"], 404);
    assert!(json.get("code").is_none());
}

#[test]
fn test_constructors_carry_codes_and_statuses() {
    let cases = [
        (ApiError::rate_limited(), Some(ErrorCode::RateLimitExceeded), None),
        (ApiError::aborted(), Some(ErrorCode::Aborted), None),
        (
            ApiError::timeout(Duration::from_millis(5)),
            Some(ErrorCode::Timeout),
            None,
        ),
        (ApiError::unauthorized(), Some(ErrorCode::Unauthorized), Some(401)),
        (ApiError::forbidden(), Some(ErrorCode::Forbidden), Some(403)),
        (ApiError::server_error(), Some(ErrorCode::ServerError), Some(500)),
        (ApiError::network(), Some(ErrorCode::NetworkError), None),
        (ApiError::response_too_large(), Some(ErrorCode::NetworkError), None),
    ];

    for (err, code, status) in cases {
        assert_eq!(err.code, code, "{err:?}");
        assert_eq!(err.status, status, "{err:?}");
    }
}

#[test]
fn test_details_are_sentences() {
    let errors = [
        ApiError::rate_limited(),
        ApiError::aborted(),
        ApiError::timeout(Duration::from_secs(30)),
        ApiError::unauthorized(),
        ApiError::forbidden(),
        ApiError::server_error(),
        ApiError::network(),
    ];

    for err in errors {
        let detail = err.to_string();
        assert!(detail.chars().next().unwrap().is_uppercase(), "{detail}");
        assert!(detail.ends_with('.'), "{detail}");
    }
}

#[test]
fn test_timeout_detail_mentions_duration() {
    let err = ApiError::timeout(Duration::from_millis(250));
    assert!(err.detail.contains("250 ms"));
}

#[test]
fn test_http_detail_is_truncated() {
    let err = ApiError::http(418, "x".repeat(4096));
    assert!(err.detail.len() < 4096);
    assert!(err.detail.ends_with("... (truncated)"));
}

#[test]
fn test_predicates() {
    assert!(ApiError::aborted().is_aborted());
    assert!(!ApiError::aborted().is_timeout());
    assert!(ApiError::timeout(Duration::from_secs(1)).is_timeout());
    assert!(ApiError::forbidden().is(ErrorCode::Forbidden));
}

#[test]
fn test_config_error_converts_without_code() {
    let err: ApiError = ConfigValidationError::missing("base_url").into();
    assert_eq!(err.code, None);
    assert_eq!(err.status, None);
    assert!(err.detail.contains("base_url"));
}

#[test]
fn test_error_is_send_sync_static() {
    fn assert_bounds<E: std::error::Error + Send + Sync + 'static>() {}
    assert_bounds::<ApiError>();
}

#[test]
fn test_terminal_marker_is_not_serialized() {
    let err = ApiError::response_too_large();
    assert!(err.is_terminal());
    assert!(!err.is_retryable());
    assert!(!ApiError::network().is_terminal());

    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["code"], "NETWORK_ERROR");
    assert!(json.get("terminal").is_none());
}

#[test]
fn test_pre_flight_rejection_has_no_status_or_code() {
    let err = ApiError::invalid_request("The request body could not be encoded.");
    assert!(err.status.is_none());
    assert!(err.code.is_none());

    let err = ApiError::from(ConfigValidationError::missing("default_locale"));
    assert!(err.status.is_none());
    assert!(err.code.is_none());
    assert!(err.detail.contains("default_locale"));
}
