use crate::retry_strategy::RetryPolicy;
use reqwest::Method;
use tracing::debug;

/// Resolves the policy for one call.
///
/// An explicit policy wins over the verb default (`get` retries, writes do
/// not) but is still dropped to a single attempt when it does not apply to
/// the method.
pub(crate) fn effective_policy(method: &Method, requested: Option<RetryPolicy>) -> RetryPolicy {
    let policy = requested.unwrap_or_else(|| {
        if *method == Method::GET {
            RetryPolicy::read_default()
        } else {
            RetryPolicy::none()
        }
    });

    if policy.applies_to(method) {
        policy
    } else {
        debug!(method = %method, "Retry policy restricted to reads, sending once");
        RetryPolicy::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_verb_defaults() {
        assert_eq!(effective_policy(&Method::GET, None), RetryPolicy::read_default());
        assert_eq!(effective_policy(&Method::POST, None), RetryPolicy::none());
        assert_eq!(effective_policy(&Method::PUT, None), RetryPolicy::none());
        assert_eq!(effective_policy(&Method::DELETE, None), RetryPolicy::none());
    }

    #[test]
    fn test_read_only_policy_is_ignored_for_writes() {
        let policy = RetryPolicy::new(5, Duration::from_millis(10));
        assert_eq!(effective_policy(&Method::GET, Some(policy)), policy);
        assert_eq!(effective_policy(&Method::POST, Some(policy)), RetryPolicy::none());
    }

    #[test]
    fn test_opted_in_write_policy_applies() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10)).allow_non_idempotent();
        assert_eq!(effective_policy(&Method::PUT, Some(policy)), policy);
    }
}
