//! Webhook delivery authorization: two static shared-secret headers.

use axum::http::HeaderMap;
use std::fmt;

/// Header carrying the subscription name (compared case-insensitively).
pub const HEADER_SUBSCRIPTION_NAME: &str = "aeg-subscription-name";

/// Header carrying the shared secret (compared exactly).
pub const HEADER_SECRET: &str = "x-webhook-secret";

/// Retry counter set by the distribution system; zero on the first attempt.
/// Used for logging only.
pub const HEADER_DELIVERY_COUNT: &str = "aeg-delivery-count";

/// Why a delivery was rejected. Carries the presented value for the log
/// line; never echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    SubscriptionName(String),
    Secret(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::SubscriptionName(got) => {
                write!(f, "subscription name mismatch: {:?}", got)
            }
            Rejection::Secret(got) => write!(f, "secret mismatch: {:?}", got),
        }
    }
}

/// Check the two shared-secret headers. The first failing check wins and no
/// event is processed on rejection.
pub fn validate_headers(
    headers: &HeaderMap,
    expected_subscription: &str,
    expected_secret: &str,
) -> Result<(), Rejection> {
    let subscription = headers
        .get(HEADER_SUBSCRIPTION_NAME)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !subscription.eq_ignore_ascii_case(expected_subscription) {
        return Err(Rejection::SubscriptionName(subscription.to_string()));
    }
    let secret = headers
        .get(HEADER_SECRET)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if secret != expected_secret {
        return Err(Rejection::Secret(secret.to_string()));
    }
    Ok(())
}

/// Attempt number for logging: the distribution system counts retries from
/// zero in [`HEADER_DELIVERY_COUNT`].
pub fn delivery_attempt(headers: &HeaderMap) -> u32 {
    headers
        .get(HEADER_DELIVERY_COUNT)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(0)
        + 1
}
