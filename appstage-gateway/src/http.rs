//! Shared HTTP request execution.
//!
//! Both gateway clients (AI execution, app-author API submit) funnel their
//! requests through here so sending, logging, status classification, and
//! retry behave identically regardless of which endpoint is being called.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::{GatewayError, GatewayResult};

/// Maximum number of response-body bytes echoed into logs and errors.
const LOG_BODY_LIMIT: usize = 512;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build the shared `reqwest` client with the gateway's default timeouts.
#[must_use]
#[allow(clippy::expect_used)]
pub fn create_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
}

/// Truncate a response body for logging and error payloads.
#[must_use]
pub fn truncate_body(body: &str) -> String {
    if body.len() <= LOG_BODY_LIMIT {
        body.to_string()
    } else {
        let mut end = LOG_BODY_LIMIT;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... ({} bytes total)", &body[..end], body.len())
    }
}

/// Performs an HTTP request and returns `(status, body)`.
///
/// Unified processing: sending the request, logging, reading the body,
/// mapping transport failures. HTTP 429 and 502–504 are classified as
/// retryable gateway errors; other statuses are returned to the caller,
/// which decides whether they are failures.
pub async fn execute_request(
    request_builder: RequestBuilder,
    endpoint: &str,
) -> GatewayResult<(u16, String)> {
    let response = request_builder.send().await.map_err(|e| {
        if e.is_timeout() {
            GatewayError::Timeout {
                endpoint: endpoint.to_string(),
                detail: e.to_string(),
            }
        } else {
            GatewayError::NetworkError {
                endpoint: endpoint.to_string(),
                detail: e.to_string(),
            }
        }
    })?;

    let status = response.status().as_u16();
    log::debug!("[gateway] {endpoint} -> HTTP {status}");

    // Extract Retry-After before consuming the body
    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    if status == 429 {
        log::warn!("[gateway] {endpoint} rate limited, retry_after={retry_after:?}");
        return Err(GatewayError::RateLimited {
            endpoint: endpoint.to_string(),
            retry_after,
        });
    }

    if matches!(status, 502..=504) {
        let body = response.text().await.unwrap_or_default();
        log::warn!("[gateway] {endpoint} server error (HTTP {status})");
        return Err(GatewayError::NetworkError {
            endpoint: endpoint.to_string(),
            detail: format!("HTTP {status}: {}", truncate_body(&body)),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::NetworkError {
            endpoint: endpoint.to_string(),
            detail: format!("Failed to read response body: {e}"),
        })?;

    log::debug!("[gateway] {endpoint} body: {}", truncate_body(&body));

    Ok((status, body))
}

/// Performs an HTTP request with automatic retry on transient failures.
///
/// # Retry strategy
/// - Only transient errors are retried (network, timeout, rate limit)
/// - Exponential backoff: 100ms, 200ms, 400ms, ... capped at 10 seconds
/// - A `Retry-After` hint from the endpoint overrides the backoff (capped
///   at 30 seconds)
pub async fn execute_request_with_retry(
    request_builder: RequestBuilder,
    endpoint: &str,
    max_retries: u32,
) -> GatewayResult<(u16, String)> {
    if max_retries == 0 {
        return execute_request(request_builder, endpoint).await;
    }

    let mut last_error = None;

    for attempt in 0..=max_retries {
        // RequestBuilder can only be sent once
        let Some(req) = request_builder.try_clone() else {
            log::warn!("[gateway] {endpoint}: cannot clone request, disabling retry");
            return execute_request(request_builder, endpoint).await;
        };

        match execute_request(req, endpoint).await {
            Ok(resp) => return Ok(resp),
            Err(e) if attempt < max_retries && e.is_retryable() => {
                let delay = retry_delay(&e, attempt);
                log::warn!(
                    "[gateway] {endpoint} failed (attempt {}/{}), retrying in {:.1}s: {}",
                    attempt + 1,
                    max_retries,
                    delay.as_secs_f32(),
                    e
                );
                tokio::time::sleep(delay).await;
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| GatewayError::NetworkError {
        endpoint: endpoint.to_string(),
        detail: "All retries exhausted with no error captured".to_string(),
    }))
}

/// Parse a JSON response body.
pub fn parse_json<T>(body: &str, endpoint: &str) -> GatewayResult<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("[gateway] {endpoint} JSON parse failed: {e}");
        GatewayError::ParseError {
            endpoint: endpoint.to_string(),
            detail: e.to_string(),
        }
    })
}

/// Compute the delay before the next retry attempt.
///
/// Uses the endpoint's `Retry-After` hint (capped at 30s) when present,
/// exponential backoff otherwise.
fn retry_delay(error: &GatewayError, attempt: u32) -> Duration {
    if let GatewayError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(30))
    } else {
        backoff_delay(attempt)
    }
}

/// Exponential backoff: 100ms, 200ms, 400ms, ... capped at 10 seconds.
fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20); // keep 2^attempt in range
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    Duration::from_millis(delay_ms.min(10_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- is_retryable ----

    #[test]
    fn retryable_network_error() {
        let e = GatewayError::NetworkError {
            endpoint: "http://x".into(),
            detail: "err".into(),
        };
        assert!(e.is_retryable());
    }

    #[test]
    fn retryable_timeout() {
        let e = GatewayError::Timeout {
            endpoint: "http://x".into(),
            detail: "err".into(),
        };
        assert!(e.is_retryable());
    }

    #[test]
    fn retryable_rate_limited() {
        let e = GatewayError::RateLimited {
            endpoint: "http://x".into(),
            retry_after: None,
        };
        assert!(e.is_retryable());
    }

    #[test]
    fn not_retryable_status() {
        let e = GatewayError::Status {
            endpoint: "http://x".into(),
            status: 404,
            body: String::new(),
        };
        assert!(!e.is_retryable());
    }

    #[test]
    fn not_retryable_execution_failed() {
        let e = GatewayError::ExecutionFailed {
            message: "model refused".into(),
        };
        assert!(!e.is_retryable());
    }

    // ---- backoff_delay ----

    #[test]
    fn backoff_attempt_0() {
        assert_eq!(backoff_delay(0), Duration::from_millis(100));
    }

    #[test]
    fn backoff_attempt_3() {
        assert_eq!(backoff_delay(3), Duration::from_millis(800));
    }

    #[test]
    fn backoff_capped_at_10s() {
        // attempt 7: 100 * 2^7 = 12800ms, capped to 10000ms
        assert_eq!(backoff_delay(7), Duration::from_millis(10_000));
    }

    #[test]
    fn retry_delay_honors_retry_after() {
        let e = GatewayError::RateLimited {
            endpoint: "http://x".into(),
            retry_after: Some(5),
        };
        assert_eq!(retry_delay(&e, 0), Duration::from_secs(5));
    }

    #[test]
    fn retry_delay_caps_retry_after() {
        let e = GatewayError::RateLimited {
            endpoint: "http://x".into(),
            retry_after: Some(600),
        };
        assert_eq!(retry_delay(&e, 0), Duration::from_secs(30));
    }

    // ---- parse_json ----

    #[test]
    fn parse_json_valid() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Foo {
            x: i32,
        }
        let result: GatewayResult<Foo> = parse_json(r#"{"x":42}"#, "http://x");
        assert!(
            matches!(&result, Ok(Foo { x: 42 })),
            "unexpected parse result: {result:?}"
        );
    }

    #[test]
    fn parse_json_invalid() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Foo {
            x: i32,
        }
        let result: GatewayResult<Foo> = parse_json("not json", "http://x");
        assert!(
            matches!(&result, Err(GatewayError::ParseError { .. })),
            "unexpected parse result: {result:?}"
        );
    }

    // ---- truncate_body ----

    #[test]
    fn truncate_short_body_unchanged() {
        assert_eq!(truncate_body("ok"), "ok");
    }

    #[test]
    fn truncate_long_body() {
        let body = "a".repeat(2000);
        let truncated = truncate_body(&body);
        assert!(truncated.len() < body.len());
        assert!(truncated.contains("2000 bytes total"));
    }
}
