use serde::{Deserialize, Serialize};

/// Unified error type for all outbound gateway calls.
///
/// Each variant carries the `endpoint` that produced the error plus
/// variant-specific context. All variants are serializable for structured
/// error reporting to the preview frontend.
///
/// # Retryable Errors
///
/// The following variants represent transient failures that may succeed on
/// retry:
/// - [`NetworkError`](Self::NetworkError) — network connectivity issues
/// - [`Timeout`](Self::Timeout) — request timed out
/// - [`RateLimited`](Self::RateLimited) — endpoint rate limit exceeded
///
/// The built-in HTTP helper automatically retries these with exponential
/// backoff.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "code")]
pub enum GatewayError {
    /// A network-level error occurred (DNS resolution failure, connection
    /// refused, etc.). Transient; automatically retried.
    #[error("Network error calling {endpoint}: {detail}")]
    NetworkError {
        /// Endpoint that produced the error.
        endpoint: String,
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out. Transient; automatically retried.
    #[error("Timeout calling {endpoint}: {detail}")]
    Timeout {
        /// Endpoint that produced the error.
        endpoint: String,
        /// Error details.
        detail: String,
    },

    /// The endpoint rate limit has been exceeded (HTTP 429).
    #[error("Rate limited by {endpoint}")]
    RateLimited {
        /// Endpoint that produced the error.
        endpoint: String,
        /// Suggested wait time in seconds before retrying, if provided.
        retry_after: Option<u64>,
    },

    /// The endpoint answered with a non-success HTTP status.
    #[error("HTTP {status} from {endpoint}")]
    Status {
        /// Endpoint that produced the error.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, truncated for reporting.
        body: String,
    },

    /// The response body could not be parsed into the expected shape.
    #[error("Parse error from {endpoint}: {detail}")]
    ParseError {
        /// Endpoint that produced the error.
        endpoint: String,
        /// Error details.
        detail: String,
    },

    /// The AI execution endpoint answered 2xx but reported a failure in its
    /// payload (`{"error": "..."}`).
    #[error("AI execution failed: {message}")]
    ExecutionFailed {
        /// Error message reported by the endpoint.
        message: String,
    },

    /// The request could not be constructed (bad method string, invalid
    /// header value, etc.). Caller input problem, never retried.
    #[error("Invalid request for {endpoint}: {detail}")]
    InvalidRequest {
        /// Endpoint the request was aimed at.
        endpoint: String,
        /// What was wrong with it.
        detail: String,
    },
}

impl GatewayError {
    /// Whether the error is a transient condition worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }
}

/// Gateway layer Result type alias
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
