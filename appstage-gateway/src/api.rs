//! App-author API transport.
//!
//! A declarative `submit` action may target an external endpoint instead of
//! the in-memory store. The endpoint, method, headers, and body contract are
//! all owned by the app author; this client only delivers the call and
//! reports success or failure.

use std::collections::BTreeMap;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};
use crate::http::{self, create_http_client};

/// One outbound submit call, fully described by the action that produced it.
#[derive(Debug, Clone)]
pub struct ApiSubmitRequest {
    /// Target URL.
    pub endpoint: String,
    /// HTTP method; `None` defaults to POST.
    pub method: Option<String>,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
    /// JSON body built from the submitted form fields.
    pub body: Value,
}

/// Abstraction over the app-author API collaborator.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Deliver the call. Non-2xx statuses are failures.
    async fn submit(&self, request: &ApiSubmitRequest) -> GatewayResult<()>;
}

/// HTTP implementation of [`ApiTransport`].
pub struct HttpApiTransport {
    client: reqwest::Client,
}

impl HttpApiTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: create_http_client(),
        }
    }
}

impl Default for HttpApiTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApiTransport for HttpApiTransport {
    async fn submit(&self, request: &ApiSubmitRequest) -> GatewayResult<()> {
        let method_str = request.method.as_deref().unwrap_or("POST");
        let method =
            Method::from_str(&method_str.to_uppercase()).map_err(|_| {
                GatewayError::InvalidRequest {
                    endpoint: request.endpoint.clone(),
                    detail: format!("unsupported HTTP method '{method_str}'"),
                }
            })?;

        log::debug!("[gateway] {method} {}", request.endpoint);

        let mut builder = self
            .client
            .request(method, &request.endpoint)
            .json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        // App-author endpoints are not ours to hammer: no automatic retry.
        let (status, body) = http::execute_request(builder, &request.endpoint).await?;

        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(GatewayError::Status {
                endpoint: request.endpoint.clone(),
                status,
                body: http::truncate_body(&body),
            })
        }
    }
}
