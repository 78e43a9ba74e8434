//! # appstage-gateway
//!
//! External endpoint clients for the AppStage preview interpreter.
//!
//! The interpreter core stays network-free; everything that crosses the
//! process boundary lives here, behind traits the core can mock:
//!
//! - [`AiExecutor`] — the AI execution endpoint
//!   (`{appId, aiAction, prompt, persona?, context}` → `{result}` / `{error}`)
//! - [`ApiTransport`] — arbitrary app-author endpoints targeted by
//!   `submit` actions (method/headers/body owned by the app author)
//!
//! ## TLS Backend
//!
//! - **`rustls`** *(default)* — rustls. Recommended for cross-compilation.
//! - **`native-tls`** — the platform's native TLS implementation.
//!
//! ## Error Handling
//!
//! All calls return [`GatewayResult<T>`](GatewayResult). Transient errors
//! (`NetworkError`, `Timeout`, `RateLimited`) are automatically retried with
//! exponential backoff where retry is safe; see [`GatewayError`].

mod ai;
mod api;
mod error;
mod http;

pub use ai::{AiExecutionRequest, AiExecutor, HttpAiExecutor};
pub use api::{ApiSubmitRequest, ApiTransport, HttpApiTransport};
pub use error::{GatewayError, GatewayResult};
pub use http::{create_http_client, execute_request, execute_request_with_retry, truncate_body};
