//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use appstage_gateway::GatewayError;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Action payload did not deserialize into the shape its kind requires
    #[error("Malformed '{kind}' action: {detail}")]
    MalformedAction { kind: String, detail: String },

    /// No declarative document is loaded
    #[error("No app document loaded")]
    MissingDocument,

    /// Login credentials did not match any user record
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Signup attempted with an email that already has a user record
    #[error("User already exists: {0}")]
    DuplicateUser(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Gateway error (converted from library)
    #[error("{0}")]
    Gateway(#[from] GatewayError),
}

impl CoreError {
    /// Whether the error is expected behavior (malformed declarative input,
    /// wrong password, partially-written document, ...) used for log
    /// classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error`
    /// when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::MalformedAction { .. }
            | Self::MissingDocument
            | Self::InvalidCredentials
            | Self::DuplicateUser(_)
            | Self::ValidationError(_)
            | Self::Gateway(_) => true,
            Self::SerializationError(_) => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
