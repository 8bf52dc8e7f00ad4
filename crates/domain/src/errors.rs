//! Error types used throughout AuthKit

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::AssuranceLevel;

/// Main error type for AuthKit operations.
///
/// Routine token invalidity is reported through
/// [`TokenValidation`](crate::TokenValidation) instead; this type covers
/// everything that fails outside the validator.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("JWKS error: {0}")]
    Jwks(String),

    #[error("Step-up required (current: {current:?}, required: {required:?})")]
    StepUpRequired { current: Option<AssuranceLevel>, required: Option<AssuranceLevel> },

    #[error("Auth server error {error}: {}", .description.as_deref().unwrap_or("no description"))]
    Server { status: Option<u16>, error: String, description: Option<String> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl AuthError {
    /// Stable snake_case label, suitable as a structured logging field.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TokenExpired => "token_expired",
            Self::InvalidToken(_) => "invalid_token",
            Self::Unauthorized(_) => "unauthorized",
            Self::Discovery(_) => "discovery",
            Self::Jwks(_) => "jwks",
            Self::StepUpRequired { .. } => "step_up_required",
            Self::Server { .. } => "server",
            Self::Network(_) => "network",
            Self::Config(_) => "config",
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }

    /// Whether retrying the same request later could succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Server { status: Some(status), .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias for AuthKit operations
pub type Result<T> = std::result::Result<T, AuthError>;
