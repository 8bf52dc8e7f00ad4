//! Token validation options and results

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::assurance::AssuranceLevel;
use super::claims::JwtClaims;
use crate::constants::DEFAULT_CLOCK_TOLERANCE_SECS;

/// Caller-supplied constraints for `validate_token`. Unset fields are not
/// checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub required_scopes: Vec<String>,
    pub required_assurance_level: Option<AssuranceLevel>,
    /// Permitted skew when comparing `exp`/`nbf` to the clock.
    pub clock_tolerance: Duration,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            issuer: None,
            audience: None,
            required_scopes: Vec::new(),
            required_assurance_level: None,
            clock_tolerance: Duration::from_secs(DEFAULT_CLOCK_TOLERANCE_SECS),
        }
    }
}

impl ValidationOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    #[must_use]
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    #[must_use]
    pub fn require_scope(mut self, scope: impl Into<String>) -> Self {
        self.required_scopes.push(scope.into());
        self
    }

    #[must_use]
    pub const fn require_assurance(mut self, level: AssuranceLevel) -> Self {
        self.required_assurance_level = Some(level);
        self
    }

    #[must_use]
    pub const fn clock_tolerance(mut self, tolerance: Duration) -> Self {
        self.clock_tolerance = tolerance;
        self
    }
}

/// Why a token failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorCode {
    Malformed,
    Expired,
    InvalidIssuer,
    InvalidAudience,
    InsufficientScope,
    InsufficientAssurance,
    /// Only produced when the signature is actually checked.
    InvalidSignature,
}

impl ValidationErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::Expired => "expired",
            Self::InvalidIssuer => "invalid_issuer",
            Self::InvalidAudience => "invalid_audience",
            Self::InsufficientScope => "insufficient_scope",
            Self::InsufficientAssurance => "insufficient_assurance",
            Self::InvalidSignature => "invalid_signature",
        }
    }
}

impl fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tagged validation outcome. Never an `Err`: routine invalidity is data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<JwtClaims>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ValidationErrorCode>,
}

impl TokenValidation {
    #[must_use]
    pub const fn valid(payload: JwtClaims) -> Self {
        Self { valid: true, payload: Some(payload), error: None, error_code: None }
    }

    #[must_use]
    pub fn invalid(code: ValidationErrorCode, error: impl Into<String>) -> Self {
        Self { valid: false, payload: None, error: Some(error.into()), error_code: Some(code) }
    }
}
