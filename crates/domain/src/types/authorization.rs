//! Authorization-code flow request types

use serde::{Deserialize, Serialize};

/// PKCE verifier/challenge pair (RFC 7636).
///
/// The verifier is a secret the caller keeps across the redirect and hands
/// back to `exchange_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkceChallenge {
    pub code_verifier: String,
    pub code_challenge: String,
    /// Always `"S256"`.
    pub code_challenge_method: String,
}

/// Caller-supplied inputs for building an authorization URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Overrides the configured redirect URI.
    pub redirect_uri: Option<String>,
    /// Overrides the configured default scope.
    pub scope: Option<String>,
    /// Generated when absent.
    pub state: Option<String>,
    pub login_hint: Option<String>,
    /// Upstream identity provider, sent as `connection`.
    pub connection: Option<String>,
    pub acr_values: Option<String>,
    /// Appended after the standard parameters, in insertion order.
    pub extra_params: Vec<(String, String)>,
}

impl AuthorizationRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    #[must_use]
    pub fn login_hint(mut self, login_hint: impl Into<String>) -> Self {
        self.login_hint = Some(login_hint.into());
        self
    }

    #[must_use]
    pub fn connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    #[must_use]
    pub fn acr_values(mut self, acr_values: impl Into<String>) -> Self {
        self.acr_values = Some(acr_values.into());
        self
    }

    #[must_use]
    pub fn extra_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params.push((key.into(), value.into()));
        self
    }
}

/// A ready-to-redirect authorization URL plus the secrets needed to finish
/// the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationUrl {
    pub url: String,
    pub pkce: PkceChallenge,
    pub state: String,
}
