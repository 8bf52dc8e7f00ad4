//! Unsigned JWT builder for tests

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Map, Value};

/// Builds compact JWTs with `alg: none` and a placeholder signature.
///
/// The decoder never checks signatures, so these are enough for anything
/// except `verify_token`.
#[derive(Debug, Clone)]
pub struct TestTokenBuilder {
    claims: Map<String, Value>,
}

impl TestTokenBuilder {
    pub fn new(sub: &str) -> Self {
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!(sub));
        Self { claims }
    }

    #[must_use]
    pub fn claim(mut self, key: &str, value: Value) -> Self {
        self.claims.insert(key.to_string(), value);
        self
    }

    #[must_use]
    pub fn expires_at(self, exp: i64) -> Self {
        self.claim("exp", json!(exp))
    }

    #[must_use]
    pub fn issued_at(self, iat: i64) -> Self {
        self.claim("iat", json!(iat))
    }

    #[must_use]
    pub fn issuer(self, iss: &str) -> Self {
        self.claim("iss", json!(iss))
    }

    #[must_use]
    pub fn audience<I, S>(self, audiences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let audiences: Vec<String> = audiences.into_iter().map(Into::into).collect();
        self.claim("aud", json!(audiences))
    }

    #[must_use]
    pub fn scope(self, scope: &str) -> Self {
        self.claim("scope", json!(scope))
    }

    #[must_use]
    pub fn acr(self, acr: &str) -> Self {
        self.claim("acr", json!(acr))
    }

    #[must_use]
    pub fn email(self, email: &str) -> Self {
        self.claim("email", json!(email))
    }

    #[must_use]
    pub fn roles(self, roles: &[&str]) -> Self {
        self.claim("roles", json!(roles))
    }

    #[must_use]
    pub fn permissions(self, permissions: &[&str]) -> Self {
        self.claim("permissions", json!(permissions))
    }

    /// The claims object as it will be encoded.
    pub fn claims(&self) -> Value {
        Value::Object(self.claims.clone())
    }

    pub fn build(&self) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(self.claims().to_string());
        format!("{header}.{payload}.unsigned")
    }
}
