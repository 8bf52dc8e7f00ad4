//! Client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_AUTH_PATH, DEFAULT_DISCOVERY_CACHE_TTL_SECS, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_REFRESH_BEFORE_EXPIRY_SECS, DEFAULT_REFRESH_MAX_RETRIES, DEFAULT_SCOPE,
    DISCOVERY_PATH,
};
use crate::errors::{AuthError, Result};

/// Configuration for an `AuthClient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base URL of the issuer, e.g. `https://id.example.com`.
    pub issuer_url: String,
    pub client_id: String,
    #[serde(default, skip_serializing)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default = "default_scope")]
    pub default_scope: String,
    /// Prefix of the auth API below the issuer.
    #[serde(default = "default_auth_path")]
    pub auth_path: String,
    #[serde(default = "default_discovery_ttl")]
    pub discovery_cache_ttl_secs: u64,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default)]
    pub auto_refresh: AutoRefreshConfig,
}

/// Defaults applied by `enable_auto_refresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoRefreshConfig {
    #[serde(default = "default_refresh_before_expiry")]
    pub refresh_before_expiry_secs: u64,
    #[serde(default = "default_refresh_max_retries")]
    pub max_retries: u32,
}

impl Default for AutoRefreshConfig {
    fn default() -> Self {
        Self {
            refresh_before_expiry_secs: DEFAULT_REFRESH_BEFORE_EXPIRY_SECS,
            max_retries: DEFAULT_REFRESH_MAX_RETRIES,
        }
    }
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_auth_path() -> String {
    DEFAULT_AUTH_PATH.to_string()
}

const fn default_discovery_ttl() -> u64 {
    DEFAULT_DISCOVERY_CACHE_TTL_SECS
}

const fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

const fn default_refresh_before_expiry() -> u64 {
    DEFAULT_REFRESH_BEFORE_EXPIRY_SECS
}

const fn default_refresh_max_retries() -> u32 {
    DEFAULT_REFRESH_MAX_RETRIES
}

impl AuthConfig {
    pub fn new(issuer_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            issuer_url: issuer_url.into(),
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: None,
            default_scope: default_scope(),
            auth_path: default_auth_path(),
            discovery_cache_ttl_secs: DEFAULT_DISCOVERY_CACHE_TTL_SECS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            auto_refresh: AutoRefreshConfig::default(),
        }
    }

    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    #[must_use]
    pub fn with_default_scope(mut self, scope: impl Into<String>) -> Self {
        self.default_scope = scope.into();
        self
    }

    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.auth_path = path.into();
        self
    }

    #[must_use]
    pub const fn with_discovery_cache_ttl(mut self, ttl: Duration) -> Self {
        self.discovery_cache_ttl_secs = ttl.as_secs();
        self
    }

    #[must_use]
    pub const fn discovery_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.discovery_cache_ttl_secs)
    }

    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    fn issuer(&self) -> &str {
        self.issuer_url.trim_end_matches('/')
    }

    /// Absolute URL of an auth API endpoint, e.g. `auth_endpoint("/token")`.
    #[must_use]
    pub fn auth_endpoint(&self, path: &str) -> String {
        let prefix = self.auth_path.trim_end_matches('/');
        let prefix = if prefix.is_empty() || prefix.starts_with('/') {
            prefix.to_string()
        } else {
            format!("/{prefix}")
        };
        format!("{}{prefix}{path}", self.issuer())
    }

    #[must_use]
    pub fn discovery_url(&self) -> String {
        format!("{}{DISCOVERY_PATH}", self.issuer())
    }

    #[must_use]
    pub fn authorization_endpoint(&self) -> String {
        self.auth_endpoint("/authorize")
    }

    /// Check the configuration is usable before any request is made.
    ///
    /// # Errors
    /// Returns `AuthError::Config` if the issuer URL is not an absolute
    /// http(s) URL or the client id is empty.
    pub fn validate(&self) -> Result<()> {
        let issuer = Url::parse(&self.issuer_url)
            .map_err(|e| AuthError::Config(format!("Invalid issuer URL: {e}")))?;
        if !matches!(issuer.scheme(), "http" | "https") {
            return Err(AuthError::Config(format!(
                "Issuer URL must use http or https, got {}",
                issuer.scheme()
            )));
        }
        if self.client_id.trim().is_empty() {
            return Err(AuthError::Config("client_id must not be empty".to_string()));
        }
        if let Some(redirect_uri) = &self.redirect_uri {
            Url::parse(redirect_uri)
                .map_err(|e| AuthError::Config(format!("Invalid redirect URI: {e}")))?;
        }
        Ok(())
    }
}
