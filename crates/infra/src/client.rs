//! Ready-to-use client wired to the reqwest transport.

use authkit_core::AuthClient;
use authkit_domain::{AuthConfig, AuthError, Result};
use tracing::info;

use crate::config;
use crate::http::ReqwestTransport;

/// [`AuthClient`] backed by [`ReqwestTransport`].
pub type HttpAuthClient = AuthClient<ReqwestTransport>;

/// Build a client for `config`, using its HTTP timeout for every request.
///
/// # Errors
/// Returns `AuthError::Config` if the configuration is invalid or the HTTP
/// client cannot be constructed.
pub fn connect(config: AuthConfig) -> Result<HttpAuthClient> {
    let transport = ReqwestTransport::builder()
        .timeout(config.http_timeout())
        .build()
        .map_err(|e| AuthError::Config(format!("Failed to build HTTP client: {e}")))?;

    info!(issuer = %config.issuer_url, client_id = %config.client_id, "AuthKit client created");
    AuthClient::new(config, transport)
}

/// Load configuration with [`config::load`] and build a client from it.
///
/// # Errors
/// Returns `AuthError::Config` if no usable configuration is found.
pub fn connect_from_env() -> Result<HttpAuthClient> {
    connect(config::load()?)
}
