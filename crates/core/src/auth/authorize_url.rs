//! Authorization URL construction for the authorization-code + PKCE flow

use authkit_domain::constants::PKCE_CHALLENGE_METHOD;
use authkit_domain::{AuthConfig, AuthError, AuthorizationRequest, AuthorizationUrl, Result};

use super::pkce::{generate_pkce_challenge, generate_state};

/// Build the URL to send the user to, with a fresh PKCE pair.
///
/// Parameters are emitted in a fixed order: `response_type`, `client_id`,
/// `redirect_uri`, `scope`, `state`, `code_challenge`,
/// `code_challenge_method`, then `login_hint`, `connection`, `acr_values`
/// when set, then the request's extra parameters in insertion order.
///
/// # Errors
/// Returns `AuthError::Config` if neither the request nor the config names
/// a redirect URI.
pub fn build_authorization_url(
    config: &AuthConfig,
    request: AuthorizationRequest,
) -> Result<AuthorizationUrl> {
    let redirect_uri = request
        .redirect_uri
        .or_else(|| config.redirect_uri.clone())
        .ok_or_else(|| AuthError::Config("redirect_uri is required".to_string()))?;
    let scope = request.scope.unwrap_or_else(|| config.default_scope.clone());
    let state = request.state.unwrap_or_else(generate_state);
    let pkce = generate_pkce_challenge();

    let mut params = vec![
        ("response_type".to_string(), "code".to_string()),
        ("client_id".to_string(), config.client_id.clone()),
        ("redirect_uri".to_string(), redirect_uri),
        ("scope".to_string(), scope),
        ("state".to_string(), state.clone()),
        ("code_challenge".to_string(), pkce.code_challenge.clone()),
        ("code_challenge_method".to_string(), PKCE_CHALLENGE_METHOD.to_string()),
    ];

    let optional = [
        ("login_hint", request.login_hint),
        ("connection", request.connection),
        ("acr_values", request.acr_values),
    ];
    params.extend(
        optional.into_iter().filter_map(|(key, value)| value.map(|v| (key.to_string(), v))),
    );
    params.extend(request.extra_params);

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let url = format!("{}?{}", config.authorization_endpoint(), query_string);

    Ok(AuthorizationUrl { url, pkce, state })
}
