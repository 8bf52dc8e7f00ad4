//! End-to-end authorization-code flow against a scripted transport:
//! authorize URL, code exchange, signature verification and the resulting
//! user context.

mod support;

use authkit_core::auth::{generate_code_challenge, validate_state};
use authkit_core::testing::MockTransport;
use authkit_core::{Grants, HttpMethod, RequestBody};
use authkit_domain::{
    AssuranceLevel, AuthError, AuthorizationRequest, ValidationErrorCode, ValidationOptions,
};
use serde_json::json;
use support::{auth_url, client, jwks_url, publish_keys, sign, CLIENT_ID, ISSUER, KID, NOW};

fn claims(exp: u64) -> serde_json::Value {
    json!({
        "sub": "user-42",
        "iss": ISSUER,
        "aud": CLIENT_ID,
        "exp": exp,
        "iat": NOW,
        "scope": "openid profile email",
        "acr": "aal2",
        "email": "ada@example.com",
        "roles": ["manager"],
        "permissions": ["reports:*", "users:read"]
    })
}

fn query_param<'a>(url: &'a str, key: &str) -> Option<&'a str> {
    url.split_once('?')?
        .1
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

#[tokio::test]
async fn authorization_code_flow_end_to_end() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    let client = client(&transport);

    let authorization = client.build_authorization_url(
        AuthorizationRequest::new().login_hint("ada@example.com").acr_values("aal2"),
    )?;
    assert!(authorization.url.starts_with(&auth_url("/authorize?response_type=code&")));
    assert_eq!(
        query_param(&authorization.url, "code_challenge"),
        Some(generate_code_challenge(&authorization.pkce.code_verifier).as_str())
    );
    assert_eq!(query_param(&authorization.url, "state"), Some(authorization.state.as_str()));

    // The browser comes back with the same state.
    assert!(validate_state(&authorization.state, &authorization.state));

    let access_token = sign(&claims(NOW + 3600), Some(KID));
    transport.respond_json(
        HttpMethod::Post,
        &auth_url("/token"),
        200,
        json!({
            "access_token": access_token,
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "rt-1"
        }),
    );
    publish_keys(&transport, KID);

    let tokens = client
        .exchange_code("auth-code", &authorization.pkce.code_verifier, None)
        .await?;
    let sent = transport
        .last_request(HttpMethod::Post, &auth_url("/token"))
        .expect("token request sent");
    let Some(RequestBody::Form(pairs)) = sent.body else {
        panic!("token request must be form encoded");
    };
    let verifier = ("code_verifier".to_string(), authorization.pkce.code_verifier.clone());
    assert!(pairs.contains(&verifier));

    let options = ValidationOptions::new()
        .issuer(ISSUER)
        .audience(CLIENT_ID)
        .require_scope("profile")
        .require_assurance(AssuranceLevel::Aal2);
    let verified = client.verify_token(&tokens.access_token, &options).await?;
    assert!(verified.valid, "unexpected failure: {:?}", verified.error);

    let context = client.get_user_context(&tokens.access_token)?;
    assert_eq!(context.user_id, "user-42");
    assert!(context.has_permission("reports:export"));
    assert!(context.has_permission("users:read:self"));
    assert!(!context.has_permission("users:delete"));
    assert_eq!(client.get_assurance_level(&tokens.access_token)?, AssuranceLevel::Aal2);
    Ok(())
}

#[tokio::test]
async fn keys_are_cached_between_verifications() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    let client = client(&transport);
    publish_keys(&transport, KID);
    let token = sign(&claims(NOW + 3600), Some(KID));

    for _ in 0..3 {
        assert!(client.verify_token(&token, &ValidationOptions::default()).await?.valid);
    }
    assert_eq!(transport.request_count(HttpMethod::Get, &jwks_url()), 1);
    Ok(())
}

#[tokio::test]
async fn unknown_kid_forces_one_key_refresh() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    let client = client(&transport);
    // First fetch returns the old key id, the refresh returns the rotated one.
    publish_keys(&transport, "old");
    transport.respond_json(HttpMethod::Get, &jwks_url(), 200, support::jwks("rotated"));

    let token = sign(&claims(NOW + 3600), Some("rotated"));
    let result = client.verify_token(&token, &ValidationOptions::default()).await?;
    assert!(result.valid);
    assert_eq!(transport.request_count(HttpMethod::Get, &jwks_url()), 2);

    let unknown = sign(&claims(NOW + 3600), Some("never-published"));
    let result = client.verify_token(&unknown, &ValidationOptions::default()).await?;
    assert_eq!(result.error_code, Some(ValidationErrorCode::InvalidSignature));
    assert_eq!(transport.request_count(HttpMethod::Get, &jwks_url()), 3);
    Ok(())
}

#[tokio::test]
async fn tampered_and_expired_tokens_are_rejected() -> anyhow::Result<()> {
    let transport = MockTransport::new();
    let client = client(&transport);
    publish_keys(&transport, KID);

    let token = sign(&claims(NOW + 3600), Some(KID));
    let (header_and_payload, _) = token.rsplit_once('.').expect("three segments");
    let forged_payload = {
        use base64::Engine;
        let mut forged = claims(NOW + 3600);
        forged["permissions"] = json!(["*"]);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(forged.to_string())
    };
    let (header, _) = header_and_payload.split_once('.').expect("header");
    let signature = token.rsplit('.').next().expect("signature");
    let tampered = format!("{header}.{forged_payload}.{signature}");

    let result = client.verify_token(&tampered, &ValidationOptions::default()).await?;
    assert_eq!(result.error_code, Some(ValidationErrorCode::InvalidSignature));

    let expired = sign(&claims(NOW - 3600), Some(KID));
    let result = client.verify_token(&expired, &ValidationOptions::default()).await?;
    assert_eq!(result.error_code, Some(ValidationErrorCode::Expired));
    assert_eq!(client.get_user_context(&expired).unwrap_err(), AuthError::TokenExpired);
    Ok(())
}

#[tokio::test]
async fn key_fetch_failures_surface_as_errors() {
    let transport = MockTransport::new();
    let client = client(&transport);
    transport.respond(HttpMethod::Get, &support::discovery_url(), 503, "");

    let token = sign(&claims(NOW + 3600), Some(KID));
    let err = client
        .verify_token(&token, &ValidationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Discovery(_)));
}
