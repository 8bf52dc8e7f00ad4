//! The `AuthClient` facade
//!
//! One client per issuer/client-id pair. Clones share the same caches,
//! listeners and auto-refresh task.

use std::sync::Arc;

use async_trait::async_trait;
use authkit_common::{Clock, SystemClock};
use authkit_domain::{
    AssuranceLevel, AuthConfig, AuthError, AuthorizationRequest, AuthorizationUrl,
    JsonWebKeySet, OidcDiscoveryDocument, Result, SessionInfo, StepUpDecision, StepUpOptions,
    TokenIntrospection, TokenResponse, TokenTypeHint, TokenValidation, UserInfo,
    ValidationErrorCode, ValidationOptions,
};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

use super::assurance;
use super::authorize_url::build_authorization_url;
use super::discovery::{fetch_discovery_document, fetch_key_set, TimedCache};
use super::http::{expect_json, expect_success, map_error_response, send};
use super::jwt::decode_claims;
use super::ports::{HttpRequest, HttpTransport};
use super::refresh::{
    scheduler, AutoRefreshHandle, AutoRefreshOptions, RefreshListeners, Subscription,
    TokenRefresher,
};
use super::signature::{key_id, verify_signature};
use super::user_context::UserContext;
use super::validator::{validate_claims_at, validate_token_at};

/// `GET /sessions` returns either a wrapped list or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum SessionList {
    Wrapped { sessions: Vec<SessionInfo> },
    Bare(Vec<SessionInfo>),
}

#[derive(Deserialize)]
struct StepUpResponse {
    #[serde(alias = "stepUpUrl")]
    step_up_url: String,
}

struct ClientInner<T: HttpTransport> {
    config: AuthConfig,
    transport: T,
    clock: Arc<dyn Clock>,
    discovery: TimedCache<OidcDiscoveryDocument>,
    jwks: TimedCache<JsonWebKeySet>,
    listeners: Arc<RefreshListeners>,
    auto_refresh: Mutex<Option<AutoRefreshHandle>>,
}

impl<T: HttpTransport> ClientInner<T> {
    fn endpoint(&self, path: &str) -> String {
        self.config.auth_endpoint(path)
    }

    /// Form pairs shared by every grant, with the secret only when configured.
    fn client_credentials_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("client_id".to_string(), self.config.client_id.clone())];
        if let Some(secret) = &self.config.client_secret {
            pairs.push(("client_secret".to_string(), secret.clone()));
        }
        pairs
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        params: Vec<(String, String)>,
    ) -> Result<TokenResponse> {
        let mut pairs = vec![("grant_type".to_string(), grant_type.to_string())];
        pairs.extend(params);
        pairs.extend(self.client_credentials_pairs());

        let request = HttpRequest::post_form(self.endpoint("/token"), pairs);
        let response = send(&self.transport, request).await?;
        let tokens: TokenResponse = expect_json(&response)?;
        info!(grant_type, expires_in = tokens.expires_in, "token grant succeeded");
        Ok(tokens)
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let request = HttpRequest::post_json(
            self.endpoint("/token/refresh"),
            json!({ "refresh_token": refresh_token }),
        );
        let response = send(&self.transport, request).await?;
        expect_json(&response)
    }
}

#[async_trait]
impl<T: HttpTransport> TokenRefresher for ClientInner<T> {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        self.request_refresh(refresh_token).await
    }

    fn publish(&self, tokens: &TokenResponse) {
        self.listeners.notify(tokens);
    }

    fn now_millis(&self) -> u64 {
        self.clock.millis_since_epoch()
    }
}

impl<T: HttpTransport> Drop for ClientInner<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.auto_refresh.get_mut().take() {
            handle.stop();
        }
    }
}

/// Authentication client for one authorization server.
///
/// Generic over the [`HttpTransport`] so the same logic runs against reqwest
/// in production and a scripted transport in tests.
pub struct AuthClient<T: HttpTransport> {
    inner: Arc<ClientInner<T>>,
}

impl<T: HttpTransport> Clone for AuthClient<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: HttpTransport> std::fmt::Debug for AuthClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClient")
            .field("issuer_url", &self.inner.config.issuer_url)
            .field("client_id", &self.inner.config.client_id)
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> AuthClient<T> {
    /// Create a client using the system clock.
    ///
    /// # Errors
    /// Returns `AuthError::Config` if the configuration is invalid.
    pub fn new(config: AuthConfig, transport: T) -> Result<Self> {
        Self::with_clock(config, transport, Arc::new(SystemClock))
    }

    /// Create a client reading time from `clock`.
    ///
    /// # Errors
    /// Returns `AuthError::Config` if the configuration is invalid.
    pub fn with_clock(config: AuthConfig, transport: T, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let ttl = config.discovery_cache_ttl();
        debug!(issuer = %config.issuer_url, client_id = %config.client_id, "auth client created");
        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                transport,
                clock,
                discovery: TimedCache::new(ttl),
                jwks: TimedCache::new(ttl),
                listeners: RefreshListeners::new(),
                auto_refresh: Mutex::new(None),
            }),
        })
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &AuthConfig {
        &self.inner.config
    }

    /// Underlying HTTP transport.
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    // ---------------------------------------------------------------------
    // Authorization code flow
    // ---------------------------------------------------------------------

    /// Build the authorize URL with a fresh PKCE pair. The caller keeps the
    /// returned verifier and state for [`exchange_code`](Self::exchange_code).
    ///
    /// # Errors
    /// Returns `AuthError::Config` when no redirect URI is available.
    pub fn build_authorization_url(
        &self,
        request: AuthorizationRequest,
    ) -> Result<AuthorizationUrl> {
        build_authorization_url(&self.inner.config, request)
    }

    /// # Errors
    /// Returns `AuthError::Config` when no redirect URI is available, or the
    /// mapped server error.
    #[instrument(skip_all)]
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: Option<&str>,
    ) -> Result<TokenResponse> {
        let redirect_uri = redirect_uri
            .map(str::to_string)
            .or_else(|| self.inner.config.redirect_uri.clone())
            .ok_or_else(|| {
                AuthError::Config("redirect_uri is required to exchange a code".to_string())
            })?;
        self.inner
            .token_grant(
                "authorization_code",
                vec![
                    ("code".to_string(), code.to_string()),
                    ("code_verifier".to_string(), code_verifier.to_string()),
                    ("redirect_uri".to_string(), redirect_uri),
                ],
            )
            .await
    }

    // ---------------------------------------------------------------------
    // Direct grants
    // ---------------------------------------------------------------------

    /// Resource-owner password grant.
    ///
    /// # Errors
    /// Returns `AuthError::Unauthorized` for bad credentials, otherwise the
    /// mapped server or network error.
    #[instrument(skip_all)]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        scope: Option<&str>,
    ) -> Result<TokenResponse> {
        let scope = scope.unwrap_or(&self.inner.config.default_scope);
        self.inner
            .token_grant(
                "password",
                vec![
                    ("username".to_string(), username.to_string()),
                    ("password".to_string(), password.to_string()),
                    ("scope".to_string(), scope.to_string()),
                ],
            )
            .await
    }

    /// # Errors
    /// Returns `AuthError::Config` when no client secret is configured.
    #[instrument(skip_all)]
    pub async fn client_credentials(&self, scope: Option<&str>) -> Result<TokenResponse> {
        if self.inner.config.client_secret.is_none() {
            return Err(AuthError::Config(
                "client_credentials requires a client_secret".to_string(),
            ));
        }
        let params = scope.map(|s| vec![("scope".to_string(), s.to_string())]).unwrap_or_default();
        self.inner.token_grant("client_credentials", params).await
    }

    // ---------------------------------------------------------------------
    // Token lifecycle
    // ---------------------------------------------------------------------

    /// Exchange a refresh token and notify every refresh listener.
    ///
    /// # Errors
    /// Returns the mapped server or network error. Listeners are not called
    /// on failure.
    #[instrument(skip_all)]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let tokens = self.inner.request_refresh(refresh_token).await?;
        info!(expires_in = tokens.expires_in, "token refreshed");
        self.inner.listeners.notify(&tokens);
        Ok(tokens)
    }

    /// Revoke `token`, authorized by `access_token`.
    ///
    /// # Errors
    /// Returns the mapped server or network error.
    #[instrument(skip_all, fields(hint = %hint))]
    pub async fn revoke_token(
        &self,
        access_token: &str,
        token: &str,
        hint: TokenTypeHint,
    ) -> Result<()> {
        let request = HttpRequest::post_json(
            self.inner.endpoint("/token/revoke"),
            json!({ "token": token, "token_type_hint": hint.as_str() }),
        )
        .bearer(access_token);
        expect_success(&send(&self.inner.transport, request).await?)?;
        info!("token revoked");
        Ok(())
    }

    /// # Errors
    /// Returns the mapped server or network error.
    pub async fn introspect_token(
        &self,
        access_token: &str,
        token: &str,
    ) -> Result<TokenIntrospection> {
        let request = HttpRequest::post_json(
            self.inner.endpoint("/token/introspect"),
            json!({ "token": token }),
        )
                .bearer(access_token);
        expect_json(&send(&self.inner.transport, request).await?)
    }

    // ---------------------------------------------------------------------
    // User and sessions
    // ---------------------------------------------------------------------

    /// # Errors
    /// Returns the mapped server or network error.
    pub async fn get_user_info(&self, access_token: &str) -> Result<UserInfo> {
        let request = HttpRequest::get(self.inner.endpoint("/userinfo")).bearer(access_token);
        expect_json(&send(&self.inner.transport, request).await?)
    }

    /// # Errors
    /// Returns the mapped server or network error.
    pub async fn list_sessions(&self, access_token: &str) -> Result<Vec<SessionInfo>> {
        let request = HttpRequest::get(self.inner.endpoint("/sessions")).bearer(access_token);
        let list: SessionList = expect_json(&send(&self.inner.transport, request).await?)?;
        Ok(match list {
            SessionList::Wrapped { sessions } | SessionList::Bare(sessions) => sessions,
        })
    }

    /// # Errors
    /// Returns the mapped server or network error.
    pub async fn revoke_session(&self, access_token: &str, session_id: &str) -> Result<()> {
        let url = self
            .inner
            .endpoint(&format!("/sessions/{}", urlencoding::encode(session_id)));
        let request = HttpRequest::delete(url).bearer(access_token);
        expect_success(&send(&self.inner.transport, request).await?)?;
        info!(session_id, "session revoked");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Discovery and keys
    // ---------------------------------------------------------------------

    /// The issuer's discovery document, cached for the configured TTL.
    ///
    /// # Errors
    /// Returns `AuthError::Discovery`; the cache is left untouched.
    pub async fn discover(&self, force_refresh: bool) -> Result<Arc<OidcDiscoveryDocument>> {
        let inner = &self.inner;
        if !force_refresh {
            if let Some(document) = inner.discovery.get(inner.clock.now()) {
                return Ok(document);
            }
        }
        let document =
            fetch_discovery_document(&inner.transport, &inner.config.discovery_url()).await?;
        Ok(inner.discovery.store(document, inner.clock.now()))
    }

    /// The issuer's signing keys, cached for the configured TTL.
    ///
    /// # Errors
    /// Returns `AuthError::Discovery` if `jwks_uri` cannot be resolved and
    /// `AuthError::Jwks` if the key set cannot be fetched.
    pub async fn get_signing_keys(&self, force_refresh: bool) -> Result<Arc<JsonWebKeySet>> {
        let inner = &self.inner;
        if !force_refresh {
            if let Some(keys) = inner.jwks.get(inner.clock.now()) {
                return Ok(keys);
            }
        }
        let document = self.discover(false).await?;
        let keys = fetch_key_set(&inner.transport, &document.jwks_uri).await?;
        Ok(inner.jwks.store(keys, inner.clock.now()))
    }

    // ---------------------------------------------------------------------
    // Validation
    // ---------------------------------------------------------------------

    /// Validate claims without checking the signature. Never fails; see
    /// [`validate_token_at`] for the order of checks.
    pub fn validate_token(&self, token: &str, options: &ValidationOptions) -> TokenValidation {
        validate_token_at(token, options, self.inner.clock.unix_secs())
    }

    /// Verify the signature against the issuer's keys, then validate claims.
    ///
    /// An unknown `kid` triggers one forced key refresh before giving up.
    ///
    /// # Errors
    /// Returns `AuthError::Discovery` or `AuthError::Jwks` when the keys
    /// cannot be obtained. Invalid tokens are reported in the result.
    pub async fn verify_token(
        &self,
        token: &str,
        options: &ValidationOptions,
    ) -> Result<TokenValidation> {
        let claims = match decode_claims(token) {
            Ok(claims) => claims,
            Err(err) => {
                return Ok(TokenValidation::invalid(
                    ValidationErrorCode::Malformed,
                    format!("Token could not be decoded: {err}"),
                ))
            }
        };
        let kid = match key_id(token) {
            Ok(kid) => kid,
            Err(err) => {
                return Ok(TokenValidation::invalid(
                    ValidationErrorCode::InvalidSignature,
                    err.to_string(),
                ))
            }
        };

        let mut keys = self.get_signing_keys(false).await?;
        if let Some(kid) = kid.as_deref() {
            if keys.find(kid).is_none() {
                debug!(kid, "unknown signing key; refreshing key set");
                keys = self.get_signing_keys(true).await?;
            }
        }

        if let Err(err) = verify_signature(token, &keys) {
            warn!(error = %err, sub = %claims.sub, "token signature rejected");
            return Ok(TokenValidation::invalid(
                ValidationErrorCode::InvalidSignature,
                err.to_string(),
            ));
        }
        Ok(validate_claims_at(claims, options, self.inner.clock.unix_secs()))
    }

    /// Identity view of a token that passes default validation.
    ///
    /// # Errors
    /// Returns `AuthError::TokenExpired` for expired tokens and
    /// `AuthError::InvalidToken` for any other failure.
    pub fn get_user_context(&self, token: &str) -> Result<UserContext> {
        let validation = self.validate_token(token, &ValidationOptions::default());
        match (validation.payload, validation.error_code) {
            (Some(claims), None) => Ok(UserContext::from(claims)),
            (_, Some(ValidationErrorCode::Expired)) => Err(AuthError::TokenExpired),
            (_, _) => Err(AuthError::InvalidToken(
                validation.error.unwrap_or_else(|| "token is not valid".to_string()),
            )),
        }
    }

    // ---------------------------------------------------------------------
    // Assurance and step-up
    // ---------------------------------------------------------------------

    /// # Errors
    /// Returns `AuthError::InvalidToken` if the token cannot be decoded.
    pub fn get_assurance_level(&self, token: &str) -> Result<AssuranceLevel> {
        assurance::assurance_level(token)
    }

    /// # Errors
    /// Returns `AuthError::StepUpRequired` when the token's level is below
    /// `target`.
    pub fn ensure_assurance(&self, token: &str, target: AssuranceLevel) -> Result<AssuranceLevel> {
        assurance::ensure_assurance(token, target)
    }

    /// Check `token` against `target`, asking the server for a step-up URL
    /// only when the current level is too low.
    ///
    /// # Errors
    /// - `AuthError::InvalidToken` if the token cannot be decoded or the
    ///   server answers 401
    /// - the mapped server or network error otherwise
    #[instrument(skip_all, fields(target = %target))]
    pub async fn require_step_up(
        &self,
        token: &str,
        target: AssuranceLevel,
        options: StepUpOptions,
    ) -> Result<StepUpDecision> {
        let current = assurance::assurance_level(token)?;
        if current.satisfies(target) {
            return Ok(StepUpDecision::Satisfied {
                current_level: current,
                target_level: target,
                access_token: token.to_string(),
            });
        }

        let mut body = json!({ "target_level": target.as_str() });
        if let Some(reason) = options.reason {
            body["reason"] = Value::String(reason);
        }
        let redirect_uri =
            options.redirect_uri.or_else(|| self.inner.config.redirect_uri.clone());
        if let Some(redirect_uri) = redirect_uri {
            body["redirect_uri"] = Value::String(redirect_uri);
        }

        let request = HttpRequest::post_json(self.inner.endpoint("/step-up"), body).bearer(token);
        let response = send(&self.inner.transport, request).await?;
        if response.status == 401 {
            return Err(AuthError::InvalidToken(map_error_response(&response).to_string()));
        }
        let StepUpResponse { step_up_url } = expect_json(&response)?;
        info!(current = %current, "step-up required");
        Ok(StepUpDecision::Required { current_level: current, target_level: target, step_up_url })
    }

    // ---------------------------------------------------------------------
    // Auto-refresh
    // ---------------------------------------------------------------------

    /// Options seeded from this client's configured refresh defaults.
    pub fn auto_refresh_options(&self, refresh_token: impl Into<String>) -> AutoRefreshOptions {
        AutoRefreshOptions::from_config(refresh_token, &self.inner.config.auto_refresh)
    }

    /// Keep `access_token` fresh in the background, replacing any previous
    /// auto-refresh on this client.
    ///
    /// # Errors
    /// - `AuthError::InvalidToken` if the token has no decodable `exp`
    /// - `AuthError::Config` when called outside a Tokio runtime
    pub fn enable_auto_refresh(
        &self,
        access_token: &str,
        options: AutoRefreshOptions,
    ) -> Result<AutoRefreshHandle> {
        let mut slot = self.inner.auto_refresh.lock();
        if let Some(previous) = slot.take() {
            previous.stop();
        }
        let handle = scheduler::start(&self.inner, access_token, options)?;
        *slot = Some(handle.clone());
        Ok(handle)
    }

    /// Stop the running auto-refresh loop, if any.
    pub fn disable_auto_refresh(&self) {
        if let Some(handle) = self.inner.auto_refresh.lock().take() {
            handle.stop();
            info!("auto-refresh disabled");
        }
    }

    /// Whether an auto-refresh loop is currently scheduled.
    pub fn is_auto_refresh_active(&self) -> bool {
        self.inner.auto_refresh.lock().as_ref().is_some_and(AutoRefreshHandle::is_active)
    }

    /// Register `callback` for every successful refresh, manual or automatic.
    pub fn on_token_refresh(
        &self,
        callback: impl Fn(&TokenResponse) + Send + Sync + 'static,
    ) -> Subscription {
        self.inner.listeners.subscribe(Arc::new(callback))
    }
}
