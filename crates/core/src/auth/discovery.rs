//! OIDC discovery and JWKS retrieval with per-client TTL caches
//!
//! A cache entry is replaced whole on a successful fetch and left untouched
//! on failure. Stale entries are never served.

use std::sync::Arc;
use std::time::{Duration, Instant};

use authkit_domain::{AuthError, JsonWebKeySet, OidcDiscoveryDocument, Result};
use parking_lot::Mutex;
use tracing::debug;

use super::http::send;
use super::ports::{HttpRequest, HttpTransport};

struct CacheEntry<T> {
    fetched_at: Instant,
    value: Arc<T>,
}

/// Single-value cache that expires `ttl` after the value was stored.
pub struct TimedCache<T> {
    ttl: Duration,
    slot: Mutex<Option<CacheEntry<T>>>,
}

impl<T> TimedCache<T> {
    pub const fn new(ttl: Duration) -> Self {
        Self { ttl, slot: Mutex::new(None) }
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value if it is younger than the TTL at `now`.
    pub fn get(&self, now: Instant) -> Option<Arc<T>> {
        self.slot
            .lock()
            .as_ref()
            .filter(|entry| now.saturating_duration_since(entry.fetched_at) < self.ttl)
            .map(|entry| Arc::clone(&entry.value))
    }

    pub fn store(&self, value: T, now: Instant) -> Arc<T> {
        let value = Arc::new(value);
        *self.slot.lock() = Some(CacheEntry { fetched_at: now, value: Arc::clone(&value) });
        value
    }

    pub fn invalidate(&self) {
        self.slot.lock().take();
    }
}

impl<T> std::fmt::Debug for TimedCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedCache")
            .field("ttl", &self.ttl)
            .field("populated", &self.slot.lock().is_some())
            .finish()
    }
}

/// GET the discovery document at `url`.
///
/// # Errors
/// Every failure, including transport errors, is `AuthError::Discovery`.
pub async fn fetch_discovery_document<T: HttpTransport + ?Sized>(
    transport: &T,
    url: &str,
) -> Result<OidcDiscoveryDocument> {
    let response = send(transport, HttpRequest::get(url))
        .await
        .map_err(|e| AuthError::Discovery(format!("GET {url} failed: {e}")))?;
    if !response.is_success() {
        return Err(AuthError::Discovery(format!("GET {url} returned {}", response.status)));
    }
    let document: OidcDiscoveryDocument = response
        .json()
        .map_err(|e| AuthError::Discovery(format!("invalid discovery document: {e}")))?;
    debug!(issuer = %document.issuer, jwks_uri = %document.jwks_uri, "discovery document fetched");
    Ok(document)
}

/// GET the key set at `jwks_uri`.
///
/// # Errors
/// Every failure, including transport errors, is `AuthError::Jwks`.
pub async fn fetch_key_set<T: HttpTransport + ?Sized>(
    transport: &T,
    jwks_uri: &str,
) -> Result<JsonWebKeySet> {
    let response = send(transport, HttpRequest::get(jwks_uri))
        .await
        .map_err(|e| AuthError::Jwks(format!("GET {jwks_uri} failed: {e}")))?;
    if !response.is_success() {
        return Err(AuthError::Jwks(format!("GET {jwks_uri} returned {}", response.status)));
    }
    let keys: JsonWebKeySet =
        response.json().map_err(|e| AuthError::Jwks(format!("invalid key set: {e}")))?;
    debug!(keys = keys.keys.len(), "signing keys fetched");
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::auth::ports::{HttpMethod, TransportError};
    use crate::testing::MockTransport;

    #[test]
    fn cache_expires_after_ttl() {
        let cache = TimedCache::new(Duration::from_secs(60));
        let start = Instant::now();
        assert!(cache.get(start).is_none());

        cache.store(7, start);
        assert_eq!(cache.get(start + Duration::from_secs(59)).as_deref(), Some(&7));
        assert!(cache.get(start + Duration::from_secs(60)).is_none());

        cache.store(8, start + Duration::from_secs(60));
        assert_eq!(cache.get(start + Duration::from_secs(61)).as_deref(), Some(&8));

        cache.invalidate();
        assert!(cache.get(start + Duration::from_secs(61)).is_none());
    }

    #[tokio::test]
    async fn discovery_errors_are_discovery_errors() {
        let transport = MockTransport::new();
        let url = "https://id.example.com/.well-known/openid-configuration";

        transport.respond(HttpMethod::Get, url, 500, "oops");
        let err = fetch_discovery_document(&transport, url).await.unwrap_err();
        assert!(matches!(err, AuthError::Discovery(_)));

        let transport = MockTransport::new();
        transport.fail(HttpMethod::Get, url, TransportError::Connect("refused".into()));
        let err = fetch_discovery_document(&transport, url).await.unwrap_err();
        assert!(matches!(err, AuthError::Discovery(msg) if msg.contains("refused")));

        let transport = MockTransport::new();
        transport.respond_json(HttpMethod::Get, url, 200, json!({"issuer": "x"}));
        let err = fetch_discovery_document(&transport, url).await.unwrap_err();
        assert!(matches!(err, AuthError::Discovery(_)));
    }

    #[tokio::test]
    async fn key_set_errors_are_jwks_errors() {
        let transport = MockTransport::new();
        let url = "https://id.example.com/jwks";
        transport.respond(HttpMethod::Get, url, 404, "");
        assert!(matches!(fetch_key_set(&transport, url).await, Err(AuthError::Jwks(_))));

        let transport = MockTransport::new();
        transport.respond_json(HttpMethod::Get, url, 200, json!({"keys": []}));
        assert!(fetch_key_set(&transport, url).await.unwrap().keys.is_empty());
    }
}
