//! Domain-level constants shared by the client and its configuration.

/// Scope requested when the caller does not supply one.
pub const DEFAULT_SCOPE: &str = "openid profile email";

/// Path prefix of the auth API below the issuer URL.
pub const DEFAULT_AUTH_PATH: &str = "/auth";

/// Path of the OIDC discovery document below the issuer URL.
pub const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";

pub const DEFAULT_DISCOVERY_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CLOCK_TOLERANCE_SECS: u64 = 30;

// Auto-refresh defaults
pub const DEFAULT_REFRESH_BEFORE_EXPIRY_SECS: u64 = 60;
pub const DEFAULT_REFRESH_MAX_RETRIES: u32 = 3;
pub const REFRESH_BACKOFF_INITIAL_MS: u64 = 1000;
pub const REFRESH_BACKOFF_MAX_MS: u64 = 30_000;

// PKCE (RFC 7636 section 4.1)
pub const PKCE_VERIFIER_MIN_LEN: usize = 43;
pub const PKCE_VERIFIER_MAX_LEN: usize = 128;
pub const PKCE_DEFAULT_VERIFIER_LEN: usize = 64;
pub const PKCE_CHALLENGE_METHOD: &str = "S256";
