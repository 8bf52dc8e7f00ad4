//! Auto-refresh options

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use authkit_domain::constants::{DEFAULT_REFRESH_BEFORE_EXPIRY_SECS, DEFAULT_REFRESH_MAX_RETRIES};
use authkit_domain::{AuthError, AutoRefreshConfig, TokenResponse};

use super::listeners::RefreshCallback;

/// Callback invoked once when auto-refresh gives up.
pub type ErrorCallback = Arc<dyn Fn(&AuthError) + Send + Sync>;

/// Settings for one auto-refresh loop.
#[derive(Clone)]
pub struct AutoRefreshOptions {
    /// Refresh token used for the first refresh.
    pub refresh_token: String,
    /// How long before `exp` to refresh.
    pub refresh_before_expiry: Duration,
    /// Retries after the first failed attempt before giving up.
    pub max_retries: u32,
    pub on_refresh: Option<RefreshCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl AutoRefreshOptions {
    /// Options with the default lead time and retry count.
    pub fn new(refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            refresh_before_expiry: Duration::from_secs(DEFAULT_REFRESH_BEFORE_EXPIRY_SECS),
            max_retries: DEFAULT_REFRESH_MAX_RETRIES,
            on_refresh: None,
            on_error: None,
        }
    }

    /// Options seeded from a client's configured defaults.
    pub fn from_config(refresh_token: impl Into<String>, config: &AutoRefreshConfig) -> Self {
        Self::new(refresh_token)
            .refresh_before_expiry(Duration::from_secs(config.refresh_before_expiry_secs))
            .max_retries(config.max_retries)
    }

    #[must_use]
    pub const fn refresh_before_expiry(mut self, lead: Duration) -> Self {
        self.refresh_before_expiry = lead;
        self
    }

    #[must_use]
    pub const fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn on_refresh(mut self, callback: impl Fn(&TokenResponse) + Send + Sync + 'static) -> Self {
        self.on_refresh = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn on_error(mut self, callback: impl Fn(&AuthError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for AutoRefreshOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoRefreshOptions")
            .field("refresh_token", &"<redacted>")
            .field("refresh_before_expiry", &self.refresh_before_expiry)
            .field("max_retries", &self.max_retries)
            .field("on_refresh", &self.on_refresh.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
