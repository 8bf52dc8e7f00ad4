//! Background refresh of an access token ahead of its expiry
//!
//! One spawned task per enabled client runs an explicit loop:
//! sleep until the refresh point, refresh, then either reschedule from the
//! new token or back off and retry. The task holds only a [`Weak`] handle to
//! its refresher, so it ends on its own once the client is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use authkit_common::BackoffStrategy;
use authkit_domain::constants::{REFRESH_BACKOFF_INITIAL_MS, REFRESH_BACKOFF_MAX_MS};
use authkit_domain::{AuthError, Result, TokenResponse};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::listeners::call_guarded;
use super::options::AutoRefreshOptions;
use crate::auth::jwt::{decode_claims, expiry_of};

/// What the scheduler needs from the client.
#[async_trait]
pub trait TokenRefresher: Send + Sync + 'static {
    /// Exchange `refresh_token` for new tokens, without notifying listeners.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse>;

    /// Notify registered refresh listeners.
    fn publish(&self, tokens: &TokenResponse);

    fn now_millis(&self) -> u64;
}

/// Control handle for a running auto-refresh task.
#[derive(Debug, Clone)]
pub struct AutoRefreshHandle {
    cancel: CancellationToken,
    active: Arc<AtomicBool>,
}

impl AutoRefreshHandle {
    fn new() -> Self {
        Self { cancel: CancellationToken::new(), active: Arc::new(AtomicBool::new(true)) }
    }

    /// Stop refreshing. Idempotent; a refresh already in flight completes
    /// but none of its callbacks run.
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.cancel.cancel();
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Milliseconds until `before` ahead of `exp_secs`, floored at zero.
#[must_use]
pub fn delay_until_refresh(exp_secs: i64, now_millis: u64, before: Duration) -> Duration {
    let target = i128::from(exp_secs) * 1000 - i128::from(now_millis) - before.as_millis() as i128;
    Duration::from_millis(u64::try_from(target.max(0)).unwrap_or(u64::MAX))
}

fn next_delay(tokens: &TokenResponse, now_millis: u64, before: Duration) -> Duration {
    match expiry_of(&tokens.access_token) {
        Some(exp) => delay_until_refresh(exp, now_millis, before),
        None => Duration::from_secs(tokens.expires_in).saturating_sub(before),
    }
}

/// Spawn the refresh loop for `access_token`.
///
/// # Errors
/// - `AuthError::InvalidToken` if the token cannot be decoded or has no `exp`
/// - `AuthError::Config` when called outside a Tokio runtime
pub fn start<R: TokenRefresher>(
    refresher: &Arc<R>,
    access_token: &str,
    options: AutoRefreshOptions,
) -> Result<AutoRefreshHandle> {
    let exp = decode_claims(access_token)?
        .exp
        .ok_or_else(|| AuthError::InvalidToken("access token has no exp claim".to_string()))?;
    let runtime = Handle::try_current()
        .map_err(|_| AuthError::Config("auto-refresh requires a Tokio runtime".to_string()))?;

    let first_delay =
        delay_until_refresh(exp, refresher.now_millis(), options.refresh_before_expiry);
    let handle = AutoRefreshHandle::new();
    info!(delay_ms = first_delay.as_millis() as u64, "auto-refresh scheduled");

    runtime.spawn(run(Arc::downgrade(refresher), options, first_delay, handle.clone()));
    Ok(handle)
}

async fn run<R: TokenRefresher>(
    refresher: Weak<R>,
    options: AutoRefreshOptions,
    first_delay: Duration,
    handle: AutoRefreshHandle,
) {
    let backoff = BackoffStrategy::doubling(
        Duration::from_millis(REFRESH_BACKOFF_INITIAL_MS),
        Duration::from_millis(REFRESH_BACKOFF_MAX_MS),
    );
    let mut refresh_token = options.refresh_token.clone();
    let mut delay = first_delay;
    let mut retries: u32 = 0;

    loop {
        tokio::select! {
            () = handle.cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }
        if !handle.is_active() {
            break;
        }
        let Some(client) = refresher.upgrade() else {
            handle.stop();
            break;
        };

        let result = client.refresh(&refresh_token).await;
        if !handle.is_active() {
            break;
        }

        match result {
            Ok(tokens) => {
                retries = 0;
                if let Some(rotated) = &tokens.refresh_token {
                    refresh_token.clone_from(rotated);
                }
                if let Some(on_refresh) = &options.on_refresh {
                    call_guarded("on_refresh", || on_refresh(&tokens));
                }
                client.publish(&tokens);
                delay = next_delay(&tokens, client.now_millis(), options.refresh_before_expiry);
                info!(delay_ms = delay.as_millis() as u64, "access token refreshed");
            }
            Err(err) => {
                retries += 1;
                if retries > options.max_retries {
                    handle.stop();
                    error!(error = %err, label = err.label(), retries, "auto-refresh gave up");
                    if let Some(on_error) = &options.on_error {
                        call_guarded("on_error", || on_error(&err));
                    }
                    break;
                }
                delay = backoff.calculate_delay(retries);
                warn!(
                    error = %err,
                    retry = retries,
                    max_retries = options.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "token refresh failed; retrying"
                );
            }
        }
    }
}
