//! Token refresh listener registry

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use authkit_domain::TokenResponse;
use parking_lot::Mutex;
use tracing::warn;
use uuid::Uuid;

/// Callback invoked with the new tokens after every successful refresh.
pub type RefreshCallback = Arc<dyn Fn(&TokenResponse) + Send + Sync>;

/// Run a user callback, logging and swallowing a panic.
pub(crate) fn call_guarded(callback: &'static str, f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        warn!(callback, "refresh callback panicked; continuing");
    }
}

/// Listeners notified after every successful refresh.
#[derive(Default)]
pub struct RefreshListeners {
    entries: Mutex<Vec<(Uuid, RefreshCallback)>>,
}

impl RefreshListeners {
    /// Empty registry, shared so subscriptions can hold a weak handle.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register `callback` and return the handle that removes it.
    pub fn subscribe(self: &Arc<Self>, callback: RefreshCallback) -> Subscription {
        let id = Uuid::new_v4();
        self.entries.lock().push((id, callback));
        Subscription { id, registry: Arc::downgrade(self) }
    }

    fn remove(&self, id: Uuid) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Call every listener with `tokens`. Listeners registered or removed
    /// while this runs take effect on the next notification.
    pub fn notify(&self, tokens: &TokenResponse) {
        let snapshot: Vec<RefreshCallback> =
            self.entries.lock().iter().map(|(_, callback)| Arc::clone(callback)).collect();
        for callback in snapshot {
            call_guarded("on_token_refresh", || callback(tokens));
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// `true` when no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl std::fmt::Debug for RefreshListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshListeners").field("len", &self.len()).finish()
    }
}

/// Registration returned by `on_token_refresh`.
///
/// Dropping it leaves the listener registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: Uuid,
    registry: Weak<RefreshListeners>,
}

impl Subscription {
    /// Identifier of the registered listener.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Remove the listener. Returns `false` if it was already removed or the
    /// client is gone.
    pub fn unsubscribe(&self) -> bool {
        self.registry.upgrade().is_some_and(|registry| registry.remove(self.id))
    }
}
