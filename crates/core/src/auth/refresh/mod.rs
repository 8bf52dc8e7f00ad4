//! Token refresh: the background scheduler and refresh listeners.

pub mod listeners;
pub mod options;
pub mod scheduler;

pub use listeners::{RefreshCallback, RefreshListeners, Subscription};
pub use options::{AutoRefreshOptions, ErrorCallback};
pub use scheduler::{delay_until_refresh, AutoRefreshHandle, TokenRefresher};
