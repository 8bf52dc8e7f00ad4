//! Resilience patterns for transient failures
//!
//! Only the delay side of retrying lives here: callers own their retry loop
//! and ask a [`BackoffStrategy`] how long to wait before the next attempt.

pub mod retry;

pub use retry::BackoffStrategy;
