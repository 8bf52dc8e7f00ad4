//! Observability setup
//!
//! Library code only emits `tracing` events; binaries and tests decide where
//! they go by installing a subscriber from here.

pub mod subscriber;

pub use subscriber::{init_test_tracing, init_tracing, LogFormat};
