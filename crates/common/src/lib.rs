//! Modular common utilities shared across AuthKit crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: backoff strategies and clock abstractions
//! - `observability`: tracing subscriber initialisation (not included by
//!   default)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod resilience;
#[cfg(feature = "foundation")]
pub mod time;

// Observability tier
// --------------------------------------------------------------
#[cfg(feature = "observability")]
pub mod observability;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "observability")]
pub use observability::{init_test_tracing, init_tracing, LogFormat};
#[cfg(feature = "foundation")]
pub use resilience::BackoffStrategy;
#[cfg(feature = "foundation")]
pub use time::{Clock, MockClock, SystemClock};
