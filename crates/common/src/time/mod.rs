//! Time abstractions
//!
//! Wall-clock access goes through [`Clock`] so token expiry logic can be
//! tested against a [`MockClock`].
//!
//! ```rust
//! use std::time::Duration;
//!
//! use authkit_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::at_unix_secs(1_700_000_000);
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.unix_secs(), 1_700_000_005);
//! ```

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
