//! Test doubles for code built on AuthKit
//!
//! - [`MockTransport`]: scripted [`HttpTransport`](crate::HttpTransport) that
//!   records every request
//! - [`TestTokenBuilder`]: unsigned JWTs with chosen claims

pub mod mocks;
pub mod tokens;

pub use mocks::MockTransport;
pub use tokens::TestTokenBuilder;
