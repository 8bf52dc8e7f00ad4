//! # AuthKit Domain
//!
//! Data types shared by every AuthKit crate.
//!
//! This crate contains:
//! - Token, claim, discovery and session types
//! - The ordered [`AssuranceLevel`] enumeration
//! - Validation option/result types
//! - [`AuthError`] and the crate-wide `Result` alias
//! - [`AuthConfig`]
//!
//! ## Architecture
//! - No dependencies on other AuthKit crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
