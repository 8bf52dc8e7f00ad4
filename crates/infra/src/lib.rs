//! # AuthKit Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - [`ReqwestTransport`], the reqwest-backed `HttpTransport`
//! - Configuration loading from the environment and config files
//! - [`connect`], which wires both into an [`HttpAuthClient`]
//!
//! ## Architecture
//! - Implements traits defined in `authkit-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod client;
pub mod config;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use client::{connect, connect_from_env, HttpAuthClient};
pub use errors::InfraError;
pub use http::{ReqwestTransport, ReqwestTransportBuilder};
