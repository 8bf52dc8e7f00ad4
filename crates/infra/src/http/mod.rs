//! reqwest-backed implementation of the core `HttpTransport` port.

pub mod client;

pub use client::{ReqwestTransport, ReqwestTransportBuilder};
