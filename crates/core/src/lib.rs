//! # AuthKit Core
//!
//! Authentication client logic - no HTTP stack of its own.
//!
//! This crate contains:
//! - PKCE generation and authorization URL building
//! - Token decoding and validation, assurance levels and step-up
//! - The auto-refresh scheduler and refresh listeners
//! - Role catalog and permission matching
//! - The [`AuthClient`] facade, written against the [`HttpTransport`] port
//!
//! ## Architecture Principles
//! - Only depends on `authkit-common` and `authkit-domain`
//! - No HTTP client code; all I/O goes through [`HttpTransport`]
//! - Validation, matching and PKCE are synchronous and side-effect free

pub mod auth;
pub mod rbac;
pub mod testing;

// Re-export specific items to avoid ambiguity
pub use auth::client::AuthClient;
pub use auth::ports::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody, TransportError,
};
pub use auth::refresh::{AutoRefreshHandle, AutoRefreshOptions, RefreshCallback, Subscription};
pub use auth::user_context::{Grants, UserContext};
pub use rbac::{check_permission, matches_permission, RoleCatalog, RoleCatalogError, RoleDefinition};
