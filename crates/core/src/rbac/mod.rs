//! Role-based access control
//!
//! - [`matcher`]: wildcard permission matching shared by every check
//! - [`catalog`]: static role graph with inheritance, resolved at load

pub mod catalog;
pub mod matcher;

pub use catalog::{RoleCatalog, RoleCatalogError, RoleDefinition};
pub use matcher::{check_permission, matches_permission};
