//! Configuration loading
//!
//! Builds an [`authkit_domain::AuthConfig`] from `AUTHKIT_*` environment
//! variables or a TOML/JSON file.

pub mod loader;

pub use loader::{load, load_from_env, load_from_file, load_from_lookup, probe_config_paths};
