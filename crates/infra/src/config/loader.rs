//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `AUTHKIT_ISSUER_URL`: Issuer base URL (required)
//! - `AUTHKIT_CLIENT_ID`: OAuth client id (required)
//! - `AUTHKIT_CLIENT_SECRET`: Client secret for confidential clients
//! - `AUTHKIT_REDIRECT_URI`: Default redirect URI
//! - `AUTHKIT_SCOPE`: Default scope
//! - `AUTHKIT_AUTH_PATH`: Auth API prefix below the issuer
//! - `AUTHKIT_DISCOVERY_TTL_SECS`: Discovery and JWKS cache TTL
//! - `AUTHKIT_HTTP_TIMEOUT_SECS`: Per-request timeout
//! - `AUTHKIT_REFRESH_BEFORE_EXPIRY_SECS`: Auto-refresh lead time
//! - `AUTHKIT_REFRESH_MAX_RETRIES`: Auto-refresh retry budget
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./authkit.toml` or `./authkit.json` (current working directory)
//! 2. `./config/authkit.toml` or `./config/authkit.json`
//! 3. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use authkit_domain::{AuthConfig, AuthError, Result};

pub const ENV_ISSUER_URL: &str = "AUTHKIT_ISSUER_URL";
pub const ENV_CLIENT_ID: &str = "AUTHKIT_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AUTHKIT_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "AUTHKIT_REDIRECT_URI";
pub const ENV_SCOPE: &str = "AUTHKIT_SCOPE";
pub const ENV_AUTH_PATH: &str = "AUTHKIT_AUTH_PATH";
pub const ENV_DISCOVERY_TTL_SECS: &str = "AUTHKIT_DISCOVERY_TTL_SECS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "AUTHKIT_HTTP_TIMEOUT_SECS";
pub const ENV_REFRESH_BEFORE_EXPIRY_SECS: &str = "AUTHKIT_REFRESH_BEFORE_EXPIRY_SECS";
pub const ENV_REFRESH_MAX_RETRIES: &str = "AUTHKIT_REFRESH_MAX_RETRIES";

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `AuthError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load() -> Result<AuthConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `AuthError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<AuthConfig> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Load configuration from any key/value source shaped like the process
/// environment.
///
/// # Errors
/// Returns `AuthError::Config` if required keys are missing or have invalid
/// values.
pub fn load_from_lookup<F>(lookup: F) -> Result<AuthConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| {
        lookup(key)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                AuthError::Config(format!("Missing required environment variable: {key}"))
            })
    };

    let mut config = AuthConfig::new(required(ENV_ISSUER_URL)?, required(ENV_CLIENT_ID)?);
    config.client_secret = lookup(ENV_CLIENT_SECRET);
    config.redirect_uri = lookup(ENV_REDIRECT_URI);
    if let Some(scope) = lookup(ENV_SCOPE) {
        config.default_scope = scope;
    }
    if let Some(auth_path) = lookup(ENV_AUTH_PATH) {
        config.auth_path = auth_path;
    }
    if let Some(ttl) = parse_opt(&lookup, ENV_DISCOVERY_TTL_SECS)? {
        config.discovery_cache_ttl_secs = ttl;
    }
    if let Some(timeout) = parse_opt(&lookup, ENV_HTTP_TIMEOUT_SECS)? {
        config.http_timeout_secs = timeout;
    }
    if let Some(lead) = parse_opt(&lookup, ENV_REFRESH_BEFORE_EXPIRY_SECS)? {
        config.auto_refresh.refresh_before_expiry_secs = lead;
    }
    if let Some(retries) = parse_opt(&lookup, ENV_REFRESH_MAX_RETRIES)? {
        config.auto_refresh.max_retries = retries;
    }

    config.validate()?;
    Ok(config)
}

fn parse_opt<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| AuthError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `AuthError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The loaded configuration fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<AuthConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AuthError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AuthError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AuthError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content, by file extension.
fn parse_config(contents: &str, path: &Path) -> Result<AuthConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AuthError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AuthError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(AuthError::Config(format!("Unsupported config format: {extension}"))),
    }
}

const CONFIG_FILE_NAMES: [&str; 4] =
    ["authkit.toml", "authkit.json", "config/authkit.toml", "config/authkit.json"];

/// Probe the standard locations for a configuration file.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}
