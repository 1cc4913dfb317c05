//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `CART_API_BASE_URL` - Base URL of the collection API (default: `http://localhost:3002`)
//! - `CART_SYNC` - `true` to mirror cart changes to the API, `false` for local-only (default: true)
//! - `CART_STORAGE_DIR` - Directory holding the persisted cart (default: `.cart-storage`)
//! - `CART_STORAGE_KEY` - Key the cart is stored under (default: `shoppingCart`)
//! - `CART_CATALOG_FILE` - Read the catalog from this JSON file instead of `GET /cats`

use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3002";
pub const DEFAULT_STORAGE_DIR: &str = ".cart-storage";
pub const DEFAULT_STORAGE_KEY: &str = "shoppingCart";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Base URL of the collection API, without trailing slash
    pub api_base_url: String,
    /// Whether cart mutations are mirrored to the API
    pub sync: bool,
    /// Directory for the local cart store
    pub storage_dir: PathBuf,
    /// Key the cart is persisted under
    pub storage_key: String,
    /// Static catalog file, used instead of the API listing when set
    pub catalog_file: Option<PathBuf>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            sync: true,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            catalog_file: None,
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_base_url = match get("CART_API_BASE_URL") {
            Some(url) => parse_base_url(&url)?,
            None => defaults.api_base_url,
        };

        let sync = match get("CART_SYNC") {
            Some(raw) => parse_bool("CART_SYNC", &raw)?,
            None => defaults.sync,
        };

        let storage_key = get("CART_STORAGE_KEY").unwrap_or(defaults.storage_key);
        if storage_key.contains(['/', '\\']) {
            return Err(ConfigError::InvalidEnvVar(
                "CART_STORAGE_KEY".to_string(),
                "must not contain path separators".to_string(),
            ));
        }

        Ok(Self {
            api_base_url,
            sync,
            storage_dir: get("CART_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            storage_key,
            catalog_file: get("CART_CATALOG_FILE").map(PathBuf::from),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/');
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar(
            "CART_API_BASE_URL".to_string(),
            format!("expected an http(s) URL, got {raw:?}"),
        ));
    }
    Ok(url.to_string())
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            name.to_string(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}
