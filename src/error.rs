//! Error types for the cart crate.
//!
//! None of these reach the caller of a cart operation. The controller logs
//! them and degrades to local-only state. [`CartError`] covers setup code
//! such as [`crate::config::CartConfig::from_env`]; the store, catalog
//! source and remote client return their own error types when used directly.

use thiserror::Error;

pub use crate::config::ConfigError;

/// Errors talking to the remote collection API.
///
/// Transport failures and non-2xx responses are kept apart here for the
/// logs, but the controller treats them identically.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never produced a response.
    #[error("Remote request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("Remote {method} {path} returned status {status}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("Remote response could not be decoded: {0}")]
    Decode(String),
}

/// Errors reading or writing the local cart store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored cart is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Catalog file could not be read: {0}")]
    Read(#[from] std::io::Error),

    #[error("Catalog file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced while starting the cart. Cart operations themselves
/// never fail; see the module docs.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
