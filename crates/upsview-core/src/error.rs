//! Error handling for UPSView
//!
//! Provides the error types shared by every layer:
//! - Asset errors (lookups into the outlet graph)
//! - Serialization and I/O errors (asset documents)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Asset graph error type
///
/// Represents errors raised when operating on a device and its outlets.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    /// The requested outlet key is not a child of the device
    #[error("Unknown outlet '{key}'")]
    UnknownOutlet {
        /// The outlet key that was looked up.
        key: String,
    },
}

/// Main error type for UPSView
///
/// A unified error type that can represent any error from the core layer.
#[derive(Error, Debug)]
pub enum Error {
    /// Asset error
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is an asset graph error
    pub fn is_asset_error(&self) -> bool {
        matches!(self, Error::Asset(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
