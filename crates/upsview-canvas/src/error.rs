//! Error types for device views.
//!
//! None of these are fatal: a view that hits one keeps rendering with a safe
//! default and surfaces the condition to its container.

use crate::images::ImageKind;
use thiserror::Error;

/// Errors raised while mounting, loading or rendering a device view.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewError {
    /// An image asset could not be read or decoded.
    #[error("Failed to load {kind} image: {reason}")]
    ImageLoad { kind: ImageKind, reason: String },

    /// A raster surface could not be allocated.
    #[error("Cannot create a {width}x{height} surface")]
    SurfaceSize { width: u32, height: u32 },

    /// A snapshot could not be encoded or written.
    #[error("Failed to export surface: {0}")]
    Export(String),

    /// No view is registered under the given asset id.
    #[error("Unknown device view '{0}'")]
    UnknownView(String),

    /// A view is already registered under the given asset id.
    #[error("Device view '{0}' already exists")]
    DuplicateView(String),

    #[error("Device '{device}' has no outlet '{key}'")]
    UnknownOutlet { device: String, key: String },
}

impl ViewError {
    pub fn image_load(kind: ImageKind, reason: impl ToString) -> Self {
        ViewError::ImageLoad {
            kind,
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for view operations.
pub type ViewResult<T> = Result<T, ViewError>;
