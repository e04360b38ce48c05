//! Bitmap assets for device views.
//!
//! Each view needs two images: the body panel and the input-connector icon.
//! They load asynchronously and independently; each lands in its own one-shot
//! [`ImageSlot`]. Rendering reads whatever slots are filled at the time.
//!
//! Completions carry the [`MountToken`] of the view that requested them so a
//! view can drop results that arrive after it was unmounted or remounted.

use crate::error::{ViewError, ViewResult};
use image::RgbaImage;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use upsview_core::Size;
use upsview_settings::ImageSettings;
use uuid::Uuid;

/// Which of the two device images a slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Panel,
    InputConnector,
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageKind::Panel => write!(f, "panel"),
            ImageKind::InputConnector => write!(f, "input connector"),
        }
    }
}

/// Decoded, immutable RGBA bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHandle {
    pixels: Arc<RgbaImage>,
}

impl ImageHandle {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.pixels.width(), self.pixels.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// One-shot slot for an asynchronously loaded image.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ImageSlot {
    #[default]
    Pending,
    Loaded(ImageHandle),
    Failed(String),
}

impl ImageSlot {
    pub fn is_pending(&self) -> bool {
        matches!(self, ImageSlot::Pending)
    }

    pub fn handle(&self) -> Option<&ImageHandle> {
        match self {
            ImageSlot::Loaded(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn size(&self) -> Option<Size> {
        self.handle().map(ImageHandle::size)
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            ImageSlot::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// The panel and connector slots of one view.
#[derive(Debug, Clone, Default)]
pub struct ImageSlots {
    panel: ImageSlot,
    connector: ImageSlot,
}

impl ImageSlots {
    pub fn get(&self, kind: ImageKind) -> &ImageSlot {
        match kind {
            ImageKind::Panel => &self.panel,
            ImageKind::InputConnector => &self.connector,
        }
    }

    /// Size of the connector icon once it has loaded.
    pub fn connector_size(&self) -> Option<Size> {
        self.connector.size()
    }

    /// Fills a pending slot.
    ///
    /// Returns `false` if the slot was already resolved; slots never change
    /// once filled.
    pub fn install(&mut self, kind: ImageKind, result: ViewResult<ImageHandle>) -> bool {
        let slot = match kind {
            ImageKind::Panel => &mut self.panel,
            ImageKind::InputConnector => &mut self.connector,
        };
        if !slot.is_pending() {
            return false;
        }
        *slot = match result {
            Ok(handle) => ImageSlot::Loaded(handle),
            Err(err) => ImageSlot::Failed(err.to_string()),
        };
        true
    }

    /// True once neither slot is pending.
    pub fn all_resolved(&self) -> bool {
        !self.panel.is_pending() && !self.connector.is_pending()
    }

    /// True if any slot failed to load.
    pub fn is_degraded(&self) -> bool {
        self.panel.failure().is_some() || self.connector.failure().is_some()
    }

    /// Clears both slots back to pending, for a fresh mount.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Identity of one mounted lifetime of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MountToken(Uuid);

impl MountToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MountToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MountToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mount({})", &self.0.to_string()[..8])
    }
}

/// Result of one image request, delivered back to the requesting view.
#[derive(Debug, Clone)]
pub struct ImageCompletion {
    pub token: MountToken,
    pub kind: ImageKind,
    pub result: ViewResult<ImageHandle>,
}

/// Decodes an in-memory image (PNG, JPEG, ...) into RGBA.
pub fn decode_image(kind: ImageKind, bytes: &[u8]) -> ViewResult<ImageHandle> {
    image::load_from_memory(bytes)
        .map(|img| ImageHandle::new(img.to_rgba8()))
        .map_err(|e| ViewError::image_load(kind, e))
}

/// Reads and decodes an image file without blocking the caller's thread.
pub async fn load_image(kind: ImageKind, path: &Path) -> ViewResult<ImageHandle> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ViewError::image_load(kind, format!("{}: {}", path.display(), e)))?;

    tokio::task::spawn_blocking(move || decode_image(kind, &bytes))
        .await
        .map_err(|e| ViewError::image_load(kind, e))?
}

/// Starts loading both device images for a mounted view.
///
/// Each image is decoded on its own task. Completions arrive on the returned
/// channel in whatever order they finish; the channel closes once both have
/// been delivered. Must be called from within a tokio runtime.
pub fn spawn_image_loads(
    token: MountToken,
    images: &ImageSettings,
) -> mpsc::UnboundedReceiver<ImageCompletion> {
    let (tx, rx) = mpsc::unbounded_channel();

    for (kind, path) in requested_paths(images) {
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = load_image(kind, &path).await;
            if let Err(err) = &result {
                tracing::warn!(%token, %err, "Image load failed");
            }
            // The view may be gone already; nobody waiting is not an error.
            let _ = tx.send(ImageCompletion {
                token,
                kind,
                result,
            });
        });
    }

    rx
}

/// Paths the loader will read, in request order.
pub fn requested_paths(images: &ImageSettings) -> [(ImageKind, PathBuf); 2] {
    [
        (ImageKind::Panel, images.panel.clone()),
        (ImageKind::InputConnector, images.connector.clone()),
    ]
}
