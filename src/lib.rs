//! # UPSView
//!
//! Interactive canvas view of a UPS and its power outlets.
//!
//! ## Architecture
//!
//! UPSView is organized as a workspace with multiple crates:
//!
//! 1. **upsview-core** - Asset model, geometry, errors, listener ports and events
//! 2. **upsview-settings** - Style configuration (colors, fonts, outline, images)
//! 3. **upsview-canvas** - Layout, selection, drag handling, image loading, rendering
//! 4. **upsview** - Snapshot binary that integrates all crates
//!
//! ## Features
//!
//! - **Grid Layout**: outlets wrap every 4 columns, growing downward
//! - **Selection**: device and outlet selection reported through listener ports
//! - **Wiring**: absolute input and output connection points, re-reported on drag
//! - **Async Images**: panel and connector bitmaps decoded off the caller's thread
//! - **Raster Export**: PNG snapshots through tiny-skia

use anyhow::Context;
use std::path::Path;

pub mod cli;

pub use cli::Cli;

pub use upsview_canvas::{
    CanvasEvent, CanvasSurface, DeviceViewProps, HitTarget, PixmapSurface, PoweredDeviceView,
    RecordingSurface, Stage, StageSelection, ViewError,
};
pub use upsview_core::{
    Asset, AssetKind, DeviceViewListener, EventQueue, OutletMap, Point, PositionSnapshot,
    PowerStatus, ViewEvent, ViewEventDispatcher,
};
pub use upsview_settings::{SettingsError, StyleConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Where the snapshot places the device.
pub const SNAPSHOT_ORIGIN: Point = Point::new(40.0, 40.0);

const SNAPSHOT_MARGIN: f64 = 40.0;

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("logging already initialized")?;

    Ok(())
}

/// Reads an asset document.
pub fn load_asset(path: &Path) -> anyhow::Result<Asset> {
    let asset = Asset::load_from_file(path)
        .with_context(|| format!("loading asset file {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        kind = %asset.kind,
        outlets = asset.children.len(),
        "Loaded asset"
    );
    Ok(asset)
}

/// Renders one device to a PNG.
///
/// Mounts the view, waits for both images to resolve (successfully or not)
/// and writes the result. Returns the final stage so callers can inspect the
/// reported connection points.
pub async fn render_snapshot(
    asset_id: &str,
    asset: Asset,
    style: StyleConfig,
    output: &Path,
) -> anyhow::Result<Stage> {
    let mut stage = Stage::new(style);
    stage.add_device(DeviceViewProps::new(asset_id, asset, SNAPSHOT_ORIGIN))?;

    for (id, token) in stage.mount_all() {
        let mut completions = upsview_canvas::spawn_image_loads(token, &stage.style().images);
        while let Some(completion) = completions.recv().await {
            tracing::debug!(asset_id = %id, kind = %completion.kind, "Image resolved");
            stage.on_image_loaded(completion);
        }
    }

    let bounds = stage
        .view(asset_id)
        .map(PoweredDeviceView::bounds)
        .context("device missing from stage")?;
    let width = (bounds.max_x + SNAPSHOT_MARGIN).ceil() as u32;
    let height = (bounds.max_y + SNAPSHOT_MARGIN).ceil() as u32;

    let mut surface = PixmapSurface::new(width, height)?;
    stage.render(&mut surface);
    surface.save_png(output)?;

    Ok(stage)
}
