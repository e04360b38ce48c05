//! # UPSView Canvas
//!
//! This crate draws UPS devices on a 2D canvas and turns canvas input into
//! selection and position notifications. Each device is a
//! [`PoweredDeviceView`]: an outlined body with a panel image, a status and
//! battery readout, an input connector and a grid of outlet sockets.
//!
//! ## Core Components
//!
//! - **Layout**: deterministic 4-column grids for sockets and connection points
//! - **Selection**: sticky outlet selection, highlighted only under nested focus
//! - **Position**: atomic connection snapshots rebuilt on every drag
//! - **Images**: one-shot slots filled asynchronously, guarded by mount tokens
//! - **Readout**: status, battery percent, charge bar and load text
//! - **Surfaces**: a drawing trait with recording and raster implementations
//! - **Stage**: a container that owns paint order, selection and wiring
//!
//! ## Architecture
//!
//! ```text
//! Stage (selection authority, z-order, wiring)
//!   └── PoweredDeviceView
//!         ├── Layout / Position (connection points)
//!         ├── SelectionState (outlet)
//!         ├── ImageSlots (panel, connector)
//!         └── Socket (per outlet)
//!
//! CanvasSurface
//!   ├── RecordingSurface (draw command log)
//!   └── PixmapSurface (tiny-skia raster)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use upsview_canvas::{DeviceViewProps, PixmapSurface, Stage};
//!
//! let mut stage = Stage::new(style);
//! stage.add_device(DeviceViewProps::new("ups-1", asset, Point::new(40.0, 40.0)))?;
//! stage.handle_click(Point::new(300.0, 190.0));
//!
//! let mut surface = PixmapSurface::new(800, 600)?;
//! stage.render(&mut surface);
//! ```

pub mod device_view;
pub mod error;
pub mod font_manager;
pub mod images;
pub mod layout;
pub mod position;
pub mod readout;
pub mod renderer;
pub mod selection;
pub mod socket;
pub mod stage;
pub mod surface;

pub use device_view::{DeviceViewProps, PoweredDeviceView};
pub use error::{ViewError, ViewResult};
pub use images::{
    decode_image, load_image, spawn_image_loads, ImageCompletion, ImageHandle, ImageKind,
    ImageSlot, ImageSlots, MountToken,
};
pub use layout::{
    grid_placement, input_connection_point, output_connection_points, GridSpec, CONNECTION_GRID,
    GRID_COLUMNS, GRID_STEP, INPUT_ANCHOR, OUTLET_DRAW_GRID, SOCKET_SIZE,
};
pub use position::{connection_snapshot, PositionState};
pub use readout::{battery_percent, charge_bar, power_label, Readout};
pub use renderer::PixmapSurface;
pub use selection::{OutletSelection, SelectionState};
pub use socket::Socket;
pub use stage::{Link, Stage, StageSelection};
pub use surface::{
    CanvasEvent, CanvasSurface, DrawCommand, HitTarget, RecordingSurface, StrokeStyle,
};
