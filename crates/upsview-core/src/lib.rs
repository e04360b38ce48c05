//! # UPSView Core
//!
//! Core types shared by every UPSView crate.
//! Provides the asset data model, canvas geometry, the error taxonomy and
//! the outbound event ports a device view reports through.

pub mod asset;
pub mod error;
pub mod events;
pub mod geometry;

pub use asset::{
    clamp_battery, Asset, AssetKind, OutletMap, PowerStatus, PowerTransition, BATTERY_MAX,
};
pub use error::{AssetError, Error, Result};
pub use events::{
    DeviceViewListener, EventQueue, NoOpListener, PositionSnapshot, ViewEvent,
    ViewEventDispatcher,
};
pub use geometry::{Bounds, Point, PointMap, Size};
