//! UPSView Settings Crate
//!
//! Handles style configuration: colors, fonts, the device outline, the
//! charge-bar glyphs and image asset locations.

pub mod config;
pub mod error;

pub use config::{
    ChargeBarSettings, FontSpec, Fonts, ImageSettings, OutlineSettings, Palette, Rgba,
    StyleConfig,
};
pub use error::{SettingsError, SettingsResult};
