//! Style configuration for UPSView
//!
//! Provides the visual inputs a device view consumes: outline colors, the
//! device outline path, fonts, charge-bar glyphs and image asset paths.
//! Supports JSON and TOML file formats stored in platform-specific directories.

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use upsview_core::Point;

/// Application directory name under the platform config dir.
const APP_DIR: &str = "upsview";
const STYLE_FILE: &str = "style.toml";

/// RGBA color, serialized as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl FromStr for Rgba {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let channel = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .ok_or_else(|| {
                    SettingsError::invalid("color", format!("'{}' is not a hex color", s))
                })
        };
        match hex.len() {
            6 => Ok(Rgba::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Rgba::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => Err(SettingsError::invalid(
                "color",
                format!("'{}' must be #rrggbb or #rrggbbaa", s),
            )),
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Color palette for the device and its sockets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Outline color when the device is selected
    pub selected: Rgba,
    /// Outline color when the device is not selected
    pub deselected: Rgba,
    /// Device body fill
    pub body: Rgba,
    /// Label and readout text
    pub text: Rgba,
    /// Socket face when the outlet is powered
    pub socket_on: Rgba,
    /// Socket face when the outlet is unpowered
    pub socket_off: Rgba,
    /// Highlight ring around the selected socket
    pub socket_highlight: Rgba,
    /// Stroke for images that failed to load
    pub degraded: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            selected: Rgba::rgb(33, 133, 208),
            deselected: Rgba::rgb(117, 117, 117),
            body: Rgba::rgb(250, 250, 250),
            text: Rgba::rgb(33, 33, 33),
            socket_on: Rgba::rgb(76, 175, 80),
            socket_off: Rgba::rgb(189, 189, 189),
            socket_highlight: Rgba::rgb(33, 133, 208),
            degraded: Rgba::rgb(229, 57, 53),
        }
    }
}

/// Font selection for a text element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Family name; "Sans", "Serif" and "Monospace" select generic families
    pub family: String,
    /// Size in canvas units
    pub size: f32,
    pub bold: bool,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f32, bold: bool) -> Self {
        Self {
            family: family.into(),
            size,
            bold,
        }
    }
}

/// Fonts used by the render pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fonts {
    pub label: FontSpec,
    pub readout: FontSpec,
    pub socket: FontSpec,
}

impl Default for Fonts {
    fn default() -> Self {
        Self {
            label: FontSpec::new("Sans", 18.0, true),
            readout: FontSpec::new("Monospace", 14.0, false),
            socket: FontSpec::new("Sans", 12.0, false),
        }
    }
}

/// Device outline drawn around the body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineSettings {
    pub stroke_width: f32,
    /// Closed polyline relative to the device anchor
    pub path: Vec<Point>,
}

impl Default for OutlineSettings {
    fn default() -> Self {
        Self {
            stroke_width: 3.0,
            path: vec![
                Point::new(0.0, 0.0),
                Point::new(680.0, 0.0),
                Point::new(680.0, 340.0),
                Point::new(0.0, 340.0),
            ],
        }
    }
}

/// Charge bar rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeBarSettings {
    /// Full-charge glyph string; truncated proportionally to the charge
    pub glyphs: String,
}

impl Default for ChargeBarSettings {
    fn default() -> Self {
        Self {
            glyphs: "||||||||||||||||||||".to_string(),
        }
    }
}

/// Bitmap assets requested when a view mounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Device body panel
    pub panel: PathBuf,
    /// Input connector icon
    pub connector: PathBuf,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            panel: PathBuf::from("assets/ups_panel.png"),
            connector: PathBuf::from("assets/input_connector.png"),
        }
    }
}

/// Complete style configuration
///
/// Aggregates all style sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StyleConfig {
    pub palette: Palette,
    pub fonts: Fonts,
    pub outline: OutlineSettings,
    pub charge_bar: ChargeBarSettings,
    pub images: ImageSettings,
}

impl StyleConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location, e.g. `~/.config/upsview/style.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR).join(STYLE_FILE))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match extension(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded style config");
        Ok(config)
    }

    /// Load the config at the default location, falling back to defaults if it
    /// does not exist
    pub fn load_or_default() -> SettingsResult<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            tracing::info!(path = %path.display(), "No style config found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
                })?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.outline.path.len() < 3 {
            return Err(SettingsError::invalid(
                "outline.path",
                "needs at least 3 points",
            ));
        }
        if self.outline.stroke_width <= 0.0 {
            return Err(SettingsError::invalid("outline.stroke_width", "must be > 0"));
        }

        for (key, font) in [
            ("fonts.label", &self.fonts.label),
            ("fonts.readout", &self.fonts.readout),
            ("fonts.socket", &self.fonts.socket),
        ] {
            if font.size <= 0.0 {
                return Err(SettingsError::invalid(key, "size must be > 0"));
            }
        }

        if self.charge_bar.glyphs.is_empty() {
            return Err(SettingsError::invalid("charge_bar.glyphs", "must not be empty"));
        }

        Ok(())
    }

    /// Outline color for the given device selection state
    pub fn outline_color(&self, selected: bool) -> Rgba {
        if selected {
            self.palette.selected
        } else {
            self.palette.deselected
        }
    }
}

enum Format {
    Json,
    Toml,
}

fn extension(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}
