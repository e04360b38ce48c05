//! Asset data model
//!
//! An [`Asset`] is a powered device (UPS, PDU) or one of its outlets. Devices
//! own an ordered [`OutletMap`] of child outlets; the insertion order of that
//! map is the order outlets are laid out on the canvas.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

use crate::error::{AssetError, Result};

/// Highest valid battery level, in tenths of a percent.
pub const BATTERY_MAX: i32 = 1000;

/// Power state of an asset.
///
/// Serialized as the integer `0` (off) or `1` (on). Any non-zero value reads
/// as on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum PowerStatus {
    #[default]
    Off,
    On,
}

impl PowerStatus {
    pub fn is_on(self) -> bool {
        matches!(self, PowerStatus::On)
    }
}

impl From<i64> for PowerStatus {
    fn from(value: i64) -> Self {
        if value != 0 {
            PowerStatus::On
        } else {
            PowerStatus::Off
        }
    }
}

impl From<PowerStatus> for i64 {
    fn from(status: PowerStatus) -> Self {
        match status {
            PowerStatus::Off => 0,
            PowerStatus::On => 1,
        }
    }
}

impl fmt::Display for PowerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerStatus::Off => write!(f, "OFF"),
            PowerStatus::On => write!(f, "ON"),
        }
    }
}

/// Kind of asset in the power graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Ups,
    Pdu,
    /// Child documents usually omit the kind, so outlets are the default.
    #[default]
    Outlet,
    Static,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ups => write!(f, "UPS"),
            Self::Pdu => write!(f, "PDU"),
            Self::Outlet => write!(f, "Outlet"),
            Self::Static => write!(f, "Static"),
        }
    }
}

/// Result of a power state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerTransition {
    pub old: PowerStatus,
    pub new: PowerStatus,
}

impl PowerTransition {
    /// Returns true if the asset actually changed state.
    pub fn changed(&self) -> bool {
        self.old != self.new
    }
}

/// Clamps a raw battery reading into `0..=1000`.
///
/// Out-of-range readings are logged rather than rejected so a bad sample never
/// breaks rendering.
pub fn clamp_battery(raw: i32) -> u16 {
    if !(0..=BATTERY_MAX).contains(&raw) {
        tracing::warn!(battery = raw, "Battery value out of range, clamping");
    }
    raw.clamp(0, BATTERY_MAX) as u16
}

/// A powered device or outlet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Asset {
    pub name: Option<String>,
    pub kind: AssetKind,
    pub status: PowerStatus,
    /// Raw battery level in tenths of a percent. Read through [`Asset::battery`].
    pub battery: i32,
    /// Load drawn by the asset in watts.
    pub load: f64,
    pub children: OutletMap,
}

impl Asset {
    /// Creates an unnamed, powered-off asset of the given kind.
    pub fn new(kind: AssetKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Creates an outlet with the given power state.
    pub fn outlet(status: PowerStatus) -> Self {
        Self {
            kind: AssetKind::Outlet,
            status,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_status(mut self, status: PowerStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_battery(mut self, battery: i32) -> Self {
        self.battery = battery;
        self
    }

    pub fn with_load(mut self, load: f64) -> Self {
        self.load = load;
        self
    }

    /// Appends an outlet. Replacing an existing key keeps its position.
    pub fn with_outlet(mut self, key: impl Into<String>, outlet: Asset) -> Self {
        self.children.insert(key, outlet);
        self
    }

    /// Reads an asset document from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let asset: Self = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), outlets = asset.children.len(), "Loaded asset");
        Ok(asset)
    }

    /// Battery level clamped into `0..=1000`.
    pub fn battery(&self) -> u16 {
        clamp_battery(self.battery)
    }

    /// Looks up an outlet by key.
    pub fn outlet_by_key(&self, key: &str) -> Result<&Asset> {
        self.children.get(key).ok_or_else(|| {
            AssetError::UnknownOutlet {
                key: key.to_string(),
            }
            .into()
        })
    }

    /// Powers the asset down and cascades to every outlet.
    pub fn power_down(&mut self) -> PowerTransition {
        self.set_power(PowerStatus::Off)
    }

    /// Powers the asset up and cascades to every outlet.
    pub fn power_up(&mut self) -> PowerTransition {
        self.set_power(PowerStatus::On)
    }

    fn set_power(&mut self, status: PowerStatus) -> PowerTransition {
        let old = self.status;
        self.status = status;
        for (_, child) in self.children.iter_mut() {
            child.set_power(status);
        }
        PowerTransition { old, new: status }
    }

    /// Switches a single outlet without touching its siblings.
    pub fn set_outlet_status(&mut self, key: &str, status: PowerStatus) -> Result<PowerTransition> {
        let outlet = self
            .children
            .get_mut(key)
            .ok_or_else(|| AssetError::UnknownOutlet {
                key: key.to_string(),
            })?;
        Ok(outlet.set_power(status))
    }
}

/// Insertion-ordered map of outlet key to outlet asset.
///
/// Serialized as a JSON object. Deserialization keeps document order, which
/// drives grid placement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutletMap {
    entries: Vec<(String, Asset)>,
}

impl OutletMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an outlet, returning the previous value for that key.
    pub fn insert(&mut self, key: impl Into<String>, outlet: Asset) -> Option<Asset> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, outlet)),
            None => {
                self.entries.push((key, outlet));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Asset> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, a)| a)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Asset> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, a)| a)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Asset)> {
        self.entries.iter().map(|(k, a)| (k.as_str(), a))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Asset)> {
        self.entries.iter_mut().map(|(k, a)| (k.as_str(), a))
    }
}

impl<K: Into<String>> FromIterator<(K, Asset)> for OutletMap {
    fn from_iter<I: IntoIterator<Item = (K, Asset)>>(iter: I) -> Self {
        let mut map = OutletMap::new();
        for (key, outlet) in iter {
            map.insert(key, outlet);
        }
        map
    }
}

impl Serialize for OutletMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, outlet) in &self.entries {
            map.serialize_entry(key, outlet)?;
        }
        map.end()
    }
}

struct OutletMapVisitor;

impl<'de> Visitor<'de> for OutletMapVisitor {
    type Value = OutletMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a map of outlet keys to assets")
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut access: A,
    ) -> std::result::Result<OutletMap, A::Error> {
        let mut map = OutletMap::new();
        while let Some((key, outlet)) = access.next_entry::<String, Asset>()? {
            map.insert(key, outlet);
        }
        Ok(map)
    }

    // A null children field is treated like a missing one.
    fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<OutletMap, E> {
        Ok(OutletMap::new())
    }
}

impl<'de> Deserialize<'de> for OutletMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(OutletMapVisitor)
    }
}
