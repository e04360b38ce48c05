//! Status and battery readout formatting.

use upsview_core::{clamp_battery, Asset, PowerStatus, BATTERY_MAX};

/// `"ON"` or `"OFF"`.
pub fn power_label(status: PowerStatus) -> &'static str {
    if status.is_on() {
        "ON"
    } else {
        "OFF"
    }
}

/// Whole percent for a battery level in tenths of a percent.
pub fn battery_percent(battery: i32) -> u16 {
    clamp_battery(battery) / 10
}

/// Truncates `glyphs` in proportion to the missing charge.
///
/// `floor(len * (1000 - battery) / 1000)` leading glyphs are dropped, so a full
/// battery keeps the whole string and an empty one keeps nothing. Integer
/// arithmetic keeps the exact maximum from rounding down to a shorter bar.
pub fn charge_bar(battery: i32, glyphs: &str) -> String {
    let battery = clamp_battery(battery) as usize;
    let len = glyphs.chars().count();
    let dropped = len * (BATTERY_MAX as usize - battery) / BATTERY_MAX as usize;
    glyphs.chars().skip(dropped).collect()
}

/// Formatted readout lines for a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readout {
    pub status: String,
    pub battery: String,
    pub bar: String,
    pub load: String,
}

impl Readout {
    pub fn for_asset(asset: &Asset, glyphs: &str) -> Self {
        Self {
            status: format!("Status: {}", power_label(asset.status)),
            battery: format!("Battery: {}%", battery_percent(asset.battery)),
            bar: charge_bar(asset.battery, glyphs),
            load: format!("Load: {} W", asset.load),
        }
    }

    /// Lines in display order.
    pub fn lines(&self) -> [&str; 4] {
        [
            self.status.as_str(),
            self.battery.as_str(),
            self.bar.as_str(),
            self.load.as_str(),
        ]
    }
}
