//! Configuration provider.

use crate::adjust::Quantity;
use crate::error::PanelError;

use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Read-only access to the host configuration.
///
/// Screens only ever read these values; persistence belongs to the host.
pub trait ConfigProvider: Send + Sync {
    /// Default hotend target temperature in °C.
    fn default_hotend_temperature(&self) -> i32;

    /// Default heatbed target temperature in °C.
    fn default_heatbed_temperature(&self) -> i32;

    /// Default feed rate in percent.
    fn default_feed_rate(&self) -> i32;

    /// Default flow rate in percent.
    fn default_flow_rate(&self) -> i32;

    /// Default fan speed in percent.
    fn default_fan_speed(&self) -> i32;

    /// G-code prefix for a z babystep, the step size is appended verbatim.
    fn z_babystep_gcode(&self) -> &str;

    /// Whether the machine panel offers extruder controls.
    fn show_extruder_control(&self) -> bool;

    /// Feed speed used for manual extrusion (mm/min).
    fn feed_speed(&self) -> i32;

    /// Whether spools are managed by a filament manager plugin.
    fn is_filament_manager_used(&self) -> bool;

    /// Configured default for an adjustable quantity.
    fn default_for(&self, quantity: Quantity) -> i32 {
        match quantity {
            Quantity::Hotend => self.default_hotend_temperature(),
            Quantity::Heatbed => self.default_heatbed_temperature(),
            Quantity::Feedrate => self.default_feed_rate(),
            Quantity::Flowrate => self.default_flow_rate(),
            Quantity::Fan => self.default_fan_speed(),
        }
    }
}

/// Plain configuration values, loadable from TOML.
///
/// Missing keys fall back to [`PanelConfig::default`].
///
/// ```
/// use printdash_core::{ConfigProvider, PanelConfig};
///
/// let config = PanelConfig::from_toml_str("default_hotend_temperature = 215").unwrap();
/// assert_eq!(config.default_hotend_temperature(), 215);
/// assert_eq!(config.z_babystep_gcode(), "M290 Z");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub default_hotend_temperature: i32,
    pub default_heatbed_temperature: i32,
    pub default_feed_rate: i32,
    pub default_flow_rate: i32,
    pub default_fan_speed: i32,
    pub z_babystep_gcode: String,
    pub show_extruder_control: bool,
    pub feed_speed: i32,
    pub use_filament_manager: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            default_hotend_temperature: 200,
            default_heatbed_temperature: 60,
            default_feed_rate: 100,
            default_flow_rate: 100,
            default_fan_speed: 100,
            z_babystep_gcode: "M290 Z".into(),
            show_extruder_control: true,
            feed_speed: 100,
            use_filament_manager: false,
        }
    }
}

impl PanelConfig {
    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    /// Returns [`PanelError::ConfigParse`] if the text is not valid TOML or a
    /// key has the wrong type.
    pub fn from_toml_str(raw: &str) -> Result<Self, PanelError> {
        Ok(toml::from_str(raw)?)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    /// Returns [`PanelError::Io`] if the file cannot be read and
    /// [`PanelError::ConfigParse`] if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PanelError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        debug!("loaded panel config from {}", path.display());
        Ok(config)
    }
}

impl ConfigProvider for PanelConfig {
    fn default_hotend_temperature(&self) -> i32 {
        self.default_hotend_temperature
    }

    fn default_heatbed_temperature(&self) -> i32 {
        self.default_heatbed_temperature
    }

    fn default_feed_rate(&self) -> i32 {
        self.default_feed_rate
    }

    fn default_flow_rate(&self) -> i32 {
        self.default_flow_rate
    }

    fn default_fan_speed(&self) -> i32 {
        self.default_fan_speed
    }

    fn z_babystep_gcode(&self) -> &str {
        &self.z_babystep_gcode
    }

    fn show_extruder_control(&self) -> bool {
        self.show_extruder_control
    }

    fn feed_speed(&self) -> i32 {
        self.feed_speed
    }

    fn is_filament_manager_used(&self) -> bool {
        self.use_filament_manager
    }
}
