//! Configuration for InkBot
//!
//! Configuration is organized into sections:
//! - Device settings (address, timeouts, protocol tuning)
//! - Drawing settings (rasterization and tool heights)
//! - Output settings (artifact export)
//!
//! Files are JSON or TOML, chosen by extension.

use crate::error::{ConfigError, SettingsError, SettingsResult};
use inkbot_core::{PenHeights, WORK_AREA_RESOLUTION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "inkbot.toml";

/// Drawing device connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// Hostname or IP address of the device
    pub host: String,
    /// TCP port of the device
    pub port: u16,
    /// Connect timeout in milliseconds; absent waits forever
    pub connect_timeout_ms: Option<u64>,
    /// Write timeout in milliseconds; absent waits forever
    pub write_timeout_ms: Option<u64>,
    /// Acknowledgment timeout in milliseconds; absent waits forever
    pub ack_timeout_ms: Option<u64>,
    /// Records between progress checkpoints (0 disables)
    pub checkpoint_interval: usize,
    /// Z transmitted in place of the pen-up height; must be below it
    pub remap_to: i64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            host: "192.168.125.1".to_string(),
            port: 1025,
            connect_timeout_ms: Some(5000),
            write_timeout_ms: Some(5000),
            ack_timeout_ms: Some(5000),
            checkpoint_interval: 100,
            remap_to: 3,
        }
    }
}

impl DeviceSettings {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    pub fn write_timeout(&self) -> Option<Duration> {
        self.write_timeout_ms.map(Duration::from_millis)
    }

    pub fn ack_timeout(&self) -> Option<Duration> {
        self.ack_timeout_ms.map(Duration::from_millis)
    }
}

/// Image-to-motion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingSettings {
    /// Millimetres per grid cell
    pub scale: f64,
    /// Work area resolution in cells per side
    pub resolution: u32,
    /// Grayscale threshold; values at or below it are ink
    pub threshold: u8,
    /// Distance between scanned rows
    pub row_step: u32,
    /// Z height while travelling
    pub pen_up: f64,
    /// Z height while drawing
    pub pen_down: f64,
}

impl Default for DrawingSettings {
    fn default() -> Self {
        let pen = PenHeights::default();
        Self {
            scale: 0.3,
            resolution: WORK_AREA_RESOLUTION,
            threshold: 128,
            row_step: 2,
            pen_up: pen.up,
            pen_down: pen.down,
        }
    }
}

impl DrawingSettings {
    pub fn pen_heights(&self) -> PenHeights {
        PenHeights {
            down: self.pen_down,
            up: self.pen_up,
        }
    }

    /// Pen-up height as it appears in decoded records
    pub fn pen_up_z(&self) -> i64 {
        self.pen_up.round_ties_even() as i64
    }

    /// Pen-down height as it appears in decoded records
    pub fn pen_down_z(&self) -> i64 {
        self.pen_down.round_ties_even() as i64
    }
}

/// Artifact export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory for exported artifacts; nothing is written when absent
    pub export_dir: Option<PathBuf>,
    pub script_file: String,
    pub coordinates_file: String,
    pub deduplicated_file: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            export_dir: None,
            script_file: "output_1.gcode".to_string(),
            coordinates_file: "input_robot.csv".to_string(),
            deduplicated_file: "output.csv".to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub device: DeviceSettings,
    pub drawing: DrawingSettings,
    pub output: OutputSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("<none>").to_string()).into()),
    }
}

fn out_of_range(key: &str, value: impl ToString) -> SettingsError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::LoadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the config at `path` if given, else the default file if it
    /// exists, else built-in defaults
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match default_config_path() {
            Ok(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.device.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "device.host".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        if self.device.port == 0 {
            return Err(out_of_range("device.port", self.device.port));
        }
        for (key, value) in [
            ("device.connect_timeout_ms", self.device.connect_timeout_ms),
            ("device.write_timeout_ms", self.device.write_timeout_ms),
            ("device.ack_timeout_ms", self.device.ack_timeout_ms),
        ] {
            if value == Some(0) {
                return Err(out_of_range(key, 0));
            }
        }

        if !self.drawing.scale.is_finite() || self.drawing.scale <= 0.0 {
            return Err(out_of_range("drawing.scale", self.drawing.scale));
        }
        if self.drawing.resolution == 0 {
            return Err(out_of_range("drawing.resolution", 0));
        }
        if self.drawing.row_step == 0 {
            return Err(out_of_range("drawing.row_step", 0));
        }
        if !self.drawing.pen_up.is_finite() || !self.drawing.pen_down.is_finite() {
            return Err(ConfigError::InvalidValue {
                key: "drawing.pen_up".to_string(),
                reason: "pen heights must be finite".to_string(),
            }
            .into());
        }
        if self.drawing.pen_down_z() == self.drawing.pen_up_z() {
            return Err(ConfigError::InvalidValue {
                key: "drawing.pen_down".to_string(),
                reason: format!(
                    "rounds to the pen-up height {}",
                    self.drawing.pen_up_z()
                ),
            }
            .into());
        }
        if self.device.remap_to >= self.drawing.pen_up_z() {
            return Err(ConfigError::InvalidValue {
                key: "device.remap_to".to_string(),
                reason: format!(
                    "must be below the pen-up height {}",
                    self.drawing.pen_up_z()
                ),
            }
            .into());
        }

        for (key, name) in [
            ("output.script_file", &self.output.script_file),
            ("output.coordinates_file", &self.output.coordinates_file),
            ("output.deduplicated_file", &self.output.deduplicated_file),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: "file name must not be empty".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }
}

/// Platform config location: `<config dir>/inkbot/inkbot.toml`
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("inkbot").join(CONFIG_FILE_NAME))
        .ok_or_else(|| SettingsError::ConfigDirectory("no platform config directory".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.device.host, "192.168.125.1");
        assert_eq!(config.device.port, 1025);
        assert_eq!(config.drawing.scale, 0.3);
        assert_eq!(config.drawing.pen_heights(), PenHeights::default());
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        let mut config = Config::default();
        config.drawing.scale = 0.0;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::Config(ConfigError::ValueOutOfRange { .. }))
        ));
        config.drawing.scale = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = Config::default();
        config.device.ack_timeout_ms = Some(0);
        assert!(config.validate().is_err());
        config.device.ack_timeout_ms = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeouts_convert_to_durations() {
        let device = DeviceSettings {
            ack_timeout_ms: Some(250),
            ..DeviceSettings::default()
        };
        assert_eq!(device.ack_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(device.write_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_default_timeouts_are_bounded() {
        let device = DeviceSettings::default();
        assert!(device.connect_timeout().is_some());
        assert!(device.write_timeout().is_some());
        assert_eq!(device.ack_timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_pen_up_z_rounds_like_decoded_records() {
        let mut drawing = DrawingSettings::default();
        assert_eq!(drawing.pen_up_z(), 5);
        drawing.pen_up = 10.5;
        assert_eq!(drawing.pen_up_z(), 10);
        drawing.pen_up = 11.5;
        assert_eq!(drawing.pen_up_z(), 12);
    }

    #[test]
    fn test_remap_target_must_be_below_pen_up() {
        let mut config = Config::default();
        config.device.remap_to = 5;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::Config(ConfigError::InvalidValue { ref key, .. }))
                if key == "device.remap_to"
        ));

        config.device.remap_to = 7;
        config.drawing.pen_up = 10.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pen_heights_must_stay_distinct_after_rounding() {
        let mut config = Config::default();
        config.drawing.pen_down = 4.9;
        assert!(matches!(
            config.validate(),
            Err(SettingsError::Config(ConfigError::InvalidValue { ref key, .. }))
                if key == "drawing.pen_down"
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Config::default()
            .save_to_file(Path::new("inkbot.yaml"))
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Config(ConfigError::UnsupportedFormat(_))
        ));
    }
}
