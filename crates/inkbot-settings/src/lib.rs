//! InkBot Settings Crate
//!
//! Loads, validates and saves the application configuration.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, Config, DeviceSettings, DrawingSettings, OutputSettings, CONFIG_FILE_NAME,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
