//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the tide-config.toml file.
//! It provides a centralized way to configure the remembered location, station
//! resolution thresholds, the NOAA request parameters and chart layout.
//!
//! Every section has defaults, so a partial file (or none at all) still works.

use crate::series::HeightPolicy;
use crate::stations::ResolverConfig;
use crate::Coordinate;
use chrono::{FixedOffset, Offset, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "tide-config.toml";

/// Application configuration loaded from tide-config.toml
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Last location the user asked for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationConfig>,
    /// Station resolution thresholds
    pub resolver: ResolverConfig,
    /// NOAA request parameters
    pub api: ApiConfig,
    /// Terminal chart layout
    pub display: DisplayConfig,
}

/// A named coordinate
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationConfig {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Finite latitude within ±90 and longitude within ±180
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude.abs() <= 90.0
            && self.longitude.abs() <= 180.0
    }
}

/// NOAA CO-OPS request configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Data API endpoint for predictions
    pub data_url: String,
    /// Metadata API endpoint for the station catalog
    pub stations_url: String,
    /// Application name reported to NOAA
    pub application: String,
    /// Vertical datum, e.g. "MLLW"
    pub datum: String,
    /// "english" (feet) or "metric" (meters)
    pub units: String,
    /// "gmt", "lst" or "lst_ldt"
    pub time_zone: String,
    /// UTC offset, in minutes, of the timestamps NOAA returns for `time_zone`
    pub utc_offset_minutes: i32,
    /// What to do with predictions whose height cannot be parsed
    pub height_policy: HeightPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            data_url: "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter".to_string(),
            stations_url:
                "https://api.tidesandcurrents.noaa.gov/mdapi/prod/webapi/stations.json".to_string(),
            application: "TideTimes".to_string(),
            datum: "MLLW".to_string(),
            units: "english".to_string(),
            time_zone: "gmt".to_string(),
            utc_offset_minutes: 0,
            height_policy: HeightPolicy::DefaultToZero,
        }
    }
}

impl ApiConfig {
    /// Fixed offset the returned timestamps are expressed in.
    ///
    /// Out-of-range offsets (beyond ±24h) fall back to UTC.
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                warn!(
                    "Invalid utc_offset_minutes {}, using UTC",
                    self.utc_offset_minutes
                );
                Utc.fix()
            })
    }

    /// Unit suffix for labels
    pub fn unit_label(&self) -> &'static str {
        if self.units == "metric" {
            "m"
        } else {
            "ft"
        }
    }
}

/// Terminal chart layout
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Intervals on the height axis
    pub value_ticks: usize,
    /// Intervals on the time axis
    pub time_ticks: usize,
    /// Chart height in character rows
    pub rows: usize,
    /// Chart width in character columns (plot area only)
    pub columns: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            value_ticks: 4,
            time_ticks: 4,
            rows: 16,
            columns: 72,
        }
    }
}

impl Config {
    /// Load configuration from tide-config.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(mut config) => {
                    info!("Loaded configuration from {}", path.display());
                    if let Err(e) = config.check_location() {
                        warn!("Ignoring saved location in {}: {}", path.display(), e);
                        config.location = None;
                    }
                    config
                }
                Err(e) => {
                    warn!("Invalid config file format in {}: {}", path.display(), e);
                    warn!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Load configuration, surfacing read and parse errors to the caller
    pub fn try_load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, crate::noaa::TideError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.check_location()?;
        Ok(config)
    }

    fn check_location(&self) -> Result<(), crate::noaa::TideError> {
        match &self.location {
            Some(location) if !location.is_valid() => {
                Err(crate::noaa::TideError::InvalidLocation {
                    latitude: location.latitude,
                    longitude: location.longitude,
                })
            }
            _ => Ok(()),
        }
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), crate::noaa::TideError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }
}
