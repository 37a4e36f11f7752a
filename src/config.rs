//! Configuration management
//!
//! This module handles loading and managing configuration.

use crate::anomaly::DetectorConfig;
use crate::data::{DEFAULT_INTERVAL, DEFAULT_RANGE};
use crate::error::Result;
use crate::timezone;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Data acquisition configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub interval: String,
    pub range: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL.to_string(),
            range: DEFAULT_RANGE.to_string(),
        }
    }
}

/// Report configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// IANA name of the timezone anomalies are reported in
    pub timezone: String,
    /// How many recent anomalies to list
    pub last: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            timezone: timezone::DEFAULT_TIMEZONE.name().to_string(),
            last: 5,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub detector: DetectorConfig,
    pub data: DataConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file or use default
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::load(&path).unwrap_or_else(|err| {
            log::warn!(
                "Using default configuration, could not load {}: {}",
                path.as_ref().display(),
                err
            );
            Self::default()
        })
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check detector settings and the report timezone
    pub fn validate(&self) -> Result<()> {
        self.detector.validate()?;
        self.report_timezone()?;
        Ok(())
    }

    /// The reporting timezone
    pub fn report_timezone(&self) -> Result<Tz> {
        timezone::parse_timezone(&self.report.timezone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.detector.window, 20);
        assert_eq!(config.detector.threshold, 2.0);
        assert_eq!(config.data.interval, "5m");
        assert_eq!(config.data.range, "5d");
        assert_eq!(config.report.timezone, "America/New_York");
        assert_eq!(config.report.last, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("indicator.toml");
        std::fs::write(&path, "[detector]\nwindow = 30\n\n[report]\nlast = 3\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.detector.window, 30);
        assert_eq!(config.detector.threshold, 2.0);
        assert_eq!(config.report.last, 3);
        assert_eq!(config.report.timezone, "America/New_York");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");

        std::fs::write(&path, "[detector]\nthreshold = -1.0\n").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::InvalidConfiguration(_))));

        std::fs::write(&path, "[report]\ntimezone = \"Nowhere/City\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::UnknownTimezone(_))));

        std::fs::write(&path, "[detector]\nwindow = -3\n").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/definitely/not/here.toml");
        assert_eq!(config, Config::default());
    }
}
