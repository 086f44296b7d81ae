//! Configuration for the input-frequency monitor.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path for the statistics store and generated reports
    pub data_path: PathBuf,

    /// How often accumulated statistics are flushed to disk
    #[serde(with = "duration_serde")]
    pub save_interval: Duration,

    /// The report is regenerated every this-many saves
    pub report_every_saves: u32,

    /// Virtual desktop dimensions used to normalize mouse travel
    pub screen: ScreenConfig,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("input-frequency");

        Self {
            data_path: data_dir,
            save_interval: Duration::from_secs(300),
            report_every_saves: 12, // roughly hourly
            screen: ScreenConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("input-frequency")
            .join("config.json")
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)?;
        Ok(())
    }

    /// Where the statistics store lives.
    pub fn store_path(&self) -> PathBuf {
        self.data_path.join("stats.csv")
    }

    /// Where the generated report lives.
    pub fn report_path(&self) -> PathBuf {
        self.data_path.join("report.txt")
    }
}

/// Virtual desktop dimensions. A platform hook can probe these live; the
/// default classifier reads them from here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScreenConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.save_interval, Duration::from_secs(300));
        assert_eq!(config.report_every_saves, 12);
        assert_eq!(config.screen.width, 1920);
        assert_eq!(config.screen.height, 1080);
    }

    #[test]
    fn test_paths_derive_from_data_path() {
        let mut config = Config::default();
        config.data_path = PathBuf::from("/tmp/ifreq");
        assert_eq!(config.store_path(), PathBuf::from("/tmp/ifreq/stats.csv"));
        assert_eq!(config.report_path(), PathBuf::from("/tmp/ifreq/report.txt"));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.save_interval, config.save_interval);
        assert_eq!(back.data_path, config.data_path);
    }
}
