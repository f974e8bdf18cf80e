//! Configuration management for the registry
//!
//! Every field has a default, so a missing file or a partial file both work.
//! Durations are humantime strings ("5s", "1m 30s").

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::types::ProjectId;

pub const CONFIG_ENV: &str = "BLUECARBON_CONFIG";

/// Longest duration any setting accepts
pub const MAX_DURATION: Duration = Duration::from_secs(366 * 24 * 60 * 60);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub notifications: NotificationsConfig,
    pub activity: ActivityConfig,
    pub simulator: SimulatorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// How long the head notification stays up
    pub ttl: String,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            ttl: "5s".to_string(),
        }
    }
}

impl NotificationsConfig {
    pub fn ttl(&self) -> Result<Duration> {
        parse_positive_duration("notifications.ttl", &self.ttl)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Keep at most this many activities; unbounded when absent
    pub retention: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub sample_interval: String,
    pub alerts_enabled: bool,
    /// Projects whose sensors are streamed
    pub projects: Vec<ProjectId>,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            sample_interval: "2s".to_string(),
            alerts_enabled: true,
            projects: vec![1, 2],
            seed: None,
        }
    }
}

impl SimulatorConfig {
    pub fn sample_interval(&self) -> Result<Duration> {
        parse_positive_duration("simulator.sample_interval", &self.sample_interval)
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_or_default(&config_path)
    }

    /// Load from `path`, falling back to defaults when the file doesn't exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default_config());
        }
        Self::load_from_path(path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self::default()
    }

    /// Check every value that can't be expressed in the TOML types alone
    pub fn validate(&self) -> Result<()> {
        self.notifications.ttl()?;
        self.simulator.sample_interval()?;
        if self.activity.retention == Some(0) {
            return Err(invalid("activity.retention", "must be at least 1").into());
        }
        Ok(())
    }
}

/// Resolve the configuration file path under the XDG config directory
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("bluecarbon").join("config.toml"))
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn parse_positive_duration(field: &str, value: &str) -> Result<Duration> {
    let duration = humantime::parse_duration(value).map_err(|e| invalid(field, e.to_string()))?;
    if duration.is_zero() {
        return Err(invalid(field, "must be greater than zero").into());
    }
    if duration > MAX_DURATION {
        return Err(invalid(field, "must be at most 366 days").into());
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default_config();
        assert_eq!(config.notifications.ttl().unwrap(), Duration::from_secs(5));
        assert_eq!(config.simulator.sample_interval().unwrap(), Duration::from_secs(2));
        assert!(config.simulator.alerts_enabled);
        assert_eq!(config.simulator.projects, vec![1, 2]);
        assert_eq!(config.activity.retention, None);
    }

    #[test]
    fn test_load_full_file() {
        let file = write_config(
            r#"
[notifications]
ttl = "1500ms"

[activity]
retention = 50

[simulator]
sample_interval = "500ms"
alerts_enabled = false
projects = [3, 5]
seed = 9
"#,
        );
        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.notifications.ttl().unwrap(), Duration::from_millis(1_500));
        assert_eq!(config.activity.retention, Some(50));
        assert_eq!(
            config.simulator.sample_interval().unwrap(),
            Duration::from_millis(500)
        );
        assert!(!config.simulator.alerts_enabled);
        assert_eq!(config.simulator.projects, vec![3, 5]);
        assert_eq!(config.simulator.seed, Some(9));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config("[activity]\nretention = 10\n");
        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.activity.retention, Some(10));
        assert_eq!(config.notifications, NotificationsConfig::default());
        assert_eq!(config.simulator, SimulatorConfig::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let file = write_config("[simulator\nprojects = ");
        let err = Config::load_from_path(file.path()).unwrap_err();
        assert!(matches!(err, RegistryError::Config(ConfigError::ParseError(_))));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_bad_duration_is_invalid_value() {
        let file = write_config("[notifications]\nttl = \"soon\"\n");
        let err = Config::load_from_path(file.path()).unwrap_err();
        match err {
            RegistryError::Config(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "notifications.ttl")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        let file = write_config("[simulator]\nsample_interval = \"0s\"\n");
        assert!(Config::load_from_path(file.path()).is_err());
    }

    #[test]
    fn test_out_of_range_ttl_rejected() {
        let file = write_config("[notifications]\nttl = \"400000000years\"\n");
        let err = Config::load_from_path(file.path()).unwrap_err();
        match err {
            RegistryError::Config(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "notifications.ttl")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ttl_just_over_a_year_rejected() {
        let file = write_config("[notifications]\nttl = \"1year 1day\"\n");
        assert!(Config::load_from_path(file.path()).is_err());
    }

    #[test]
    fn test_zero_retention_rejected() {
        let file = write_config("[activity]\nretention = 0\n");
        assert!(Config::load_from_path(file.path()).is_err());
    }

    #[test]
    #[serial]
    fn test_env_var_overrides_path() {
        std::env::set_var(CONFIG_ENV, "/tmp/bluecarbon-test/config.toml");
        let path = resolve_config_path().unwrap();
        std::env::remove_var(CONFIG_ENV);
        assert_eq!(path, PathBuf::from("/tmp/bluecarbon-test/config.toml"));
    }

    #[test]
    #[serial]
    fn test_env_var_expands_tilde() {
        std::env::set_var(CONFIG_ENV, "~/bluecarbon.toml");
        let path = resolve_config_path().unwrap();
        std::env::remove_var(CONFIG_ENV);
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("bluecarbon.toml"));
    }

    #[test]
    #[serial]
    fn test_default_path_under_config_dir() {
        std::env::remove_var(CONFIG_ENV);
        if let Ok(path) = resolve_config_path() {
            assert!(path.ends_with("bluecarbon/config.toml"));
        }
    }
}
