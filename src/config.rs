use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kernel::time::ClockSource;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "tempo.toml";

/// Range accepted by `setpriority(2)` for nice values.
pub const NICE_RANGE: std::ops::RangeInclusive<i32> = -20..=19;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Top-level config ────────────────────────────────────────────────

/// Full scheduler configuration, parsed from `tempo.toml`.
///
/// Every key has a default, so an empty file (or no file) is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Path of the registry document maintained by the external registrar.
    pub registry: PathBuf,

    /// Sleep between two evaluation passes.
    pub interval_secs: u64,

    /// Length of one blocking throttle.
    pub throttle_secs: u64,

    /// How lower-priority contenders are held back during an overtime escalation.
    pub contention: ContentionPolicy,

    /// Time base of the registry's `start_time_ns` stamps.
    pub clock: ClockSource,

    pub priority: PriorityLevels,
}

fn default_registry() -> PathBuf {
    PathBuf::from("/run/tempo/tasks.json")
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            interval_secs: 5,
            throttle_secs: 5,
            contention: ContentionPolicy::default(),
            clock: ClockSource::default(),
            priority: PriorityLevels::default(),
        }
    }
}

// ── Section configs ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ContentionPolicy {
    /// Block the loop for `throttle_secs` once per contender.
    #[default]
    Throttle,
    /// Stop contenders outright; the global resume continues them.
    Suspend,
}

/// Nice values applied per severity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityLevels {
    pub overtime: i32,
    pub approaching: i32,
    pub halfway: i32,
}

impl Default for PriorityLevels {
    fn default() -> Self {
        Self {
            overtime: -20,
            approaching: -10,
            halfway: 0,
        }
    }
}

// ── Loading ─────────────────────────────────────────────────────────

impl SchedulerConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: SchedulerConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Loads `path` when given (it must exist), else `tempo.toml` if present, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid("interval_secs must be positive".into()));
        }
        let levels = [
            ("overtime", self.priority.overtime),
            ("approaching", self.priority.approaching),
            ("halfway", self.priority.halfway),
        ];
        for (name, value) in levels {
            if !NICE_RANGE.contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "priority.{name} = {value} is outside {}..={}",
                    NICE_RANGE.start(),
                    NICE_RANGE.end()
                )));
            }
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_secs(self.throttle_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = SchedulerConfig::from_toml_str("").unwrap();
        assert_eq!(config, SchedulerConfig::default());
        assert_eq!(config.interval(), Duration::from_secs(5));
        assert_eq!(config.throttle(), Duration::from_secs(5));
        assert_eq!(config.contention, ContentionPolicy::Throttle);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = SchedulerConfig::from_toml_str(
            r#"
            registry = "/tmp/tasks.json"
            throttle_secs = 1
            contention = "suspend"
            clock = "monotonic"

            [priority]
            approaching = -5
            "#,
        )
        .unwrap();

        assert_eq!(config.registry, PathBuf::from("/tmp/tasks.json"));
        assert_eq!(config.interval_secs, 5);
        assert_eq!(config.throttle_secs, 1);
        assert_eq!(config.contention, ContentionPolicy::Suspend);
        assert_eq!(config.clock, ClockSource::Monotonic);
        assert_eq!(config.priority.overtime, -20);
        assert_eq!(config.priority.approaching, -5);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = SchedulerConfig::from_toml_str("interval_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn nice_values_outside_range_are_rejected() {
        let err = SchedulerConfig::from_toml_str("[priority]\novertime = -40").unwrap_err();
        assert!(err.to_string().contains("priority.overtime"));
    }

    #[test]
    fn unknown_contention_policy_fails_to_parse() {
        let err = SchedulerConfig::from_toml_str(r#"contention = "kill""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = SchedulerConfig::discover(Some(Path::new("/nonexistent/tempo.toml")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
