//! Configuration loading and typed config structures for the Logisim
//! simulation.
//!
//! The canonical configuration lives in `logisim-config.yaml` at the project
//! root. Every field has a default, so a partial (or empty) file is valid.
//! Two environment variables override the file:
//!
//! - `LOGISIM_SEED` overrides `world.seed`
//! - `LOGISIM_OBSERVER_PORT` overrides `observer.port`

use std::path::Path;

use logisim_spikes::{SchedulerConfig, SpikeError};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The values parsed but are inconsistent.
    #[error("invalid configuration: {source}")]
    Invalid {
        /// The validation failure.
        #[from]
        source: SpikeError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// Spike generation settings.
    #[serde(default)]
    pub spikes: SchedulerConfig,

    /// Isolation alert settings.
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Observer API settings.
    #[serde(default)]
    pub observer: ObserverConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string. No environment
    /// overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] or [`ConfigError::Invalid`].
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.spikes.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    /// Unparsable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(seed) = lookup("LOGISIM_SEED").and_then(|v| v.parse().ok()) {
            self.world.seed = seed;
        }
        if let Some(port) = lookup("LOGISIM_OBSERVER_PORT").and_then(|v| v.parse().ok()) {
            self.observer.port = port;
        }
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Funds available on day 0.
    #[serde(default = "default_starting_funds")]
    pub starting_funds: Decimal,

    /// Real-time milliseconds between automatic day advances (0 = manual).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Days to run in headless mode before stopping (0 = unbounded).
    #[serde(default = "default_max_days")]
    pub max_days: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            starting_funds: default_starting_funds(),
            tick_interval_ms: default_tick_interval_ms(),
            max_days: default_max_days(),
        }
    }
}

/// Isolation alert configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlertConfig {
    /// Total units below which an isolated location raises an alert.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Observer API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Serve the HTTP API instead of running headless.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// TCP port to listen on.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_observer_port(),
        }
    }
}

fn default_world_name() -> String {
    "Logisim".to_owned()
}

const fn default_seed() -> u64 {
    42
}

fn default_starting_funds() -> Decimal {
    Decimal::new(25_000, 0)
}

const fn default_tick_interval_ms() -> u64 {
    5_000
}

const fn default_max_days() -> u64 {
    60
}

const fn default_low_stock_threshold() -> u64 {
    50
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

const fn default_observer_port() -> u16 {
    8080
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use logisim_types::SpikeType;

    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let result = SimulationConfig::parse("");
        assert!(matches!(&result, Ok(c) if *c == SimulationConfig::default()));
        if let Ok(config) = result {
            assert_eq!(config.spikes.max_active_spikes, 2);
            assert_eq!(config.alerts.low_stock_threshold, 50);
        }
    }

    #[test]
    fn partial_yaml_overrides_only_given_fields() {
        let yaml = r#"
world:
  seed: 7
  starting_funds: "1500.50"
spikes:
  cooldown_days: 3
  weights:
    demand: 1
    breakdown: 1
alerts:
  low_stock_threshold: 10
"#;
        let result = SimulationConfig::parse(yaml);
        assert!(result.is_ok(), "{result:?}");
        if let Ok(config) = result {
            assert_eq!(config.world.seed, 7);
            assert_eq!(config.world.starting_funds, Decimal::new(150_050, 2));
            assert_eq!(config.world.name, "Logisim");
            assert_eq!(config.spikes.cooldown_days, 3);
            assert_eq!(config.spikes.max_active_spikes, 2);
            assert_eq!(
                config.spikes.weights,
                BTreeMap::from([(SpikeType::Demand, 1), (SpikeType::Breakdown, 1)])
            );
            assert_eq!(config.alerts.low_stock_threshold, 10);
            assert!(config.observer.enabled);
        }
    }

    #[test]
    fn inconsistent_spike_settings_rejected() {
        let yaml = "spikes:\n  min_duration: 9\n  max_duration: 3\n";
        assert!(matches!(
            SimulationConfig::parse(yaml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn malformed_yaml_rejected() {
        assert!(matches!(
            SimulationConfig::parse("world: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn overrides_apply_parsable_values() {
        let mut config = SimulationConfig::default();
        config.apply_overrides(|key| match key {
            "LOGISIM_SEED" => Some("1234".to_owned()),
            "LOGISIM_OBSERVER_PORT" => Some("not a port".to_owned()),
            _ => None,
        });
        assert_eq!(config.world.seed, 1234);
        assert_eq!(config.observer.port, 8080);
    }

    #[test]
    fn bundled_config_file_parses() {
        let yaml = include_str!("../../../logisim-config.yaml");
        let result = SimulationConfig::parse(yaml);
        assert!(result.is_ok(), "{result:?}");
    }
}
