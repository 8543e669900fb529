//! Configuration loader and validator for the simulator.
//! A scenario file holds the engine settings under `[simulation]` and the
//! script to run under `[scenario]`.

use serde::Deserialize;
use std::fs;
use std::time::Duration;
use thiserror::Error;

use netterm::SimulationConfig;

/// Used when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "simulator/config.toml";

// ------------------------------------------------------------------------------------------------
// Configuration Structs
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Engine settings, passed through unchanged
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

/// What the simulator does with the engine
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScenarioConfig {
    /// How long transmission runs before `stop`, in seconds
    pub duration_secs: f64,
    /// Rate changes applied while running, by offset from `start`
    pub rate_changes: Vec<RateChange>,
    /// How long to wait after `stop` before collecting statistics, in milliseconds
    pub stop_grace_ms: u64,
    /// Whether to `reset` the engine once statistics are collected
    pub reset_at_end: bool,
    /// Directory the JSON results are written to
    pub results_dir: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RateChange {
    pub at_secs: f64,
    pub rate: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            duration_secs: 10.0,
            rate_changes: Vec::new(),
            stop_grace_ms: 300,
            reset_at_end: false,
            results_dir: "simulator/results".to_string(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Error Types and Loading
// ------------------------------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Engine(#[from] netterm::config::ConfigError),
}

impl Config {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let config_str = fs::read_to_string(path)?;
        Self::parse(&config_str)
    }

    pub fn parse(config_str: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        let scenario = &self.scenario;
        if !scenario.duration_secs.is_finite() || scenario.duration_secs <= 0.0 {
            return Err(ConfigError::ValidationError("Duration must be positive".into()));
        }
        for change in &scenario.rate_changes {
            if !(0.0..=scenario.duration_secs).contains(&change.at_secs) {
                return Err(ConfigError::ValidationError(format!(
                    "Rate change at {}s lies outside the {}s run",
                    change.at_secs, scenario.duration_secs
                )));
            }
        }
        if scenario.results_dir.is_empty() {
            return Err(ConfigError::ValidationError("Results directory must be set".into()));
        }
        Ok(())
    }
}

impl ScenarioConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }

    /// Rate changes in the order they apply
    pub fn sorted_rate_changes(&self) -> Vec<RateChange> {
        let mut changes = self.rate_changes.clone();
        changes.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            [simulation]
            rate_per_second = 5
            seed = 7

            [scenario]
            duration_secs = 4.0
            stop_grace_ms = 500
            reset_at_end = true
            rate_changes = [
                { at_secs = 3.0, rate = 1 },
                { at_secs = 1.5, rate = 8 },
            ]
            "#,
        )
        .expect("config must parse");

        assert_eq!(config.simulation.rate_per_second, 5);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.scenario.duration(), Duration::from_secs(4));
        assert!(config.scenario.reset_at_end);
        let rates: Vec<u32> = config.scenario.sorted_rate_changes().iter().map(|c| c.rate).collect();
        assert_eq!(rates, vec![8, 1]);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").expect("empty config must parse");
        assert_eq!(config.simulation.rate_per_second, 3);
        assert_eq!(config.scenario.duration_secs, 10.0);
        assert_eq!(config.scenario.results_dir, "simulator/results");
    }

    #[test]
    fn test_rejects_rate_change_after_end() {
        let result = Config::parse(
            r#"
            [scenario]
            duration_secs = 2.0
            rate_changes = [{ at_secs = 5.0, rate = 2 }]
            "#,
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_engine_errors_surface() {
        let result = Config::parse(
            r#"
            [simulation]
            poll_slice_ms = 500
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Engine(_))));
    }
}
