use anyhow::Context;
use std::path::Path;

use netterm::SimulationConfig;

/// Read by the shell when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "netterm.toml";

/// Loads the engine configuration from `path`. A missing default file means
/// stock settings; a missing explicit file is an error.
pub fn load(path: Option<&str>) -> anyhow::Result<SimulationConfig> {
    let (path, explicit) = match path {
        Some(path) => (path, true),
        None => (DEFAULT_CONFIG_PATH, false),
    };
    if !explicit && !Path::new(path).exists() {
        return Ok(SimulationConfig::default());
    }
    let contents = std::fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path))?;
    let config: SimulationConfig = toml::from_str(&contents).with_context(|| format!("Failed to parse config file {}", path))?;
    config.validate()?;
    Ok(config)
}
