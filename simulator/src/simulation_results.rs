use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use netterm::utils::logging;
use netterm::SimulationSnapshot;

use crate::config::RateChange;
use crate::stats::SimulatorStats;

/// Scenario parameters as they were run
#[derive(Debug, Clone, Serialize)]
pub struct RunParameters {
    pub rate_per_second: u32,
    pub seed: u64,
    pub duration_secs: f64,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub max_in_flight: Option<usize>,
    pub rate_changes: Vec<(f64, u32)>,
    pub stop_grace_ms: u64,
    pub reset_at_end: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationResults {
    pub started_at: DateTime<Local>,
    pub parameters: RunParameters,
    pub elapsed_secs: f64,
    pub observed_rate: f64,
    pub stats: SimulatorStats,
    /// Engine state right after the grace period
    pub final_snapshot: SimulationSnapshot,
}

impl RunParameters {
    pub fn rate_changes_from(changes: &[RateChange]) -> Vec<(f64, u32)> {
        changes.iter().map(|change| (change.at_secs, change.rate)).collect()
    }
}

impl SimulationResults {
    /// Saves the results as pretty JSON into `dir`, named after the start time
    pub fn save(&self, dir: &str) -> Result<PathBuf, String> {
        fs::create_dir_all(dir).map_err(|e| e.to_string())?;
        let path = PathBuf::from(dir).join(format!("results_{}.json", self.started_at.format("%Y%m%d_%H%M%S")));
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(&path, json).map_err(|e| e.to_string())?;
        logging::log("SIMULATOR", &format!("Saved results to {}", path.display()));
        Ok(path)
    }
}
