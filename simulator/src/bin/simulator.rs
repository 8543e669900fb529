use std::env;
use std::time::Duration;

use netterm::utils::logging;
use simulator::{
    config::{Config, DEFAULT_CONFIG_PATH},
    progress::run_progress_bar,
    run_simulation, SimulatorError,
};

// ------------------------------------------------------------------------------------------------
// Main
// ------------------------------------------------------------------------------------------------

/// Loads the scenario, runs it, prints the statistics and saves the results
#[tokio::main]
async fn main() -> Result<(), SimulatorError> {
    logging::init_logging();

    let path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&path)?;
    logging::log("SIMULATOR", &format!("Loaded scenario from {}", path));

    let results_dir = config.scenario.results_dir.clone();
    let progress = run_progress_bar(config.scenario.duration_secs);
    let results = run_simulation(config, progress).await?;

    results.stats.print_final_stats(Duration::from_secs_f64(results.elapsed_secs));
    let saved = results.save(&results_dir).map_err(SimulatorError::Results)?;
    println!("SIMULATOR: Results saved to {}", saved.display());
    Ok(())
}
