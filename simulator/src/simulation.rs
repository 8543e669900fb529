use chrono::Local;
use indicatif::ProgressBar;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, sleep_until, Instant};

use netterm::{display::TraceRenderer, utils::logging, Controller, SimulationError, SimulationNode};

use crate::config::Config;
use crate::progress::ProgressSink;
use crate::simulation_results::{RunParameters, SimulationResults};
use crate::stats::SimulatorStats;

/// How often the progress bar advances
const TICK: Duration = Duration::from_millis(100);
const DRAIN_WAIT: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error("Engine error: {0}")]
    Engine(#[from] SimulationError),
    #[error("Failed to save results: {0}")]
    Results(String),
}

// ------------------------------------------------------------------------------------------------
// Main Simulation Function
// ------------------------------------------------------------------------------------------------

/// Runs one scenario against a fresh engine:
/// start, apply the rate changes at their offsets, stop after the configured
/// duration, wait out the grace period, collect statistics from the console
/// lines, optionally reset, shut down.
pub async fn run_simulation(config: Config, progress: ProgressBar) -> Result<SimulationResults, SimulatorError> {
    let Config { mut simulation, scenario } = config;
    // record the seed so every run can be replayed
    let seed = *simulation.seed.get_or_insert_with(rand::random::<u64>);

    let parameters = RunParameters {
        rate_per_second: simulation.rate_per_second,
        seed,
        duration_secs: scenario.duration_secs,
        delay_min_ms: simulation.delay.min,
        delay_max_ms: simulation.delay.max,
        max_in_flight: simulation.max_in_flight,
        rate_changes: RunParameters::rate_changes_from(&scenario.sorted_rate_changes()),
        stop_grace_ms: scenario.stop_grace_ms,
        reset_at_end: scenario.reset_at_end,
    };
    logging::log("SIMULATOR", "=== Simulation Configuration ===");
    logging::log("SIMULATOR", &format!("Rate: {} packets/s", parameters.rate_per_second));
    logging::log("SIMULATOR", &format!("Duration: {} seconds", parameters.duration_secs));
    logging::log("SIMULATOR", &format!("Seed: {}", seed));
    logging::log("SIMULATOR", "=============================");

    let sink = ProgressSink::new(progress.clone());
    let node = SimulationNode::launch(simulation, Box::new(TraceRenderer), Box::new(sink.clone())).await?;
    let started_at = Local::now();
    let start = Instant::now();
    let end = start + scenario.duration();

    node.start().await;
    let mut pending = scenario.sorted_rate_changes().into_iter().peekable();
    loop {
        let elapsed = start.elapsed();
        while let Some(change) = pending.next_if(|c| Duration::from_secs_f64(c.at_secs) <= elapsed) {
            node.set_rate(change.rate).await;
            progress.set_message(format!("rate {} packets/s", change.rate.max(1)));
            logging::log("SIMULATOR", &format!("Rate changed to {} at {:.1}s", change.rate, elapsed.as_secs_f64()));
        }
        if Instant::now() >= end {
            break;
        }
        progress.set_position((elapsed.as_millis() / TICK.as_millis()) as u64);
        let next_tick = (Instant::now() + TICK).min(end);
        let next_change = pending.peek().map(|c| start + Duration::from_secs_f64(c.at_secs));
        sleep_until(next_change.map_or(next_tick, |at| at.min(next_tick))).await;
    }
    node.stop().await;
    let run_time = start.elapsed();
    progress.finish_with_message("stopped");

    sleep(scenario.stop_grace()).await;
    let final_snapshot = node.snapshot().await;
    // let the drain forward what is still queued before reading the console
    while node.snapshot().await.queued_lines > 0 {
        sleep(DRAIN_WAIT).await;
    }
    let stats = SimulatorStats::from_lines(&sink.lines());

    if scenario.reset_at_end {
        node.reset().await;
        logging::log("SIMULATOR", "Engine reset after collecting statistics");
    }
    node.shutdown().await?;

    let observed_rate = stats.observed_rate(run_time);
    let results = SimulationResults {
        started_at,
        parameters,
        elapsed_secs: run_time.as_secs_f64(),
        observed_rate,
        stats,
        final_snapshot,
    };
    Ok(results)
}
