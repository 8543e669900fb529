pub mod config;
pub mod progress;
pub mod simulation;
pub mod simulation_results;
pub mod stats;

pub use progress::ProgressSink;
pub use simulation::{run_simulation, SimulatorError};
pub use simulation_results::SimulationResults;
pub use stats::SimulatorStats;
