pub mod types;
pub mod config;
pub mod clock;
pub mod display;
pub mod registry;
pub mod log_queue;
pub mod simulation;
pub mod utils;

pub use config::SimulationConfig;
pub use display::{LogSink, Renderer};
pub use simulation::{Controller, SimulationError, SimulationNode, SimulationSnapshot};
