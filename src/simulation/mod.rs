use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::clock::delay::slices;
use crate::config::ConfigError;

pub mod animate;
pub mod deliver;
pub mod generator;
pub mod node;

pub use animate::{AnimationOutcome, Hop, Leg, Step, Trajectory};
pub use node::{SimulationNode, SimulationSnapshot};

#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Simulation already shut down")]
    AlreadyShutDown,
    #[error("Background task failed: {0}")]
    Task(String),
}

/// The operations an external controller (buttons, shell, scenario script)
/// issues. None of them fail and none of them wait for in-flight packets.
#[async_trait]
pub trait Controller: Send + Sync {
    /// Begin generating packets; a no-op while running
    async fn start(&self);

    /// Request every task of the current run to stop; a no-op while idle
    async fn stop(&self);

    /// Change the generation rate from the next cycle on; 0 is treated as 1
    async fn set_rate(&self, rate_per_second: u32);

    /// Stop if running, then return to the first-launch state
    async fn reset(&self);
}

/// Where the controller state machine is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Never started, or reset
    Initial,
    Running,
    Stopped,
}

/// Run state and counters, one per simulation
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub phase: Phase,
    pub running: bool,
    /// Level-triggered: stays set until the next `start` or `reset`
    pub stop_requested: bool,
    pub rate_per_second: u32,
    /// Id of the last generated packet
    pub sequence_counter: u64,
    /// Packets generated; what the stop banner reports
    pub packets_generated: u64,
    /// Packets whose deliver task completed
    pub packets_delivered: u64,
}

impl SimulationState {
    pub fn initial(rate_per_second: u32) -> Self {
        Self {
            phase: Phase::Initial,
            running: false,
            stop_requested: false,
            rate_per_second,
            sequence_counter: 0,
            packets_generated: 0,
            packets_delivered: 0,
        }
    }
}

/// The cancellation tokens a packet task is spawned with.
///
/// `run` is cancelled by `stop` and gates progress: moving, logging, counting.
/// `session` is only cancelled by `reset` and gates cleanup, so a stopped task
/// can still tidy up after itself while a task from before a reset cannot touch
/// anything.
#[derive(Debug, Clone)]
pub struct RunTokens {
    pub run: CancellationToken,
    pub session: CancellationToken,
}

impl RunTokens {
    pub fn is_stopped(&self) -> bool {
        self.run.is_cancelled()
    }
}

/// Sleep for `total` in slices of at most `slice`, polling `token` before
/// every slice. Returns false as soon as the token is seen cancelled.
pub async fn pause(total: Duration, slice: Duration, token: &CancellationToken) -> bool {
    for part in slices(total, slice) {
        if token.is_cancelled() {
            return false;
        }
        tokio::time::sleep(part).await;
    }
    !token.is_cancelled()
}
