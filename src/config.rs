//! Engine configuration.
//! Every field has a default, so an empty table deserializes to the stock simulation.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::clock::{DelayModel, UniformRange};
use crate::types::{DeviceId, Position, Topology, TopologyError};

/// Upper bound on the cancellation polling slice
pub const MAX_POLL_SLICE_MS: u64 = 100;
/// Longest transit delay a packet may be given (one hour)
pub const MAX_DELAY_MS: u64 = 3_600_000;
/// Largest packet size that can be drawn
pub const MAX_PACKET_SIZE_BYTES: u64 = 65_535;

// ------------------------------------------------------------------------------------------------
// Configuration Structs
// ------------------------------------------------------------------------------------------------

/// Parameters of the packet simulation engine
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    /// Packets generated per second; 0 is treated as 1
    pub rate_per_second: u32,
    /// End-to-end transit delay range in milliseconds
    pub delay: UniformRange,
    /// Packet size range in bytes
    pub size: UniformRange,
    /// Longest sleep between two cancellation checks, in milliseconds
    pub poll_slice_ms: u64,
    /// Timing of the packet animation
    pub animation: AnimationConfig,
    /// Maximum number of packets travelling at once (unbounded when unset)
    pub max_in_flight: Option<usize>,
    /// Seed for the random source (OS entropy when unset)
    pub seed: Option<u64>,
    /// Custom star topology (four PCs around one switch when unset)
    pub topology: Option<TopologyConfig>,
}

/// Timing of the source -> switch -> destination animation
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AnimationConfig {
    /// Interpolation steps per leg
    pub steps: u32,
    /// Pause after each step, in milliseconds
    pub step_ms: u64,
    /// Pause at the switch between the two legs, in milliseconds
    pub switch_pause_ms: u64,
    /// Pause at the destination before the packet is removed, in milliseconds
    pub arrival_pause_ms: u64,
}

/// A custom star topology
#[derive(Debug, Deserialize, Clone)]
pub struct TopologyConfig {
    pub endpoints: Vec<DevicePlacement>,
    pub switch: DevicePlacement,
}

/// Name and canvas position of one device
#[derive(Debug, Deserialize, Clone)]
pub struct DevicePlacement {
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rate_per_second: 3,
            delay: UniformRange::new(2000, 4000),
            size: UniformRange::new(100, 1500),
            poll_slice_ms: MAX_POLL_SLICE_MS,
            animation: AnimationConfig::default(),
            max_in_flight: None,
            seed: None,
            topology: None,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            steps: 50,
            step_ms: 20,
            switch_pause_ms: 300,
            arrival_pause_ms: 500,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Error Types and Validation
// ------------------------------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
    #[error("Invalid topology: {0}")]
    TopologyError(#[from] TopologyError),
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.delay.is_valid() {
            return Err(ConfigError::ValidationError("Delay min must not exceed delay max".into()));
        }
        if self.delay.max > MAX_DELAY_MS {
            return Err(ConfigError::ValidationError(format!("Delay max must be at most {} ms", MAX_DELAY_MS)));
        }
        if !self.size.is_valid() {
            return Err(ConfigError::ValidationError("Size min must not exceed size max".into()));
        }
        if self.size.max > MAX_PACKET_SIZE_BYTES {
            return Err(ConfigError::ValidationError(format!(
                "Size max must be at most {} bytes",
                MAX_PACKET_SIZE_BYTES
            )));
        }
        if self.poll_slice_ms == 0 {
            return Err(ConfigError::ValidationError("Poll slice must be positive".into()));
        }
        if self.poll_slice_ms > MAX_POLL_SLICE_MS {
            return Err(ConfigError::ValidationError(format!(
                "Poll slice must be at most {} ms",
                MAX_POLL_SLICE_MS
            )));
        }
        if self.animation.steps == 0 {
            return Err(ConfigError::ValidationError("Animation steps must be positive".into()));
        }
        if self.max_in_flight == Some(0) {
            return Err(ConfigError::ValidationError("Max in-flight packets must be positive".into()));
        }
        if let Some(topology) = &self.topology {
            topology.build()?;
        }
        Ok(())
    }

    /// The configured topology, or the default star
    pub fn build_topology(&self) -> Result<Topology, ConfigError> {
        match &self.topology {
            Some(topology) => topology.build(),
            None => Ok(Topology::default_star()),
        }
    }

    pub fn poll_slice(&self) -> Duration {
        Duration::from_millis(self.poll_slice_ms)
    }

    pub fn delay_model(&self) -> DelayModel {
        DelayModel::new(self.delay)
    }
}

impl TopologyConfig {
    pub fn build(&self) -> Result<Topology, ConfigError> {
        let endpoints = self.endpoints.iter().map(DevicePlacement::placement).collect();
        Ok(Topology::star(endpoints, self.switch.placement())?)
    }
}

impl DevicePlacement {
    fn placement(&self) -> (DeviceId, Position) {
        (DeviceId::new(self.name.clone()), Position::new(self.x, self.y))
    }
}

impl AnimationConfig {
    pub fn step(&self) -> Duration {
        Duration::from_millis(self.step_ms)
    }

    pub fn switch_pause(&self) -> Duration {
        Duration::from_millis(self.switch_pause_ms)
    }

    pub fn arrival_pause(&self) -> Duration {
        Duration::from_millis(self.arrival_pause_ms)
    }
}

/// Clamps a requested rate to the supported minimum of 1 packet per second
pub fn clamp_rate(rate: u32) -> u32 {
    rate.max(1)
}
