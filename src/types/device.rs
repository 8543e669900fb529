use serde::{Deserialize, Serialize};
use std::fmt;

/// What a device is on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// A host (PC) that sends and receives packets
    Endpoint,
    /// The single switch every endpoint is wired to
    Switch,
}

/// Status of a device as shown by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceStatus {
    /// No packet is acting at the device
    Idle,
    /// A packet is leaving the device towards the switch
    Sending,
    /// A packet is travelling from the switch into the device
    Receiving,
    /// A packet is pausing at the switch
    Processing,
}

impl DeviceStatus {
    /// Indicator colour a renderer paints for this status
    pub fn indicator_color(&self) -> &'static str {
        match self {
            DeviceStatus::Idle => "#2D3047",
            DeviceStatus::Sending => "#FFD166",
            DeviceStatus::Receiving => "#06D6A0",
            DeviceStatus::Processing => "#7209B7",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DeviceStatus::Idle)
    }
}

impl Default for DeviceStatus {
    fn default() -> Self {
        DeviceStatus::Idle
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Idle => write!(f, "idle"),
            DeviceStatus::Sending => write!(f, "sending"),
            DeviceStatus::Receiving => write!(f, "receiving"),
            DeviceStatus::Processing => write!(f, "processing"),
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Endpoint => write!(f, "pc"),
            DeviceKind::Switch => write!(f, "switch"),
        }
    }
}
