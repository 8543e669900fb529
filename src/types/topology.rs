use std::collections::HashSet;
use thiserror::Error;

use crate::types::constants::{DEFAULT_ENDPOINTS, SWITCH_NAME};
use crate::types::{constants, DeviceId, DeviceKind, Position};

#[derive(Debug, Error, PartialEq)]
pub enum TopologyError {
    #[error("A star topology needs at least 2 endpoints, got {0}")]
    TooFewEndpoints(usize),
    #[error("Duplicate device name: {0}")]
    DuplicateDevice(DeviceId),
}

/// A device placed on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: DeviceId,
    pub kind: DeviceKind,
    pub position: Position,
}

/// N endpoints each wired to one switch; immutable once built
#[derive(Debug, Clone)]
pub struct Topology {
    endpoints: Vec<Device>,
    switch: Device,
}

impl Topology {
    /// Build a star from endpoint placements and the switch placement
    pub fn star(
        endpoints: Vec<(DeviceId, Position)>,
        switch: (DeviceId, Position),
    ) -> Result<Self, TopologyError> {
        if endpoints.len() < 2 {
            return Err(TopologyError::TooFewEndpoints(endpoints.len()));
        }
        let mut seen = HashSet::new();
        for id in endpoints.iter().map(|(id, _)| id).chain(std::iter::once(&switch.0)) {
            if !seen.insert(id.clone()) {
                return Err(TopologyError::DuplicateDevice(id.clone()));
            }
        }
        Ok(Self {
            endpoints: Self::place(endpoints),
            switch: Device { id: switch.0, kind: DeviceKind::Switch, position: switch.1 },
        })
    }

    /// Four PCs in the corners and the switch in the middle
    pub fn default_star() -> Self {
        let endpoints = DEFAULT_ENDPOINTS
            .iter()
            .map(|(name, x, y)| (DeviceId::new(*name), Position::new(*x, *y)))
            .collect();
        Self {
            endpoints: Self::place(endpoints),
            switch: Device {
                id: DeviceId::new(SWITCH_NAME),
                kind: DeviceKind::Switch,
                position: constants::switch_position(),
            },
        }
    }

    fn place(endpoints: Vec<(DeviceId, Position)>) -> Vec<Device> {
        endpoints
            .into_iter()
            .map(|(id, position)| Device { id, kind: DeviceKind::Endpoint, position })
            .collect()
    }

    pub fn endpoints(&self) -> &[Device] {
        &self.endpoints
    }

    pub fn switch(&self) -> &Device {
        &self.switch
    }

    /// Every device, endpoints first
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.endpoints.iter().chain(std::iter::once(&self.switch))
    }

    pub fn device(&self, id: &DeviceId) -> Option<&Device> {
        self.devices().find(|d| &d.id == id)
    }

    pub fn position(&self, id: &DeviceId) -> Option<Position> {
        self.device(id).map(|d| d.position)
    }

    pub fn is_endpoint(&self, id: &DeviceId) -> bool {
        self.endpoints.iter().any(|d| &d.id == id)
    }

    /// Only endpoint<->switch edges exist
    pub fn is_adjacent(&self, a: &DeviceId, b: &DeviceId) -> bool {
        let switch = &self.switch.id;
        (a == switch && self.is_endpoint(b)) || (b == switch && self.is_endpoint(a))
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::default_star()
    }
}
