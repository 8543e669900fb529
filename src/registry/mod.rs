//! Per-device status shared by every packet task and painted by the renderer.
//!
//! Tasks hold a status while they act at a device. The shown status is the most
//! recently acquired hold that is still active, idle when there is none. Every
//! mutation is checked against a cancellation token under the registry lock, so
//! once a token is cancelled its holder can no longer touch the display.

use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::display::Renderer;
use crate::types::{DeviceId, DeviceStatus, PacketColor, PacketId, Position, Topology};

/// The internal state of the registry
struct RegistryState {
    /// Active holds per device, oldest first
    holds: BTreeMap<DeviceId, Vec<DeviceStatus>>,
    /// What the renderer currently shows per device
    shown: BTreeMap<DeviceId, DeviceStatus>,
    renderer: Box<dyn Renderer>,
}

pub struct DeviceRegistry {
    state: Mutex<RegistryState>,
}

impl RegistryState {
    fn repaint(&mut self, device: &DeviceId) {
        let status = self
            .holds
            .get(device)
            .and_then(|holds| holds.last().copied())
            .unwrap_or(DeviceStatus::Idle);
        let previous = self.shown.insert(device.clone(), status);
        if previous != Some(status) {
            self.renderer.update_device_status(device, status);
        }
    }
}

impl DeviceRegistry {
    pub fn new(topology: &Topology, renderer: Box<dyn Renderer>) -> Self {
        let holds = topology.devices().map(|d| (d.id.clone(), Vec::new())).collect();
        let shown = topology.devices().map(|d| (d.id.clone(), DeviceStatus::Idle)).collect();
        Self {
            state: Mutex::new(RegistryState { holds, shown, renderer }),
        }
    }

    /// Hold `status` at `device`. Returns false, changing nothing, when
    /// `guard` is cancelled or the device is unknown.
    pub async fn acquire(&self, guard: &CancellationToken, device: &DeviceId, status: DeviceStatus) -> bool {
        if status.is_idle() {
            return false;
        }
        let mut state = self.state.lock().await;
        if guard.is_cancelled() {
            return false;
        }
        match state.holds.get_mut(device) {
            Some(holds) => holds.push(status),
            None => return false,
        }
        state.repaint(device);
        true
    }

    /// Drop one hold of `status` at `device`, unless `guard` is cancelled
    pub async fn release(&self, guard: &CancellationToken, device: &DeviceId, status: DeviceStatus) {
        let mut state = self.state.lock().await;
        if guard.is_cancelled() {
            return;
        }
        let Some(holds) = state.holds.get_mut(device) else {
            return;
        };
        if let Some(index) = holds.iter().rposition(|held| *held == status) {
            holds.remove(index);
            state.repaint(device);
        }
    }

    pub async fn draw_packet(&self, guard: &CancellationToken, packet: PacketId, color: PacketColor, at: Position) -> bool {
        let mut state = self.state.lock().await;
        if guard.is_cancelled() {
            return false;
        }
        state.renderer.draw_packet(packet, color, at);
        true
    }

    pub async fn move_packet(&self, guard: &CancellationToken, packet: PacketId, at: Position) -> bool {
        let mut state = self.state.lock().await;
        if guard.is_cancelled() {
            return false;
        }
        state.renderer.update_packet_position(packet, at);
        true
    }

    pub async fn remove_packet(&self, guard: &CancellationToken, packet: PacketId) {
        let mut state = self.state.lock().await;
        if guard.is_cancelled() {
            return;
        }
        state.renderer.remove_packet(packet);
    }

    /// Every device idle, no holds, renderer back to its initial display
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        for holds in state.holds.values_mut() {
            holds.clear();
        }
        for shown in state.shown.values_mut() {
            *shown = DeviceStatus::Idle;
        }
        state.renderer.reset();
    }

    pub async fn status(&self, device: &DeviceId) -> Option<DeviceStatus> {
        self.state.lock().await.shown.get(device).copied()
    }

    pub async fn snapshot(&self) -> BTreeMap<DeviceId, DeviceStatus> {
        self.state.lock().await.shown.clone()
    }

    pub async fn all_idle(&self) -> bool {
        self.state.lock().await.shown.values().all(DeviceStatus::is_idle)
    }
}
