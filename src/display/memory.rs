use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{LogSink, Renderer};
use crate::types::{DeviceId, DeviceStatus, PacketColor, PacketId, Position};

/// One call received by a [`RecordingRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    DeviceStatus(DeviceId, DeviceStatus),
    Draw(PacketId, PacketColor, Position),
    Move(PacketId, Position),
    Remove(PacketId),
    Reset,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Keeps every line in memory. Clones share the same buffer, so a test can
/// hand one clone to the engine and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<MemorySinkState>>,
}

#[derive(Debug, Default)]
struct MemorySinkState {
    lines: Vec<String>,
    clears: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines received since the last clear
    pub fn lines(&self) -> Vec<String> {
        lock(&self.inner).lines.clone()
    }

    pub fn clear_count(&self) -> usize {
        lock(&self.inner).clears
    }

    pub fn contains(&self, needle: &str) -> bool {
        lock(&self.inner).lines.iter().any(|line| line.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn append_line(&mut self, line: &str) {
        lock(&self.inner).lines.push(line.to_string());
    }

    fn clear(&mut self) {
        let mut state = lock(&self.inner);
        state.lines.clear();
        state.clears += 1;
    }
}

/// Records renderer calls and tracks what is currently on the canvas
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    inner: Arc<Mutex<RecordingState>>,
}

#[derive(Debug, Default)]
struct RecordingState {
    events: Vec<RenderEvent>,
    statuses: BTreeMap<DeviceId, DeviceStatus>,
    packets: HashMap<PacketId, Position>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        lock(&self.inner).events.clone()
    }

    /// Last status painted for `device`, idle if never painted
    pub fn device_status(&self, device: &DeviceId) -> DeviceStatus {
        lock(&self.inner).statuses.get(device).copied().unwrap_or_default()
    }

    /// Packets currently drawn
    pub fn live_packets(&self) -> Vec<PacketId> {
        let mut packets: Vec<PacketId> = lock(&self.inner).packets.keys().copied().collect();
        packets.sort();
        packets
    }

    /// Positions a packet was moved through, in order
    pub fn path_of(&self, packet: PacketId) -> Vec<Position> {
        lock(&self.inner)
            .events
            .iter()
            .filter_map(|event| match event {
                RenderEvent::Draw(id, _, at) | RenderEvent::Move(id, at) if *id == packet => Some(*at),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn update_device_status(&mut self, device: &DeviceId, status: DeviceStatus) {
        let mut state = lock(&self.inner);
        state.statuses.insert(device.clone(), status);
        state.events.push(RenderEvent::DeviceStatus(device.clone(), status));
    }

    fn draw_packet(&mut self, packet: PacketId, color: PacketColor, at: Position) {
        let mut state = lock(&self.inner);
        state.packets.insert(packet, at);
        state.events.push(RenderEvent::Draw(packet, color, at));
    }

    fn update_packet_position(&mut self, packet: PacketId, at: Position) {
        let mut state = lock(&self.inner);
        state.packets.insert(packet, at);
        state.events.push(RenderEvent::Move(packet, at));
    }

    fn remove_packet(&mut self, packet: PacketId) {
        let mut state = lock(&self.inner);
        state.packets.remove(&packet);
        state.events.push(RenderEvent::Remove(packet));
    }

    fn reset(&mut self) {
        let mut state = lock(&self.inner);
        state.statuses.clear();
        state.packets.clear();
        state.events.push(RenderEvent::Reset);
    }
}
