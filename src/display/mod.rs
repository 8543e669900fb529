//! Seams to the outside world: the renderer that draws devices and packets,
//! and the sink that shows console lines.

use crate::types::{DeviceId, DeviceStatus, PacketColor, PacketId, Position};

pub mod console;
pub mod memory;

pub use console::{ConsoleSink, TraceRenderer};
pub use memory::{MemorySink, RecordingRenderer, RenderEvent};

/// Draws devices and travelling packets
pub trait Renderer: Send {
    /// Repaint a device's status indicator
    fn update_device_status(&mut self, device: &DeviceId, status: DeviceStatus);

    /// Place a new packet on the canvas
    fn draw_packet(&mut self, packet: PacketId, color: PacketColor, at: Position);

    /// Move an already drawn packet
    fn update_packet_position(&mut self, packet: PacketId, at: Position);

    /// Take a packet off the canvas
    fn remove_packet(&mut self, packet: PacketId);

    /// Return to the initial display: every device idle, no packets
    fn reset(&mut self);
}

/// Displays console lines in the order they are handed over
pub trait LogSink: Send {
    fn append_line(&mut self, line: &str);

    /// Return to the initial display
    fn clear(&mut self);
}
