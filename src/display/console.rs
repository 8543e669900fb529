use std::io::Write;

use super::{LogSink, Renderer};
use crate::types::{DeviceId, DeviceStatus, PacketColor, PacketId, Position};

/// Lines shown when the console is (re)initialised
const CONSOLE_HEADER: [&str; 3] = [
    "# Network terminal - LAN simulation",
    "### NETWORK CONSOLE",
    "",
];

/// Prints console lines to stdout
#[derive(Debug, Default)]
pub struct ConsoleSink {
    lines_written: u64,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prints the console header, as shown on first launch
    pub fn print_header(&mut self) {
        for line in CONSOLE_HEADER {
            self.write(line);
        }
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    fn write(&mut self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        // a closed stdout only loses display output
        let _ = writeln!(stdout, "{}", line);
        self.lines_written += 1;
    }
}

impl LogSink for ConsoleSink {
    fn append_line(&mut self, line: &str) {
        self.write(line);
    }

    fn clear(&mut self) {
        // a terminal cannot un-print; start a fresh screen instead
        let _ = write!(std::io::stdout().lock(), "\x1B[2J\x1B[H");
        self.print_header();
    }
}

/// Renders by emitting tracing events; useful where there is no canvas
#[derive(Debug, Default)]
pub struct TraceRenderer;

impl Renderer for TraceRenderer {
    fn update_device_status(&mut self, device: &DeviceId, status: DeviceStatus) {
        tracing::debug!(device = %device, status = %status, color = status.indicator_color(), "device status");
    }

    fn draw_packet(&mut self, packet: PacketId, color: PacketColor, at: Position) {
        tracing::debug!(packet = %packet, color = color.0, at = %at, "packet drawn");
    }

    fn update_packet_position(&mut self, packet: PacketId, at: Position) {
        tracing::trace!(packet = %packet, at = %at, "packet moved");
    }

    fn remove_packet(&mut self, packet: PacketId) {
        tracing::debug!(packet = %packet, "packet removed");
    }

    fn reset(&mut self) {
        tracing::debug!("renderer reset");
    }
}
