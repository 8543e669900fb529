use std::fmt;
use std::time::Duration;

use crate::clock::Timestamp;
use crate::types::{DeviceId, PacketId};

/// Colour a packet is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketColor(pub &'static str);

/// One simulated transmission from `source` to `destination` via the switch.
///
/// Created by the generator loop; only its own deliver task writes
/// `delivered_at` and `delay`.
#[derive(Debug, Clone)]
pub struct Packet {
    pub id: PacketId,
    pub source: DeviceId,
    pub destination: DeviceId,
    /// Informational only, in [100, 1500] by default
    pub size_bytes: u64,
    pub color: PacketColor,
    pub created_at: Timestamp,
    pub sent_at: Timestamp,
    pub delivered_at: Option<Timestamp>,
    pub delay: Option<Duration>,
}

impl Packet {
    pub fn new(
        id: PacketId,
        source: DeviceId,
        destination: DeviceId,
        size_bytes: u64,
        color: PacketColor,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            source,
            destination,
            size_bytes,
            color,
            created_at,
            sent_at: created_at,
            delivered_at: None,
            delay: None,
        }
    }

    /// Records successful delivery and computes the transit delay
    pub fn mark_delivered(&mut self, at: Timestamp) {
        self.delivered_at = Some(at);
        self.delay = Some(at.duration_since(&self.sent_at));
    }

    pub fn delay_ms(&self) -> Option<u128> {
        self.delay.map(|d| d.as_millis())
    }

    /// The synthesized "reached the switch" time, halfway through the delay
    pub fn switch_time(&self) -> Option<Timestamp> {
        self.delay.map(|d| self.sent_at.offset(d / 2))
    }

    pub fn is_delivered(&self) -> bool {
        self.delivered_at.is_some()
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Packet #{}: {} -> {}, Size: {} bytes", self.id, self.source, self.destination, self.size_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::types::constants;

    #[tokio::test(start_paused = true)]
    async fn test_mark_delivered_sets_delay_and_switch_time() {
        let clock = Clock::new();
        let mut packet = Packet::new(
            PacketId(1),
            constants::pc_1(),
            constants::pc_3(),
            512,
            PacketColor("#FF6B6B"),
            clock.now(),
        );
        assert!(!packet.is_delivered());
        assert!(packet.switch_time().is_none());

        tokio::time::sleep(Duration::from_millis(3000)).await;
        packet.mark_delivered(clock.now());

        assert_eq!(packet.delay_ms(), Some(3000));
        let switch_time = packet.switch_time().unwrap();
        assert_eq!(switch_time.duration_since(&packet.sent_at), Duration::from_millis(1500));
        assert_eq!(packet.to_string(), "Packet #1: PC1 -> PC3, Size: 512 bytes");
    }
}
