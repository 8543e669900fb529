//! Statistics recovered from the console lines of a run.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

lazy_static! {
    static ref GENERATED_PATTERN: Regex =
        Regex::new(r"^\[(\d{2}:\d{2}:\d{2}\.\d{3})\] Packet #(\d+): (\S+) -> (\S+), Size: (\d+) bytes$").unwrap();
    static ref DELIVERED_PATTERN: Regex =
        Regex::new(r"^\[(\d{2}:\d{2}:\d{2}\.\d{3})\] Packet #(\d+) delivered on (\S+) \(delay: (\d+) ms\)$").unwrap();
    static ref SWITCH_PATTERN: Regex = Regex::new(r"^\[(\d{2}:\d{2}:\d{2}\.\d{3})\] Packet #(\d+) reached (\S+)$").unwrap();
    static ref TOTAL_PATTERN: Regex = Regex::new(r"^Total packets sent: (\d+)$").unwrap();
}

/// Transit delays of the delivered packets, in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DelayStats {
    pub min_ms: u64,
    pub max_ms: u64,
    pub avg_ms: f64,
}

/// Tracks what a run logged
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulatorStats {
    pub packets_generated: u64,
    pub packets_delivered: u64,
    pub total_bytes: u64,
    /// Highest packet id seen; equals `packets_generated` when ids have no gaps
    pub last_packet_id: u64,
    /// The count printed by the last stop banner
    pub reported_total: Option<u64>,
    /// Switch lines whose timestamp is earlier than a line printed before them
    pub out_of_order_switch_lines: u64,
    pub delays: Option<DelayStats>,
    pub generated_per_source: BTreeMap<String, u64>,
    pub delivered_per_destination: BTreeMap<String, u64>,
}

impl SimulatorStats {
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut stats = Self::default();
        let mut delays: Vec<u64> = Vec::new();
        // HH:MM:SS.mmm compares correctly as text within one day
        let mut latest_stamp: Option<String> = None;

        for line in lines.iter().map(AsRef::as_ref) {
            if let Some(caps) = GENERATED_PATTERN.captures(line) {
                stats.packets_generated += 1;
                stats.last_packet_id = stats.last_packet_id.max(caps[2].parse().unwrap_or(0));
                *stats.generated_per_source.entry(caps[3].to_string()).or_default() += 1;
                stats.total_bytes += caps[5].parse::<u64>().unwrap_or(0);
                Self::advance(&mut latest_stamp, &caps[1]);
            } else if let Some(caps) = DELIVERED_PATTERN.captures(line) {
                stats.packets_delivered += 1;
                *stats.delivered_per_destination.entry(caps[3].to_string()).or_default() += 1;
                if let Ok(delay) = caps[4].parse() {
                    delays.push(delay);
                }
                Self::advance(&mut latest_stamp, &caps[1]);
            } else if let Some(caps) = SWITCH_PATTERN.captures(line) {
                if latest_stamp.as_deref().is_some_and(|latest| &caps[1] < latest) {
                    stats.out_of_order_switch_lines += 1;
                }
                Self::advance(&mut latest_stamp, &caps[1]);
            } else if let Some(caps) = TOTAL_PATTERN.captures(line) {
                stats.reported_total = caps[1].parse().ok();
            }
        }

        if !delays.is_empty() {
            let sum: u64 = delays.iter().sum();
            stats.delays = Some(DelayStats {
                min_ms: delays.iter().copied().min().unwrap_or(0),
                max_ms: delays.iter().copied().max().unwrap_or(0),
                avg_ms: sum as f64 / delays.len() as f64,
            });
        }
        stats
    }

    fn advance(latest: &mut Option<String>, stamp: &str) {
        if latest.as_deref().map_or(true, |current| stamp > current) {
            *latest = Some(stamp.to_string());
        }
    }

    /// Packets generated per second over `duration`
    pub fn observed_rate(&self, duration: Duration) -> f64 {
        if duration.is_zero() {
            return 0.0;
        }
        self.packets_generated as f64 / duration.as_secs_f64()
    }

    /// Prints the final statistics
    pub fn print_final_stats(&self, duration: Duration) {
        println!("SIMULATOR: === Final Statistics ===");
        println!("SIMULATOR: Packets generated: {}", self.packets_generated);
        println!("SIMULATOR: Packets delivered: {}", self.packets_delivered);
        if let Some(total) = self.reported_total {
            println!("SIMULATOR: Reported by stop banner: {}", total);
        }
        println!("SIMULATOR: Observed rate: {:.2} packets/s", self.observed_rate(duration));
        if let Some(delays) = &self.delays {
            println!(
                "SIMULATOR: Delay min/avg/max: {} / {:.1} / {} ms",
                delays.min_ms, delays.avg_ms, delays.max_ms
            );
        }
        println!("SIMULATOR: Out-of-order switch lines: {}", self.out_of_order_switch_lines);
        println!("SIMULATOR: ========================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_a_short_run() {
        let lines = [
            "",
            "==================================================",
            "Packet transmission started",
            "==================================================",
            "[10:00:00.000] Packet #1: PC2 -> PC1, Size: 450 bytes",
            "[10:00:00.333] Packet #2: PC3 -> PC4, Size: 100 bytes",
            "[10:00:02.500] Packet #1 delivered on PC1 (delay: 2500 ms)",
            "[10:00:01.250] Packet #1 reached SWITCH",
            "[10:00:03.333] Packet #2 delivered on PC4 (delay: 3000 ms)",
            "[10:00:01.833] Packet #2 reached SWITCH",
            "",
            "[10:00:04] Packet transmission stopped",
            "Total packets sent: 2",
            "--------------------------------------------------",
        ];
        let stats = SimulatorStats::from_lines(&lines);

        assert_eq!(stats.packets_generated, 2);
        assert_eq!(stats.packets_delivered, 2);
        assert_eq!(stats.last_packet_id, 2);
        assert_eq!(stats.total_bytes, 550);
        assert_eq!(stats.reported_total, Some(2));
        assert_eq!(stats.out_of_order_switch_lines, 2);
        assert_eq!(stats.delays, Some(DelayStats { min_ms: 2500, max_ms: 3000, avg_ms: 2750.0 }));
        assert_eq!(stats.delivered_per_destination.get("PC4"), Some(&1));
        assert_eq!(stats.observed_rate(Duration::from_secs(4)), 0.5);
    }

    #[test]
    fn test_empty_log() {
        let stats = SimulatorStats::from_lines::<&str>(&[]);
        assert_eq!(stats, SimulatorStats::default());
        assert_eq!(stats.observed_rate(Duration::ZERO), 0.0);
    }
}
