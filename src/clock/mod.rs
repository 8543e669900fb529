//! Timestamps, the delay model and the injected random source.
//!
//! Durations are measured on tokio's monotonic clock so that tests running on
//! paused time see exact delays. Wall-clock values shown in log lines are
//! derived from a single anchor taken when the [`Clock`] is created.

use chrono::{DateTime, Local, TimeDelta};
use std::time::Duration;
use tokio::time::Instant;

pub mod delay;
pub mod random;

pub use delay::{DelayModel, UniformRange};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};

/// A point in simulated time with its wall-clock rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    instant: Instant,
    wall: DateTime<Local>,
}

impl Timestamp {
    pub fn instant(&self) -> Instant {
        self.instant
    }

    pub fn wall(&self) -> DateTime<Local> {
        self.wall
    }

    /// Elapsed time from `earlier` to `self`, zero if `earlier` is later
    pub fn duration_since(&self, earlier: &Timestamp) -> Duration {
        self.instant.saturating_duration_since(earlier.instant)
    }

    /// This timestamp shifted forward by `offset`
    pub fn offset(&self, offset: Duration) -> Timestamp {
        Timestamp {
            instant: self.instant + offset,
            wall: self.wall + to_delta(offset),
        }
    }

    /// `HH:MM:SS.mmm`, the format of per-packet log lines
    pub fn format_millis(&self) -> String {
        self.wall.format("%H:%M:%S%.3f").to_string()
    }

    /// `HH:MM:SS`, the format of the stop banner
    pub fn format_seconds(&self) -> String {
        self.wall.format("%H:%M:%S").to_string()
    }
}

/// Source of [`Timestamp`]s sharing one wall-clock anchor
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    anchor_instant: Instant,
    anchor_wall: DateTime<Local>,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            anchor_instant: Instant::now(),
            anchor_wall: Local::now(),
        }
    }

    pub fn now(&self) -> Timestamp {
        let instant = Instant::now();
        let elapsed = instant.saturating_duration_since(self.anchor_instant);
        Timestamp {
            instant,
            wall: self.anchor_wall + to_delta(elapsed),
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

fn to_delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::zero())
}
