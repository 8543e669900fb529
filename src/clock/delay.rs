use serde::Deserialize;
use std::time::Duration;

use super::RandomSource;

/// An inclusive integer range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UniformRange {
    pub min: u64,
    pub max: u64,
}

impl UniformRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn contains(&self, value: u64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn sample(&self, random: &mut dyn RandomSource) -> u64 {
        random.uniform_inclusive(self.min, self.max)
    }
}

/// Produces the randomized end-to-end transit delay of a packet
#[derive(Debug, Clone, Copy)]
pub struct DelayModel {
    range_ms: UniformRange,
}

impl DelayModel {
    pub fn new(range_ms: UniformRange) -> Self {
        Self { range_ms }
    }

    /// A model that always yields `delay`
    pub fn fixed(delay: Duration) -> Self {
        let ms = delay.as_millis() as u64;
        Self { range_ms: UniformRange::new(ms, ms) }
    }

    pub fn range_ms(&self) -> UniformRange {
        self.range_ms
    }

    pub fn sample(&self, random: &mut dyn RandomSource) -> Duration {
        Duration::from_millis(self.range_ms.sample(random))
    }
}

/// Splits `total` into slices of at most `slice`; the last slice carries the
/// remainder so the slices always add up to `total`.
pub fn slices(total: Duration, slice: Duration) -> impl Iterator<Item = Duration> {
    let mut remaining = total;
    std::iter::from_fn(move || {
        if remaining.is_zero() || slice.is_zero() {
            return None;
        }
        let next = remaining.min(slice);
        remaining -= next;
        Some(next)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ScriptedRandom, SeededRandom};

    #[test]
    fn test_delay_within_bounds() {
        let model = DelayModel::new(UniformRange::new(2000, 4000));
        let mut random = SeededRandom::new(Some(7));
        for _ in 0..1000 {
            let delay = model.sample(&mut random).as_millis() as u64;
            assert!((2000..=4000).contains(&delay), "delay {} out of range", delay);
        }
    }

    #[test]
    fn test_quarter_uniform_gives_2500ms() {
        let model = DelayModel::new(UniformRange::new(2000, 4000));
        let mut random = ScriptedRandom::new(vec![0.25]);
        assert_eq!(model.sample(&mut random), Duration::from_millis(2500));
    }

    #[test]
    fn test_fixed_model() {
        let model = DelayModel::fixed(Duration::from_millis(2500));
        let mut random = SeededRandom::new(None);
        assert_eq!(model.sample(&mut random), Duration::from_millis(2500));
    }

    #[test]
    fn test_slices_sum_to_total() {
        let parts: Vec<Duration> = slices(Duration::from_millis(333), Duration::from_millis(100)).collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[3], Duration::from_millis(33));
        assert_eq!(parts.iter().sum::<Duration>(), Duration::from_millis(333));

        assert_eq!(slices(Duration::ZERO, Duration::from_millis(100)).count(), 0);
    }
}
