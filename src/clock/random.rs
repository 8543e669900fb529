use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The injected source of randomness. Everything random in a run (endpoint
/// choice, packet size, colour, transit delay) is derived from `next_uniform`.
pub trait RandomSource: Send {
    /// A uniform sample in `[0, 1)`
    fn next_uniform(&mut self) -> f64;

    /// A uniform index in `0..len`; `len` must be non-zero
    fn pick_index(&mut self, len: usize) -> usize {
        let index = (self.next_uniform() * len as f64) as usize;
        index.min(len.saturating_sub(1))
    }

    /// A uniform integer in `low..=high`
    fn uniform_inclusive(&mut self, low: u64, high: u64) -> u64 {
        if high <= low {
            return low;
        }
        let span = (high - low).saturating_add(1) as f64;
        let offset = (self.next_uniform() * span) as u64;
        low + offset.min(high - low)
    }
}

/// [`RandomSource`] backed by a seedable `StdRng`
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Seeded from `seed`, or from OS entropy when `None`
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl RandomSource for SeededRandom {
    fn next_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of uniforms, cycling when it runs out
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    next: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f64>) -> Self {
        let values = values.into_iter().map(|v| v.clamp(0.0, 0.999_999)).collect();
        Self { values, next: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_uniform(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}
