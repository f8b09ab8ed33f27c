//! Random number source
//!
//! The simulation only ever asks for "an integer in [min, max]" or "a float in
//! [min, max)". Production runs use a seeded PCG stream so a seed plus an input
//! sequence replays exactly; tests inject scripted values.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Uniform integers and floats in caller-specified ranges
pub trait RandomSource {
    /// Uniform integer in `[min, max]` (inclusive, like `Phaser.Math.Between`)
    fn int_between(&mut self, min: i32, max: i32) -> i32;

    /// Uniform float in `[min, max)`
    fn float_between(&mut self, min: f32, max: f32) -> f32;
}

impl RandomSource for Pcg32 {
    fn int_between(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.random_range(min..=max)
    }

    fn float_between(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        self.random_range(min..max)
    }
}

/// Seeded PCG stream for a level session
pub fn seeded(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Replays fixed values, falling back to range minimums once exhausted
///
/// Values outside the requested range are clamped into it, so a script can
/// say "as high as possible" with `i32::MAX`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    ints: std::collections::VecDeque<i32>,
    floats: std::collections::VecDeque<f32>,
}

impl ScriptedRandom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ints(mut self, ints: impl IntoIterator<Item = i32>) -> Self {
        self.ints.extend(ints);
        self
    }

    pub fn with_floats(mut self, floats: impl IntoIterator<Item = f32>) -> Self {
        self.floats.extend(floats);
        self
    }

    pub fn push_int(&mut self, value: i32) {
        self.ints.push_back(value);
    }

    pub fn push_float(&mut self, value: f32) {
        self.floats.push_back(value);
    }
}

impl RandomSource for ScriptedRandom {
    fn int_between(&mut self, min: i32, max: i32) -> i32 {
        self.ints.pop_front().map_or(min, |v| v.clamp(min, max.max(min)))
    }

    fn float_between(&mut self, min: f32, max: f32) -> f32 {
        self.floats.pop_front().map_or(min, |v| v.clamp(min, max.max(min)))
    }
}
