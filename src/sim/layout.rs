//! Level layout generation
//!
//! Platforms form a staircase climbing up and to the right, each step
//! jittered a little so no two levels are identical.

use glam::Vec2;

use super::rng::RandomSource;
use super::state::Platform;
use crate::consts::PLATFORM_SCALE;

/// Horizontal distance between consecutive steps
pub const STEP_X: f32 = 150.0;
/// Vertical rise between consecutive steps
pub const STEP_Y: f32 = 100.0;
/// x of the first step before jitter
pub const FIRST_X: f32 = 100.0;
/// Max horizontal jitter (either direction)
pub const JITTER_X: i32 = 40;
/// Max vertical jitter (either direction)
pub const JITTER_Y: i32 = 25;

/// Generate `count` platforms starting at `base_y`.
///
/// Step `i` sits at `x = 100 + 150i ± 40`, `y = base_y - 100i ± 25`.
/// Always returns exactly `count` platforms.
pub fn generate_platforms(rng: &mut impl RandomSource, count: usize, base_y: f32) -> Vec<Platform> {
    (0..count)
        .map(|i| {
            let i = i as f32;
            let x = FIRST_X + i * STEP_X + rng.int_between(-JITTER_X, JITTER_X) as f32;
            let y = base_y - i * STEP_Y + rng.int_between(-JITTER_Y, JITTER_Y) as f32;
            Platform {
                pos: Vec2::new(x, y),
                scale: PLATFORM_SCALE,
            }
        })
        .collect()
}
