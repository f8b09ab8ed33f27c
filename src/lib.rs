//! Level 6-7 - a glitchy single-screen platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level generation, score, gravity, hazard)
//! - `tuning`: Data-driven game balance
//! - `audio`: Scoped per-screen audio playback
//! - `flow`: Start screen / level / void screen flow

pub mod audio;
pub mod flow;
pub mod sim;
pub mod tuning;

pub use flow::{App, Screen};
pub use tuning::{RuleVariant, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame duration (60 Hz host)
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Longest frame the simulation will accept (tab-switch hitches)
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// World dimensions
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    /// Player spawn point (also the reset point)
    pub const SPAWN_X: f32 = 100.0;
    pub const SPAWN_Y: f32 = 450.0;
    /// Player body (phaser-dude sprite is 32x48)
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;
    pub const PLAYER_BOUNCE: f32 = 0.2;

    /// Base world gravity (pixels/s², +y is down)
    pub const BASE_GRAVITY: f32 = 300.0;

    /// Highest score a level can reach
    pub const MAX_SCORE: u32 = 67;

    /// Platform sprite is 400x32, placed at half scale
    pub const PLATFORM_WIDTH: f32 = 400.0;
    pub const PLATFORM_HEIGHT: f32 = 32.0;
    pub const PLATFORM_SCALE: f32 = 0.5;
    pub const PLATFORM_COUNT: usize = 20;
    pub const PLATFORM_BASE_Y: f32 = 580.0;

    /// Moving platform tween (x from START to END and back)
    pub const MOVING_PLATFORM_START_X: f32 = 400.0;
    pub const MOVING_PLATFORM_END_X: f32 = 600.0;
    pub const MOVING_PLATFORM_Y: f32 = 350.0;
    pub const MOVING_PLATFORM_PERIOD_MS: f32 = 3000.0;

    /// Spike obstacle
    pub const SPIKE_X: f32 = 300.0;
    pub const SPIKE_Y: f32 = 560.0;
    pub const SPIKE_SIZE: f32 = 32.0;
    pub const SPIKE_SCALE: f32 = 0.5;

    /// Coins (ball sprites are 17x17)
    pub const COIN_SIZE: f32 = 17.0;
    pub const COIN_COUNT: usize = 80;

    /// Trick star (star sprite is 24x22, drawn at 0.35)
    pub const HAZARD_X: f32 = 400.0;
    pub const HAZARD_Y: f32 = 0.0;
    pub const HAZARD_WIDTH: f32 = 24.0;
    pub const HAZARD_HEIGHT: f32 = 22.0;
    pub const HAZARD_SCALE: f32 = 0.35;
    pub const HAZARD_EXPIRY_MS: f32 = 6700.0;

    /// Glitch sequence played on reaching MAX_SCORE
    pub const GLITCH_FLASHES: u32 = 10;
    pub const GLITCH_FLASH_MS: f32 = 150.0;

    /// Periodic gravity variation
    pub const GRAVITY_VARIATION_MS: f32 = 3000.0;
}

/// Half extents of a sprite drawn at `scale`
#[inline]
pub fn half_extents(width: f32, height: f32, scale: f32) -> Vec2 {
    Vec2::new(width, height) * scale * 0.5
}

/// Sine ease-in-out over `t` in [0, 1]
#[inline]
pub fn sine_ease_in_out(t: f32) -> f32 {
    -0.5 * ((std::f32::consts::PI * t.clamp(0.0, 1.0)).cos() - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_ease_endpoints() {
        assert!(sine_ease_in_out(0.0).abs() < 1e-6);
        assert!((sine_ease_in_out(0.5) - 0.5).abs() < 1e-6);
        assert!((sine_ease_in_out(1.0) - 1.0).abs() < 1e-6);
        // Clamped outside the unit interval
        assert!((sine_ease_in_out(2.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_half_extents() {
        let h = half_extents(consts::PLATFORM_WIDTH, consts::PLATFORM_HEIGHT, consts::PLATFORM_SCALE);
        assert_eq!(h, Vec2::new(100.0, 8.0));
    }
}
