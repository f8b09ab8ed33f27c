//! Coin and trick star placement

use glam::Vec2;

use super::rng::RandomSource;
use super::state::{Coin, CoinKind, Hazard};
use crate::consts::*;

/// Coin spawn area (inclusive pixel bounds)
pub const COIN_MIN_X: i32 = 50;
pub const COIN_MAX_X: i32 = 750;
pub const COIN_MIN_Y: i32 = 50;
pub const COIN_MAX_Y: i32 = 400;

/// Coin vertical bounce range
pub const COIN_BOUNCE: (f32, f32) = (0.3, 1.0);
/// Trick star vertical bounce range
pub const HAZARD_BOUNCE: (f32, f32) = (0.4, 0.8);

/// Roll a coin kind: a "6" when uniform(0, 7) comes up 0, otherwise a "7"
pub fn roll_coin_kind(rng: &mut impl RandomSource) -> CoinKind {
    if rng.int_between(0, 7) == 0 {
        CoinKind::Six
    } else {
        CoinKind::Seven
    }
}

/// Spawn `n` coins scattered over the upper part of the screen.
///
/// `next_id` supplies entity ids so coins stay unique across resets.
pub fn spawn_coins(
    rng: &mut impl RandomSource,
    n: usize,
    mut next_id: impl FnMut() -> u32,
) -> Vec<Coin> {
    (0..n)
        .map(|_| {
            let kind = roll_coin_kind(rng);
            let x = rng.int_between(COIN_MIN_X, COIN_MAX_X) as f32;
            let y = rng.int_between(COIN_MIN_Y, COIN_MAX_Y) as f32;
            let bounce = rng.float_between(COIN_BOUNCE.0, COIN_BOUNCE.1);
            Coin {
                id: next_id(),
                kind,
                pos: Vec2::new(x, y),
                vel: Vec2::ZERO,
                bounce,
                collected: false,
            }
        })
        .collect()
}

/// Spawn the trick star at its fixed drop point, active.
///
/// Expiry is scheduled by the owner of the level timers.
pub fn spawn_hazard(rng: &mut impl RandomSource) -> Hazard {
    Hazard {
        pos: Vec2::new(HAZARD_X, HAZARD_Y),
        vel: Vec2::ZERO,
        bounce: rng.float_between(HAZARD_BOUNCE.0, HAZARD_BOUNCE.1),
        scale: HAZARD_SCALE,
        active: true,
        expiry: None,
    }
}
