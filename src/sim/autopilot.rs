//! Autopilot input for headless runs and attract mode

use glam::Vec2;

use super::state::GameState;
use super::tick::TickInput;

/// Closer than this to an active trick star, run away from it
const HAZARD_AVOID_RADIUS: f32 = 120.0;
/// Horizontal slack before steering toward a target
const STEER_DEADZONE: f32 = 8.0;
/// Only jump for coins at least this far above
const JUMP_THRESHOLD: f32 = 24.0;

/// Keys a naive player would press this frame
pub fn autopilot_input(state: &GameState) -> TickInput {
    if state.is_game_over() {
        return TickInput::default();
    }

    let player = state.player.pos;

    if state.hazard.active && state.hazard.pos.distance(player) < HAZARD_AVOID_RADIUS {
        let away = player.x >= state.hazard.pos.x;
        return TickInput {
            left: !away,
            right: away,
            up: state.player.grounded,
        };
    }

    let Some(target) = nearest_coin(state, player) else {
        return TickInput::default();
    };

    let dx = target.x - player.x;
    TickInput {
        left: dx < -STEER_DEADZONE,
        right: dx > STEER_DEADZONE,
        up: state.player.grounded && target.y < player.y - JUMP_THRESHOLD,
    }
}

fn nearest_coin(state: &GameState, from: Vec2) -> Option<Vec2> {
    state
        .coins
        .iter()
        .map(|c| c.pos)
        .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Coin, CoinKind, GamePhase};
    use crate::sim::tick::Simulation;
    use crate::tuning::Tuning;

    fn bare_state() -> GameState {
        let mut state = Simulation::new(1, Tuning::default()).state().clone();
        state.coins.clear();
        state.hazard.active = false;
        state
    }

    fn coin_at(x: f32, y: f32) -> Coin {
        Coin {
            id: 1,
            kind: CoinKind::Seven,
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            bounce: 0.5,
            collected: false,
        }
    }

    #[test]
    fn test_idle_without_coins() {
        assert_eq!(autopilot_input(&bare_state()), TickInput::default());
    }

    #[test]
    fn test_steers_to_nearest_coin() {
        let mut state = bare_state();
        state.player.pos = Vec2::new(400.0, 300.0);
        state.coins = vec![coin_at(700.0, 300.0), coin_at(350.0, 300.0)];
        let input = autopilot_input(&state);
        assert!(input.left && !input.right);
    }

    #[test]
    fn test_jumps_for_coin_above_only_when_grounded() {
        let mut state = bare_state();
        state.player.pos = Vec2::new(400.0, 300.0);
        state.coins = vec![coin_at(402.0, 150.0)];

        state.player.grounded = false;
        assert!(!autopilot_input(&state).up);
        state.player.grounded = true;
        let input = autopilot_input(&state);
        assert!(input.up && !input.left && !input.right);
    }

    #[test]
    fn test_flees_active_hazard() {
        let mut state = bare_state();
        state.player.pos = Vec2::new(420.0, 100.0);
        state.hazard.pos = Vec2::new(400.0, 80.0);
        state.hazard.active = true;
        state.coins = vec![coin_at(100.0, 100.0)];
        let input = autopilot_input(&state);
        assert!(input.right && !input.left);
    }

    #[test]
    fn test_nothing_after_game_over() {
        let mut state = bare_state();
        state.coins = vec![coin_at(700.0, 100.0)];
        state.phase = GamePhase::GameOver;
        assert_eq!(autopilot_input(&state), TickInput::default());
    }
}
