//! Simulation core
//!
//! Owns the level state, its RNG and its timers. The host calls `tick` once
//! per rendered frame with the current key state, then reports contacts from
//! its physics step through the `on_*` handlers. Nothing in here can fail;
//! handlers return whether they had any effect.

use rand_pcg::Pcg32;

use super::layout::generate_platforms;
use super::rng::{RandomSource, seeded};
use super::spawn::{spawn_coins, spawn_hazard};
use super::state::{GameEvent, GamePhase, GameState, Player};
use super::timers::{Fired, Scheduler, TimerId, TimerKind};
use crate::consts::*;
use crate::tuning::Tuning;

/// Key state for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Jump (only while grounded)
    pub up: bool,
}

/// One level episode: state, randomness and scheduled tasks
#[derive(Debug, Clone)]
pub struct Simulation<R: RandomSource = Pcg32> {
    state: GameState,
    rng: R,
    timers: Scheduler,
    tuning: Tuning,
    gravity_timer: Option<TimerId>,
    glitch_timer: Option<TimerId>,
}

impl Simulation<Pcg32> {
    /// New level seeded from `seed`
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self::with_rng(seed, tuning, seeded(seed))
    }
}

impl<R: RandomSource> Simulation<R> {
    /// New level drawing from a caller-supplied random source
    pub fn with_rng(seed: u64, tuning: Tuning, mut rng: R) -> Self {
        let tuning = tuning.sanitized();
        let hazard = spawn_hazard(&mut rng);
        let state = GameState::new(seed, tuning.base_gravity, hazard);

        let mut sim = Self {
            state,
            rng,
            timers: Scheduler::new(),
            tuning,
            gravity_timer: None,
            glitch_timer: None,
        };
        sim.generate_level();

        if sim.tuning.gravity_variation {
            sim.gravity_timer = Some(
                sim.timers
                    .every(TimerKind::GravityVariation, sim.tuning.gravity_variation_ms),
            );
        }
        sim.state.hazard.expiry = Some(
            sim.timers
                .after(TimerKind::HazardExpiry, sim.tuning.hazard_expiry_ms),
        );

        log::info!(
            "Level created (seed {}, {:?} rules)",
            seed,
            sim.tuning.variant
        );
        sim
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable state, for the physics host to move bodies
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Number of scheduled tasks still pending
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Advance one frame. No-op once the game is over.
    pub fn tick(&mut self, input: &TickInput, dt_ms: f32) {
        if self.state.is_game_over() {
            return;
        }

        let dt_ms = dt_ms.clamp(0.0, MAX_FRAME_MS);
        self.state.time_ms += f64::from(dt_ms);
        self.run_timers(dt_ms);

        let run = self.tuning.run_speed;
        let jump = self.tuning.jump_speed;
        let player = &mut self.state.player;
        player.vel.x = if input.left {
            -run
        } else if input.right {
            run
        } else {
            0.0
        };
        if input.up && player.grounded {
            player.vel.y = -jump;
        }

        if self.tuning.random_drift {
            self.random_drift();
        }
        self.gravity_glitch();
    }

    fn run_timers(&mut self, dt_ms: f32) {
        let horizon = self.timers.now_ms() + f64::from(dt_ms);
        while let Some(fired) = self.timers.pop_due(horizon) {
            self.on_timer(fired);
        }
        self.timers.settle(horizon);
    }

    fn on_timer(&mut self, fired: Fired) {
        match fired.kind {
            TimerKind::GravityVariation => {
                let variation = self.rng.float_between(
                    self.tuning.gravity_variation_min,
                    self.tuning.gravity_variation_max,
                );
                self.state.gravity = self.tuning.base_gravity * variation;
                self.state.push_event(GameEvent::GravityChanged {
                    gravity: self.state.gravity,
                    glitch: false,
                });
            }
            TimerKind::HazardExpiry => {
                self.state.hazard.expiry = None;
                if self.state.hazard.active {
                    self.state.hazard.active = false;
                    self.state.push_event(GameEvent::HazardExpired);
                    log::debug!("Trick star expired at {:.0}ms", fired.at_ms);
                }
            }
            TimerKind::GlitchFlash => self.glitch_flash(fired.id),
        }
    }

    /// Occasionally fling the player sideways at drift speed
    fn random_drift(&mut self) {
        let vx = match self.rng.int_between(1, self.tuning.drift_roll_max) {
            6 => self.tuning.drift_speed,
            7 => -self.tuning.drift_speed,
            _ => return,
        };
        self.state.player.vel.x = vx;
        self.state.push_event(GameEvent::Drift { vx });
    }

    /// Occasionally replace gravity with something unrelated
    fn gravity_glitch(&mut self) {
        let roll = self.rng.int_between(0, self.tuning.gravity_glitch_roll_max);
        if roll < self.tuning.gravity_glitch_threshold {
            let gravity = self
                .rng
                .int_between(self.tuning.gravity_glitch_min, self.tuning.gravity_glitch_max)
                as f32;
            self.state.gravity = gravity;
            self.state.push_event(GameEvent::GravityChanged {
                gravity,
                glitch: true,
            });
            log::debug!("Gravity glitch: {}", gravity);
        }
    }

    /// Player touched coin `id`. Returns false if the coin is not active.
    pub fn on_coin_collected(&mut self, id: u32) -> bool {
        if self.state.is_game_over() {
            return false;
        }
        let Some(idx) = self.state.coins.iter().position(|c| c.id == id) else {
            return false;
        };

        let mut coin = self.state.coins.remove(idx);
        coin.collected = true;

        let lo = self.tuning.coin_value_min.min(i32::MAX as u32) as i32;
        let hi = self.tuning.coin_value_max.min(i32::MAX as u32) as i32;
        let value = self.rng.int_between(lo, hi).max(0) as u32;
        let max = self.tuning.max_score;
        self.state.score = self.state.score.saturating_add(value).min(max);
        self.state.push_event(GameEvent::CoinCollected {
            id: coin.id,
            kind: coin.kind,
            value,
        });
        log::debug!("Coin {} (+{}) -> score {}", coin.id, value, self.state.score);

        if self.state.score >= max {
            self.trigger_glitch();
        }
        self.state.push_event(GameEvent::ScoreChanged {
            score: self.state.score,
        });
        true
    }

    /// Player touched the trick star. Effective once per episode.
    pub fn on_hazard_contact(&mut self) -> bool {
        if self.state.is_game_over() || !self.state.hazard.active {
            return false;
        }

        self.state.hazard.active = false;
        if let Some(id) = self.state.hazard.expiry.take() {
            self.timers.cancel(id);
        }

        self.state.phase = GamePhase::GameOver;
        self.state.final_score = Some(self.state.score);
        self.state.player.vel = glam::Vec2::ZERO;
        self.state.player.allow_gravity = false;
        self.state.push_event(GameEvent::GameOver {
            final_score: self.state.score,
        });
        log::info!("GAME OVER - final score {}", self.state.score);
        true
    }

    /// Player touched a spike: restart the level unless the game is over
    pub fn on_obstacle_contact(&mut self) -> bool {
        self.reset_level()
    }

    /// Start the max-score flash sequence. Returns false if one is running.
    pub fn trigger_glitch(&mut self) -> bool {
        if self.glitch_timer.is_some() || self.state.is_game_over() {
            return false;
        }
        self.state.glitching = true;
        self.state.glitch_pulses = 0;
        self.glitch_timer = Some(
            self.timers
                .every(TimerKind::GlitchFlash, self.tuning.glitch_flash_ms),
        );
        self.state.push_event(GameEvent::GlitchStarted);
        log::info!("Max score reached, glitching");
        true
    }

    fn glitch_flash(&mut self, id: TimerId) {
        self.state.glitch_pulses += 1;
        self.state.push_event(GameEvent::GlitchFlash {
            pulse: self.state.glitch_pulses,
        });

        if self.state.glitch_pulses >= self.tuning.glitch_flashes {
            self.timers.cancel(id);
            self.glitch_timer = None;
            self.reset_level();
            self.state.glitching = false;
            self.state.push_event(GameEvent::GlitchEnded);
        }
    }

    /// Zero the score, rebuild platforms and coins, put the player back at
    /// spawn and restore base gravity. Does nothing once the game is over.
    pub fn reset_level(&mut self) -> bool {
        if self.state.is_game_over() {
            return false;
        }

        self.state.score = 0;
        self.state.push_event(GameEvent::ScoreChanged { score: 0 });
        self.generate_level();

        let player = &mut self.state.player;
        let vel = player.vel;
        *player = Player::at_spawn();
        player.vel = vel;
        self.state.gravity = self.tuning.base_gravity;

        self.state.resets += 1;
        self.state.push_event(GameEvent::LevelReset);
        log::info!("Level reset (#{})", self.state.resets);
        true
    }

    fn generate_level(&mut self) {
        self.state.platforms = generate_platforms(
            &mut self.rng,
            self.tuning.platform_count,
            self.tuning.platform_base_y,
        );
        let state = &mut self.state;
        let coins = spawn_coins(&mut self.rng, self.tuning.coin_count, || {
            state.next_entity_id()
        });
        self.state.coins = coins;
        self.state.push_event(GameEvent::LevelGenerated {
            platforms: self.state.platforms.len(),
            coins: self.state.coins.len(),
        });
    }

    /// Cancel every scheduled task. The level stops changing on its own.
    pub fn teardown(&mut self) -> usize {
        self.gravity_timer = None;
        self.glitch_timer = None;
        self.state.hazard.expiry = None;
        let cancelled = self.timers.cancel_all();
        if cancelled > 0 {
            log::debug!("Cancelled {} level timers", cancelled);
        }
        cancelled
    }
}
