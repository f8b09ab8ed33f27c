//! Game state and core simulation types
//!
//! Everything a host needs to draw a frame lives here and serializes, so a
//! level can be snapshotted and replayed from its seed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::timers::TimerId;
use crate::consts::*;
use crate::{half_extents, sine_ease_in_out};

/// Current phase of a level episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Trick star touched. Terminal until an explicit restart.
    GameOver,
}

/// The player body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Standing on something this frame (written by the physics host)
    pub grounded: bool,
    /// Cleared on game over so the frozen player stays put
    pub allow_gravity: bool,
}

impl Player {
    pub fn at_spawn() -> Self {
        Self {
            pos: Vec2::new(SPAWN_X, SPAWN_Y),
            vel: Vec2::ZERO,
            grounded: false,
            allow_gravity: true,
        }
    }

    pub fn half_extents(&self) -> Vec2 {
        half_extents(PLAYER_WIDTH, PLAYER_HEIGHT, 1.0)
    }
}

/// A static platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub pos: Vec2,
    pub scale: f32,
}

impl Platform {
    pub fn half_extents(&self) -> Vec2 {
        half_extents(PLATFORM_WIDTH, PLATFORM_HEIGHT, self.scale)
    }
}

/// The platform that glides back and forth above the staircase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingPlatform {
    pub start_x: f32,
    pub end_x: f32,
    pub y: f32,
    pub scale: f32,
    /// One-way travel time
    pub period_ms: f32,
}

impl Default for MovingPlatform {
    fn default() -> Self {
        Self {
            start_x: MOVING_PLATFORM_START_X,
            end_x: MOVING_PLATFORM_END_X,
            y: MOVING_PLATFORM_Y,
            scale: PLATFORM_SCALE,
            period_ms: MOVING_PLATFORM_PERIOD_MS,
        }
    }
}

impl MovingPlatform {
    /// Position at level time `time_ms` (sine ease, yoyo, repeat forever)
    pub fn position_at(&self, time_ms: f64) -> Vec2 {
        let period = f64::from(self.period_ms.max(1.0));
        let cycle = (time_ms.max(0.0) % (2.0 * period)) / period;
        let t = if cycle <= 1.0 { cycle } else { 2.0 - cycle };
        let x = self.start_x + (self.end_x - self.start_x) * sine_ease_in_out(t as f32);
        Vec2::new(x, self.y)
    }

    pub fn half_extents(&self) -> Vec2 {
        half_extents(PLATFORM_WIDTH, PLATFORM_HEIGHT, self.scale)
    }
}

/// A spike: touching it restarts the level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub pos: Vec2,
    pub scale: f32,
}

impl Default for Spike {
    fn default() -> Self {
        Self {
            pos: Vec2::new(SPIKE_X, SPIKE_Y),
            scale: SPIKE_SCALE,
        }
    }
}

impl Spike {
    pub fn half_extents(&self) -> Vec2 {
        half_extents(SPIKE_SIZE, SPIKE_SIZE, self.scale)
    }
}

/// Coin variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoinKind {
    /// Blue "6" coin (rare, ~1 in 8)
    Six,
    /// Yellow "7" coin
    Seven,
}

/// A collectible coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub kind: CoinKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Vertical restitution when landing
    pub bounce: f32,
    pub collected: bool,
}

impl Coin {
    pub fn half_extents(&self) -> Vec2 {
        half_extents(COIN_SIZE, COIN_SIZE, 1.0)
    }
}

/// The trick star
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub pos: Vec2,
    pub vel: Vec2,
    pub bounce: f32,
    pub scale: f32,
    /// Inactive stars are hidden and ignored by collision
    pub active: bool,
    /// Pending expiry task, if scheduled
    #[serde(default)]
    pub expiry: Option<TimerId>,
}

impl Hazard {
    pub fn half_extents(&self) -> Vec2 {
        half_extents(HAZARD_WIDTH, HAZARD_HEIGHT, self.scale)
    }
}

/// Things that happened during a call into the simulation, for the host to
/// render, play sounds for, or forward to the score observer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Fresh platforms and coins were placed
    LevelGenerated { platforms: usize, coins: usize },
    /// A coin was picked up
    CoinCollected { id: u32, kind: CoinKind, value: u32 },
    /// Score changed (or was re-announced after a reset)
    ScoreChanged { score: u32 },
    /// Gravity changed; `glitch` marks the wide random replacement
    GravityChanged { gravity: f32, glitch: bool },
    /// Player was flung sideways by the drift glitch
    Drift { vx: f32 },
    /// Max score reached, flashes begin
    GlitchStarted,
    /// One flash of the glitch sequence (1-based)
    GlitchFlash { pulse: u32 },
    /// Glitch sequence finished and the level was reset
    GlitchEnded,
    /// Spike or glitch reset (score zeroed, level regenerated)
    LevelReset,
    /// Trick star timed out without being touched
    HazardExpired,
    /// Trick star touched
    GameOver { final_score: u32 },
}

/// Complete level state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed the level RNG was created from
    pub seed: u64,
    pub phase: GamePhase,
    /// Always within [0, max score]
    pub score: u32,
    /// Score at the moment the trick star was touched
    pub final_score: Option<u32>,
    /// World gravity (pixels/s², +y down)
    pub gravity: f32,
    pub player: Player,
    pub platforms: Vec<Platform>,
    pub moving_platform: MovingPlatform,
    pub spike: Spike,
    /// Active coins (sorted by id)
    pub coins: Vec<Coin>,
    pub hazard: Hazard,
    /// Glitch visual filter is on
    pub glitching: bool,
    /// Flashes shown so far in the running glitch sequence
    pub glitch_pulses: u32,
    /// Level time
    pub time_ms: f64,
    /// Number of level resets this episode
    pub resets: u32,
    /// Events since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Empty level: player at spawn, no platforms or coins yet
    pub fn new(seed: u64, gravity: f32, hazard: Hazard) -> Self {
        Self {
            seed,
            phase: GamePhase::Playing,
            score: 0,
            final_score: None,
            gravity,
            player: Player::at_spawn(),
            platforms: Vec::new(),
            moving_platform: MovingPlatform::default(),
            spike: Spike::default(),
            coins: Vec::new(),
            hazard,
            glitching: false,
            glitch_pulses: 0,
            time_ms: 0.0,
            resets: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current moving platform position
    pub fn moving_platform_pos(&self) -> Vec2 {
        self.moving_platform.position_at(self.time_ms)
    }
}
