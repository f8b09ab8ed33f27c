//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, drawn in a fixed order
//! - Time comes from the frame delta, never the wall clock
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod arcade;
pub mod autopilot;
pub mod layout;
pub mod rng;
pub mod session;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timers;

pub use arcade::{Aabb, ArcadeWorld, Contacts, PhysicsHost};
pub use autopilot::autopilot_input;
pub use layout::generate_platforms;
pub use rng::{RandomSource, ScriptedRandom, seeded};
pub use session::{LevelScene, ScoreObserver, Session};
pub use spawn::{roll_coin_kind, spawn_coins, spawn_hazard};
pub use state::{
    Coin, CoinKind, GameEvent, GamePhase, GameState, Hazard, MovingPlatform, Platform, Player,
    Spike,
};
pub use tick::{Simulation, TickInput};
pub use timers::{Fired, Scheduler, TimerId, TimerKind};
