//! Arcade physics host
//!
//! The simulation core never integrates motion itself. A host moves bodies,
//! resolves collisions and reports what the player touched. `ArcadeWorld` is
//! the built-in host: axis-aligned boxes, gravity, vertical bounce, world
//! bounds for the player, and overlap tests for coins, spike and trick star.

use glam::Vec2;

use super::state::GameState;
use crate::consts::*;

/// Below this rebound speed a landing body comes to rest
const REST_SPEED: f32 = 20.0;
/// Bodies further than this below the world stop simulating
const FALL_OUT_MARGIN: f32 = 200.0;

/// What the player touched during one physics step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contacts {
    /// Coins overlapped, in id order
    pub coins: Vec<u32>,
    /// Spike touched
    pub obstacle: bool,
    /// Trick star overlapped while active
    pub hazard: bool,
}

impl Contacts {
    pub fn is_empty(&self) -> bool {
        self.coins.is_empty() && !self.obstacle && !self.hazard
    }
}

/// Moves bodies and detects contacts for a level
pub trait PhysicsHost {
    /// Advance bodies by `dt_ms` and report the player's contacts.
    ///
    /// Must write `state.player.grounded`. Must not move anything while the
    /// game is over.
    fn step(&mut self, state: &mut GameState, dt_ms: f32) -> Contacts;
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    /// Strict overlap (edges touching does not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let reach = self.half + other.half;
        d.x < reach.x && d.y < reach.y
    }

    /// Overlap or edge contact
    pub fn touches(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let reach = self.half + other.half;
        d.x <= reach.x && d.y <= reach.y
    }
}

/// A dynamic body borrowed from the state for one integration step
struct Body<'a> {
    pos: &'a mut Vec2,
    vel: &'a mut Vec2,
    half: Vec2,
    bounce: f32,
}

impl Body<'_> {
    fn aabb(&self) -> Aabb {
        Aabb::new(*self.pos, self.half)
    }

    /// Integrate and separate from `solids`. Returns the index of the solid
    /// landed on, if any.
    fn integrate(&mut self, gravity: f32, dt: f32, solids: &[Aabb]) -> Option<usize> {
        self.vel.y += gravity * dt;

        self.pos.x += self.vel.x * dt;
        for solid in solids {
            if self.aabb().overlaps(solid) {
                if self.vel.x > 0.0 {
                    self.pos.x = solid.min().x - self.half.x;
                    self.vel.x = 0.0;
                } else if self.vel.x < 0.0 {
                    self.pos.x = solid.max().x + self.half.x;
                    self.vel.x = 0.0;
                }
            }
        }

        self.pos.y += self.vel.y * dt;
        let mut landed = None;
        for (i, solid) in solids.iter().enumerate() {
            if !self.aabb().overlaps(solid) {
                continue;
            }
            if self.vel.y >= 0.0 {
                self.pos.y = solid.min().y - self.half.y;
                self.vel.y = rebound(self.vel.y, self.bounce);
                landed = Some(i);
            } else {
                // Head bump
                self.pos.y = solid.max().y + self.half.y;
                self.vel.y = 0.0;
            }
        }
        landed
    }
}

/// Vertical speed after landing with restitution `bounce`
fn rebound(vy: f32, bounce: f32) -> f32 {
    let up = -vy * bounce;
    if up.abs() < REST_SPEED { 0.0 } else { up }
}

/// The built-in physics host
#[derive(Debug, Clone)]
pub struct ArcadeWorld {
    /// World size; the player is kept inside it
    pub bounds: Vec2,
    /// Host-requested pause (game over pauses regardless)
    pub paused: bool,
    pub player_bounce: f32,
}

impl Default for ArcadeWorld {
    fn default() -> Self {
        Self {
            bounds: Vec2::new(WORLD_WIDTH, WORLD_HEIGHT),
            paused: false,
            player_bounce: PLAYER_BOUNCE,
        }
    }
}

impl ArcadeWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the player inside the world, bouncing off the floor.
    ///
    /// The floor blocks but does not count as standing on something, so the
    /// player cannot jump off it.
    fn clamp_to_bounds(&self, pos: &mut Vec2, vel: &mut Vec2, half: Vec2) {
        if pos.x < half.x {
            pos.x = half.x;
            vel.x = 0.0;
        } else if pos.x > self.bounds.x - half.x {
            pos.x = self.bounds.x - half.x;
            vel.x = 0.0;
        }
        if pos.y < half.y {
            pos.y = half.y;
            vel.y = vel.y.max(0.0);
        } else if pos.y > self.bounds.y - half.y {
            pos.y = self.bounds.y - half.y;
            vel.y = rebound(vel.y.max(0.0), self.player_bounce);
        }
    }
}

impl PhysicsHost for ArcadeWorld {
    fn step(&mut self, state: &mut GameState, dt_ms: f32) -> Contacts {
        if self.paused || state.is_game_over() {
            return Contacts::default();
        }

        let dt_ms = dt_ms.clamp(0.0, MAX_FRAME_MS);
        let dt = dt_ms / 1000.0;
        let gravity = state.gravity;

        let statics: Vec<Aabb> = state
            .platforms
            .iter()
            .map(|p| Aabb::new(p.pos, p.half_extents()))
            .collect();

        // Moving platform (its tween already advanced with level time)
        let mover_now = state.moving_platform_pos();
        let mover_before = state
            .moving_platform
            .position_at(state.time_ms - f64::from(dt_ms));
        let mover = Aabb::new(mover_now, state.moving_platform.half_extents());

        // Player collides with both kinds of platform
        let mut player_solids = statics.clone();
        player_solids.push(mover);
        let mover_index = player_solids.len() - 1;

        let player = &mut state.player;
        let half = player.half_extents();
        let player_gravity = if player.allow_gravity { gravity } else { 0.0 };
        let landed = Body {
            pos: &mut player.pos,
            vel: &mut player.vel,
            half,
            bounce: self.player_bounce,
        }
        .integrate(player_gravity, dt, &player_solids);

        if landed == Some(mover_index) {
            // Ride along
            player.pos.x += mover_now.x - mover_before.x;
        }
        player.grounded = landed.is_some();
        self.clamp_to_bounds(&mut player.pos, &mut player.vel, half);

        // Coins and the star only land on static platforms
        let fall_out = self.bounds.y + FALL_OUT_MARGIN;
        for coin in state.coins.iter_mut() {
            if coin.pos.y > fall_out {
                continue;
            }
            let half = coin.half_extents();
            Body {
                pos: &mut coin.pos,
                vel: &mut coin.vel,
                half,
                bounce: coin.bounce,
            }
            .integrate(gravity, dt, &statics);
        }

        let hazard = &mut state.hazard;
        if hazard.active && hazard.pos.y <= fall_out {
            let half = hazard.half_extents();
            Body {
                pos: &mut hazard.pos,
                vel: &mut hazard.vel,
                half,
                bounce: hazard.bounce,
            }
            .integrate(gravity, dt, &statics);
        }

        // Contacts, in the order the level reacts to them
        let player_box = Aabb::new(state.player.pos, half);
        let spike = Aabb::new(state.spike.pos, state.spike.half_extents());
        let coins = state
            .coins
            .iter()
            .filter(|c| !c.collected && player_box.overlaps(&Aabb::new(c.pos, c.half_extents())))
            .map(|c| c.id)
            .collect();
        let hazard = state.hazard.active
            && player_box.overlaps(&Aabb::new(state.hazard.pos, state.hazard.half_extents()));

        Contacts {
            coins,
            obstacle: player_box.touches(&spike),
            hazard,
        }
    }
}
