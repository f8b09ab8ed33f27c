//! Level session
//!
//! A session is one mounted level: the simulation, the physics host driving
//! it, whoever listens for score changes, and the level's audio. Hosts drive
//! it through `LevelScene`. Teardown cancels every timer and releases audio;
//! it also runs on drop, so navigating away mid-game cannot leave callbacks
//! firing into a dead level.

use super::arcade::{ArcadeWorld, PhysicsHost};
use super::state::{GameEvent, GameState};
use super::tick::{Simulation, TickInput};
use crate::audio::ScreenAudio;
use crate::tuning::Tuning;

/// Receives every score change
pub trait ScoreObserver {
    fn on_score(&mut self, score: u32);
}

impl<F: FnMut(u32)> ScoreObserver for F {
    fn on_score(&mut self, score: u32) {
        self(score)
    }
}

/// Lifecycle a rendering host drives
pub trait LevelScene {
    /// Called once when the level is shown
    fn initialize(&mut self);
    /// Called once per rendered frame; returns what happened
    fn tick(&mut self, input: &TickInput, dt_ms: f32) -> Vec<GameEvent>;
    /// Called when the level is hidden. Must be idempotent.
    fn teardown(&mut self);
}

/// One mounted level
pub struct Session<P: PhysicsHost = ArcadeWorld> {
    sim: Simulation,
    physics: P,
    tuning: Tuning,
    observer: Option<Box<dyn ScoreObserver>>,
    audio: Option<ScreenAudio>,
    active: bool,
    torn_down: bool,
}

impl Session<ArcadeWorld> {
    /// Session with the built-in arcade physics
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self::with_physics(seed, tuning, ArcadeWorld::new())
    }
}

impl<P: PhysicsHost> Session<P> {
    pub fn with_physics(seed: u64, tuning: Tuning, physics: P) -> Self {
        Self {
            sim: Simulation::new(seed, tuning.clone()),
            physics,
            tuning,
            observer: None,
            audio: None,
            active: false,
            torn_down: false,
        }
    }

    /// Forward score changes to `observer`
    pub fn with_observer(mut self, observer: impl ScoreObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Hold `audio` for the lifetime of the session
    pub fn with_audio(mut self, audio: ScreenAudio) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn state(&self) -> &GameState {
        self.sim.state()
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    /// Initialized and not yet torn down
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// One frame: input and timers, then physics, then contact handlers
    pub fn frame(&mut self, input: &TickInput, dt_ms: f32) -> Vec<GameEvent> {
        if !self.active {
            return Vec::new();
        }

        self.sim.tick(input, dt_ms);
        let contacts = self.physics.step(self.sim.state_mut(), dt_ms);

        if contacts.obstacle {
            self.sim.on_obstacle_contact();
        }
        for id in contacts.coins {
            self.sim.on_coin_collected(id);
        }
        if contacts.hazard {
            self.sim.on_hazard_contact();
        }

        self.dispatch()
    }

    /// Drain simulation events, forwarding score changes
    fn dispatch(&mut self) -> Vec<GameEvent> {
        let events = self.sim.drain_events();
        if let Some(observer) = self.observer.as_mut() {
            for event in &events {
                if let GameEvent::ScoreChanged { score } = event {
                    observer.on_score(*score);
                }
            }
        }
        events
    }

    /// Start a new episode (the only way out of game over). Returns false
    /// once the session has been torn down.
    pub fn restart(&mut self, seed: u64) -> bool {
        if self.torn_down {
            return false;
        }
        self.sim.teardown();
        self.sim = Simulation::new(seed, self.tuning.clone());
        self.sim.drain_events();
        if let Some(observer) = self.observer.as_mut() {
            observer.on_score(0);
        }
        log::info!("Level restarted with seed {}", seed);
        true
    }
}

impl<P: PhysicsHost> LevelScene for Session<P> {
    fn initialize(&mut self) {
        if self.active || self.torn_down {
            return;
        }
        self.active = true;
        // Level generation events are not interesting to hosts
        self.sim.drain_events();
        log::info!("Level session started (seed {})", self.sim.state().seed);
    }

    fn tick(&mut self, input: &TickInput, dt_ms: f32) -> Vec<GameEvent> {
        self.frame(input, dt_ms)
    }

    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.active = false;
        self.sim.teardown();
        if let Some(mut audio) = self.audio.take() {
            audio.release();
        }
        log::info!(
            "Level session ended (score {}, {} resets)",
            self.sim.state().score,
            self.sim.state().resets
        );
    }
}

impl<P: PhysicsHost> Drop for Session<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioCue, AudioPlayer, LEVEL_MUSIC};
    use crate::consts::*;
    use crate::sim::arcade::Contacts;
    use crate::sim::state::GamePhase;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Physics host that reports scripted contacts and moves nothing
    #[derive(Default)]
    struct ScriptedPhysics {
        queue: Vec<Contacts>,
    }

    impl PhysicsHost for ScriptedPhysics {
        fn step(&mut self, state: &mut GameState, _dt_ms: f32) -> Contacts {
            if state.is_game_over() || self.queue.is_empty() {
                return Contacts::default();
            }
            self.queue.remove(0)
        }
    }

    struct CountingAudio(Rc<RefCell<(u32, u32)>>);

    impl AudioPlayer for CountingAudio {
        fn play(&mut self, _cue: &AudioCue, _volume: f32) -> bool {
            self.0.borrow_mut().0 += 1;
            true
        }

        fn stop(&mut self, _cue: &AudioCue) {
            self.0.borrow_mut().1 += 1;
        }
    }

    fn calm() -> Tuning {
        Tuning {
            gravity_glitch_threshold: 0,
            random_drift: false,
            gravity_variation: false,
            ..Tuning::merged()
        }
    }

    fn observed(session: Session<ScriptedPhysics>) -> (Session<ScriptedPhysics>, Rc<RefCell<Vec<u32>>>) {
        let scores = Rc::new(RefCell::new(Vec::new()));
        let sink = scores.clone();
        let session = session.with_observer(move |s: u32| sink.borrow_mut().push(s));
        (session, scores)
    }

    #[test]
    fn test_inactive_until_initialized() {
        let mut session = Session::with_physics(1, calm(), ScriptedPhysics::default());
        assert!(!session.is_active());
        assert!(session.frame(&TickInput::default(), FRAME_MS).is_empty());
        assert_eq!(session.state().time_ms, 0.0);

        session.initialize();
        assert!(session.is_active());
        session.frame(&TickInput::default(), FRAME_MS);
        assert!(session.state().time_ms > 0.0);
    }

    #[test]
    fn test_contacts_reach_the_core_in_order() {
        let mut session = Session::with_physics(4, calm(), ScriptedPhysics::default());
        let first = session.state().coins[0].id;
        let second = session.state().coins[1].id;
        let third = session.state().coins[2].id;
        let (mut session, scores) = observed(session);
        session.physics_mut().queue = vec![
            Contacts {
                coins: vec![first, second],
                ..Default::default()
            },
            // Spike first, so the coin from the old level no longer exists
            Contacts {
                coins: vec![third],
                obstacle: true,
                hazard: false,
            },
        ];
        session.initialize();

        session.frame(&TickInput::default(), FRAME_MS);
        let after_two = session.state().score;
        assert!((2..=6).contains(&after_two));

        let events = session.frame(&TickInput::default(), FRAME_MS);
        assert!(events.contains(&GameEvent::LevelReset));
        assert_eq!(session.state().score, 0);

        let scores = scores.borrow();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[1], after_two);
        assert_eq!(scores[2], 0);
    }

    #[test]
    fn test_hazard_contact_ends_game_once() {
        let mut session = Session::with_physics(4, calm(), ScriptedPhysics::default());
        session.physics_mut().queue = vec![
            Contacts {
                hazard: true,
                ..Default::default()
            },
            Contacts {
                hazard: true,
                ..Default::default()
            },
        ];
        session.initialize();

        let events = session.frame(&TickInput::default(), FRAME_MS);
        assert!(events.contains(&GameEvent::GameOver { final_score: 0 }));
        assert_eq!(session.state().phase, GamePhase::GameOver);

        for _ in 0..10 {
            let events = session.frame(&TickInput { right: true, ..Default::default() }, FRAME_MS);
            assert!(events.is_empty());
        }
        assert_eq!(session.state().player.vel, glam::Vec2::ZERO);

        assert!(session.restart(99));
        assert_eq!(session.state().phase, GamePhase::Playing);
        assert_eq!(session.state().seed, 99);
    }

    #[test]
    fn test_drop_tears_down_audio() {
        let counts = Rc::new(RefCell::new((0, 0)));
        {
            let audio = ScreenAudio::acquire(Box::new(CountingAudio(counts.clone())), &[LEVEL_MUSIC], 1.0);
            let mut session = Session::new(2, calm()).with_audio(audio);
            session.initialize();
            assert!(session.has_audio());
            assert_eq!(*counts.borrow(), (1, 0));
            // Abnormal exit: dropped mid-game without teardown
        }
        assert_eq!(*counts.borrow(), (1, 1));
    }

    #[test]
    fn test_teardown_idempotent_and_final() {
        let mut session = Session::new(2, calm());
        session.initialize();
        assert_eq!(session.sim().pending_timers(), 1);
        session.teardown();
        session.teardown();
        assert_eq!(session.sim().pending_timers(), 0);
        assert!(!session.is_active());

        // Cannot be revived
        session.initialize();
        assert!(!session.is_active());
        assert!(session.frame(&TickInput::default(), FRAME_MS).is_empty());
    }

    #[test]
    fn test_restart_after_teardown_is_refused() {
        let mut session = Session::new(2, calm());
        session.initialize();
        session.teardown();

        assert!(!session.restart(3));
        assert_eq!(session.state().seed, 2);
        assert_eq!(session.sim().pending_timers(), 0);
    }

    #[test]
    fn test_arcade_session_runs() {
        let mut session = Session::new(12345, calm());
        session.initialize();
        for _ in 0..600 {
            session.frame(&TickInput::default(), FRAME_MS);
            assert!(session.state().score <= MAX_SCORE);
        }
        assert!(session.state().player.pos.y <= WORLD_HEIGHT);
        assert!(session.state().time_ms > 9_000.0);
    }
}
