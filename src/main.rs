//! Level 6-7 entry point
//!
//! Native builds run the game headless with the autopilot and log what
//! happens. WASM builds draw to a 2D canvas and take the keyboard.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent};

    use level67::audio::ScreenAudio;
    use level67::audio::web::WebAudio;
    use level67::consts::*;
    use level67::flow::TITLE;
    use level67::sim::{CoinKind, GameEvent, LevelScene, Session, TickInput};
    use level67::{App, Screen, Tuning};

    const GREEN: &str = "#0f0";
    const DIM_GREEN: &str = "#080";

    /// Everything the page needs between frames
    struct Game {
        app: App,
        tuning: Tuning,
        session: Option<Session>,
        /// Audio for the start and void screens (the level session owns its own)
        screen_audio: Option<ScreenAudio>,
        input: TickInput,
        last_time: f64,
        ctx: CanvasRenderingContext2d,
    }

    impl Game {
        fn new(ctx: CanvasRenderingContext2d, tuning: Tuning) -> Self {
            let mut game = Self {
                app: App::new(tuning.max_score),
                tuning,
                session: None,
                screen_audio: None,
                input: TickInput::default(),
                last_time: 0.0,
                ctx,
            };
            game.enter(Screen::Start);
            game
        }

        /// Swap screen resources for `screen`. Dropping the old ones stops
        /// their audio and cancels level timers.
        fn enter(&mut self, screen: Screen) {
            self.session = None;
            self.screen_audio = None;
            self.input = TickInput::default();

            let audio = ScreenAudio::acquire(Box::new(WebAudio::new()), screen.audio_cues(), 1.0);
            match screen {
                Screen::Level => {
                    let seed = js_sys::Date::now() as u64;
                    let mut session = Session::new(seed, self.tuning.clone()).with_audio(audio);
                    session.initialize();
                    self.session = Some(session);
                }
                Screen::Start | Screen::Void => self.screen_audio = Some(audio),
            }
        }

        fn key(&mut self, key: &str, down: bool) {
            match key {
                "ArrowLeft" => self.input.left = down,
                "ArrowRight" => self.input.right = down,
                "ArrowUp" => self.input.up = down,
                _ => {}
            }
            if !down {
                return;
            }
            if key == "r" || key == "R" {
                if let Some(session) = self.session.as_mut() {
                    if session.state().is_game_over() {
                        session.restart(js_sys::Date::now() as u64);
                    }
                }
            }
            if let Some(screen) = self.app.key_down(key) {
                self.enter(screen);
            }
        }

        fn update(&mut self, dt_ms: f32) {
            self.app.advance(dt_ms);

            let Some(session) = self.session.as_mut() else {
                return;
            };
            let mut next = None;
            for event in session.frame(&self.input, dt_ms) {
                match event {
                    GameEvent::ScoreChanged { score } => {
                        if let Some(screen) = self.app.on_score(score) {
                            next = Some(screen);
                        }
                    }
                    GameEvent::GameOver { final_score } => {
                        log::info!("Final score: {}", final_score);
                    }
                    _ => {}
                }
            }
            if let Some(screen) = next {
                self.enter(screen);
            }
        }

        fn render(&self) {
            let ctx = &self.ctx;
            ctx.set_fill_style_str("#000");
            ctx.fill_rect(0.0, 0.0, f64::from(WORLD_WIDTH), f64::from(WORLD_HEIGHT));

            match self.app.screen() {
                Screen::Start => self.render_start(),
                Screen::Level => self.render_level(),
                Screen::Void => self.render_void(),
            }
        }

        fn render_start(&self) {
            let ctx = &self.ctx;
            let cx = f64::from(WORLD_WIDTH) / 2.0;
            ctx.set_text_align("center");
            ctx.set_fill_style_str(if self.app.title_lit() { GREEN } else { DIM_GREEN });
            ctx.set_font("bold 64px 'Courier New', monospace");
            let _ = ctx.fill_text(TITLE, cx, 200.0);
            ctx.set_font("20px 'Courier New', monospace");
            let _ = ctx.fill_text("You wake up mid-game on Level 6-7.", cx, 280.0);
            ctx.set_font("bold 20px 'Courier New', monospace");
            let _ = ctx.fill_text(self.app.prompt(), cx, 400.0);
        }

        fn render_void(&self) {
            let ctx = &self.ctx;
            ctx.set_text_align("center");
            ctx.set_fill_style_str(GREEN);
            ctx.set_font("24px 'Courier New', monospace");
            let text = self.app.void_text();
            let mut y = 260.0;
            // Crude wrap; the last line is long
            let mut line = String::new();
            for word in text.split(' ') {
                if line.len() + word.len() > 44 {
                    let _ = ctx.fill_text(&line, f64::from(WORLD_WIDTH) / 2.0, y);
                    line.clear();
                    y += 32.0;
                }
                if !line.is_empty() {
                    line.push(' ');
                }
                line.push_str(word);
            }
            let _ = ctx.fill_text(&line, f64::from(WORLD_WIDTH) / 2.0, y);
        }

        fn render_level(&self) {
            let Some(session) = self.session.as_ref() else {
                return;
            };
            let ctx = &self.ctx;
            let state = session.state();

            let rect = |center: glam::Vec2, half: glam::Vec2| {
                ctx.fill_rect(
                    f64::from(center.x - half.x),
                    f64::from(center.y - half.y),
                    f64::from(half.x * 2.0),
                    f64::from(half.y * 2.0),
                );
            };

            ctx.set_fill_style_str(if state.glitching { "#f0f" } else { "#3a3" });
            for platform in &state.platforms {
                rect(platform.pos, platform.half_extents());
            }
            rect(state.moving_platform_pos(), state.moving_platform.half_extents());

            ctx.set_fill_style_str("#c33");
            let spike = state.spike.pos;
            let half = state.spike.half_extents();
            ctx.begin_path();
            ctx.move_to(f64::from(spike.x - half.x), f64::from(spike.y + half.y));
            ctx.line_to(f64::from(spike.x), f64::from(spike.y - half.y));
            ctx.line_to(f64::from(spike.x + half.x), f64::from(spike.y + half.y));
            ctx.close_path();
            ctx.fill();

            ctx.set_text_align("center");
            ctx.set_font("bold 12px monospace");
            for coin in &state.coins {
                ctx.set_fill_style_str("#fd0");
                ctx.begin_path();
                let _ = ctx.arc(
                    f64::from(coin.pos.x),
                    f64::from(coin.pos.y),
                    f64::from(coin.half_extents().x),
                    0.0,
                    TAU,
                );
                ctx.fill();
                ctx.set_fill_style_str("#000");
                let label = match coin.kind {
                    CoinKind::Six => "6",
                    CoinKind::Seven => "7",
                };
                let _ = ctx.fill_text(label, f64::from(coin.pos.x), f64::from(coin.pos.y) + 4.0);
            }

            if state.hazard.active {
                ctx.set_fill_style_str("#fff");
                rect(state.hazard.pos, state.hazard.half_extents());
            }

            ctx.set_fill_style_str("#48f");
            rect(state.player.pos, state.player.half_extents());

            ctx.set_text_align("left");
            ctx.set_font("bold 24px 'Courier New', monospace");
            ctx.set_fill_style_str(if self.app.hud_lit(state.score) { "#f00" } else { GREEN });
            let _ = ctx.fill_text(&format!("Score: {}", state.score), 16.0, 32.0);

            if let Some(final_score) = state.final_score {
                ctx.set_text_align("center");
                ctx.set_fill_style_str("#f00");
                ctx.set_font("bold 48px 'Courier New', monospace");
                let cx = f64::from(WORLD_WIDTH) / 2.0;
                let _ = ctx.fill_text("GAME OVER", cx, 260.0);
                ctx.set_font("24px 'Courier New', monospace");
                let _ = ctx.fill_text(&format!("Final Score: {}", final_score), cx, 310.0);
                let _ = ctx.fill_text("Press R to try again", cx, 350.0);
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Level 6-7 starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(WORLD_WIDTH as u32);
        canvas.set_height(WORLD_HEIGHT as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let game = Rc::new(RefCell::new(Game::new(ctx, Tuning::load())));

        setup_input_handlers(game.clone());
        request_animation_frame(game);

        log::info!("Level 6-7 running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        for (name, down) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.repeat() && down {
                    return;
                }
                game.borrow_mut().key(&event.key(), down);
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt_ms = if g.last_time > 0.0 {
                (time - g.last_time) as f32
            } else {
                FRAME_MS
            };
            g.last_time = time;

            g.update(dt_ms);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Level 6-7 (native, headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(clock_seed);
    let mut tuning = level67::Tuning::load();
    if let Some(variant) = args.next().as_deref().and_then(level67::RuleVariant::from_str) {
        tuning = level67::Tuning::from_variant(variant);
    }

    let summary = headless::run(seed, tuning, headless::DEFAULT_FRAMES);
    println!(
        "seed {}: {} frames, {} coins, best score {}, {} resets, {} game overs, reached void: {}",
        seed,
        summary.frames,
        summary.coins,
        summary.best_score,
        summary.resets,
        summary.game_overs,
        summary.reached_void
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(67)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Autopilot run through the screen flow with no window or audio
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use level67::audio::{NullAudio, ScreenAudio};
    use level67::consts::FRAME_MS;
    use level67::sim::{GameEvent, LevelScene, Session, autopilot_input};
    use level67::{App, Screen, Tuning};

    /// Two minutes at 60 Hz
    pub const DEFAULT_FRAMES: u32 = 7200;

    #[derive(Debug, Default)]
    pub struct Summary {
        pub frames: u32,
        pub coins: u32,
        pub best_score: u32,
        pub resets: u32,
        pub game_overs: u32,
        pub reached_void: bool,
    }

    pub fn run(seed: u64, tuning: Tuning, frames: u32) -> Summary {
        let mut summary = Summary::default();
        let mut app = App::new(tuning.max_score);
        app.key_down("6");

        let audio = ScreenAudio::acquire(Box::new(NullAudio), Screen::Level.audio_cues(), 1.0);
        let mut session = Session::new(seed, tuning)
            .with_audio(audio)
            .with_observer(|score: u32| log::debug!("Score: {}", score));
        session.initialize();

        let mut episode = 0;
        while summary.frames < frames {
            summary.frames += 1;
            app.advance(FRAME_MS);

            let input = autopilot_input(session.state());
            for event in session.frame(&input, FRAME_MS) {
                match event {
                    GameEvent::CoinCollected { .. } => summary.coins += 1,
                    GameEvent::ScoreChanged { score } => {
                        summary.best_score = summary.best_score.max(score);
                        if app.on_score(score) == Some(Screen::Void) {
                            summary.reached_void = true;
                        }
                    }
                    GameEvent::LevelReset => summary.resets += 1,
                    GameEvent::GameOver { final_score } => {
                        summary.game_overs += 1;
                        log::info!("Game over at frame {} (score {})", summary.frames, final_score);
                    }
                    GameEvent::GravityChanged { gravity, glitch: true } => {
                        log::debug!("Gravity glitched to {}", gravity);
                    }
                    _ => {}
                }
            }

            if summary.reached_void {
                session.teardown();
                break;
            }
            if session.state().is_game_over() {
                episode += 1;
                session.restart(seed.wrapping_add(episode));
            }
        }

        if app.screen() == Screen::Void {
            // Let the first void line finish typing
            for _ in 0..120 {
                app.advance(FRAME_MS);
            }
            log::info!("Void: {}", app.void_text());
        }
        summary
    }
}
