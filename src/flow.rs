//! Screen flow
//!
//! Start screen, then the level, then the void once the score maxes out.
//! `App` only tracks which screen is up and its text effects; hosts create
//! and drop the level `Session` and per-screen audio when the screen changes.

use crate::audio::{AudioCue, LEVEL_MUSIC, START_MUSIC, START_VOICE, VOID_LAUGH};
use crate::consts::MAX_SCORE;

pub const TITLE: &str = "LEVEL 6-7";
pub const START_PROMPT: &str = "Press 6 or 7 to continue.";
pub const START_NOPE: &str = "Nope! Press 6 or 7 to continue...";

/// Lines typed out on the void screen, in order
pub const VOID_TEXTS: [&str; 3] = [
    "Level 68 loading... ???",
    "Error 0x6-0x7: Reality not found.",
    "Congrats! You've reached the pinnacle of confusion. Your reality is unstable. Press 6 or 7 to stabilize... or stay trapped forever",
];

const TITLE_FLICKER_MS: f32 = 500.0;
const HUD_FLICKER_MS: f32 = 300.0;
const TYPE_CHAR_MS: f32 = 50.0;
const TYPE_HOLD_MS: f32 = 1500.0;

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Start,
    Level,
    Void,
}

impl Screen {
    /// Tracks played while this screen is shown
    pub fn audio_cues(&self) -> &'static [AudioCue] {
        match self {
            Screen::Start => &[START_VOICE, START_MUSIC],
            Screen::Level => &[LEVEL_MUSIC],
            Screen::Void => &[VOID_LAUGH],
        }
    }
}

/// Keys that mean "go" on the start and void screens
fn is_six_or_seven(key: &str) -> bool {
    matches!(key, "6" | "7")
}

/// Toggles every `period_ms`
#[derive(Debug, Clone, Copy)]
pub struct Blink {
    period_ms: f32,
    elapsed_ms: f32,
    on: bool,
}

impl Blink {
    pub fn new(period_ms: f32) -> Self {
        Self {
            period_ms: period_ms.max(1.0),
            elapsed_ms: 0.0,
            on: false,
        }
    }

    pub fn advance(&mut self, dt_ms: f32) {
        self.elapsed_ms += dt_ms.max(0.0);
        while self.elapsed_ms >= self.period_ms {
            self.elapsed_ms -= self.period_ms;
            self.on = !self.on;
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
        self.on = false;
    }
}

/// Types `texts` one char at a time, holds each finished line, then moves on
#[derive(Debug, Clone)]
pub struct Typewriter {
    texts: &'static [&'static str],
    index: usize,
    shown: usize,
    elapsed_ms: f32,
}

impl Typewriter {
    pub fn new(texts: &'static [&'static str]) -> Self {
        Self {
            texts,
            index: 0,
            shown: 0,
            elapsed_ms: 0.0,
        }
    }

    fn current(&self) -> &'static str {
        self.texts.get(self.index).copied().unwrap_or("")
    }

    fn line_done(&self) -> bool {
        self.shown >= self.current().chars().count()
    }

    pub fn advance(&mut self, dt_ms: f32) {
        if self.texts.is_empty() {
            return;
        }
        self.elapsed_ms += dt_ms.max(0.0);
        loop {
            if self.line_done() {
                if self.elapsed_ms < TYPE_HOLD_MS {
                    break;
                }
                self.elapsed_ms -= TYPE_HOLD_MS;
                self.index = (self.index + 1) % self.texts.len();
                self.shown = 0;
            } else {
                if self.elapsed_ms < TYPE_CHAR_MS {
                    break;
                }
                self.elapsed_ms -= TYPE_CHAR_MS;
                self.shown += 1;
            }
        }
    }

    /// Which line is being typed
    pub fn index(&self) -> usize {
        self.index
    }

    /// Text typed so far
    pub fn visible(&self) -> &'static str {
        let text = self.current();
        let end = text
            .char_indices()
            .nth(self.shown)
            .map_or(text.len(), |(i, _)| i);
        &text[..end]
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.shown = 0;
        self.elapsed_ms = 0.0;
    }
}

/// Which screen is up, plus its text effects
#[derive(Debug, Clone)]
pub struct App {
    screen: Screen,
    prompt: &'static str,
    title_flicker: Blink,
    hud_flicker: Blink,
    void_text: Typewriter,
    max_score: u32,
}

impl Default for App {
    fn default() -> Self {
        Self::new(MAX_SCORE)
    }
}

impl App {
    pub fn new(max_score: u32) -> Self {
        Self {
            screen: Screen::Start,
            prompt: START_PROMPT,
            title_flicker: Blink::new(TITLE_FLICKER_MS),
            hud_flicker: Blink::new(HUD_FLICKER_MS),
            void_text: Typewriter::new(&VOID_TEXTS),
            max_score,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Start screen prompt
    pub fn prompt(&self) -> &'static str {
        self.prompt
    }

    pub fn title_lit(&self) -> bool {
        self.title_flicker.is_on()
    }

    /// Score HUD highlight; only flickers at the max score
    pub fn hud_lit(&self, score: u32) -> bool {
        score >= self.max_score && self.hud_flicker.is_on()
    }

    pub fn void_text(&self) -> &'static str {
        self.void_text.visible()
    }

    /// A key was pressed. Returns the new screen if it changed.
    pub fn key_down(&mut self, key: &str) -> Option<Screen> {
        match self.screen {
            Screen::Start if is_six_or_seven(key) => self.go(Screen::Level),
            Screen::Start => {
                self.prompt = START_NOPE;
                None
            }
            Screen::Void if is_six_or_seven(key) => self.go(Screen::Start),
            _ => None,
        }
    }

    /// Score reported by the level. Returns the new screen if it changed.
    pub fn on_score(&mut self, score: u32) -> Option<Screen> {
        if self.screen == Screen::Level && score >= self.max_score {
            self.go(Screen::Void)
        } else {
            None
        }
    }

    pub fn advance(&mut self, dt_ms: f32) {
        match self.screen {
            Screen::Start => self.title_flicker.advance(dt_ms),
            Screen::Level => self.hud_flicker.advance(dt_ms),
            Screen::Void => self.void_text.advance(dt_ms),
        }
    }

    fn go(&mut self, screen: Screen) -> Option<Screen> {
        log::info!("Screen {:?} -> {:?}", self.screen, screen);
        self.screen = screen;
        match screen {
            Screen::Start => {
                self.prompt = START_PROMPT;
                self.title_flicker.reset();
            }
            Screen::Level => self.hud_flicker.reset(),
            Screen::Void => self.void_text.reset(),
        }
        Some(screen)
    }
}
