//! Per-screen audio
//!
//! Each screen owns the tracks it plays. `ScreenAudio` starts them when the
//! screen is entered and stops them when it is dropped, so leaving a screen
//! any way at all (including tearing down a level mid-game) silences it.
//! Browsers may refuse playback until the user interacts; that is logged and
//! otherwise ignored.

/// A sound file and how to play it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioCue {
    pub path: &'static str,
    pub looped: bool,
    /// 0.0 - 1.0
    pub volume: f32,
}

/// Voice line on the start screen
pub const START_VOICE: AudioCue = AudioCue {
    path: "/sounds/vsauce.mp3",
    looped: false,
    volume: 0.8,
};

/// Start screen background loop
pub const START_MUSIC: AudioCue = AudioCue {
    path: "/sounds/startBg.mp3",
    looped: true,
    volume: 0.8,
};

/// Level background loop
pub const LEVEL_MUSIC: AudioCue = AudioCue {
    path: "/sounds/spooky.mp3",
    looped: true,
    volume: 0.8,
};

/// Void screen laugh loop
pub const VOID_LAUGH: AudioCue = AudioCue {
    path: "/sounds/cat-laugh.mp3",
    looped: true,
    volume: 0.3,
};

/// Something that can play audio files
pub trait AudioPlayer {
    /// Start `cue` at `volume`. Returns false if playback was refused.
    fn play(&mut self, cue: &AudioCue, volume: f32) -> bool;

    /// Stop `cue` and release it
    fn stop(&mut self, cue: &AudioCue);
}

/// Player that plays nothing (headless runs, tests)
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioPlayer for NullAudio {
    fn play(&mut self, cue: &AudioCue, volume: f32) -> bool {
        log::debug!("(silent) play {} at {:.2}", cue.path, volume);
        true
    }

    fn stop(&mut self, cue: &AudioCue) {
        log::debug!("(silent) stop {}", cue.path);
    }
}

/// Audio held by one screen for as long as it is shown
pub struct ScreenAudio {
    player: Box<dyn AudioPlayer>,
    playing: Vec<AudioCue>,
    master_volume: f32,
    muted: bool,
}

impl ScreenAudio {
    /// Start every cue on `player`
    pub fn acquire(player: Box<dyn AudioPlayer>, cues: &[AudioCue], master_volume: f32) -> Self {
        let mut audio = Self {
            player,
            playing: Vec::with_capacity(cues.len()),
            master_volume: master_volume.clamp(0.0, 1.0),
            muted: false,
        };
        for cue in cues {
            audio.start(*cue);
        }
        audio
    }

    fn start(&mut self, cue: AudioCue) {
        let volume = self.effective_volume(&cue);
        if self.player.play(&cue, volume) {
            self.playing.push(cue);
        } else {
            log::debug!("Playback of {} refused (autoplay?)", cue.path);
        }
    }

    /// Volume a cue plays at
    fn effective_volume(&self, cue: &AudioCue) -> f32 {
        if self.muted {
            0.0
        } else {
            cue.volume * self.master_volume
        }
    }

    /// Mute/unmute: stops everything, restarts on unmute
    pub fn set_muted(&mut self, muted: bool) {
        if muted == self.muted {
            return;
        }
        if muted {
            // Keep `playing` so unmute knows what to resume
            for cue in &self.playing {
                self.player.stop(cue);
            }
            self.muted = true;
        } else {
            self.muted = false;
            for cue in std::mem::take(&mut self.playing) {
                self.start(cue);
            }
        }
    }

    pub fn is_playing(&self, cue: &AudioCue) -> bool {
        !self.muted && self.playing.iter().any(|c| c.path == cue.path)
    }

    /// Stop everything this screen started. Safe to call more than once.
    pub fn release(&mut self) {
        for cue in self.playing.drain(..) {
            if !self.muted {
                self.player.stop(&cue);
            }
        }
    }
}

impl Drop for ScreenAudio {
    fn drop(&mut self) {
        self.release();
    }
}

/// HTML audio elements, one per playing cue
#[cfg(target_arch = "wasm32")]
pub mod web {
    use std::collections::HashMap;

    use wasm_bindgen::prelude::*;
    use web_sys::HtmlAudioElement;

    use super::{AudioCue, AudioPlayer};

    #[derive(Default)]
    pub struct WebAudio {
        elements: HashMap<&'static str, HtmlAudioElement>,
    }

    impl WebAudio {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl AudioPlayer for WebAudio {
        fn play(&mut self, cue: &AudioCue, volume: f32) -> bool {
            let Ok(el) = HtmlAudioElement::new_with_src(cue.path) else {
                log::warn!("Cannot create audio element for {}", cue.path);
                return false;
            };
            el.set_loop(cue.looped);
            el.set_volume(f64::from(volume));
            match el.play() {
                Ok(promise) => {
                    // Autoplay rejection arrives asynchronously; swallow it
                    let ignore = Closure::<dyn FnMut(JsValue)>::new(|_: JsValue| {});
                    let _ = promise.catch(&ignore);
                    ignore.forget();
                }
                Err(_) => return false,
            }
            self.elements.insert(cue.path, el);
            true
        }

        fn stop(&mut self, cue: &AudioCue) {
            if let Some(el) = self.elements.remove(cue.path) {
                let _ = el.pause();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records play/stop calls; can refuse a path
    #[derive(Default, Clone)]
    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
        refuse: Option<&'static str>,
    }

    impl AudioPlayer for Recorder {
        fn play(&mut self, cue: &AudioCue, volume: f32) -> bool {
            if self.refuse == Some(cue.path) {
                return false;
            }
            self.log.borrow_mut().push(format!("play {} {:.2}", cue.path, volume));
            true
        }

        fn stop(&mut self, cue: &AudioCue) {
            self.log.borrow_mut().push(format!("stop {}", cue.path));
        }
    }

    #[test]
    fn test_drop_releases_everything() {
        let rec = Recorder::default();
        {
            let audio = ScreenAudio::acquire(Box::new(rec.clone()), &[START_VOICE, START_MUSIC], 1.0);
            assert!(audio.is_playing(&START_MUSIC));
        }
        let log = rec.log.borrow();
        assert_eq!(
            *log,
            vec![
                "play /sounds/vsauce.mp3 0.80",
                "play /sounds/startBg.mp3 0.80",
                "stop /sounds/vsauce.mp3",
                "stop /sounds/startBg.mp3",
            ]
        );
    }

    #[test]
    fn test_refused_cue_is_not_stopped() {
        let rec = Recorder {
            refuse: Some(LEVEL_MUSIC.path),
            ..Default::default()
        };
        let mut audio = ScreenAudio::acquire(Box::new(rec.clone()), &[LEVEL_MUSIC], 0.5);
        assert!(!audio.is_playing(&LEVEL_MUSIC));
        audio.release();
        audio.release();
        assert!(rec.log.borrow().is_empty());
    }

    #[test]
    fn test_master_volume_and_mute() {
        let rec = Recorder::default();
        let mut audio = ScreenAudio::acquire(Box::new(rec.clone()), &[VOID_LAUGH], 0.5);
        audio.set_muted(true);
        assert!(!audio.is_playing(&VOID_LAUGH));
        audio.set_muted(false);
        assert!(audio.is_playing(&VOID_LAUGH));
        drop(audio);
        let log = rec.log.borrow();
        assert_eq!(
            *log,
            vec![
                "play /sounds/cat-laugh.mp3 0.15",
                "stop /sounds/cat-laugh.mp3",
                "play /sounds/cat-laugh.mp3 0.15",
                "stop /sounds/cat-laugh.mp3",
            ]
        );
    }

    #[test]
    fn test_each_cue_stopped_once_per_mute() {
        let rec = Recorder::default();
        let mut audio = ScreenAudio::acquire(Box::new(rec.clone()), &[START_VOICE, START_MUSIC], 1.0);
        for _ in 0..3 {
            audio.set_muted(true);
            audio.set_muted(true);
            audio.set_muted(false);
        }
        audio.set_muted(true);
        // Already silent: dropping while muted stops nothing more
        drop(audio);

        let log = rec.log.borrow();
        let stops = log.iter().filter(|l| l.starts_with("stop")).count();
        let plays = log.iter().filter(|l| l.starts_with("play")).count();
        assert_eq!(plays, 2 * 4);
        assert_eq!(stops, 2 * 4);
    }
}
