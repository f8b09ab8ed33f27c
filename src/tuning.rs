//! Game balance knobs
//!
//! Every number the simulation rolls against lives here so a level can be
//! retuned from JSON without a rebuild. Persisted in LocalStorage on web;
//! native builds read the file named by `LEVEL67_TUNING`.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Rule presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RuleVariant {
    /// Fast movement, small coin values, drift and gravity wobble
    #[default]
    Merged,
    /// Slow movement, "6 or 7" coin values, no drift or wobble
    Classic,
}

impl RuleVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleVariant::Merged => "Merged",
            RuleVariant::Classic => "Classic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "merged" | "default" => Some(RuleVariant::Merged),
            "classic" | "simple" => Some(RuleVariant::Classic),
            _ => None,
        }
    }
}

/// Level tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Preset these values started from
    pub variant: RuleVariant,

    // === Movement ===
    /// Horizontal speed while left/right is held (pixels/s)
    pub run_speed: f32,
    /// Upward speed applied on jump (pixels/s)
    pub jump_speed: f32,

    // === Score ===
    pub max_score: u32,
    /// Coin value is uniform(coin_value_min, coin_value_max)
    pub coin_value_min: u32,
    pub coin_value_max: u32,

    // === Level ===
    pub platform_count: usize,
    pub platform_base_y: f32,
    pub coin_count: usize,

    // === Gravity ===
    pub base_gravity: f32,
    /// Periodic wobble around base gravity
    pub gravity_variation: bool,
    pub gravity_variation_ms: f32,
    pub gravity_variation_min: f32,
    pub gravity_variation_max: f32,
    /// Per-frame glitch: fires when uniform(0, roll_max) < threshold
    pub gravity_glitch_roll_max: i32,
    pub gravity_glitch_threshold: i32,
    pub gravity_glitch_min: i32,
    pub gravity_glitch_max: i32,

    // === Drift glitch ===
    /// Per-frame: uniform(1, drift_roll_max) of 6 flings right, 7 flings left
    pub random_drift: bool,
    pub drift_roll_max: i32,
    pub drift_speed: f32,

    // === Trick star ===
    pub hazard_expiry_ms: f32,

    // === Max-score glitch ===
    pub glitch_flashes: u32,
    pub glitch_flash_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::merged()
    }
}

impl Tuning {
    /// The full game: fast, glitchy
    pub fn merged() -> Self {
        Self {
            variant: RuleVariant::Merged,

            run_speed: 300.0,
            jump_speed: 300.0,

            max_score: MAX_SCORE,
            coin_value_min: 1,
            coin_value_max: 3,

            platform_count: PLATFORM_COUNT,
            platform_base_y: PLATFORM_BASE_Y,
            coin_count: COIN_COUNT,

            base_gravity: BASE_GRAVITY,
            gravity_variation: true,
            gravity_variation_ms: GRAVITY_VARIATION_MS,
            gravity_variation_min: 0.9,
            gravity_variation_max: 1.1,
            gravity_glitch_roll_max: 1000,
            gravity_glitch_threshold: 3,
            gravity_glitch_min: 100,
            gravity_glitch_max: 600,

            random_drift: true,
            drift_roll_max: 50,
            drift_speed: 800.0,

            hazard_expiry_ms: HAZARD_EXPIRY_MS,

            glitch_flashes: GLITCH_FLASHES,
            glitch_flash_ms: GLITCH_FLASH_MS,
        }
    }

    /// The simpler variant: slower, coins worth 6 or 7
    pub fn classic() -> Self {
        Self {
            variant: RuleVariant::Classic,
            run_speed: 160.0,
            jump_speed: 330.0,
            coin_value_min: 6,
            coin_value_max: 7,
            gravity_variation: false,
            random_drift: false,
            ..Self::merged()
        }
    }

    /// Tuning for a preset
    pub fn from_variant(variant: RuleVariant) -> Self {
        match variant {
            RuleVariant::Merged => Self::merged(),
            RuleVariant::Classic => Self::classic(),
        }
    }

    /// Parse from JSON. Missing fields take the default preset's values.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Repair values that would break the simulation (inverted ranges,
    /// non-positive periods, a max score of zero)
    pub fn sanitized(mut self) -> Self {
        fn order<T: PartialOrd + Copy>(name: &str, lo: &mut T, hi: &mut T) {
            if *lo > *hi {
                log::warn!("Tuning: {} range inverted, swapping", name);
                std::mem::swap(lo, hi);
            }
        }

        if self.max_score == 0 {
            log::warn!("Tuning: max_score must be positive, using {}", MAX_SCORE);
            self.max_score = MAX_SCORE;
        }
        order("coin_value", &mut self.coin_value_min, &mut self.coin_value_max);
        order(
            "gravity_variation",
            &mut self.gravity_variation_min,
            &mut self.gravity_variation_max,
        );
        order("gravity_glitch", &mut self.gravity_glitch_min, &mut self.gravity_glitch_max);

        for (name, value, fallback) in [
            ("gravity_variation_ms", &mut self.gravity_variation_ms, GRAVITY_VARIATION_MS),
            ("hazard_expiry_ms", &mut self.hazard_expiry_ms, HAZARD_EXPIRY_MS),
            ("glitch_flash_ms", &mut self.glitch_flash_ms, GLITCH_FLASH_MS),
        ] {
            if !(*value > 0.0) {
                log::warn!("Tuning: {} must be positive, using {}", name, fallback);
                *value = fallback;
            }
        }

        if self.drift_roll_max < 1 {
            self.drift_roll_max = 1;
        }
        self
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "level67_tuning";

    /// Environment variable naming a JSON tuning file (native only)
    pub const ENV_VAR: &'static str = "LEVEL67_TUNING";

    /// Load tuning from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(tuning) => {
                        log::info!("Loaded tuning from LocalStorage");
                        return tuning;
                    }
                    Err(e) => log::warn!("Ignoring stored tuning: {}", e),
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Load tuning from the file named by `LEVEL67_TUNING`, else defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::ENV_VAR) else {
            log::info!("Using default tuning");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path);
                    tuning
                }
                Err(e) => {
                    log::warn!("Bad tuning file {}: {}, using defaults", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read tuning file {}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_differ_where_expected() {
        let merged = Tuning::merged();
        let classic = Tuning::classic();
        assert_eq!(merged.run_speed, 300.0);
        assert_eq!(classic.run_speed, 160.0);
        assert_eq!(merged.jump_speed, 300.0);
        assert_eq!(classic.jump_speed, 330.0);
        assert_eq!((classic.coin_value_min, classic.coin_value_max), (6, 7));
        assert!(!classic.random_drift && !classic.gravity_variation);
        // Shared rules
        assert_eq!(merged.max_score, classic.max_score);
        assert_eq!(merged.gravity_glitch_threshold, classic.gravity_glitch_threshold);
        assert_eq!(Tuning::default(), merged);
    }

    #[test]
    fn test_variant_names() {
        for v in [RuleVariant::Merged, RuleVariant::Classic] {
            assert_eq!(RuleVariant::from_str(v.as_str()), Some(v));
        }
        assert_eq!(RuleVariant::from_str("SIMPLE"), Some(RuleVariant::Classic));
        assert_eq!(RuleVariant::from_str("nope"), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "coin_count": 5, "run_speed": 120.0 }"#).unwrap();
        assert_eq!(tuning.coin_count, 5);
        assert_eq!(tuning.run_speed, 120.0);
        assert_eq!(tuning.max_score, MAX_SCORE);
        assert_eq!(tuning.platform_count, PLATFORM_COUNT);
    }

    #[test]
    fn test_json_round_trip() {
        let tuning = Tuning::classic();
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(Tuning::from_json("{ not json").is_err());
        assert!(Tuning::from_json(r#"{ "coin_count": -1 }"#).is_err());
    }

    #[test]
    fn test_sanitize_repairs() {
        let tuning = Tuning {
            max_score: 0,
            coin_value_min: 5,
            coin_value_max: 2,
            gravity_variation_ms: 0.0,
            glitch_flash_ms: f32::NAN,
            drift_roll_max: 0,
            ..Tuning::merged()
        }
        .sanitized();
        assert_eq!(tuning.max_score, MAX_SCORE);
        assert_eq!((tuning.coin_value_min, tuning.coin_value_max), (2, 5));
        assert_eq!(tuning.gravity_variation_ms, GRAVITY_VARIATION_MS);
        assert_eq!(tuning.glitch_flash_ms, GLITCH_FLASH_MS);
        assert_eq!(tuning.drift_roll_max, 1);
    }
}
