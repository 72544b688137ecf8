//! Engine tuning.
//!
//! Everything the game treats as a "design constant" lives here so it can be
//! tuned from a JSON file instead of being baked into the state machines.
//! Missing fields fall back to the values in [`crate::constants`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

/// Game difficulty
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(format!(
                "Invalid difficulty: '{}'. Must be 'easy', 'medium', or 'hard'",
                s
            )),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

/// Delivery speed range and bowling multiplier for one difficulty.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpeedBand {
    pub min_kmh: f64,
    pub max_kmh: f64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DifficultyTable {
    pub easy: SpeedBand,
    pub medium: SpeedBand,
    pub hard: SpeedBand,
}

impl DifficultyTable {
    pub fn band(&self, difficulty: Difficulty) -> &SpeedBand {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: SpeedBand { min_kmh: EASY_MIN_KMH, max_kmh: EASY_MAX_KMH, multiplier: EASY_MULTIPLIER },
            medium: SpeedBand { min_kmh: MEDIUM_MIN_KMH, max_kmh: MEDIUM_MAX_KMH, multiplier: MEDIUM_MULTIPLIER },
            hard: SpeedBand { min_kmh: HARD_MIN_KMH, max_kmh: HARD_MAX_KMH, multiplier: HARD_MULTIPLIER },
        }
    }
}

/// How pull power and swing speed combine into total release power.
///
/// `total = min(100, pull * pull_weight + swing * swing_weight)`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PowerWeights {
    pub pull: f64,
    pub swing: f64,
}

impl Default for PowerWeights {
    fn default() -> Self {
        Self { pull: PULL_WEIGHT, swing: SWING_WEIGHT }
    }
}

/// Travel-time scaling for one game mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TravelTiming {
    pub slow_motion: f64,
    pub floor_secs: f64,
    pub ceiling_secs: f64,
}

impl TravelTiming {
    pub fn clamp(&self, secs: f64) -> f64 {
        secs.clamp(self.floor_secs, self.ceiling_secs)
    }
}

fn default_batting_travel() -> TravelTiming {
    TravelTiming {
        slow_motion: BATTING_SLOW_MOTION,
        floor_secs: BATTING_TRAVEL_FLOOR_SECS,
        ceiling_secs: BATTING_TRAVEL_CEILING_SECS,
    }
}
fn default_bowling_travel() -> TravelTiming {
    TravelTiming {
        slow_motion: BOWLING_SLOW_MOTION,
        floor_secs: BOWLING_TRAVEL_FLOOR_SECS,
        ceiling_secs: BOWLING_TRAVEL_CEILING_SECS,
    }
}
fn default_travel_secs() -> f64 {
    DEFAULT_TRAVEL_SECS
}
fn default_countdown_ms() -> u64 {
    COUNTDOWN_MS
}
fn default_idle_wait_ms() -> u64 {
    BATTING_IDLE_WAIT_MS
}
fn default_tick_ms() -> u64 {
    TICK_MS
}
fn default_follow_through_ms() -> u64 {
    FOLLOW_THROUGH_MS
}
fn default_jitter() -> f64 {
    HORIZONTAL_JITTER_PX
}
fn default_max_bowling_speed() -> f64 {
    MAX_BOWLING_SPEED_KMH
}

/// Batting contact scoring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContactTuning {
    pub hit_radius_px: f64,
    pub ideal_distance_px: f64,
    pub tolerance_px: f64,
}

impl Default for ContactTuning {
    fn default() -> Self {
        Self {
            hit_radius_px: HIT_RADIUS_PX,
            ideal_distance_px: IDEAL_CONTACT_DISTANCE_PX,
            tolerance_px: TIMING_TOLERANCE_PX,
        }
    }
}

/// Bowling gesture thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GestureTuning {
    pub pull_reference_px: f64,
    pub min_pull_px: f64,
    pub min_swing_velocity: f64,
    pub swing_reference_velocity: f64,
    pub swing_smoothing: f64,
    pub min_release_power: f64,
    pub preview_points: usize,
    pub weights: PowerWeights,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self {
            pull_reference_px: PULL_REFERENCE_PX,
            min_pull_px: MIN_PULL_PX,
            min_swing_velocity: MIN_SWING_VELOCITY,
            swing_reference_velocity: SWING_REFERENCE_VELOCITY,
            swing_smoothing: SWING_SMOOTHING,
            min_release_power: MIN_RELEASE_POWER,
            preview_points: PREVIEW_POINTS,
            weights: PowerWeights::default(),
        }
    }
}

/// Timings of the stick-cricket variant (milliseconds).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StickTuning {
    pub run_up_ms: u64,
    pub ball_travel_ms: u64,
    pub hit_window_ms: u64,
    pub shot_ms: u64,
    pub max_wickets: u32,
}

impl Default for StickTuning {
    fn default() -> Self {
        Self {
            run_up_ms: STICK_RUN_UP_MS,
            ball_travel_ms: STICK_BALL_TRAVEL_MS,
            hit_window_ms: STICK_HIT_WINDOW_MS,
            shot_ms: STICK_SHOT_MS,
            max_wickets: STICK_MAX_WICKETS,
        }
    }
}

/// All engine tuning in one serializable value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub difficulties: DifficultyTable,
    #[serde(default = "default_max_bowling_speed")]
    pub max_bowling_speed_kmh: f64,
    #[serde(default)]
    pub contact: ContactTuning,
    #[serde(default)]
    pub gesture: GestureTuning,
    #[serde(default = "default_batting_travel")]
    pub batting_travel: TravelTiming,
    #[serde(default = "default_bowling_travel")]
    pub bowling_travel: TravelTiming,
    #[serde(default = "default_travel_secs")]
    pub default_travel_secs: f64,
    #[serde(default = "default_countdown_ms")]
    pub countdown_ms: u64,
    #[serde(default = "default_idle_wait_ms")]
    pub idle_wait_ms: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_follow_through_ms")]
    pub follow_through_ms: u64,
    #[serde(default = "default_jitter")]
    pub horizontal_jitter_px: f64,
    #[serde(default)]
    pub stick: StickTuning,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            difficulties: DifficultyTable::default(),
            max_bowling_speed_kmh: default_max_bowling_speed(),
            contact: ContactTuning::default(),
            gesture: GestureTuning::default(),
            batting_travel: default_batting_travel(),
            bowling_travel: default_bowling_travel(),
            default_travel_secs: default_travel_secs(),
            countdown_ms: default_countdown_ms(),
            idle_wait_ms: default_idle_wait_ms(),
            tick_ms: default_tick_ms(),
            follow_through_ms: default_follow_through_ms(),
            horizontal_jitter_px: default_jitter(),
            stick: StickTuning::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Reject tuning that would break an engine invariant (non-positive
    /// travel time, empty speed band, zero-sized hit radius, ...).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, band) in [
            ("easy", &self.difficulties.easy),
            ("medium", &self.difficulties.medium),
            ("hard", &self.difficulties.hard),
        ] {
            if !(band.min_kmh > 0.0 && band.min_kmh <= band.max_kmh && band.max_kmh.is_finite()) {
                return Err(invalid(format!(
                    "{} speed band must satisfy 0 < min <= max (got {}..{})",
                    name, band.min_kmh, band.max_kmh
                )));
            }
            if !(band.multiplier > 0.0) {
                return Err(invalid(format!("{} multiplier must be positive", name)));
            }
        }

        for (name, travel) in [("batting", &self.batting_travel), ("bowling", &self.bowling_travel)] {
            if !(travel.floor_secs > 0.0 && travel.floor_secs <= travel.ceiling_secs) {
                return Err(invalid(format!(
                    "{} travel time must satisfy 0 < floor <= ceiling (got {}..{})",
                    name, travel.floor_secs, travel.ceiling_secs
                )));
            }
            if !(travel.slow_motion > 0.0) {
                return Err(invalid(format!("{} slow_motion must be positive", name)));
            }
        }
        if !(self.default_travel_secs > 0.0) {
            return Err(invalid("default_travel_secs must be positive".into()));
        }
        if !(self.max_bowling_speed_kmh > 0.0) {
            return Err(invalid("max_bowling_speed_kmh must be positive".into()));
        }

        let c = &self.contact;
        if !(c.hit_radius_px > 0.0 && c.tolerance_px > 0.0 && c.ideal_distance_px >= 0.0) {
            return Err(invalid("contact radius and tolerance must be positive".into()));
        }

        let g = &self.gesture;
        if !(g.pull_reference_px > 0.0 && g.swing_reference_velocity > 0.0) {
            return Err(invalid("gesture reference distances must be positive".into()));
        }
        if !(0.0..=1.0).contains(&g.swing_smoothing) {
            return Err(invalid("swing_smoothing must be within [0, 1]".into()));
        }
        if g.weights.pull < 0.0 || g.weights.swing < 0.0 || g.weights.pull + g.weights.swing <= 0.0 {
            return Err(invalid("power weights must be non-negative with a positive sum".into()));
        }

        let jitter = self.horizontal_jitter_px;
        if !(0.0..=MAX_HORIZONTAL_JITTER_PX).contains(&jitter) {
            return Err(invalid(format!(
                "horizontal_jitter_px must be within [0, {}] (got {})",
                MAX_HORIZONTAL_JITTER_PX, jitter
            )));
        }

        if self.tick_ms == 0 {
            return Err(invalid("tick_ms must be positive".into()));
        }
        for (name, ms) in [
            ("tick_ms", self.tick_ms),
            ("countdown_ms", self.countdown_ms),
            ("idle_wait_ms", self.idle_wait_ms),
            ("follow_through_ms", self.follow_through_ms),
            ("stick.run_up_ms", self.stick.run_up_ms),
            ("stick.ball_travel_ms", self.stick.ball_travel_ms),
            ("stick.hit_window_ms", self.stick.hit_window_ms),
            ("stick.shot_ms", self.stick.shot_ms),
        ] {
            if ms > MAX_DURATION_MS {
                return Err(invalid(format!("{} must be at most {}ms (got {})", name, MAX_DURATION_MS, ms)));
            }
        }
        if self.stick.max_wickets == 0 {
            return Err(invalid("stick.max_wickets must be positive".into()));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::Invalid(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg = EngineConfig::from_json_str(r#"{ "max_bowling_speed_kmh": 160.0 }"#).unwrap();
        assert_eq!(cfg.max_bowling_speed_kmh, 160.0);
        assert_eq!(cfg.contact, ContactTuning::default());
        assert_eq!(cfg.difficulties.band(Difficulty::Hard).multiplier, HARD_MULTIPLIER);
    }

    #[test]
    fn inverted_travel_clamp_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.bowling_travel.floor_secs = 4.0;
        cfg.bowling_travel.ceiling_secs = 1.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn oversized_jitter_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.horizontal_jitter_px = 1e308;
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
        cfg.horizontal_jitter_px = f64::NAN;
        assert!(cfg.validate().is_err());
        cfg.horizontal_jitter_px = -1.0;
        assert!(cfg.validate().is_err());
        cfg.horizontal_jitter_px = MAX_HORIZONTAL_JITTER_PX;
        cfg.validate().unwrap();
    }

    #[test]
    fn absurd_durations_are_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.tick_ms = u64::MAX;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.follow_through_ms = MAX_DURATION_MS + 1;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.stick.hit_window_ms = u64::MAX;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn infinite_speed_band_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.difficulties.hard.max_kmh = f64::INFINITY;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_weights_are_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.gesture.weights = PowerWeights { pull: 0.0, swing: 0.0 };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("insane".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Easy.to_string(), "easy");
    }
}
