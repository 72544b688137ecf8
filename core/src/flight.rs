//! Ball trajectories, computed from elapsed time rather than measured.

use std::iter::FusedIterator;

use serde::Serialize;

use crate::config::TravelTiming;
use crate::geometry::{FieldBounds, Vec2};
use crate::units::FieldScale;

/// On-screen travel time for a delivery at `speed_kmh`.
///
/// The physical time over the pitch is found through the field's speed ratio,
/// stretched by the mode's slow-motion factor and clamped to its floor and
/// ceiling. Without a usable speed or geometry the configured default is used.
pub fn travel_secs(
    speed_kmh: f64,
    scale: Option<&FieldScale>,
    timing: &TravelTiming,
    default_secs: f64,
) -> f64 {
    let scale = match scale {
        Some(s) if speed_kmh > 0.0 && s.pitch_length_px > 0.0 => s,
        _ => return default_secs,
    };
    let speed_ms = speed_kmh / 3.6;
    let px_per_sec = scale.screen_speed_px_per_sec(speed_ms);
    if !(px_per_sec > 0.0) {
        return default_secs;
    }
    let screen_secs = scale.pitch_length_px / px_per_sec;
    timing.clamp(screen_secs * timing.slow_motion)
}

/// A ball travelling in a straight line from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BallFlight {
    pub release_ms: u64,
    pub travel_secs: f64,
    pub speed_kmh: f64,
    pub horizontal_offset: f64,
    pub start: Vec2,
    pub end: Vec2,
}

impl BallFlight {
    /// Straight down the pitch, shifted sideways by `horizontal_offset`.
    pub fn down_the_pitch(
        release_ms: u64,
        speed_kmh: f64,
        travel_secs: f64,
        horizontal_offset: f64,
        field: &FieldBounds,
        pitch_length_px: f64,
    ) -> Self {
        let c = field.center();
        let half = pitch_length_px / 2.0;
        Self {
            release_ms,
            travel_secs,
            speed_kmh,
            horizontal_offset,
            start: Vec2::new(c.x + horizontal_offset, c.y - half),
            end: Vec2::new(c.x + horizontal_offset, c.y + half),
        }
    }

    /// From the release point, one pitch length along `direction`.
    /// A backward release is mirrored so the ball still heads up the pitch.
    pub fn from_release(
        release_ms: u64,
        speed_kmh: f64,
        travel_secs: f64,
        point: Vec2,
        direction: Vec2,
        pitch_length_px: f64,
    ) -> Self {
        let heading = Vec2::new(direction.x, -direction.y.abs())
            .normalized()
            .unwrap_or(Vec2::new(0.0, -1.0));
        Self {
            release_ms,
            travel_secs,
            speed_kmh,
            horizontal_offset: 0.0,
            start: point,
            end: point.add(heading.scale(pitch_length_px)),
        }
    }

    pub fn duration_ms(&self) -> u64 {
        ((self.travel_secs * 1000.0).round() as u64).max(1)
    }

    pub fn lands_at_ms(&self) -> u64 {
        self.release_ms.saturating_add(self.duration_ms())
    }

    /// Fraction of the flight covered at `at_ms`, in [0, 1].
    pub fn progress(&self, at_ms: u64) -> f64 {
        let elapsed = at_ms.saturating_sub(self.release_ms) as f64;
        (elapsed / self.duration_ms() as f64).clamp(0.0, 1.0)
    }

    pub fn position(&self, at_ms: u64) -> Vec2 {
        self.start.lerp(self.end, self.progress(at_ms))
    }

    /// Earlier positions, newest first, for the trail behind the ball.
    pub fn trail(&self, at_ms: u64, points: usize, spacing_ms: u64) -> Trail {
        Trail { flight: *self, at_ms, spacing_ms, remaining: points, step: 1 }
    }
}

#[derive(Debug, Clone)]
pub struct Trail {
    flight: BallFlight,
    at_ms: u64,
    spacing_ms: u64,
    remaining: usize,
    step: u64,
}

impl Iterator for Trail {
    type Item = Vec2;

    fn next(&mut self) -> Option<Vec2> {
        if self.remaining == 0 {
            return None;
        }
        let back = self.step * self.spacing_ms;
        if back > self.at_ms || self.at_ms - back < self.flight.release_ms {
            self.remaining = 0;
            return None;
        }
        self.remaining -= 1;
        self.step += 1;
        Some(self.flight.position(self.at_ms - back))
    }
}

impl FusedIterator for Trail {}

/// Path of a ball after the bat connects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StruckFlight {
    pub struck_ms: u64,
    pub duration_ms: u64,
    pub from: Vec2,
    pub to: Vec2,
}

impl StruckFlight {
    pub fn new(struck_ms: u64, duration_ms: u64, from: Vec2, timing_score: u8) -> Self {
        let carry = if timing_score > 3 { 300.0 } else { 100.0 };
        Self { struck_ms, duration_ms, from, to: from.add(Vec2::new(carry, -100.0)) }
    }

    pub fn position(&self, at_ms: u64) -> Vec2 {
        let elapsed = at_ms.saturating_sub(self.struck_ms) as f64;
        let t = if self.duration_ms == 0 { 1.0 } else { elapsed / self.duration_ms as f64 };
        self.from.lerp(self.to, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn batting_travel_time_is_clamped() {
        let cfg = EngineConfig::default();
        let scale = FieldScale::from_bounds(&FieldBounds::square(1000.0));
        let t = &cfg.batting_travel;
        for kmh in [60.0, 100.0, 145.0, 170.0, 400.0] {
            let secs = travel_secs(kmh, Some(&scale), t, cfg.default_travel_secs);
            assert!(secs >= t.floor_secs && secs <= t.ceiling_secs, "{} km/h -> {}", kmh, secs);
        }
        // 145 km/h covers 20.12 m in ~0.4995 s; six times slower on screen
        let secs = travel_secs(145.0, Some(&scale), t, cfg.default_travel_secs);
        assert!((secs - 20.12 / (145.0 / 3.6) * 6.0).abs() < 1e-9);
    }

    #[test]
    fn zero_speed_or_missing_geometry_uses_default() {
        let cfg = EngineConfig::default();
        let scale = FieldScale::from_bounds(&FieldBounds::square(1000.0));
        assert_eq!(travel_secs(0.0, Some(&scale), &cfg.bowling_travel, 3.0), 3.0);
        assert_eq!(travel_secs(140.0, None, &cfg.bowling_travel, 3.0), 3.0);
    }

    #[test]
    fn position_is_linear_in_time() {
        let field = FieldBounds::square(1000.0);
        let f = BallFlight::down_the_pitch(1_000, 140.0, 2.0, 5.0, &field, 700.0);
        assert_eq!(f.position(1_000), Vec2::new(505.0, 150.0));
        assert_eq!(f.position(2_000), Vec2::new(505.0, 500.0));
        assert_eq!(f.position(9_000), Vec2::new(505.0, 850.0));
        assert_eq!(f.lands_at_ms(), 3_000);
    }

    #[test]
    fn trail_stops_at_release() {
        let field = FieldBounds::square(1000.0);
        let f = BallFlight::down_the_pitch(1_000, 140.0, 2.0, 0.0, &field, 700.0);
        let trail: Vec<Vec2> = f.trail(1_100, 5, 40).collect();
        assert_eq!(trail.len(), 2);
        assert!(trail[0].y > trail[1].y);
    }

    #[test]
    fn backward_release_still_heads_up_the_pitch() {
        let f = BallFlight::from_release(0, 120.0, 1.0, Vec2::new(100.0, 500.0), Vec2::new(0.0, 1.0), 300.0);
        assert_eq!(f.end, Vec2::new(100.0, 200.0));
    }
}
