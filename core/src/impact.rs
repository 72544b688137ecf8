//! Contact scoring for both game modes.

use serde::Serialize;

use crate::config::{ContactTuning, EngineConfig, SpeedBand};
use crate::constants::MAX_TIMING_SCORE;
use crate::geometry::{FieldBounds, Vec2};
use crate::gesture::Release;

/// A registered bat-ball contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contact {
    pub ball: Vec2,
    pub bat: Vec2,
    pub vertical_distance: f64,
    pub timing_score: u8,
}

/// Performance record of one bowled ball, fixed at release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BowlingMeasure {
    pub speed_kmh: f64,
    pub scaled_speed_kmh: f64,
    pub accuracy_pct: f64,
}

/// `max(0, 6 - floor(|vertical - ideal| / tolerance))`, clamped to [0, 6].
pub fn timing_score(vertical_distance: f64, tuning: &ContactTuning) -> u8 {
    let deviation = (vertical_distance - tuning.ideal_distance_px).abs();
    let bands = (deviation / tuning.tolerance_px).floor();
    let score = (MAX_TIMING_SCORE as f64 - bands).clamp(0.0, MAX_TIMING_SCORE as f64);
    score as u8
}

/// Proximity check for one bat sample. `None` while the bat is out of reach.
pub fn check_contact(ball: Vec2, bat: Vec2, tuning: &ContactTuning) -> Option<Contact> {
    if ball.distance(bat) >= tuning.hit_radius_px {
        return None;
    }
    let vertical_distance = (ball.y - bat.y).abs();
    Some(Contact {
        ball,
        bat,
        vertical_distance,
        timing_score: timing_score(vertical_distance, tuning),
    })
}

/// Release speed before any on-screen scaling.
pub fn bowling_speed_kmh(total_power: f64, max_speed_kmh: f64, band: &SpeedBand) -> f64 {
    (total_power.clamp(0.0, 100.0) / 100.0) * max_speed_kmh * band.multiplier
}

/// Linear falloff from the field's center line. A field that was never
/// measured cannot be missed, so it scores 100.
pub fn accuracy_pct(release_x: f64, field: Option<&FieldBounds>) -> f64 {
    match field {
        Some(f) if f.is_measurable() => {
            let deviation = (release_x - f.center().x).abs();
            (100.0 - deviation / (f.width / 2.0) * 100.0).clamp(0.0, 100.0)
        }
        _ => 100.0,
    }
}

/// Everything needed to score a bowling release.
pub struct BowlingContext<'a> {
    pub config: &'a EngineConfig,
    pub band: &'a SpeedBand,
    pub speed_ratio: f64,
    pub field: Option<&'a FieldBounds>,
}

/// Score a release. The record is final; there are no retries.
pub fn measure_release(release: &Release, ctx: &BowlingContext<'_>) -> BowlingMeasure {
    let speed_kmh = bowling_speed_kmh(release.total_power, ctx.config.max_bowling_speed_kmh, ctx.band);
    let scaled_speed_kmh = scale_speed(speed_kmh, ctx.speed_ratio);
    BowlingMeasure {
        speed_kmh,
        scaled_speed_kmh,
        accuracy_pct: accuracy_pct(release.point.x, ctx.field),
    }
}

/// On-screen equivalent of a real speed under the given speed ratio.
pub fn scale_speed(speed_kmh: f64, speed_ratio: f64) -> f64 {
    if speed_ratio > 0.0 {
        speed_kmh / speed_ratio
    } else {
        speed_kmh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, DifficultyTable};

    #[test]
    fn ideal_offset_scores_six() {
        let t = ContactTuning::default();
        assert_eq!(timing_score(20.0, &t), 6);
        assert_eq!(timing_score(54.9, &t), 6);
        assert_eq!(timing_score(55.0, &t), 5);
        assert_eq!(timing_score(0.0, &t), 6);
    }

    #[test]
    fn score_never_goes_negative() {
        let t = ContactTuning { hit_radius_px: 80.0, ideal_distance_px: 20.0, tolerance_px: 5.0 };
        assert_eq!(timing_score(500.0, &t), 0);
    }

    #[test]
    fn contact_needs_bat_inside_radius() {
        let t = ContactTuning::default();
        let ball = Vec2::new(100.0, 100.0);
        assert!(check_contact(ball, Vec2::new(100.0, 180.0), &t).is_none());
        let c = check_contact(ball, Vec2::new(100.0, 120.0), &t).unwrap();
        assert_eq!(c.vertical_distance, 20.0);
        assert_eq!(c.timing_score, 6);
    }

    #[test]
    fn full_power_on_hard_is_max_times_one_point_two() {
        let table = DifficultyTable::default();
        let speed = bowling_speed_kmh(100.0, 150.0, table.band(Difficulty::Hard));
        assert!((speed - 150.0 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn accuracy_falls_off_linearly_from_center() {
        let field = FieldBounds::new(0.0, 0.0, 400.0, 600.0);
        assert_eq!(accuracy_pct(200.0, Some(&field)), 100.0);
        assert!((accuracy_pct(300.0, Some(&field)) - 50.0).abs() < 1e-9);
        assert_eq!(accuracy_pct(-1000.0, Some(&field)), 0.0);
        assert_eq!(accuracy_pct(-1000.0, None), 100.0);
    }
}
