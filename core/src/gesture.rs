//! Bowling gesture: pull back to load power, swing forward, let go.
//!
//! Screen coordinates grow downward and the bowler stands at the bottom of the
//! field, so pulling *back* moves the pointer down (+y) and the forward swing
//! moves it up (-y).

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use crate::config::GestureTuning;
use crate::geometry::Vec2;

/// Phase of one gesture. Ordered: a gesture only ever moves forward through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GesturePhase {
    Idle,
    PullBack,
    ForwardSwing,
    Released,
    Abandoned,
}

impl GesturePhase {
    pub fn is_active(self) -> bool {
        matches!(self, GesturePhase::PullBack | GesturePhase::ForwardSwing)
    }
}

/// One pointer observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureSample {
    pub position: Vec2,
    pub timestamp_ms: u64,
}

impl GestureSample {
    pub fn new(x: f64, y: f64, timestamp_ms: u64) -> Self {
        Self { position: Vec2::new(x, y), timestamp_ms }
    }
}

/// A gesture that ended in a bowled ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Release {
    pub origin: Vec2,
    pub point: Vec2,
    /// Unit vector from gesture start to release point
    pub direction: Vec2,
    pub pull_power: f64,
    pub swing_speed: f64,
    pub total_power: f64,
    pub at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEnd {
    Released(Release),
    /// Nothing is bowled. `reached` is the furthest phase the gesture got to.
    Abandoned { reached: GesturePhase, total_power: f64 },
}

#[derive(Debug, Clone)]
pub struct GestureTracker {
    tuning: GestureTuning,
    phase: GesturePhase,
    origin: Option<GestureSample>,
    last: Option<GestureSample>,
    peak_pull_px: f64,
    deepest_pull_y: f64,
    pull_power: f64,
    swing_speed: f64,
    path: Vec<GesturePhase>,
}

impl GestureTracker {
    pub fn new(tuning: GestureTuning) -> Self {
        Self {
            tuning,
            phase: GesturePhase::Idle,
            origin: None,
            last: None,
            peak_pull_px: 0.0,
            deepest_pull_y: 0.0,
            pull_power: 0.0,
            swing_speed: 0.0,
            path: Vec::with_capacity(3),
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Phases visited by the current gesture, in order.
    pub fn path(&self) -> &[GesturePhase] {
        &self.path
    }

    pub fn pull_power(&self) -> f64 {
        self.pull_power
    }

    pub fn swing_speed(&self) -> f64 {
        self.swing_speed
    }

    pub fn origin(&self) -> Option<Vec2> {
        self.origin.map(|s| s.position)
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.last.map(|s| s.position)
    }

    pub fn total_power(&self) -> f64 {
        let w = self.tuning.weights;
        (self.pull_power * w.pull + self.swing_speed * w.swing).min(100.0)
    }

    /// Start a gesture. Refused while another gesture is still active.
    pub fn begin(&mut self, sample: GestureSample) -> bool {
        if self.phase.is_active() {
            return false;
        }
        self.reset();
        self.origin = Some(sample);
        self.last = Some(sample);
        self.enter(GesturePhase::PullBack);
        true
    }

    /// Feed one pointer observation. Returns the phase after the sample.
    pub fn sample(&mut self, sample: GestureSample) -> GesturePhase {
        if !self.phase.is_active() {
            return self.phase;
        }
        let (origin, last) = match (self.origin, self.last) {
            (Some(o), Some(l)) => (o, l),
            _ => return self.phase,
        };
        if sample.timestamp_ms < last.timestamp_ms {
            tracing::warn!(
                "Dropping out-of-order gesture sample ({} < {})",
                sample.timestamp_ms,
                last.timestamp_ms
            );
            return self.phase;
        }

        let step = sample.position.sub(last.position);
        let elapsed_ms = (sample.timestamp_ms - last.timestamp_ms) as f64;
        let velocity = if elapsed_ms > 0.0 { step.length() / elapsed_ms } else { 0.0 };

        if self.phase == GesturePhase::PullBack {
            let from_origin = sample.position.sub(origin.position);
            self.peak_pull_px = self.peak_pull_px.max(from_origin.length());
            self.deepest_pull_y = self.deepest_pull_y.max(from_origin.y);
            self.pull_power = (self.peak_pull_px / self.tuning.pull_reference_px * 100.0).min(100.0);

            let pulled_enough = self.peak_pull_px > self.tuning.min_pull_px;
            let reversed = self.deepest_pull_y > 0.0 && step.y < 0.0;
            let fast_enough = velocity > self.tuning.min_swing_velocity;
            if pulled_enough && reversed && fast_enough {
                self.enter(GesturePhase::ForwardSwing);
            }
        }

        if self.phase == GesturePhase::ForwardSwing && elapsed_ms > 0.0 {
            let factor = (velocity / self.tuning.swing_reference_velocity * 100.0).min(100.0);
            let k = self.tuning.swing_smoothing;
            self.swing_speed = (self.swing_speed * k + factor * (1.0 - k)).clamp(0.0, 100.0);
        }

        self.last = Some(sample);
        self.phase
    }

    /// Pointer lifted. Only a forward swing with enough power bowls the ball;
    /// anything else abandons the gesture and resets the tracker.
    pub fn end(&mut self, sample: GestureSample) -> Option<GestureEnd> {
        if !self.phase.is_active() {
            return None;
        }
        self.sample(sample);

        let total_power = self.total_power();
        if self.phase == GesturePhase::ForwardSwing && total_power >= self.tuning.min_release_power {
            let origin = self.origin.map(|s| s.position).unwrap_or(sample.position);
            let point = self.last.map(|s| s.position).unwrap_or(sample.position);
            let direction = point.sub(origin).normalized().unwrap_or(Vec2::new(0.0, -1.0));
            let release = Release {
                origin,
                point,
                direction,
                pull_power: self.pull_power,
                swing_speed: self.swing_speed,
                total_power,
                at_ms: self.last.map(|s| s.timestamp_ms).unwrap_or(sample.timestamp_ms),
            };
            self.enter(GesturePhase::Released);
            return Some(GestureEnd::Released(release));
        }

        Some(self.abandon(total_power))
    }

    /// Pointer cancelled by the platform.
    pub fn cancel(&mut self) -> Option<GestureEnd> {
        if !self.phase.is_active() {
            return None;
        }
        let total_power = self.total_power();
        Some(self.abandon(total_power))
    }

    pub fn reset(&mut self) {
        self.phase = GesturePhase::Idle;
        self.origin = None;
        self.last = None;
        self.peak_pull_px = 0.0;
        self.deepest_pull_y = 0.0;
        self.pull_power = 0.0;
        self.swing_speed = 0.0;
        self.path.clear();
    }

    /// Aiming preview from the gesture start to the pointer.
    /// Empty when no gesture is active.
    pub fn preview(&self) -> TrajectoryPreview {
        match (self.phase.is_active(), self.origin, self.last) {
            (true, Some(o), Some(l)) => {
                TrajectoryPreview::new(o.position, l.position, self.tuning.preview_points)
            }
            _ => TrajectoryPreview::new(Vec2::ZERO, Vec2::ZERO, 0),
        }
    }

    fn abandon(&mut self, total_power: f64) -> GestureEnd {
        let reached = self.phase;
        tracing::debug!("Gesture abandoned in {:?} at {:.1}% power", reached, total_power);
        self.reset();
        GestureEnd::Abandoned { reached, total_power }
    }

    fn enter(&mut self, next: GesturePhase) {
        if next > self.phase {
            self.phase = next;
            self.path.push(next);
        }
    }
}

/// Evenly spaced points on the segment `from -> to`, endpoints included.
/// Single pass; build a new one for every pointer sample.
#[derive(Debug, Clone)]
pub struct TrajectoryPreview {
    from: Vec2,
    to: Vec2,
    count: usize,
    next: usize,
}

impl TrajectoryPreview {
    fn new(from: Vec2, to: Vec2, count: usize) -> Self {
        Self { from, to, count, next: 0 }
    }
}

impl Iterator for TrajectoryPreview {
    type Item = Vec2;

    fn next(&mut self) -> Option<Vec2> {
        if self.next >= self.count {
            return None;
        }
        let t = if self.count == 1 { 1.0 } else { self.next as f64 / (self.count - 1) as f64 };
        self.next += 1;
        Some(self.from.lerp(self.to, t))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for TrajectoryPreview {}
impl FusedIterator for TrajectoryPreview {}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> GestureTracker {
        GestureTracker::new(GestureTuning::default())
    }

    /// Pull straight down by `depth` px over `pull_ms`, then swing up by
    /// `swing` px over `swing_ms`, in 10 ms steps.
    fn pull_and_swing(t: &mut GestureTracker, depth: f64, pull_ms: u64, swing: f64, swing_ms: u64) -> u64 {
        t.begin(GestureSample::new(0.0, 0.0, 0));
        let steps = pull_ms / 10;
        for i in 1..=steps {
            let y = depth * i as f64 / steps as f64;
            t.sample(GestureSample::new(0.0, y, i * 10));
        }
        let steps_up = swing_ms / 10;
        for i in 1..=steps_up {
            let y = depth - swing * i as f64 / steps_up as f64;
            t.sample(GestureSample::new(0.0, y, pull_ms + i * 10));
        }
        pull_ms + swing_ms
    }

    #[test]
    fn pull_power_saturates_at_reference_distance() {
        let mut t = tracker();
        t.begin(GestureSample::new(0.0, 0.0, 0));
        t.sample(GestureSample::new(0.0, 60.0, 100));
        assert!((t.pull_power() - 50.0).abs() < 1e-9);
        t.sample(GestureSample::new(0.0, 500.0, 200));
        assert_eq!(t.pull_power(), 100.0);
        assert_eq!(t.phase(), GesturePhase::PullBack);
    }

    #[test]
    fn reversal_after_pull_starts_forward_swing() {
        let mut t = tracker();
        let end = pull_and_swing(&mut t, 80.0, 200, 100.0, 100);
        assert_eq!(t.phase(), GesturePhase::ForwardSwing);
        assert!(t.swing_speed() > 0.0);
        let out = t.end(GestureSample::new(0.0, -20.0, end + 10)).unwrap();
        match out {
            GestureEnd::Released(r) => {
                assert!(r.direction.y < 0.0);
                assert!(r.total_power >= 5.0);
            }
            other => panic!("expected release, got {:?}", other),
        }
        assert_eq!(t.path(), &[GesturePhase::PullBack, GesturePhase::ForwardSwing, GesturePhase::Released]);
    }

    #[test]
    fn small_wiggle_is_not_a_swing() {
        let mut t = tracker();
        t.begin(GestureSample::new(0.0, 0.0, 0));
        t.sample(GestureSample::new(0.0, 10.0, 50));
        t.sample(GestureSample::new(0.0, 2.0, 60));
        assert_eq!(t.phase(), GesturePhase::PullBack);
    }

    #[test]
    fn slow_reversal_is_not_a_swing() {
        let mut t = tracker();
        t.begin(GestureSample::new(0.0, 0.0, 0));
        t.sample(GestureSample::new(0.0, 50.0, 100));
        // 1 px over 100 ms = 0.01 px/ms
        t.sample(GestureSample::new(0.0, 49.0, 200));
        assert_eq!(t.phase(), GesturePhase::PullBack);
    }

    #[test]
    fn release_during_pull_back_is_abandoned_and_resets() {
        let mut t = tracker();
        t.begin(GestureSample::new(0.0, 0.0, 0));
        t.sample(GestureSample::new(0.0, 100.0, 100));
        let out = t.end(GestureSample::new(0.0, 110.0, 150)).unwrap();
        assert!(matches!(out, GestureEnd::Abandoned { reached: GesturePhase::PullBack, .. }));
        assert_eq!(t.phase(), GesturePhase::Idle);
        assert_eq!(t.pull_power(), 0.0);
        assert!(t.path().is_empty());
    }

    #[test]
    fn weak_forward_swing_is_abandoned_below_release_power() {
        let tuning = GestureTuning { min_release_power: 90.0, ..GestureTuning::default() };
        let mut t = GestureTracker::new(tuning);
        // 30 px pull, then a slow 40 px swing at 0.4 px/ms
        let end = pull_and_swing(&mut t, 30.0, 200, 40.0, 100);
        assert_eq!(t.phase(), GesturePhase::ForwardSwing);
        assert!(t.total_power() < 90.0);

        let out = t.end(GestureSample::new(0.0, -14.0, end + 10)).unwrap();
        match out {
            GestureEnd::Abandoned { reached, total_power } => {
                assert_eq!(reached, GesturePhase::ForwardSwing);
                assert!(total_power < 90.0);
            }
            other => panic!("expected abandon, got {:?}", other),
        }
        assert_eq!(t.phase(), GesturePhase::Idle);
        assert!(t.path().is_empty());
    }

    #[test]
    fn phase_never_moves_backwards() {
        let mut t = tracker();
        pull_and_swing(&mut t, 80.0, 200, 40.0, 100);
        assert_eq!(t.phase(), GesturePhase::ForwardSwing);
        // pulling back again keeps the swing phase
        t.sample(GestureSample::new(0.0, 200.0, 400));
        assert_eq!(t.phase(), GesturePhase::ForwardSwing);
        assert_eq!(t.path(), &[GesturePhase::PullBack, GesturePhase::ForwardSwing]);
    }

    #[test]
    fn out_of_order_samples_are_dropped() {
        let mut t = tracker();
        t.begin(GestureSample::new(0.0, 0.0, 100));
        t.sample(GestureSample::new(0.0, 60.0, 200));
        t.sample(GestureSample::new(0.0, 120.0, 150));
        assert!((t.pull_power() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn begin_is_refused_mid_gesture() {
        let mut t = tracker();
        assert!(t.begin(GestureSample::new(0.0, 0.0, 0)));
        assert!(!t.begin(GestureSample::new(5.0, 5.0, 10)));
    }

    #[test]
    fn preview_runs_from_origin_to_pointer_once() {
        let mut t = tracker();
        t.begin(GestureSample::new(0.0, 0.0, 0));
        t.sample(GestureSample::new(0.0, 70.0, 100));
        let mut preview = t.preview();
        assert_eq!(preview.len(), PREVIEW_POINTS_FOR_TEST);
        let points: Vec<Vec2> = preview.by_ref().collect();
        assert_eq!(points.first(), Some(&Vec2::new(0.0, 0.0)));
        assert_eq!(points.last(), Some(&Vec2::new(0.0, 70.0)));
        assert!(preview.next().is_none());
    }

    const PREVIEW_POINTS_FOR_TEST: usize = crate::constants::PREVIEW_POINTS;

    #[test]
    fn full_effort_combines_to_full_power() {
        let mut t = tracker();
        t.pull_power = 100.0;
        t.swing_speed = 100.0;
        assert_eq!(t.total_power(), 100.0);
        t.swing_speed = 0.0;
        assert!((t.total_power() - 60.0).abs() < 1e-9);
    }
}
