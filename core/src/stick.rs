//! The quick tap-to-swing variant: no over, play until the wickets run out.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::StickTuning;
use crate::timer::TimerQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StickPhase {
    Ready,
    RunUp,
    BallComing,
    HitWindow,
    ShotPlayed,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum StickEvent {
    Bowled { ball: u32 },
    HitWindowOpen,
    Shot { runs: u8 },
    Missed { out: bool },
    Wicket { wickets: u32 },
    GameOver { score: u32, wickets: u32, balls: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StickTimer {
    BallReleased,
    WindowOpens,
    WindowCloses,
    ShotDone,
}

pub struct StickMatch {
    tuning: StickTuning,
    rng: StdRng,
    timers: TimerQueue<StickTimer>,
    phase: StickPhase,
    now_ms: u64,
    score: u32,
    wickets: u32,
    balls: u32,
    events: Vec<StickEvent>,
}

impl StickMatch {
    pub fn new(tuning: StickTuning, seed: u64) -> Self {
        Self {
            tuning,
            rng: StdRng::seed_from_u64(seed),
            timers: TimerQueue::new(),
            phase: StickPhase::Ready,
            now_ms: 0,
            score: 0,
            wickets: 0,
            balls: 0,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> StickPhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn wickets(&self) -> u32 {
        self.wickets
    }

    pub fn balls(&self) -> u32 {
        self.balls
    }

    pub fn is_over(&self) -> bool {
        self.phase == StickPhase::GameOver
    }

    pub fn drain_events(&mut self) -> Vec<StickEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start the next delivery. Ignored unless the previous one has finished.
    pub fn bowl(&mut self, now_ms: u64) -> bool {
        self.advance_to(now_ms);
        if self.phase != StickPhase::Ready {
            return false;
        }
        self.balls += 1;
        self.phase = StickPhase::RunUp;
        self.events.push(StickEvent::Bowled { ball: self.balls });
        self.timers.schedule(self.now_ms.saturating_add(self.tuning.run_up_ms), StickTimer::BallReleased);
        true
    }

    /// Tap to swing. Only connects while the hit window is open.
    pub fn swing(&mut self, now_ms: u64) -> Option<u8> {
        self.advance_to(now_ms);
        if self.phase != StickPhase::HitWindow {
            return None;
        }
        self.timers.cancel_all();

        let runs: u8 = self.rng.gen_range(0..=6);
        if runs == 0 {
            self.take_wicket();
        } else {
            self.score += runs as u32;
            self.events.push(StickEvent::Shot { runs });
        }
        if self.phase != StickPhase::GameOver {
            self.phase = StickPhase::ShotPlayed;
            self.timers.schedule(self.now_ms.saturating_add(self.tuning.shot_ms), StickTimer::ShotDone);
        }
        Some(runs)
    }

    pub fn advance_to(&mut self, now_ms: u64) {
        let target = now_ms.max(self.now_ms);
        while let Some((due, _, timer)) = self.timers.pop_due(target) {
            self.now_ms = self.now_ms.max(due);
            match timer {
                StickTimer::BallReleased => {
                    self.phase = StickPhase::BallComing;
                    self.timers.schedule(due.saturating_add(self.tuning.ball_travel_ms), StickTimer::WindowOpens);
                }
                StickTimer::WindowOpens => {
                    self.phase = StickPhase::HitWindow;
                    self.events.push(StickEvent::HitWindowOpen);
                    self.timers.schedule(due.saturating_add(self.tuning.hit_window_ms), StickTimer::WindowCloses);
                }
                StickTimer::WindowCloses => {
                    // a missed ball is out half the time
                    let out = self.rng.gen_bool(0.5);
                    self.events.push(StickEvent::Missed { out });
                    if out {
                        self.take_wicket();
                    }
                    if self.phase != StickPhase::GameOver {
                        self.phase = StickPhase::Ready;
                    }
                }
                StickTimer::ShotDone => {
                    if self.phase == StickPhase::ShotPlayed {
                        self.phase = StickPhase::Ready;
                    }
                }
            }
        }
        self.now_ms = target;
    }

    /// Back to a fresh innings; the RNG stream carries on.
    pub fn reset(&mut self) {
        self.timers.cancel_all();
        self.phase = StickPhase::Ready;
        self.score = 0;
        self.wickets = 0;
        self.balls = 0;
        self.events.clear();
    }

    fn take_wicket(&mut self) {
        self.wickets += 1;
        self.events.push(StickEvent::Wicket { wickets: self.wickets });
        if self.wickets >= self.tuning.max_wickets {
            self.timers.cancel_all();
            self.phase = StickPhase::GameOver;
            tracing::info!("Stick match over: {} runs from {} balls", self.score, self.balls);
            self.events.push(StickEvent::GameOver {
                score: self.score,
                wickets: self.wickets,
                balls: self.balls,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn stick() -> StickMatch {
        StickMatch::new(EngineConfig::default().stick, 11)
    }

    #[test]
    fn delivery_walks_through_its_phases() {
        let mut m = stick();
        assert!(m.bowl(0));
        assert!(!m.bowl(10));
        assert_eq!(m.phase(), StickPhase::RunUp);
        m.advance_to(500);
        assert_eq!(m.phase(), StickPhase::BallComing);
        m.advance_to(1_500);
        assert_eq!(m.phase(), StickPhase::HitWindow);
        m.advance_to(2_000);
        assert_eq!(m.phase(), StickPhase::Ready);
    }

    #[test]
    fn early_swing_does_nothing() {
        let mut m = stick();
        m.bowl(0);
        assert_eq!(m.swing(800), None);
        assert_eq!(m.phase(), StickPhase::BallComing);
    }

    #[test]
    fn swing_in_window_scores_or_loses_a_wicket() {
        let mut m = stick();
        m.bowl(0);
        let runs = m.swing(1_600).unwrap();
        assert!(runs <= 6);
        if runs == 0 {
            assert_eq!(m.wickets(), 1);
        } else {
            assert_eq!(m.score(), runs as u32);
        }
        m.advance_to(1_900);
        assert_eq!(m.phase(), StickPhase::Ready);
    }

    #[test]
    fn game_ends_at_the_wicket_limit() {
        let mut m = stick();
        let mut t = 0;
        while !m.is_over() {
            m.bowl(t);
            m.advance_to(t + 2_000);
            t += 2_000;
            assert!(m.balls() < 1_000);
        }
        assert_eq!(m.wickets(), 3);
        assert!(!m.bowl(t));
        let events = m.drain_events();
        assert!(matches!(events.last(), Some(StickEvent::GameOver { wickets: 3, .. })));

        m.reset();
        assert_eq!(m.phase(), StickPhase::Ready);
        assert_eq!(m.score(), 0);
    }
}
