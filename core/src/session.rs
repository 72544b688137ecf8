//! One over of batting or bowling.
//!
//! A [`GameSession`] owns every piece of mutable game state: the delivery
//! phase, the over, the live ball, the gesture tracker and the pending timers.
//! It is driven entirely by its caller: `advance_to` for the passage of time,
//! plus the pointer/bat input methods. Every input first advances the clock to
//! its own timestamp, so timers and inputs interleave deterministically.
//!
//! Phase flow:
//!
//! ```text
//! PreCountdown -> Countdown -> IdleWait -> Releasing -> InFlight -> Resolved
//!                                 ^                                   |
//!                                 +-----------------------------------+
//!                                                  (6th ball) -> OverComplete
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{Difficulty, EngineConfig};
use crate::constants::{
    DEFAULT_FIELD_SIZE_PX, MAX_HORIZONTAL_JITTER_PX, PITCH_FRACTION_OF_FIELD, TRAIL_POINTS, TRAIL_SPACING_MS,
};
use crate::flight::{travel_secs, BallFlight, StruckFlight};
use crate::geometry::{FieldBounds, Vec2};
use crate::gesture::{GestureEnd, GesturePhase, GestureSample, GestureTracker, Release};
use crate::impact::{check_contact, measure_release, BowlingContext, BowlingMeasure, Contact};
use crate::over::{BallOutcome, Over};
use crate::profile::{Opponent, OpponentProvider, Role};
use crate::timer::{TimerId, TimerQueue};
use crate::units::{FieldScale, UnitConverter};
use crate::ResultsPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Batting,
    Bowling,
}

impl GameMode {
    /// Role of the opponent the player faces in this mode.
    pub fn opponent_role(self) -> Role {
        match self {
            GameMode::Batting => Role::Bowler,
            GameMode::Bowling => Role::Batsman,
        }
    }
}

impl std::str::FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "batting" => Ok(GameMode::Batting),
            "bowling" => Ok(GameMode::Bowling),
            _ => Err(format!("Invalid game mode: '{}'. Must be 'batting' or 'bowling'", s)),
        }
    }
}

impl std::fmt::Display for GameMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameMode::Batting => write!(f, "batting"),
            GameMode::Bowling => write!(f, "bowling"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSetup {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// Seeds delivery speeds and horizontal jitter
    pub seed: u64,
}

/// Where the current ball is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryPhase {
    PreCountdown,
    Countdown { remaining: u32 },
    /// Between balls. Batting counts `remaining` seconds down to an automatic
    /// release; bowling waits for the player's gesture (`remaining` is `None`).
    IdleWait { remaining: Option<u32> },
    Releasing,
    /// `measure` is fixed at release for bowled balls.
    InFlight { flight: BallFlight, measure: Option<BowlingMeasure> },
    Resolved { outcome: BallOutcome, struck: Option<StruckFlight> },
    OverComplete,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseKind {
    PreCountdown,
    Countdown,
    IdleWait,
    Releasing,
    InFlight,
    Resolved,
    OverComplete,
    Stopped,
}

impl DeliveryPhase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            DeliveryPhase::PreCountdown => PhaseKind::PreCountdown,
            DeliveryPhase::Countdown { .. } => PhaseKind::Countdown,
            DeliveryPhase::IdleWait { .. } => PhaseKind::IdleWait,
            DeliveryPhase::Releasing => PhaseKind::Releasing,
            DeliveryPhase::InFlight { .. } => PhaseKind::InFlight,
            DeliveryPhase::Resolved { .. } => PhaseKind::Resolved,
            DeliveryPhase::OverComplete => PhaseKind::OverComplete,
            DeliveryPhase::Stopped => PhaseKind::Stopped,
        }
    }

    /// A ball is live while it waits for release or travels.
    pub fn ball_is_live(&self) -> bool {
        matches!(self, DeliveryPhase::IdleWait { .. } | DeliveryPhase::Releasing | DeliveryPhase::InFlight { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SessionEvent {
    PhaseChanged { phase: PhaseKind, at_ms: u64 },
    CountdownTick { remaining: u32 },
    BallTimerTick { remaining: u32 },
    #[serde(rename_all = "camelCase")]
    BallReleased { ball: u8, speed_kmh: f64, travel_secs: f64, horizontal_offset: f64 },
    #[serde(rename_all = "camelCase")]
    BatContact { ball: u8, vertical_distance: f64, timing_score: u8 },
    BallResolved { outcome: BallOutcome },
    GestureAbandoned { reached: GesturePhase },
    OverComplete { payload: ResultsPayload },
}

/// Render state for one animation frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameState {
    pub phase: PhaseKind,
    /// 1-based number of the ball being played
    pub ball_number: u8,
    pub countdown: Option<u32>,
    pub ball_timer: Option<u32>,
    pub ball_position: Option<Vec2>,
    pub bat_position: Option<Vec2>,
    pub trajectory_preview: Vec<Vec2>,
    pub trail: Vec<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionTimer {
    CountdownTick,
    BallTimerTick,
    FlightComplete,
    FollowThroughDone,
}

enum Resolution {
    Batting(u8),
    Bowling(BowlingMeasure),
}

pub struct GameSession {
    config: EngineConfig,
    mode: GameMode,
    difficulty: Difficulty,
    opponent: Opponent,
    units: UnitConverter,
    over: Over,
    phase: DeliveryPhase,
    timers: TimerQueue<SessionTimer>,
    flight_timer: Option<TimerId>,
    now_ms: u64,
    rng: StdRng,
    gesture: GestureTracker,
    bat: Option<Vec2>,
    results: Option<ResultsPayload>,
    events: Vec<SessionEvent>,
}

impl GameSession {
    pub fn new(setup: SessionSetup, config: EngineConfig, opponents: &dyn OpponentProvider) -> Self {
        let opponent = opponents.opponent(setup.mode.opponent_role(), setup.difficulty);
        let gesture = GestureTracker::new(config.gesture);
        Self {
            config,
            mode: setup.mode,
            difficulty: setup.difficulty,
            opponent,
            units: UnitConverter::new(),
            over: Over::new(),
            phase: DeliveryPhase::PreCountdown,
            timers: TimerQueue::new(),
            flight_timer: None,
            now_ms: 0,
            rng: StdRng::seed_from_u64(setup.seed),
            gesture,
            bat: None,
            results: None,
            events: Vec::new(),
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn opponent(&self) -> &Opponent {
        &self.opponent
    }

    pub fn phase(&self) -> &DeliveryPhase {
        &self.phase
    }

    pub fn over(&self) -> &Over {
        &self.over
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn units(&self) -> &UnitConverter {
        &self.units
    }

    pub fn gesture(&self) -> &GestureTracker {
        &self.gesture
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// The handoff payload, once the over is complete.
    pub fn results(&self) -> Option<&ResultsPayload> {
        self.results.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, DeliveryPhase::OverComplete | DeliveryPhase::Stopped)
    }

    /// Events emitted since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Begin the pre-game countdown. Only valid once.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.phase != DeliveryPhase::PreCountdown {
            return false;
        }
        self.now_ms = now_ms;
        let remaining = ticks(self.config.countdown_ms, self.config.tick_ms);
        if remaining == 0 {
            self.enter_idle_wait(now_ms);
            return true;
        }
        self.set_phase(DeliveryPhase::Countdown { remaining }, now_ms);
        self.events.push(SessionEvent::CountdownTick { remaining });
        self.timers.schedule(now_ms.saturating_add(self.config.tick_ms), SessionTimer::CountdownTick);
        true
    }

    /// New field measurement. The live ball keeps the geometry it was
    /// released with; the next delivery picks up the change.
    pub fn resize(&mut self, bounds: Option<FieldBounds>) -> Option<FieldScale> {
        if self.phase == DeliveryPhase::Stopped {
            return self.units.scale();
        }
        self.units.measure(bounds)
    }

    /// Fire every timer due at or before `now_ms`, in order.
    pub fn advance_to(&mut self, now_ms: u64) {
        let target = now_ms.max(self.now_ms);
        while let Some((due, id, timer)) = self.timers.pop_due(target) {
            self.now_ms = self.now_ms.max(due);
            self.fire(id, timer, due);
        }
        self.now_ms = target;
    }

    /// Bat position sample (batting). Returns the contact if this sample hit.
    pub fn bat_moved(&mut self, at_ms: u64, position: Vec2) -> Option<Contact> {
        self.advance_to(at_ms);
        if self.is_finished() {
            return None;
        }
        self.bat = Some(position);
        if self.mode != GameMode::Batting {
            return None;
        }
        let flight = match &self.phase {
            DeliveryPhase::InFlight { flight, .. } => *flight,
            _ => return None,
        };

        let now = self.now_ms;
        let contact = check_contact(flight.position(now), position, &self.config.contact)?;
        if let Some(id) = self.flight_timer.take() {
            self.timers.cancel(id);
        }
        let ball = self.over.next_index().unwrap_or_default();
        self.events.push(SessionEvent::BatContact {
            ball,
            vertical_distance: contact.vertical_distance,
            timing_score: contact.timing_score,
        });
        tracing::debug!(
            "Bat contact on ball {}: vertical offset {:.1}px, score {}",
            ball + 1,
            contact.vertical_distance,
            contact.timing_score
        );
        let struck = StruckFlight::new(now, self.config.follow_through_ms, contact.ball, contact.timing_score);
        self.resolve(Resolution::Batting(contact.timing_score), now, Some(struck));
        Some(contact)
    }

    /// Pointer pressed on the ball (bowling).
    pub fn pointer_down(&mut self, sample: GestureSample) -> bool {
        self.advance_to(sample.timestamp_ms);
        if !self.accepts_gesture() {
            return false;
        }
        self.gesture.begin(sample)
    }

    pub fn pointer_move(&mut self, sample: GestureSample) -> GesturePhase {
        self.advance_to(sample.timestamp_ms);
        if !self.accepts_gesture() {
            return self.gesture.phase();
        }
        self.gesture.sample(sample)
    }

    /// Pointer lifted. A qualifying forward swing bowls the ball.
    pub fn pointer_up(&mut self, sample: GestureSample) -> Option<GestureEnd> {
        self.advance_to(sample.timestamp_ms);
        if !self.accepts_gesture() {
            return None;
        }
        let end = self.gesture.end(sample)?;
        match end {
            GestureEnd::Released(release) => {
                self.gesture.reset();
                self.release_bowled(release, self.now_ms);
            }
            GestureEnd::Abandoned { reached, .. } => {
                self.events.push(SessionEvent::GestureAbandoned { reached });
            }
        }
        Some(end)
    }

    pub fn pointer_cancel(&mut self, at_ms: u64) -> Option<GestureEnd> {
        self.advance_to(at_ms);
        let end = self.gesture.cancel()?;
        if let GestureEnd::Abandoned { reached, .. } = end {
            self.events.push(SessionEvent::GestureAbandoned { reached });
        }
        Some(end)
    }

    /// Leave the game: cancel every timer and drop the live ball.
    pub fn teardown(&mut self) {
        if self.phase == DeliveryPhase::Stopped {
            return;
        }
        self.timers.cancel_all();
        self.flight_timer = None;
        self.gesture.reset();
        self.bat = None;
        let now = self.now_ms;
        self.set_phase(DeliveryPhase::Stopped, now);
    }

    /// Advance to `at_ms`, then render.
    pub fn frame_at(&mut self, at_ms: u64) -> FrameState {
        self.advance_to(at_ms);
        self.frame()
    }

    /// Render state at the current clock.
    pub fn frame(&self) -> FrameState {
        let now = self.now_ms;
        let (countdown, ball_timer) = match &self.phase {
            DeliveryPhase::Countdown { remaining } => (Some(*remaining), None),
            DeliveryPhase::IdleWait { remaining } => (None, *remaining),
            _ => (None, None),
        };
        let (top, bottom) = self.pitch_ends();
        let ball_position = match &self.phase {
            DeliveryPhase::InFlight { flight, .. } => Some(flight.position(now)),
            DeliveryPhase::Resolved { struck: Some(s), .. } => Some(s.position(now)),
            DeliveryPhase::IdleWait { .. } => match self.mode {
                GameMode::Batting => Some(top),
                GameMode::Bowling => Some(self.gesture.pointer().unwrap_or(bottom)),
            },
            _ => None,
        };
        let trail = match &self.phase {
            DeliveryPhase::InFlight { flight, .. } => flight.trail(now, TRAIL_POINTS, TRAIL_SPACING_MS).collect(),
            _ => Vec::new(),
        };
        let trajectory_preview = match (&self.phase, self.mode) {
            (DeliveryPhase::IdleWait { .. }, GameMode::Bowling) => self.gesture.preview().collect(),
            _ => Vec::new(),
        };
        let ball_number = (self.over.len().min(crate::constants::BALLS_PER_OVER - 1) + 1) as u8;

        FrameState {
            phase: self.phase.kind(),
            ball_number,
            countdown,
            ball_timer,
            ball_position,
            bat_position: self.bat,
            trajectory_preview,
            trail,
        }
    }

    fn accepts_gesture(&self) -> bool {
        self.mode == GameMode::Bowling && matches!(self.phase, DeliveryPhase::IdleWait { .. })
    }

    fn fire(&mut self, id: TimerId, timer: SessionTimer, at: u64) {
        match timer {
            SessionTimer::CountdownTick => {
                if let DeliveryPhase::Countdown { remaining } = self.phase {
                    let remaining = remaining.saturating_sub(1);
                    if remaining == 0 {
                        self.events.push(SessionEvent::CountdownTick { remaining });
                        self.enter_idle_wait(at);
                    } else {
                        self.phase = DeliveryPhase::Countdown { remaining };
                        self.events.push(SessionEvent::CountdownTick { remaining });
                        self.timers.schedule(at.saturating_add(self.config.tick_ms), SessionTimer::CountdownTick);
                    }
                }
            }
            SessionTimer::BallTimerTick => {
                if let DeliveryPhase::IdleWait { remaining: Some(remaining) } = self.phase {
                    let remaining = remaining.saturating_sub(1);
                    self.events.push(SessionEvent::BallTimerTick { remaining });
                    if remaining == 0 {
                        self.release_batting(at);
                    } else {
                        self.phase = DeliveryPhase::IdleWait { remaining: Some(remaining) };
                        self.timers.schedule(at.saturating_add(self.config.tick_ms), SessionTimer::BallTimerTick);
                    }
                }
            }
            SessionTimer::FlightComplete => {
                if self.flight_timer != Some(id) {
                    tracing::warn!("Ignoring stale flight completion at {}ms", at);
                    return;
                }
                self.flight_timer = None;
                let measure = match &self.phase {
                    DeliveryPhase::InFlight { measure, .. } => *measure,
                    _ => return,
                };
                let resolution = match (self.mode, measure) {
                    (GameMode::Bowling, Some(m)) => Resolution::Bowling(m),
                    _ => Resolution::Batting(0),
                };
                self.resolve(resolution, at, None);
            }
            SessionTimer::FollowThroughDone => {
                if matches!(self.phase, DeliveryPhase::Resolved { .. }) {
                    self.enter_idle_wait(at);
                }
            }
        }
    }

    fn enter_idle_wait(&mut self, at: u64) {
        if self.over.is_complete() {
            self.complete_over(at);
            return;
        }
        match self.mode {
            GameMode::Batting => {
                let remaining = ticks(self.config.idle_wait_ms, self.config.tick_ms);
                if remaining == 0 {
                    self.set_phase(DeliveryPhase::IdleWait { remaining: Some(0) }, at);
                    self.release_batting(at);
                    return;
                }
                self.set_phase(DeliveryPhase::IdleWait { remaining: Some(remaining) }, at);
                self.events.push(SessionEvent::BallTimerTick { remaining });
                self.timers.schedule(at.saturating_add(self.config.tick_ms), SessionTimer::BallTimerTick);
            }
            GameMode::Bowling => {
                self.gesture.reset();
                self.set_phase(DeliveryPhase::IdleWait { remaining: None }, at);
            }
        }
    }

    fn release_batting(&mut self, at: u64) {
        self.set_phase(DeliveryPhase::Releasing, at);

        let band = *self.config.difficulties.band(self.difficulty);
        let speed_kmh = self.rng.gen_range(band.min_kmh..=band.max_kmh);

        let flight = match (self.units.scale(), self.units.bounds()) {
            (Some(scale), Some(bounds)) => {
                let jitter = self.config.horizontal_jitter_px.min(MAX_HORIZONTAL_JITTER_PX);
                let offset = if jitter > 0.0 { self.rng.gen_range(-jitter..=jitter) } else { 0.0 };
                let secs = travel_secs(
                    speed_kmh,
                    Some(&scale),
                    &self.config.batting_travel,
                    self.config.default_travel_secs,
                );
                BallFlight::down_the_pitch(at, speed_kmh, secs, offset, &bounds, scale.pitch_length_px)
            }
            _ => {
                tracing::debug!("No field geometry, using default travel time");
                let field = FieldBounds::square(DEFAULT_FIELD_SIZE_PX);
                BallFlight::down_the_pitch(
                    at,
                    speed_kmh,
                    self.config.default_travel_secs,
                    0.0,
                    &field,
                    DEFAULT_FIELD_SIZE_PX * PITCH_FRACTION_OF_FIELD,
                )
            }
        };

        tracing::debug!(
            "Ball speed: {:.1} km/h, real travel time: {:.3}s, game travel time: {:.3}s",
            speed_kmh,
            crate::constants::REAL_PITCH_LENGTH_METERS / (speed_kmh / 3.6),
            flight.travel_secs
        );
        self.launch(flight, None, at);
    }

    fn release_bowled(&mut self, release: Release, at: u64) {
        self.set_phase(DeliveryPhase::Releasing, at);

        let bounds = self.units.bounds();
        let scale = self.units.scale();
        let ctx = BowlingContext {
            config: &self.config,
            band: self.config.difficulties.band(self.difficulty),
            speed_ratio: self.units.speed_ratio(),
            field: bounds.as_ref(),
        };
        let measure = measure_release(&release, &ctx);
        let secs = travel_secs(
            measure.speed_kmh,
            scale.as_ref(),
            &self.config.bowling_travel,
            self.config.default_travel_secs,
        );
        let pitch = scale
            .map(|s| s.pitch_length_px)
            .unwrap_or(DEFAULT_FIELD_SIZE_PX * PITCH_FRACTION_OF_FIELD);
        let flight = BallFlight::from_release(at, measure.speed_kmh, secs, release.point, release.direction, pitch);

        tracing::debug!(
            "Bowled at {:.1} km/h ({:.1}% power, {:.1}% accuracy), game travel time: {:.3}s",
            measure.speed_kmh,
            release.total_power,
            measure.accuracy_pct,
            secs
        );
        self.launch(flight, Some(measure), at);
    }

    fn launch(&mut self, flight: BallFlight, measure: Option<BowlingMeasure>, at: u64) {
        self.events.push(SessionEvent::BallReleased {
            ball: self.over.next_index().unwrap_or_default(),
            speed_kmh: flight.speed_kmh,
            travel_secs: flight.travel_secs,
            horizontal_offset: flight.horizontal_offset,
        });
        self.flight_timer = Some(self.timers.schedule(flight.lands_at_ms(), SessionTimer::FlightComplete));
        self.set_phase(DeliveryPhase::InFlight { flight, measure }, at);
    }

    fn resolve(&mut self, resolution: Resolution, at: u64, struck: Option<StruckFlight>) {
        let appended = match resolution {
            Resolution::Batting(score) => self.over.push_batting(score),
            Resolution::Bowling(measure) => self.over.push_bowling(&measure),
        };
        let outcome = match appended {
            Some(o) => o,
            None => {
                tracing::warn!("Over already complete, ignoring delivery at {}ms", at);
                return;
            }
        };

        self.events.push(SessionEvent::BallResolved { outcome });
        self.set_phase(DeliveryPhase::Resolved { outcome, struck }, at);

        if self.over.is_complete() {
            self.complete_over(at);
        } else if struck.is_some() && self.config.follow_through_ms > 0 {
            self.timers.schedule(at.saturating_add(self.config.follow_through_ms), SessionTimer::FollowThroughDone);
        } else {
            self.enter_idle_wait(at);
        }
    }

    fn complete_over(&mut self, at: u64) {
        if self.results.is_some() {
            return;
        }
        self.timers.cancel_all();
        self.flight_timer = None;
        self.gesture.reset();

        let payload = ResultsPayload::new(
            self.mode,
            self.over.outcomes().to_vec(),
            self.difficulty,
            self.opponent.clone(),
        );
        tracing::info!(
            "Over complete ({} {}, vs {}): {} balls",
            self.mode,
            self.difficulty,
            self.opponent.name,
            payload.outcomes.len()
        );
        self.results = Some(payload.clone());
        self.set_phase(DeliveryPhase::OverComplete, at);
        self.events.push(SessionEvent::OverComplete { payload });
    }

    fn set_phase(&mut self, phase: DeliveryPhase, at: u64) {
        let kind = phase.kind();
        self.phase = phase;
        self.events.push(SessionEvent::PhaseChanged { phase: kind, at_ms: at });
    }

    /// Ends of the pitch in screen space: (far end, bowler's end).
    fn pitch_ends(&self) -> (Vec2, Vec2) {
        let (bounds, pitch) = match (self.units.bounds(), self.units.scale()) {
            (Some(b), Some(s)) => (b, s.pitch_length_px),
            _ => (
                FieldBounds::square(DEFAULT_FIELD_SIZE_PX),
                DEFAULT_FIELD_SIZE_PX * PITCH_FRACTION_OF_FIELD,
            ),
        };
        let c = bounds.center();
        (Vec2::new(c.x, c.y - pitch / 2.0), Vec2::new(c.x, c.y + pitch / 2.0))
    }
}

fn ticks(duration_ms: u64, tick_ms: u64) -> u32 {
    if tick_ms == 0 {
        return 0;
    }
    duration_ms.div_ceil(tick_ms) as u32
}
