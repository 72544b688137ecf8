// Default tuning values. Every one of these can be overridden through
// `EngineConfig`; the constants only seed `EngineConfig::default()`.

/// Real cricket pitch length (meters)
pub const REAL_PITCH_LENGTH_METERS: f64 = 20.12;

/// On-screen pitch length as a fraction of the field diameter
pub const PITCH_FRACTION_OF_FIELD: f64 = 0.7;

/// Fixed pixel-to-centimeter factor used for the speed ratio
pub const PX_PER_CM: f64 = 10.0;

/// Field size assumed until the view reports real bounds (pixels)
pub const DEFAULT_FIELD_SIZE_PX: f64 = 600.0;

/// Balls in one over
pub const BALLS_PER_OVER: usize = 6;

/// Highest timing score for one ball
pub const MAX_TIMING_SCORE: u8 = 6;

// ---------------------------------------------------------------------------
// Delivery speeds (km/h)
// ---------------------------------------------------------------------------

pub const EASY_MIN_KMH: f64 = 100.0;
pub const EASY_MAX_KMH: f64 = 120.0;
pub const EASY_MULTIPLIER: f64 = 0.7;

pub const MEDIUM_MIN_KMH: f64 = 125.0;
pub const MEDIUM_MAX_KMH: f64 = 145.0;
pub const MEDIUM_MULTIPLIER: f64 = 1.0;

pub const HARD_MIN_KMH: f64 = 150.0;
pub const HARD_MAX_KMH: f64 = 170.0;
pub const HARD_MULTIPLIER: f64 = 1.2;

/// Speed reached by a full-power bowling release before the difficulty multiplier
pub const MAX_BOWLING_SPEED_KMH: f64 = 150.0;

// ---------------------------------------------------------------------------
// Session timing (milliseconds)
// ---------------------------------------------------------------------------

/// Countdown before the first ball
pub const COUNTDOWN_MS: u64 = 3_000;

/// Between-ball wait in batting mode; expiry releases the ball
pub const BATTING_IDLE_WAIT_MS: u64 = 5_000;

/// Interval between countdown / ball-timer ticks
pub const TICK_MS: u64 = 1_000;

/// Longest accepted duration for any configured timer
pub const MAX_DURATION_MS: u64 = 10 * 60 * 1_000;

/// How long a struck ball stays on screen before the next wait starts
pub const FOLLOW_THROUGH_MS: u64 = 1_000;

// ---------------------------------------------------------------------------
// Travel time (seconds)
// ---------------------------------------------------------------------------

/// Slow-motion factor applied to the physical travel time when batting
pub const BATTING_SLOW_MOTION: f64 = 6.0;
pub const BATTING_TRAVEL_FLOOR_SECS: f64 = 2.0;
pub const BATTING_TRAVEL_CEILING_SECS: f64 = 5.0;

/// Slow-motion factor applied to the physical travel time when bowling
pub const BOWLING_SLOW_MOTION: f64 = 4.0;
pub const BOWLING_TRAVEL_FLOOR_SECS: f64 = 0.8;
pub const BOWLING_TRAVEL_CEILING_SECS: f64 = 3.0;

/// Travel time used when speed or geometry is unusable
pub const DEFAULT_TRAVEL_SECS: f64 = 3.0;

/// Maximum random horizontal offset of a batting delivery (pixels, either side)
pub const HORIZONTAL_JITTER_PX: f64 = 10.0;

/// Largest accepted horizontal jitter: one default field width
pub const MAX_HORIZONTAL_JITTER_PX: f64 = DEFAULT_FIELD_SIZE_PX;

// ---------------------------------------------------------------------------
// Batting contact
// ---------------------------------------------------------------------------

/// Bat-to-ball distance below which contact registers (pixels)
pub const HIT_RADIUS_PX: f64 = 80.0;

/// Vertical bat/ball offset that earns a perfect score (pixels)
pub const IDEAL_CONTACT_DISTANCE_PX: f64 = 20.0;

/// Width of each scoring band around the ideal offset (pixels)
pub const TIMING_TOLERANCE_PX: f64 = 35.0;

// ---------------------------------------------------------------------------
// Bowling gesture
// ---------------------------------------------------------------------------

/// Pull distance that loads 100% pull power (pixels)
pub const PULL_REFERENCE_PX: f64 = 120.0;

/// Minimum pull before a forward swing can be recognized (pixels)
pub const MIN_PULL_PX: f64 = 20.0;

/// Minimum pointer speed for a forward swing (px/ms)
pub const MIN_SWING_VELOCITY: f64 = 0.05;

/// Pointer speed that counts as a 100% swing (px/ms)
pub const SWING_REFERENCE_VELOCITY: f64 = 2.0;

/// Weight of the previous swing speed in the exponential smoothing
pub const SWING_SMOOTHING: f64 = 0.7;

/// Minimum total power for a release to bowl a ball (percent)
pub const MIN_RELEASE_POWER: f64 = 5.0;

/// Share of pull power in total power
pub const PULL_WEIGHT: f64 = 0.6;

/// Share of swing speed in total power
pub const SWING_WEIGHT: f64 = 0.4;

/// Number of points in the aiming preview
pub const PREVIEW_POINTS: usize = 8;

// ---------------------------------------------------------------------------
// Trail
// ---------------------------------------------------------------------------

pub const TRAIL_POINTS: usize = 5;
pub const TRAIL_SPACING_MS: u64 = 40;

// ---------------------------------------------------------------------------
// Stick cricket
// ---------------------------------------------------------------------------

pub const STICK_RUN_UP_MS: u64 = 500;
pub const STICK_BALL_TRAVEL_MS: u64 = 1_000;
pub const STICK_HIT_WINDOW_MS: u64 = 500;
pub const STICK_SHOT_MS: u64 = 300;
pub const STICK_MAX_WICKETS: u32 = 3;
