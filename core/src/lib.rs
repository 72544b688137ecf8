pub mod config;
pub mod constants;
pub mod flight;
pub mod geometry;
pub mod gesture;
pub mod impact;
pub mod over;
pub mod profile;
pub mod session;
pub mod stick;
pub mod timer;
pub mod units;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub use config::{ConfigError, Difficulty, EngineConfig};
pub use geometry::{FieldBounds, Vec2};
pub use gesture::{GestureEnd, GesturePhase, GestureSample, GestureTracker};
pub use over::{BallOutcome, Over};
pub use profile::{MatchProfiler, Opponent, OpponentProvider, PerformanceSummary, PlayerProfile, Roster, Role};
pub use session::{DeliveryPhase, FrameState, GameMode, GameSession, PhaseKind, SessionEvent, SessionSetup};
pub use stick::{StickEvent, StickMatch, StickPhase};

/// Handed to the results view once the over is done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsPayload {
    pub mode: GameMode,
    pub outcomes: Vec<BallOutcome>,
    pub difficulty: Difficulty,
    pub opponent_ref: Opponent,
    /// SHA-256 over the outcomes, see [`compute_over_hash`]
    pub log_hash: [u8; 32],
}

impl ResultsPayload {
    pub fn new(mode: GameMode, outcomes: Vec<BallOutcome>, difficulty: Difficulty, opponent_ref: Opponent) -> Self {
        let log_hash = compute_over_hash(mode, difficulty, &outcomes);
        Self { mode, outcomes, difficulty, opponent_ref, log_hash }
    }

    /// True if the outcomes still hash to `log_hash`.
    pub fn verify(&self) -> bool {
        compute_over_hash(self.mode, self.difficulty, &self.outcomes) == self.log_hash
    }

    pub fn total_runs(&self) -> u32 {
        self.outcomes.iter().filter_map(|o| o.score()).map(u32::from).sum()
    }
}

/// Compute SHA-256 hash of a completed over
/// This hash binds a saved result to the exact outcomes it reports
pub fn compute_over_hash(mode: GameMode, difficulty: Difficulty, outcomes: &[BallOutcome]) -> [u8; 32] {
    let mut h = Sha256::new();

    // Version prefix: 8 bytes, then mode and difficulty tags
    // Batting balls: index + score (2 bytes)
    // Bowling balls: index + three f64 LE (25 bytes)
    let mut buf = Vec::with_capacity(10 + outcomes.len() * 25);

    buf.extend_from_slice(b"CREASEv1");
    buf.push(match mode {
        GameMode::Batting => 0,
        GameMode::Bowling => 1,
    });
    buf.push(match difficulty {
        Difficulty::Easy => 0,
        Difficulty::Medium => 1,
        Difficulty::Hard => 2,
    });

    for outcome in outcomes {
        buf.push(outcome.index());
        match outcome {
            BallOutcome::Batting(b) => buf.push(b.score),
            BallOutcome::Bowling(b) => {
                buf.extend_from_slice(&b.speed_kmh.to_le_bytes());
                buf.extend_from_slice(&b.scaled_speed_kmh.to_le_bytes());
                buf.extend_from_slice(&b.accuracy_pct.to_le_bytes());
            }
        }
    }

    h.update(&buf);

    let out = h.finalize();
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&out);
    arr
}
