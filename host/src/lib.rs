use crease_core::profile::Role;
use crease_core::{
    Difficulty, EngineConfig, FieldBounds, GameMode, GameSession, GestureSample, MatchProfiler, PerformanceSummary,
    PlayerProfile, ResultsPayload, Roster, SessionSetup, Vec2,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Largest script or report the host will read
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

/// A recorded session: setup plus every input in the order it happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionScript {
    pub v: u32,
    pub mode: GameMode,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub seed: u64,
    /// Field measurement taken before the countdown
    #[serde(default)]
    pub field: Option<FieldBounds>,
    /// Overrides for the default tuning
    #[serde(default)]
    pub config: Option<EngineConfig>,
    pub inputs: Vec<ScriptInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScriptInput {
    Start { at: u64 },
    Bat { at: u64, x: f64, y: f64 },
    Down { at: u64, x: f64, y: f64 },
    Move { at: u64, x: f64, y: f64 },
    Up { at: u64, x: f64, y: f64 },
    Cancel { at: u64 },
    Resize {
        at: u64,
        #[serde(default)]
        field: Option<FieldBounds>,
    },
    Advance { at: u64 },
}

impl ScriptInput {
    pub fn at(&self) -> u64 {
        match self {
            ScriptInput::Start { at }
            | ScriptInput::Bat { at, .. }
            | ScriptInput::Down { at, .. }
            | ScriptInput::Move { at, .. }
            | ScriptInput::Up { at, .. }
            | ScriptInput::Cancel { at }
            | ScriptInput::Resize { at, .. }
            | ScriptInput::Advance { at } => *at,
        }
    }
}

/// Result of replaying a script to the end of its over
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    /// The results handoff, exactly as the session produced it
    pub payload: ResultsPayload,

    pub summary: PerformanceSummary,

    /// Roster player whose numbers sit closest to this over
    pub matched_profile: Option<PlayerProfile>,

    /// Hex of `payload.log_hash`, for display
    pub log_hash: String,

    /// Number of session events emitted during the replay
    pub events_len: u32,
}

/// Read a script from disk, refusing oversized files.
pub fn load_script(path: impl AsRef<Path>) -> Result<SessionScript, Box<dyn std::error::Error>> {
    let raw = read_bounded(path.as_ref())?;
    let script: SessionScript = serde_json::from_str(&raw)?;
    Ok(script)
}

/// Replay a recorded session against a fresh engine.
///
/// Inputs must be in timestamp order. The script has to carry the session
/// through to the end of the over; a script that stops early is an error.
pub fn replay_script(script: &SessionScript, roster: &Roster) -> Result<ReplayReport, Box<dyn std::error::Error>> {
    tracing::info!(
        "Replaying {} script ({}, seed {}) with {} inputs",
        script.mode,
        script.difficulty,
        script.seed,
        script.inputs.len()
    );

    if script.v != 1 {
        return Err(format!("Unsupported script version: {}", script.v).into());
    }

    let config = script.config.clone().unwrap_or_default();
    config.validate()?;

    let setup = SessionSetup { mode: script.mode, difficulty: script.difficulty, seed: script.seed };
    let mut session = GameSession::new(setup, config, roster);
    if script.field.is_some() {
        session.resize(script.field);
    }

    let mut last_at = 0;
    let mut events_len = 0usize;
    for (i, input) in script.inputs.iter().enumerate() {
        let at = input.at();
        if at < last_at {
            return Err(format!("Input {} goes back in time ({}ms < {}ms)", i, at, last_at).into());
        }
        last_at = at;

        match *input {
            ScriptInput::Start { at } => {
                if !session.start(at) {
                    tracing::warn!("Ignoring repeated start at {}ms", at);
                }
            }
            ScriptInput::Bat { at, x, y } => {
                session.bat_moved(at, Vec2::new(x, y));
            }
            ScriptInput::Down { at, x, y } => {
                session.pointer_down(GestureSample::new(x, y, at));
            }
            ScriptInput::Move { at, x, y } => {
                session.pointer_move(GestureSample::new(x, y, at));
            }
            ScriptInput::Up { at, x, y } => {
                session.pointer_up(GestureSample::new(x, y, at));
            }
            ScriptInput::Cancel { at } => {
                session.pointer_cancel(at);
            }
            ScriptInput::Resize { at, field } => {
                session.advance_to(at);
                session.resize(field);
            }
            ScriptInput::Advance { at } => session.advance_to(at),
        }
        events_len += session.drain_events().len();
    }

    let payload = match session.results() {
        Some(p) => p.clone(),
        None => {
            return Err(format!(
                "Script ended before the over completed ({} of 6 balls)",
                session.over().len()
            )
            .into())
        }
    };

    let summary = PerformanceSummary::from_outcomes(&payload.outcomes);
    let player_role = match script.mode {
        GameMode::Batting => Role::Batsman,
        GameMode::Bowling => Role::Bowler,
    };
    let matched_profile = MatchProfiler::new(roster).closest(player_role, &summary).cloned();

    tracing::info!("Replay complete: {} balls, hash {}", payload.outcomes.len(), hex::encode(payload.log_hash));

    Ok(ReplayReport {
        log_hash: hex::encode(payload.log_hash),
        payload,
        summary,
        matched_profile,
        events_len: events_len as u32,
    })
}

/// Check that a report's outcomes still match its hash.
pub fn verify_report(report: &ReplayReport) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Verifying report hash {}", report.log_hash);

    if !report.payload.verify() {
        return Err("Outcome hash mismatch: outcomes were modified after the over".into());
    }
    if hex::encode(report.payload.log_hash) != report.log_hash.to_lowercase() {
        return Err("Displayed log hash does not match payload".into());
    }
    if report.payload.outcomes.len() != 6 {
        return Err(format!("Expected 6 outcomes, found {}", report.payload.outcomes.len()).into());
    }

    tracing::info!("Report verification successful");
    Ok(())
}

pub fn save_report(report: &ReplayReport, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_report(path: impl AsRef<Path>) -> Result<ReplayReport, Box<dyn std::error::Error>> {
    let raw = read_bounded(path.as_ref())?;
    let report: ReplayReport = serde_json::from_str(&raw)?;
    Ok(report)
}

fn read_bounded(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let metadata = fs::metadata(path).map_err(|e| format!("Error accessing file '{}': {}", path.display(), e))?;
    if metadata.len() > MAX_FILE_SIZE {
        return Err(format!("File too large: {} bytes (max {} bytes)", metadata.len(), MAX_FILE_SIZE).into());
    }
    let raw = fs::read_to_string(path).map_err(|e| format!("Error reading file '{}': {}", path.display(), e))?;
    Ok(raw)
}
