//! Opponents and the "which player are you" match.
//!
//! The engine only ever passes an [`Opponent`] through to the results payload;
//! it never looks inside. The built-in [`Roster`] is a small canned data set.

use serde::{Deserialize, Serialize};

use crate::config::Difficulty;
use crate::over::BallOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Batsman,
    Bowler,
}

/// Read-only reference to the opposing player, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opponent {
    pub id: String,
    pub name: String,
    pub team: String,
}

pub trait OpponentProvider {
    fn opponent(&self, role: Role, difficulty: Difficulty) -> Opponent;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BowlingType {
    Pace,
    Spin,
}

/// Bowling a batsman is strong or weak against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Matchup {
    Pace,
    Spin,
    Both,
}

impl Matchup {
    pub fn covers(self, kind: BowlingType) -> bool {
        matches!(
            (self, kind),
            (Matchup::Both, _) | (Matchup::Pace, BowlingType::Pace) | (Matchup::Spin, BowlingType::Spin)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingStats {
    pub average_speed: f64,
    pub reaction_time_ms: f64,
    #[serde(default)]
    pub strong_against: Vec<Matchup>,
    #[serde(default)]
    pub weak_against: Vec<Matchup>,
    pub style: String,
}

impl BattingStats {
    pub fn is_strong_against(&self, kind: BowlingType) -> bool {
        self.strong_against.iter().any(|m| m.covers(kind))
    }

    pub fn is_weak_against(&self, kind: BowlingType) -> bool {
        self.weak_against.iter().any(|m| m.covers(kind))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingStats {
    pub average_speed: f64,
    #[serde(rename = "type")]
    pub kind: BowlingType,
    pub variation: String,
    pub accuracy: f64,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: String,
    pub name: String,
    pub team: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batting_stats: Option<BattingStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bowling_stats: Option<BowlingStats>,
    pub fun_facts: Vec<String>,
}

impl PlayerProfile {
    pub fn as_opponent(&self) -> Opponent {
        Opponent { id: self.id.clone(), name: self.name.clone(), team: self.team.clone() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    pub batsmen: Vec<PlayerProfile>,
    pub bowlers: Vec<PlayerProfile>,
}

impl Roster {
    pub fn players(&self, role: Role) -> &[PlayerProfile] {
        match role {
            Role::Batsman => &self.batsmen,
            Role::Bowler => &self.bowlers,
        }
    }

    /// Difficulty pools: easy gets the first player, medium the second,
    /// hard everyone after that.
    pub fn pool(&self, role: Role, difficulty: Difficulty) -> &[PlayerProfile] {
        let players = self.players(role);
        let (start, end) = match difficulty {
            Difficulty::Easy => (0, 1),
            Difficulty::Medium => (1, 2),
            Difficulty::Hard => (2, players.len()),
        };
        let end = end.min(players.len());
        let start = start.min(end);
        &players[start..end]
    }
}

impl OpponentProvider for Roster {
    fn opponent(&self, role: Role, difficulty: Difficulty) -> Opponent {
        self.pool(role, difficulty)
            .first()
            .or_else(|| self.players(role).first())
            .map(PlayerProfile::as_opponent)
            .unwrap_or_else(|| Opponent {
                id: "unknown".into(),
                name: match role {
                    Role::Batsman => "Batsman".into(),
                    Role::Bowler => "Bowler".into(),
                },
                team: "Team".into(),
            })
    }
}

fn facts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn batsman(
    id: &str,
    name: &str,
    team: &str,
    speed: f64,
    reaction: f64,
    strong: &[Matchup],
    weak: &[Matchup],
    style: &str,
    fun: &[&str],
) -> PlayerProfile {
    PlayerProfile {
        id: id.into(),
        name: name.into(),
        team: team.into(),
        role: Role::Batsman,
        batting_stats: Some(BattingStats {
            average_speed: speed,
            reaction_time_ms: reaction,
            strong_against: strong.to_vec(),
            weak_against: weak.to_vec(),
            style: style.into(),
        }),
        bowling_stats: None,
        fun_facts: facts(fun),
    }
}

#[allow(clippy::too_many_arguments)]
fn bowler(
    id: &str,
    name: &str,
    team: &str,
    speed: f64,
    kind: BowlingType,
    variation: &str,
    accuracy: f64,
    style: &str,
    fun: &[&str],
) -> PlayerProfile {
    PlayerProfile {
        id: id.into(),
        name: name.into(),
        team: team.into(),
        role: Role::Bowler,
        batting_stats: None,
        bowling_stats: Some(BowlingStats {
            average_speed: speed,
            kind,
            variation: variation.into(),
            accuracy,
            style: style.into(),
        }),
        fun_facts: facts(fun),
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            batsmen: vec![
                batsman("vk-18", "Virat Kohli", "RCB", 145.0, 180.0, &[Matchup::Pace], &[Matchup::Spin], "Aggressive", &[
                    "Known as the 'King' of cricket",
                    "Has scored the most IPL centuries",
                    "Famous for his cover drive",
                ]),
                batsman("rg-45", "Rohit Sharma", "MI", 140.0, 190.0, &[Matchup::Spin], &[Matchup::Pace], "Elegant", &[
                    "Called the 'Hitman' for his explosive batting",
                    "Holds the record for highest individual ODI score",
                    "Known for his pull shots",
                ]),
                batsman("kl-1", "KL Rahul", "LSG", 138.0, 185.0, &[Matchup::Both], &[], "Technical", &[
                    "One of the most consistent IPL batsmen",
                    "Known for his classical batting technique",
                    "Great wicketkeeper-batsman",
                ]),
            ],
            bowlers: vec![
                bowler("jb-93", "Jasprit Bumrah", "MI", 145.0, BowlingType::Pace, "Yorker", 90.0, "Unorthodox", &[
                    "Has a unique bowling action",
                    "Best death bowler in IPL",
                    "Known for pin-point yorkers",
                ]),
                bowler("rk-8", "Rashid Khan", "GT", 90.0, BowlingType::Spin, "Googly", 95.0, "Attacking", &[
                    "Best T20 spinner in the world",
                    "Batsmen struggle to read his variations",
                    "Can bat explosively in the lower order",
                ]),
                bowler("yc-90", "Yuzvendra Chahal", "RR", 85.0, BowlingType::Spin, "Leg Break", 88.0, "Crafty", &[
                    "IPL's highest wicket-taker among spinners",
                    "Former chess player",
                    "Known for his celebrations",
                ]),
            ],
        }
    }
}

/// Averages over one completed over.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummary {
    pub balls: u32,
    pub total_runs: u32,
    pub average_score: f64,
    pub average_speed_kmh: f64,
    pub average_accuracy_pct: f64,
}

impl PerformanceSummary {
    pub fn from_outcomes(outcomes: &[BallOutcome]) -> Self {
        let mut runs = 0u32;
        let mut batting = 0u32;
        let mut speed = 0.0;
        let mut accuracy = 0.0;
        let mut bowling = 0u32;
        for outcome in outcomes {
            match outcome {
                BallOutcome::Batting(b) => {
                    runs += b.score as u32;
                    batting += 1;
                }
                BallOutcome::Bowling(b) => {
                    speed += b.speed_kmh;
                    accuracy += b.accuracy_pct;
                    bowling += 1;
                }
            }
        }
        let avg = |sum: f64, n: u32| if n == 0 { 0.0 } else { sum / n as f64 };
        Self {
            balls: outcomes.len() as u32,
            total_runs: runs,
            average_score: avg(runs as f64, batting),
            average_speed_kmh: avg(speed, bowling),
            average_accuracy_pct: avg(accuracy, bowling),
        }
    }
}

/// Picks the roster profile closest to a player's over.
pub struct MatchProfiler<'a> {
    roster: &'a Roster,
}

impl<'a> MatchProfiler<'a> {
    pub fn new(roster: &'a Roster) -> Self {
        Self { roster }
    }

    /// Reaction time a batting average maps to: a perfect over reads as 150 ms,
    /// a scoreless one as 350 ms.
    pub fn estimated_reaction_ms(average_score: f64) -> f64 {
        150.0 + (6.0 - average_score.clamp(0.0, 6.0)) / 6.0 * 200.0
    }

    pub fn closest(&self, role: Role, summary: &PerformanceSummary) -> Option<&'a PlayerProfile> {
        let players = self.roster.players(role);
        let distance = |p: &PlayerProfile| -> f64 {
            match role {
                Role::Batsman => p
                    .batting_stats
                    .as_ref()
                    .map(|s| (s.reaction_time_ms - Self::estimated_reaction_ms(summary.average_score)).abs())
                    .unwrap_or(f64::INFINITY),
                Role::Bowler => p
                    .bowling_stats
                    .as_ref()
                    .map(|s| {
                        // speed in 10 km/h units so both axes weigh about the same
                        let ds = (s.average_speed - summary.average_speed_kmh) / 10.0;
                        let da = (s.accuracy - summary.average_accuracy_pct) / 10.0;
                        ds.hypot(da)
                    })
                    .unwrap_or(f64::INFINITY),
            }
        };
        players.iter().min_by(|a, b| distance(*a).total_cmp(&distance(*b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impact::BowlingMeasure;
    use crate::over::Over;

    #[test]
    fn difficulty_pools_follow_roster_order() {
        let roster = Roster::default();
        assert_eq!(roster.opponent(Role::Bowler, Difficulty::Easy).name, "Jasprit Bumrah");
        assert_eq!(roster.opponent(Role::Bowler, Difficulty::Medium).name, "Rashid Khan");
        assert_eq!(roster.opponent(Role::Batsman, Difficulty::Hard).name, "KL Rahul");
    }

    #[test]
    fn batsmen_carry_their_matchups() {
        let roster = Roster::default();
        let stats = |id: &str| {
            roster.batsmen.iter().find(|p| p.id == id).and_then(|p| p.batting_stats.clone()).unwrap()
        };
        let kohli = stats("vk-18");
        assert!(kohli.is_strong_against(BowlingType::Pace));
        assert!(kohli.is_weak_against(BowlingType::Spin));
        let rahul = stats("kl-1");
        assert!(rahul.is_strong_against(BowlingType::Spin) && rahul.is_strong_against(BowlingType::Pace));
        assert!(!rahul.is_weak_against(BowlingType::Pace));

        let json = serde_json::to_value(&kohli).unwrap();
        assert_eq!(json["strongAgainst"], serde_json::json!(["pace"]));
        assert_eq!(json["weakAgainst"], serde_json::json!(["spin"]));
    }

    #[test]
    fn empty_roster_still_returns_an_opponent() {
        let roster = Roster { batsmen: vec![], bowlers: vec![] };
        assert_eq!(roster.opponent(Role::Batsman, Difficulty::Hard).name, "Batsman");
    }

    #[test]
    fn fast_accurate_bowling_matches_the_paceman() {
        let mut over = Over::new();
        for _ in 0..6 {
            over.push_bowling(&BowlingMeasure { speed_kmh: 140.0, scaled_speed_kmh: 5.0, accuracy_pct: 85.0 });
        }
        let summary = PerformanceSummary::from_outcomes(over.outcomes());
        assert_eq!(summary.balls, 6);
        let roster = Roster::default();
        let best = MatchProfiler::new(&roster).closest(Role::Bowler, &summary).unwrap();
        assert_eq!(best.id, "jb-93");
    }

    #[test]
    fn perfect_batting_matches_the_quickest_reactions() {
        let mut over = Over::new();
        for _ in 0..6 {
            over.push_batting(6);
        }
        let summary = PerformanceSummary::from_outcomes(over.outcomes());
        assert_eq!(summary.total_runs, 36);
        assert_eq!(MatchProfiler::estimated_reaction_ms(summary.average_score), 150.0);
        let roster = Roster::default();
        let best = MatchProfiler::new(&roster).closest(Role::Batsman, &summary).unwrap();
        assert_eq!(best.id, "vk-18");
    }
}
