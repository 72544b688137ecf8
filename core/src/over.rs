use serde::{Deserialize, Serialize};

use crate::constants::{BALLS_PER_OVER, MAX_TIMING_SCORE};
use crate::impact::BowlingMeasure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattingOutcome {
    pub index: u8,
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BowlingOutcome {
    pub index: u8,
    pub speed_kmh: f64,
    pub scaled_speed_kmh: f64,
    pub accuracy_pct: f64,
}

/// One resolved delivery. Serialized without a tag so the results consumer
/// sees `{index, score}` or `{index, speedKmh, scaledSpeedKmh, accuracyPct}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BallOutcome {
    Batting(BattingOutcome),
    Bowling(BowlingOutcome),
}

impl BallOutcome {
    pub fn index(&self) -> u8 {
        match self {
            BallOutcome::Batting(b) => b.index,
            BallOutcome::Bowling(b) => b.index,
        }
    }

    /// Runs-equivalent score; bowled balls have none.
    pub fn score(&self) -> Option<u8> {
        match self {
            BallOutcome::Batting(b) => Some(b.score),
            BallOutcome::Bowling(_) => None,
        }
    }
}

/// Up to six outcomes in delivery order. Closed once full.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Over {
    outcomes: Vec<BallOutcome>,
}

impl Over {
    pub fn new() -> Self {
        Self { outcomes: Vec::with_capacity(BALLS_PER_OVER) }
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.len() >= BALLS_PER_OVER
    }

    pub fn outcomes(&self) -> &[BallOutcome] {
        &self.outcomes
    }

    /// Index the next delivery will get, or `None` once the over is closed.
    pub fn next_index(&self) -> Option<u8> {
        if self.is_complete() {
            None
        } else {
            Some(self.outcomes.len() as u8)
        }
    }

    pub fn push_batting(&mut self, score: u8) -> Option<BallOutcome> {
        let index = self.next_index()?;
        let outcome = BallOutcome::Batting(BattingOutcome { index, score: score.min(MAX_TIMING_SCORE) });
        self.outcomes.push(outcome);
        Some(outcome)
    }

    pub fn push_bowling(&mut self, measure: &BowlingMeasure) -> Option<BallOutcome> {
        let index = self.next_index()?;
        let outcome = BallOutcome::Bowling(BowlingOutcome {
            index,
            speed_kmh: measure.speed_kmh.max(0.0),
            scaled_speed_kmh: measure.scaled_speed_kmh.max(0.0),
            accuracy_pct: measure.accuracy_pct.clamp(0.0, 100.0),
        });
        self.outcomes.push(outcome);
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_closes_after_six_balls() {
        let mut over = Over::new();
        for i in 0..6u8 {
            let out = over.push_batting(i).unwrap();
            assert_eq!(out.index(), i);
        }
        assert!(over.is_complete());
        assert_eq!(over.next_index(), None);
        assert!(over.push_batting(6).is_none());
        assert_eq!(over.len(), 6);
    }

    #[test]
    fn outcomes_serialize_without_a_tag() {
        let mut over = Over::new();
        over.push_batting(4);
        over.push_bowling(&BowlingMeasure { speed_kmh: 120.0, scaled_speed_kmh: 4.0, accuracy_pct: 88.5 });
        let json = serde_json::to_value(over.outcomes()).unwrap();
        assert_eq!(json[0], serde_json::json!({ "index": 0, "score": 4 }));
        assert_eq!(json[1]["speedKmh"], 120.0);
        assert_eq!(json[1]["accuracyPct"], 88.5);

        let back: Vec<BallOutcome> = serde_json::from_value(json).unwrap();
        assert_eq!(back.as_slice(), over.outcomes());
    }
}
