use proptest::prelude::*;

use crease_core::config::GestureTuning;
use crease_core::impact::{accuracy_pct, bowling_speed_kmh, timing_score};
use crease_core::{
    Difficulty, EngineConfig, FieldBounds, GameMode, GameSession, GestureSample, GestureTracker, Roster, SessionSetup,
    Vec2,
};

proptest! {
    #[test]
    fn batting_over_never_exceeds_six_balls(
        seed in any::<u64>(),
        size in 200.0f64..1600.0,
        swings in prop::collection::vec((0.0f64..1.0, 0.0f64..1.0), 0..400),
    ) {
        let setup = SessionSetup { mode: GameMode::Batting, difficulty: Difficulty::Hard, seed };
        let mut s = GameSession::new(setup, EngineConfig::default(), &Roster::default());
        s.resize(Some(FieldBounds::square(size)));
        s.start(0);

        let mut t = 3_000;
        for (fx, fy) in swings {
            t += 250;
            s.bat_moved(t, Vec2::new(fx * size, fy * size));
            prop_assert!(s.over().len() <= 6);
        }
        s.advance_to(t + 200_000);

        let payload = s.results().unwrap();
        prop_assert_eq!(payload.outcomes.len(), 6);
        for o in &payload.outcomes {
            let score = o.score().unwrap();
            prop_assert!(score <= 6);
        }
    }

    #[test]
    fn timing_score_is_bounded(v in 0.0f64..10_000.0) {
        let tuning = EngineConfig::default().contact;
        prop_assert!(timing_score(v, &tuning) <= 6);
    }

    #[test]
    fn bowling_measures_stay_in_range(
        power in -50.0f64..200.0,
        x in -1_000.0f64..2_000.0,
        width in 1.0f64..2_000.0,
    ) {
        let cfg = EngineConfig::default();
        let band = cfg.difficulties.band(Difficulty::Hard);
        let speed = bowling_speed_kmh(power, cfg.max_bowling_speed_kmh, band);
        prop_assert!(speed >= 0.0);
        prop_assert!(speed <= cfg.max_bowling_speed_kmh * band.multiplier + 1e-9);

        let field = FieldBounds::new(0.0, 0.0, width, width);
        let acc = accuracy_pct(x, Some(&field));
        prop_assert!((0.0..=100.0).contains(&acc));
    }

    #[test]
    fn gesture_phases_only_move_forward(
        steps in prop::collection::vec((-60.0f64..60.0, -60.0f64..60.0, 0u64..80), 1..60),
    ) {
        let mut g = GestureTracker::new(GestureTuning::default());
        let mut pos = Vec2::new(300.0, 500.0);
        let mut t = 1_000;
        g.begin(GestureSample::new(pos.x, pos.y, t));

        let mut last = g.phase();
        for (dx, dy, dt) in steps {
            pos = Vec2::new(pos.x + dx, pos.y + dy);
            t += dt;
            let phase = g.sample(GestureSample::new(pos.x, pos.y, t));
            prop_assert!(phase >= last);
            prop_assert!((0.0..=100.0).contains(&g.pull_power()));
            prop_assert!((0.0..=100.0).contains(&g.swing_speed()));
            last = phase;
        }
        prop_assert!(g.path().windows(2).all(|w| w[0] < w[1]));
    }
}
