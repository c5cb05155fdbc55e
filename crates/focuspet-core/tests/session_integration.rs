//! Integration tests for full session runs.

use chrono::{DateTime, Duration, TimeZone, Utc};
use focuspet_core::{
    Config, Event, Mood, NextPhase, Phase, ProgressStore, SessionConfig, SessionEngine, Stage,
};
use tempfile::TempDir;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
}

fn engine_with(config: &Config) -> (SessionEngine, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let engine = SessionEngine::new(ProgressStore::in_dir(dir.path()), config, t0());
    (engine, dir)
}

fn secs(n: i64) -> Duration {
    Duration::seconds(n)
}

#[test]
fn two_cycle_run_with_six_second_intervals() {
    let (mut engine, _dir) = engine_with(&Config::default());
    engine.start(SessionConfig::new(0.1, 2, 0.1), t0()).unwrap();

    // Nothing before the first deadline.
    assert!(engine.tick(t0() + secs(5)).is_none());

    // First focus deadline at 6s.
    match engine.tick(t0() + secs(6)) {
        Some(Event::FocusCompleted { cycle, gained, next, .. }) => {
            assert_eq!(cycle, 1);
            assert!((gained - 0.1).abs() < 1e-9);
            assert_eq!(next, NextPhase::Break);
        }
        other => panic!("Expected FocusCompleted, got {other:?}"),
    }
    assert!((engine.progress().total - 0.1).abs() < 1e-9);
    assert_eq!(engine.phase(), Phase::Break);
    assert_eq!(engine.progress().mood, Mood::Happy);

    // Break deadline at 12s.
    assert!(matches!(
        engine.tick(t0() + secs(12)),
        Some(Event::BreakCompleted { cycle: 2, .. })
    ));
    assert_eq!(engine.current_cycle(), 2);
    assert_eq!(engine.phase(), Phase::Focusing);
    assert_eq!(engine.progress().mood, Mood::Neutral);

    // Second focus deadline at 18s ends the run.
    assert!(matches!(
        engine.tick(t0() + secs(18)),
        Some(Event::FocusCompleted { cycle: 2, next: NextPhase::Finished, .. })
    ));
    assert!((engine.progress().total - 0.2).abs() < 1e-9);
    assert_eq!(engine.phase(), Phase::Idle);
    assert_eq!(engine.deadline(), None);
    assert_eq!(engine.current_cycle(), 0);
    assert_eq!(engine.progress().mood, Mood::Happy);
}

#[test]
fn full_run_awards_exactly_n_times_focus_length() {
    let (mut engine, _dir) = engine_with(&Config::default());
    let n = 4;
    let focus = 2.5;
    engine.start(SessionConfig::new(focus, n, 1.0), t0()).unwrap();

    let mut awards = 0;
    let mut breaks = 0;
    let mut last_award_at = None;
    while engine.phase() != Phase::Idle {
        let now = engine.deadline().unwrap();
        match engine.tick(now) {
            Some(Event::FocusCompleted { next, at, .. }) => {
                awards += 1;
                last_award_at = Some(at);
                if next == NextPhase::Break {
                    breaks += 1;
                }
            }
            Some(Event::BreakCompleted { .. }) => {}
            other => panic!("Unexpected tick result {other:?}"),
        }
    }

    assert_eq!(awards, n);
    assert_eq!(breaks, n - 1);
    assert!((engine.progress().total - n as f64 * focus).abs() < 1e-9);
    assert_eq!(engine.progress().last_session, last_award_at);
}

#[test]
fn late_tick_applies_one_boundary_only() {
    let (mut engine, _dir) = engine_with(&Config::default());
    engine.start(SessionConfig::new(0.1, 3, 0.1), t0()).unwrap();

    // Far past several nominal boundaries.
    let late = t0() + secs(60);
    assert!(matches!(
        engine.tick(late),
        Some(Event::FocusCompleted { cycle: 1, .. })
    ));
    assert_eq!(engine.phase(), Phase::Break);
    assert_eq!(engine.deadline(), Some(late + secs(6)));
    assert!((engine.progress().total - 0.1).abs() < 1e-9);

    // Same instant again: nothing more fires.
    assert!(engine.tick(late).is_none());
}

#[test]
fn stop_mid_focus_awards_nothing() {
    let (mut engine, _dir) = engine_with(&Config::default());
    let before = engine.progress().total;
    engine.start(SessionConfig::new(0.1, 2, 0.1), t0()).unwrap();

    assert!(matches!(
        engine.stop(t0() + secs(3)),
        Some(Event::SessionStopped { .. })
    ));
    assert_eq!(engine.phase(), Phase::Idle);
    assert_eq!(engine.current_cycle(), 0);
    assert_eq!(engine.progress().mood, Mood::Sad);
    assert_eq!(engine.progress().total, before);
    assert_eq!(engine.remaining_secs(t0() + secs(3)), 0.0);

    // The abort survives a restart.
    let reloaded = engine.store().load();
    assert_eq!(reloaded.mood, Mood::Sad);
    assert_eq!(reloaded.total, before);
}

#[test]
fn pause_during_break_awards_nothing_and_next_start_is_cycle_one() {
    let (mut engine, _dir) = engine_with(&Config::default());
    engine.start(SessionConfig::new(0.1, 3, 0.1), t0()).unwrap();
    engine.tick(t0() + secs(6)).unwrap();
    let after_first = engine.progress().total;

    engine.pause(t0() + secs(8)).unwrap();
    assert_eq!(engine.phase(), Phase::Idle);
    assert_eq!(engine.progress().total, after_first);
    assert_eq!(engine.progress().mood, Mood::Sad);

    engine.start(SessionConfig::new(0.1, 3, 0.1), t0() + secs(20)).unwrap();
    assert_eq!(engine.current_cycle(), 1);
    assert_eq!(engine.progress().mood, Mood::Neutral);
}

#[test]
fn companion_grows_across_runs_and_persists() {
    let mut config = Config::default();
    config.growth.baby_threshold = 0.1;
    config.growth.teen_threshold = 0.2;
    let (mut engine, dir) = engine_with(&config);

    engine.start(SessionConfig::new(0.1, 1, 0.0), t0()).unwrap();
    assert!(matches!(
        engine.tick(t0() + secs(6)),
        Some(Event::FocusCompleted { stage: Stage::Teen, stage_advanced: true, .. })
    ));

    engine.start(SessionConfig::new(0.1, 1, 0.0), t0() + secs(10)).unwrap();
    engine.tick(t0() + secs(16)).unwrap();
    assert_eq!(engine.progress().stage, Stage::Adult);

    // A fresh engine over the same record resumes Idle with the grown companion.
    let restarted = SessionEngine::new(ProgressStore::in_dir(dir.path()), &config, t0() + secs(20));
    assert_eq!(restarted.phase(), Phase::Idle);
    assert_eq!(restarted.progress().stage, Stage::Adult);
    assert!((restarted.progress().total - 0.2).abs() < 1e-9);
}

#[test]
fn adult_break_cycles_rest_animation() {
    let mut config = Config::default();
    config.growth.baby_threshold = 0.0;
    config.growth.teen_threshold = 0.0;
    let (mut engine, _dir) = engine_with(&config);

    engine.start(SessionConfig::new(0.1, 2, 1.0), t0()).unwrap();
    engine.tick(t0() + secs(6)).unwrap();
    assert_eq!(engine.progress().stage, Stage::Adult);
    assert_eq!(engine.phase(), Phase::Break);

    let now = t0() + secs(7);
    let keys: Vec<String> = (0..4).map(|_| engine.frame(now).scene_key.to_string()).collect();
    assert_eq!(keys, ["adult_rest1", "adult_rest2", "adult_rest3", "adult_rest1"]);

    // snapshot() does not advance the animation.
    assert_eq!(engine.snapshot(now).scene_key.to_string(), "adult_rest2");
    assert_eq!(engine.snapshot(now).scene_key.to_string(), "adult_rest2");
}

#[test]
fn snapshot_reports_front_end_outputs() {
    let (mut engine, _dir) = engine_with(&Config::default());
    engine.start(SessionConfig::new(1.0, 3, 0.5), t0()).unwrap();

    let snap = engine.snapshot(t0() + secs(15));
    assert_eq!(snap.phase, Phase::Focusing);
    assert_eq!(snap.remaining_secs, 45.0);
    assert_eq!(snap.current_cycle, 1);
    assert_eq!(snap.total_cycles, 3);
    assert_eq!(snap.scene_key.to_string(), "baby_neutral");
    assert_eq!(snap.status.text, "Session 1/3 started!");

    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["phase"], "focusing");
    assert_eq!(json["scene_key"], "baby_neutral");
    assert_eq!(json["status"]["severity"], "info");
}
