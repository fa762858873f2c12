//! Unit tests for built-in presets and plan files.

use interval_timer::workouts::library::{load_plan, parse_plan, save_plan, Preset};
use interval_timer::workouts::types::{format_clock, SegmentKind, WorkoutError};
use tempfile::tempdir;

#[test]
fn test_ab_workout_duration() {
    let plan = Preset::AbWorkout.plan(3).unwrap();

    // 4x(45+15) + 60 + 60 per round, last round drops the round break
    assert_eq!(plan.total_duration_secs(), 3 * 360 - 60);
    assert_eq!(format_clock(plan.total_duration_secs()), "17:00");
}

#[test]
fn test_presets_start_with_exercise() {
    for preset in Preset::all() {
        let segments = preset.segments();
        assert_eq!(segments[0].kind, SegmentKind::Exercise, "{}", preset);
    }
}

#[test]
fn test_plan_file_round_trip_keeps_kinds() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ladder.json");
    let plan = Preset::PlankLadder.plan(2).unwrap();

    save_plan(&plan, &path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"break\""));

    let loaded = load_plan(&path).unwrap();
    assert_eq!(loaded.segments, plan.segments);
    assert_eq!(loaded.total_rounds, 2);
}

#[test]
fn test_plan_with_zero_rounds_rejected() {
    let json = r#"{
        "name": "Nope",
        "segments": [{"name": "Plank", "duration": 30, "kind": "exercise"}],
        "total_rounds": 0
    }"#;
    assert!(matches!(parse_plan(json), Err(WorkoutError::InvalidWorkout(_))));
}

#[test]
fn test_plan_with_unknown_kind_rejected() {
    let json = r#"{
        "name": "Nope",
        "segments": [{"name": "Nap", "duration": 30, "kind": "sleep"}],
        "total_rounds": 1
    }"#;
    assert!(matches!(parse_plan(json), Err(WorkoutError::ParseError(_))));
}
