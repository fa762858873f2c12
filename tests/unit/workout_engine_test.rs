//! Unit tests for the WorkoutTimer state machine.

use interval_timer::workouts::engine::{TimerCallbacks, WorkoutTimer};
use interval_timer::workouts::types::{
    AdvanceOutcome, Segment, SegmentKind, WorkoutPlan, WorkoutState, WorkoutStatus,
};
use std::sync::{Arc, Mutex};

fn segment(kind: SegmentKind, duration: u32) -> Segment {
    match kind {
        SegmentKind::Exercise => Segment::exercise("Move", duration),
        SegmentKind::Break => Segment::rest("Rest", duration),
    }
}

/// A spread of sequences covering trailing/leading breaks and zero durations.
fn sequences() -> Vec<Vec<Segment>> {
    use SegmentKind::{Break, Exercise};
    vec![
        vec![segment(Exercise, 30)],
        vec![segment(Break, 15)],
        vec![segment(Exercise, 30), segment(Break, 10)],
        vec![segment(Break, 10), segment(Exercise, 30)],
        vec![segment(Exercise, 20), segment(Exercise, 20), segment(Break, 60)],
        vec![segment(Exercise, 0), segment(Break, 0), segment(Exercise, 5)],
        vec![
            segment(Exercise, 45),
            segment(Break, 15),
            segment(Exercise, 45),
            segment(Break, 15),
            segment(Exercise, 60),
            segment(Break, 60),
        ],
    ]
}

fn plans() -> Vec<WorkoutPlan> {
    let mut plans = Vec::new();
    for segments in sequences() {
        for rounds in 1..=4 {
            if let Ok(plan) = WorkoutPlan::new("Generated", segments.clone(), rounds) {
                plans.push(plan);
            }
        }
    }
    plans
}

#[test]
fn test_advance_count_to_finish() {
    for plan in plans() {
        let expected = plan.presented_segment_count() - 1;
        let trailing_break = plan.skips_trailing_break();
        let total = plan.segments.len() * plan.total_rounds as usize;

        let mut timer = WorkoutTimer::new(plan.clone()).unwrap();
        timer.start();

        let mut advances = 0;
        while !timer.is_finished() {
            timer.advance().unwrap();
            advances += 1;
            assert!(advances <= total, "runaway workout for {:?}", plan);
        }

        // One advance per presented segment, counting the finishing one.
        assert_eq!(advances, expected + 1, "plan {:?}", plan);
        if trailing_break {
            assert_eq!(advances, total - 1);
        } else {
            assert_eq!(advances, total);
        }
    }
}

#[test]
fn test_in_bounds_while_not_finished() {
    for plan in plans() {
        let mut timer = WorkoutTimer::new(plan.clone()).unwrap();
        timer.start();

        while !timer.is_finished() {
            let state = timer.state();
            assert!(state.segment_index < plan.segments.len());
            assert!(state.round >= 1 && state.round <= plan.total_rounds);
            assert!(state.time_left <= timer.current_segment().duration);
            timer.advance().unwrap();
        }
    }
}

#[test]
fn test_trailing_break_never_presented() {
    for plan in plans().into_iter().filter(WorkoutPlan::skips_trailing_break) {
        let last_index = plan.segments.len() - 1;
        let mut timer = WorkoutTimer::new(plan.clone()).unwrap();
        timer.start();

        while let AdvanceOutcome::Segment(next) = timer.advance().unwrap() {
            assert!(
                !(next.round == plan.total_rounds && next.index == last_index),
                "presented trailing break of {:?}",
                plan
            );
        }
    }
}

#[test]
fn test_overall_progress_monotonic_and_bounded() {
    for plan in plans() {
        let mut timer = WorkoutTimer::new(plan).unwrap();
        timer.start();

        let mut last = timer.overall_progress_percent();
        while !timer.is_finished() {
            while timer.time_left() > 0 {
                timer.tick();
                let now = timer.overall_progress_percent();
                assert!(now >= last - 1e-9);
                assert!(now <= 100.0);
                last = now;
            }
            timer.advance().unwrap();
            let now = timer.overall_progress_percent();
            assert!(now >= last - 1e-9);
            assert!(now <= 100.0);
            last = now;
        }
        assert_eq!(last, 100.0);
    }
}

#[test]
fn test_double_pause_restores_and_freezes_time() {
    let plan = WorkoutPlan::new("Pause", vec![Segment::exercise("Plank", 30)], 1).unwrap();
    let mut timer = WorkoutTimer::new(plan).unwrap();
    timer.start();
    timer.tick();

    let before = timer.is_paused();
    timer.pause().unwrap();
    for _ in 0..10 {
        timer.tick();
    }
    timer.pause().unwrap();

    assert_eq!(timer.is_paused(), before);
    assert_eq!(timer.time_left(), 29);

    timer.tick();
    assert_eq!(timer.time_left(), 28);
}

#[test]
fn test_reset_from_any_state() {
    let plan = WorkoutPlan::new(
        "Reset",
        vec![Segment::exercise("Crunches", 30), Segment::rest("Rest", 10)],
        2,
    )
    .unwrap();
    let expected = WorkoutState::initial(30);

    // idle
    let mut timer = WorkoutTimer::new(plan.clone()).unwrap();
    timer.reset();
    assert_eq!(*timer.state(), expected);

    // running mid-workout
    timer.start();
    timer.advance().unwrap();
    timer.tick();
    timer.reset();
    assert_eq!(*timer.state(), expected);

    // paused
    timer.start();
    timer.pause().unwrap();
    timer.reset();
    assert_eq!(*timer.state(), expected);

    // finished
    timer.start();
    while !timer.is_finished() {
        timer.advance().unwrap();
    }
    timer.reset();
    assert_eq!(*timer.state(), expected);
    assert_eq!(timer.status(), WorkoutStatus::Idle);
}

#[test]
fn test_exercise_break_scenario() {
    let plan = WorkoutPlan::new(
        "Scenario",
        vec![Segment::exercise("Crunches", 30), Segment::rest("Rest", 10)],
        2,
    )
    .unwrap();

    let entered = Arc::new(Mutex::new(Vec::new()));
    let sink = entered.clone();
    let completed = Arc::new(Mutex::new(false));
    let done = completed.clone();

    let mut timer = WorkoutTimer::new(plan).unwrap();
    timer.set_callbacks(
        TimerCallbacks::new()
            .on_segment_complete(move |s| sink.lock().unwrap().push((s.kind, s.duration)))
            .on_workout_complete(move || *done.lock().unwrap() = true),
    );
    timer.start();

    match timer.advance().unwrap() {
        AdvanceOutcome::Segment(next) => {
            assert_eq!(next.segment.kind, SegmentKind::Break);
            assert_eq!(next.segment.duration, 10);
            assert_eq!(next.round, 1);
        }
        AdvanceOutcome::Finished => panic!("finished early"),
    }
    match timer.advance().unwrap() {
        AdvanceOutcome::Segment(next) => {
            assert_eq!(next.segment.kind, SegmentKind::Exercise);
            assert_eq!(next.segment.duration, 30);
            assert_eq!(next.round, 2);
        }
        AdvanceOutcome::Finished => panic!("finished early"),
    }
    assert_eq!(timer.advance().unwrap(), AdvanceOutcome::Finished);

    assert!(timer.is_finished());
    assert!(!timer.is_running());
    assert!(*completed.lock().unwrap());
    assert_eq!(
        *entered.lock().unwrap(),
        vec![(SegmentKind::Break, 10), (SegmentKind::Exercise, 30)]
    );
}

#[test]
fn test_start_callback_runs_after_reset_of_state() {
    let plan = WorkoutPlan::new("Start", vec![Segment::exercise("Plank", 30)], 1).unwrap();
    let calls = Arc::new(Mutex::new(0));
    let counter = calls.clone();

    let mut timer = WorkoutTimer::new(plan).unwrap();
    timer.set_callbacks(TimerCallbacks::new().on_start(move || *counter.lock().unwrap() += 1));

    timer.start();
    timer.start();
    assert_eq!(*calls.lock().unwrap(), 2);
    assert_eq!(timer.status(), WorkoutStatus::Running);
}
