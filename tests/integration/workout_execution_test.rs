//! Integration tests for workout execution.
//!
//! Runs whole sessions on tokio's paused clock with the 1 Hz interval driver,
//! checking cue timing, pause handling and wake lock lifecycle end to end.

use interval_timer::audio::{AudioConfig, Cue, MockCueBackend, SoundScheduler};
use interval_timer::storage::config::AppConfig;
use interval_timer::wake_lock::{MockWakeLock, WakeLockGuard};
use interval_timer::workouts::types::{Segment, WorkoutPlan, WorkoutStatus};
use interval_timer::{SessionCommand, WorkoutSession};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

async fn build_session(
    plan: WorkoutPlan,
    lead_in_with_countdown: bool,
    backend: Arc<MockCueBackend>,
    lock: MockWakeLock,
) -> WorkoutSession {
    let mut config = AppConfig::default();
    config.workout.lead_in_with_countdown = lead_in_with_countdown;

    let sounds = Arc::new(SoundScheduler::new(backend, AudioConfig::default()));
    let session = WorkoutSession::new(plan, &config, sounds, WakeLockGuard::new(Box::new(lock)))
        .expect("valid plan");
    assert_eq!(session.preload().await, 4);
    session
}

#[tokio::test(start_paused = true)]
async fn test_full_workout_cue_sequence() {
    let plan = WorkoutPlan::new(
        "Integration",
        vec![Segment::exercise("Crunches", 8), Segment::rest("Rest", 6)],
        2,
    )
    .unwrap();

    let backend = Arc::new(MockCueBackend::new());
    backend.set_duration(Cue::Countdown, Duration::from_secs(3));
    let lock = MockWakeLock::new();
    let mut session = build_session(plan, true, backend.clone(), lock.clone()).await;

    let (tx, rx) = mpsc::channel(4);
    tx.send(SessionCommand::Start).await.unwrap();
    drop(tx);

    let started = Instant::now();
    let status = session.run(rx).await;
    let elapsed = started.elapsed();

    assert_eq!(status, WorkoutStatus::Finished);
    // 3s countdown lead-in, 8s + 6s + 8s of segments, trailing break skipped
    assert!(elapsed >= Duration::from_secs(25), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(26), "elapsed {:?}", elapsed);

    assert_eq!(
        backend.plays(),
        vec![
            Cue::Countdown, // start
            Cue::Beep,      // 5s before end of first exercise
            Cue::Rest,      // entering the break
            Cue::Beep,      // 5s before end of the break
            Cue::Countdown, // timed to finish as round 2 starts
            Cue::Beep,      // 5s before end of last exercise
            Cue::Complete,
        ]
    );

    assert_eq!(lock.requests(), 1);
    assert_eq!(lock.releases(), 1);
    assert!(!session.timer().is_driver_running());
}

#[tokio::test(start_paused = true)]
async fn test_pause_freezes_countdown_and_cues() {
    let plan = WorkoutPlan::new("Plank", vec![Segment::exercise("Plank", 10)], 1).unwrap();
    let backend = Arc::new(MockCueBackend::new());
    let lock = MockWakeLock::new();
    let mut session = build_session(plan, false, backend.clone(), lock.clone()).await;

    let (tx, rx) = mpsc::channel(4);
    tokio::spawn(async move {
        tx.send(SessionCommand::Start).await.unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        tx.send(SessionCommand::TogglePause).await.unwrap();
        tokio::time::sleep(Duration::from_secs(100)).await;
        tx.send(SessionCommand::TogglePause).await.unwrap();
    });

    let started = Instant::now();
    let status = session.run(rx).await;
    let elapsed = started.elapsed();

    assert_eq!(status, WorkoutStatus::Finished);
    // 3 ticks before the pause, 7 after it
    assert!(elapsed >= Duration::from_secs(110), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(111), "elapsed {:?}", elapsed);

    assert_eq!(
        backend.plays(),
        vec![Cue::Countdown, Cue::Beep, Cue::Complete]
    );
    assert_eq!(lock.releases(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_pause_burst_plays_each_cue_once() {
    let plan = WorkoutPlan::new(
        "Burst",
        vec![Segment::exercise("Crunches", 8), Segment::rest("Rest", 6)],
        2,
    )
    .unwrap();

    let backend = Arc::new(MockCueBackend::new());
    backend.set_duration(Cue::Countdown, Duration::from_secs(3));
    let lock = MockWakeLock::new();
    let mut session = build_session(plan, true, backend.clone(), lock.clone()).await;

    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let origin = Instant::now();
        tx.send(SessionCommand::Start).await.unwrap();
        // once in the lead-in, once mid-exercise, once mid-break
        for at_ms in [1_500u64, 5_400, 13_400] {
            tokio::time::sleep_until(origin + Duration::from_millis(at_ms)).await;
            for _ in 0..6 {
                tx.send(SessionCommand::TogglePause).await.unwrap();
                tokio::time::sleep(Duration::from_millis(40)).await;
            }
        }
    });

    let started = Instant::now();
    let status = session.run(rx).await;

    assert_eq!(status, WorkoutStatus::Finished);
    assert!(started.elapsed() < Duration::from_secs(26));
    assert_eq!(
        backend.plays(),
        vec![
            Cue::Countdown,
            Cue::Beep,
            Cue::Rest,
            Cue::Beep,
            Cue::Countdown,
            Cue::Beep,
            Cue::Complete,
        ]
    );
    for cue in [Cue::Rest, Cue::Complete] {
        assert_eq!(backend.play_count(cue), 1);
    }
    assert_eq!(lock.releases(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reset_mid_workout_returns_to_idle() {
    let plan = WorkoutPlan::new(
        "Reset",
        vec![Segment::exercise("Crunches", 30), Segment::rest("Rest", 10)],
        3,
    )
    .unwrap();
    let backend = Arc::new(MockCueBackend::new());
    let lock = MockWakeLock::new();
    let mut session = build_session(plan, false, backend.clone(), lock.clone()).await;

    let (tx, rx) = mpsc::channel(4);
    tokio::spawn(async move {
        tx.send(SessionCommand::Start).await.unwrap();
        tokio::time::sleep(Duration::from_millis(12_500)).await;
        tx.send(SessionCommand::Reset).await.unwrap();
    });

    let status = session.run(rx).await;

    assert_eq!(status, WorkoutStatus::Idle);
    let state = session.timer().state();
    assert_eq!(state.round, 1);
    assert_eq!(state.segment_index, 0);
    assert_eq!(state.time_left, 30);
    assert!(!session.timer().is_driver_running());
    assert_eq!(lock.releases(), 1);

    // nothing left armed fires later
    tokio::time::advance(Duration::from_secs(120)).await;
    tokio::task::yield_now().await;
    assert_eq!(backend.plays(), vec![Cue::Countdown]);
}

#[tokio::test(start_paused = true)]
async fn test_workout_runs_without_audio_or_wake_lock() {
    let plan = WorkoutPlan::new(
        "Silent",
        vec![Segment::exercise("Crunches", 4), Segment::rest("Rest", 2)],
        2,
    )
    .unwrap();

    let sounds = Arc::new(SoundScheduler::new(
        Arc::new(interval_timer::audio::SilentBackend),
        AudioConfig::default(),
    ));
    let mut session = WorkoutSession::new(
        plan,
        &AppConfig::default(),
        sounds,
        WakeLockGuard::unsupported(),
    )
    .unwrap();
    assert_eq!(session.preload().await, 0);

    let (tx, rx) = mpsc::channel(1);
    tx.send(SessionCommand::Start).await.unwrap();
    drop(tx);

    let started = Instant::now();
    assert_eq!(session.run(rx).await, WorkoutStatus::Finished);
    assert!(started.elapsed() >= Duration::from_secs(10));
}
