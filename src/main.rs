//! IntervalTimer - headless runner
//!
//! Runs the configured workout in the terminal. Type `p` + Enter to pause or
//! resume, `r` to reset, `s` to start again and `q` to quit.

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use interval_timer::audio::{CueBackend, RodioBackend, SoundScheduler};
use interval_timer::storage::config::load_config;
use interval_timer::wake_lock::WakeLockGuard;
use interval_timer::workouts::{format_clock, load_plan, Preset, TimerCallbacks};
use interval_timer::{SessionCommand, WorkoutSession};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting IntervalTimer v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config().context("failed to load configuration")?;
    let plan = match &config.workout.workout_file {
        Some(path) => load_plan(path).with_context(|| format!("failed to load {}", path.display()))?,
        None => Preset::AbWorkout.plan(config.workout.total_rounds)?,
    };

    let backend: Arc<dyn CueBackend> = Arc::new(RodioBackend::new());
    let sounds = Arc::new(SoundScheduler::new(backend, config.audio.clone()));

    // No desktop wake lock facility is wired up yet.
    let mut session = WorkoutSession::new(plan, &config, sounds, WakeLockGuard::unsupported())?;
    session.preload().await;

    session.set_callbacks(
        TimerCallbacks::new()
            .on_tick(|state| {
                print!("\r  {}  ", format_clock(state.time_left));
                let _ = std::io::stdout().flush();
            })
            .on_segment_complete(|segment| {
                println!();
                tracing::info!("{} - {}", segment.name, format_clock(segment.duration));
            })
            .on_workout_complete(|| {
                println!();
                tracing::info!("Workout complete. Great job!");
            }),
    );

    let (tx, rx) = mpsc::channel(8);
    tx.send(SessionCommand::Start).await?;

    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let command = match line.trim() {
                "p" => SessionCommand::TogglePause,
                "r" => SessionCommand::Reset,
                "s" => SessionCommand::Start,
                "q" => SessionCommand::Quit,
                _ => continue,
            };
            if tx.blocking_send(command).is_err() {
                break;
            }
        }
    });

    let first = session.timer().current_segment().clone();
    tracing::info!("{} - {}", first.name, format_clock(first.duration));

    let status = session.run(rx).await;
    tracing::info!("Session ended: {}", status);

    Ok(())
}
