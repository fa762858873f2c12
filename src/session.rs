//! Workout session host.
//!
//! Drives a [`WorkoutTimer`] from a 1 Hz [`IntervalDriver`] and forwards its
//! transitions to the [`SoundScheduler`] and the [`WakeLockGuard`]. Data flows
//! one way: the scheduler only ever sees snapshots of the timer state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::audio::SoundScheduler;
use crate::storage::config::AppConfig;
use crate::wake_lock::WakeLockGuard;
use crate::workouts::driver::{IntervalDriver, TickEvent};
use crate::workouts::engine::{TimerCallbacks, WorkoutTimer};
use crate::workouts::types::{AdvanceOutcome, WorkoutError, WorkoutPlan, WorkoutStatus};

/// Commands accepted by [`WorkoutSession::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    TogglePause,
    Reset,
    Quit,
}

enum LoopEvent {
    Tick,
    Command(Option<SessionCommand>),
}

/// A running workout with its cues and wake lock.
pub struct WorkoutSession {
    timer: WorkoutTimer,
    sounds: Arc<SoundScheduler>,
    wake_lock: WakeLockGuard,
    ticks: mpsc::UnboundedReceiver<TickEvent>,
    lead_in_with_countdown: bool,
    keep_screen_awake: bool,
    /// First segment's triggers are armed on the first tick, after the lead-in.
    pending_schedule: bool,
}

impl WorkoutSession {
    pub fn new(
        plan: WorkoutPlan,
        config: &AppConfig,
        sounds: Arc<SoundScheduler>,
        wake_lock: WakeLockGuard,
    ) -> Result<Self, WorkoutError> {
        let (driver, ticks) = IntervalDriver::new();
        let timer = WorkoutTimer::with_driver(plan, Box::new(driver))?;

        Ok(Self {
            timer,
            sounds,
            wake_lock,
            ticks,
            lead_in_with_countdown: config.workout.lead_in_with_countdown,
            keep_screen_awake: config.display.keep_screen_awake,
            pending_schedule: false,
        })
    }

    /// Install host callbacks on the timer.
    pub fn set_callbacks(&mut self, callbacks: TimerCallbacks) {
        self.timer.set_callbacks(callbacks);
    }

    pub fn timer(&self) -> &WorkoutTimer {
        &self.timer
    }

    pub fn sounds(&self) -> &SoundScheduler {
        &self.sounds
    }

    pub fn wake_lock(&self) -> &WakeLockGuard {
        &self.wake_lock
    }

    /// Load the cues. Returns how many loaded.
    pub async fn preload(&self) -> usize {
        self.sounds.preload().await
    }

    /// Start (or restart) the workout.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        while self.ticks.try_recv().is_ok() {}

        if self.keep_screen_awake {
            self.wake_lock.acquire();
        }
        self.sounds.cancel_scheduled();

        let countdown = self.sounds.on_workout_start();
        let lead_in = if self.lead_in_with_countdown {
            countdown
        } else {
            Duration::ZERO
        };

        self.timer.start_after(lead_in);
        self.pending_schedule = true;
    }

    /// Pause or resume. Returns the new paused flag.
    ///
    /// Resuming before the first tick leaves the triggers to that tick, since
    /// the driver may still be in its lead-in.
    pub fn toggle_pause(&mut self) -> Result<bool, WorkoutError> {
        let paused = self.timer.pause()?;
        if !paused && self.pending_schedule {
            return Ok(paused);
        }

        let timer = &self.timer;
        self.sounds.on_pause_toggle(
            paused,
            timer.time_left(),
            timer.current_segment(),
            || timer.next_segment(),
        );
        Ok(paused)
    }

    /// Return to idle, cancelling cues and releasing the wake lock.
    pub fn reset(&mut self) {
        self.timer.reset();
        self.sounds.on_reset();
        self.wake_lock.release();
        self.pending_schedule = false;
    }

    /// Handle one elapsed second.
    ///
    /// Advances exactly once when the countdown is at zero.
    pub fn handle_tick(&mut self) {
        if !self.timer.is_running() || self.timer.is_paused() {
            return;
        }

        self.timer.tick();
        if self.timer.time_left() == 0 {
            self.advance();
        } else if std::mem::take(&mut self.pending_schedule) {
            self.schedule_current();
        }
    }

    fn advance(&mut self) {
        self.pending_schedule = false;
        match self.timer.advance() {
            Ok(AdvanceOutcome::Segment(next)) => {
                self.sounds.on_segment_advance(&next.segment);
                self.schedule_current();
            }
            Ok(AdvanceOutcome::Finished) => {
                self.sounds.on_workout_complete();
                self.wake_lock.release();
            }
            Err(e) => tracing::debug!("Advance ignored: {}", e),
        }
    }

    fn schedule_current(&self) {
        let timer = &self.timer;
        self.sounds.schedule_for_segment(
            timer.time_left(),
            timer.current_segment(),
            || timer.next_segment(),
        );
    }

    /// Run until the workout finishes or `Quit` is received.
    ///
    /// When the command channel closes the session keeps running an active
    /// workout to completion.
    pub async fn run(&mut self, mut commands: mpsc::Receiver<SessionCommand>) -> WorkoutStatus {
        let mut commands_open = true;

        loop {
            if self.timer.is_finished() {
                break;
            }
            if !commands_open && !self.timer.is_running() {
                break;
            }

            let event = tokio::select! {
                tick = self.ticks.recv() => match tick {
                    Some(_) => LoopEvent::Tick,
                    None => break,
                },
                command = commands.recv(), if commands_open => LoopEvent::Command(command),
            };

            match event {
                LoopEvent::Tick => self.handle_tick(),
                LoopEvent::Command(Some(SessionCommand::Start)) => self.start(),
                LoopEvent::Command(Some(SessionCommand::TogglePause)) => {
                    if let Err(e) = self.toggle_pause() {
                        tracing::warn!("Cannot pause: {}", e);
                    }
                }
                LoopEvent::Command(Some(SessionCommand::Reset)) => self.reset(),
                LoopEvent::Command(Some(SessionCommand::Quit)) => {
                    self.reset();
                    break;
                }
                LoopEvent::Command(None) => commands_open = false,
            }
        }

        self.timer.status()
    }
}

impl std::fmt::Debug for WorkoutSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkoutSession")
            .field("timer", &self.timer)
            .field("wake_lock", &self.wake_lock)
            .field("pending_schedule", &self.pending_schedule)
            .finish()
    }
}
