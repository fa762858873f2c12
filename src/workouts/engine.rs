//! Workout execution engine.
//!
//! Round/segment state machine: `Idle -> Running <-> Paused -> Finished`,
//! with `reset()` returning to `Idle` from anywhere.

use std::time::Duration;

use crate::workouts::driver::{ManualDriver, TickDriver};
use crate::workouts::types::{
    AdvanceOutcome, NextSegment, Segment, WorkoutError, WorkoutPlan, WorkoutState, WorkoutStatus,
};

type Handler = Box<dyn FnMut() + Send>;
type TickHandler = Box<dyn FnMut(&WorkoutState) + Send>;
type SegmentHandler = Box<dyn FnMut(&Segment) + Send>;

/// Optional host callbacks, invoked synchronously at transition points.
#[derive(Default)]
pub struct TimerCallbacks {
    /// After every decrement of `time_left`
    pub on_tick: Option<TickHandler>,
    /// After advancing onto a new segment, with that segment
    pub on_segment_complete: Option<SegmentHandler>,
    /// After the workout finishes
    pub on_workout_complete: Option<Handler>,
    /// After `start()` has reset the state
    pub on_start: Option<Handler>,
    /// After `reset()`
    pub on_reset: Option<Handler>,
}

impl TimerCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_tick(mut self, f: impl FnMut(&WorkoutState) + Send + 'static) -> Self {
        self.on_tick = Some(Box::new(f));
        self
    }

    pub fn on_segment_complete(mut self, f: impl FnMut(&Segment) + Send + 'static) -> Self {
        self.on_segment_complete = Some(Box::new(f));
        self
    }

    pub fn on_workout_complete(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_workout_complete = Some(Box::new(f));
        self
    }

    pub fn on_start(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    pub fn on_reset(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_reset = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for TimerCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerCallbacks")
            .field("on_tick", &self.on_tick.is_some())
            .field("on_segment_complete", &self.on_segment_complete.is_some())
            .field("on_workout_complete", &self.on_workout_complete.is_some())
            .field("on_start", &self.on_start.is_some())
            .field("on_reset", &self.on_reset.is_some())
            .finish()
    }
}

/// Interval workout timer.
///
/// Owns the round/segment position, the countdown and the running flags.
/// Segment transitions are not performed by `tick()`; the host calls
/// `advance()` once `time_left` reaches zero.
pub struct WorkoutTimer {
    plan: WorkoutPlan,
    state: WorkoutState,
    driver: Box<dyn TickDriver>,
    callbacks: TimerCallbacks,
}

impl WorkoutTimer {
    /// Create a timer driven manually by the host.
    pub fn new(plan: WorkoutPlan) -> Result<Self, WorkoutError> {
        Self::with_driver(plan, Box::new(ManualDriver::new()))
    }

    /// Create a timer that attaches the given driver on start.
    pub fn with_driver(
        plan: WorkoutPlan,
        driver: Box<dyn TickDriver>,
    ) -> Result<Self, WorkoutError> {
        plan.validate()?;
        let state = WorkoutState::initial(plan.segments[0].duration);

        tracing::info!(
            "Workout '{}' loaded: {} segments x {} rounds",
            plan.name,
            plan.segments.len(),
            plan.total_rounds
        );

        Ok(Self {
            plan,
            state,
            driver,
            callbacks: TimerCallbacks::default(),
        })
    }

    /// Install host callbacks, replacing any previous ones.
    pub fn set_callbacks(&mut self, callbacks: TimerCallbacks) {
        self.callbacks = callbacks;
    }

    /// Start from the first segment of round 1 and attach the driver.
    pub fn start(&mut self) {
        self.start_after(Duration::ZERO);
    }

    /// Like [`start`](Self::start), delaying the first tick by `lead_in`.
    pub fn start_after(&mut self, lead_in: Duration) {
        self.state = WorkoutState {
            running: true,
            ..WorkoutState::initial(self.plan.segments[0].duration)
        };
        self.driver.start(lead_in);

        tracing::info!("Workout started");
        if let Some(f) = self.callbacks.on_start.as_mut() {
            f();
        }
    }

    /// Count down one second.
    ///
    /// No-op unless running and unpaused. Never goes below zero.
    pub fn tick(&mut self) {
        if !self.state.running || self.state.paused {
            return;
        }
        if self.state.time_left == 0 {
            return;
        }

        self.state.time_left -= 1;
        if let Some(f) = self.callbacks.on_tick.as_mut() {
            f(&self.state);
        }
    }

    /// Move past the current segment.
    ///
    /// Finishes the workout when the rounds are exhausted, or when the only
    /// thing left is the final round's trailing break.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, WorkoutError> {
        if !self.state.running {
            return Err(WorkoutError::NotRunning);
        }

        let Some(next) = self.lookup_next() else {
            self.finish();
            return Ok(AdvanceOutcome::Finished);
        };

        if next.round > self.state.round {
            tracing::info!("Round {} of {}", next.round, self.plan.total_rounds);
        }
        self.state.round = next.round;
        self.state.segment_index = next.index;
        self.state.time_left = next.segment.duration;

        tracing::debug!(
            "Transitioned to segment {} ({}, {}s) in round {}",
            next.index,
            next.segment.kind,
            next.segment.duration,
            next.round
        );

        if let Some(f) = self.callbacks.on_segment_complete.as_mut() {
            f(&next.segment);
        }
        Ok(AdvanceOutcome::Segment(next))
    }

    /// Mark the workout complete and detach the driver.
    pub fn finish(&mut self) {
        self.state.running = false;
        self.state.paused = false;
        self.state.finished = true;
        self.driver.stop();

        tracing::info!("Workout completed");
        if let Some(f) = self.callbacks.on_workout_complete.as_mut() {
            f();
        }
    }

    /// Toggle pause. Returns the new paused flag.
    ///
    /// The driver keeps running; ticks are ignored while paused.
    pub fn pause(&mut self) -> Result<bool, WorkoutError> {
        if !self.state.running {
            return Err(WorkoutError::NotRunning);
        }

        self.state.paused = !self.state.paused;
        if self.state.paused {
            tracing::info!("Workout paused");
        } else {
            tracing::info!("Workout resumed");
        }
        Ok(self.state.paused)
    }

    /// Return to idle on the first segment and detach the driver.
    pub fn reset(&mut self) {
        self.state = WorkoutState::initial(self.plan.segments[0].duration);
        self.driver.stop();

        tracing::info!("Workout reset");
        if let Some(f) = self.callbacks.on_reset.as_mut() {
            f();
        }
    }

    /// The segment that would follow the current one, without mutating state.
    ///
    /// `None` when the current segment is the last one presented.
    pub fn next_segment(&self) -> Option<NextSegment> {
        if self.state.finished {
            return None;
        }
        self.lookup_next()
    }

    fn lookup_next(&self) -> Option<NextSegment> {
        let segments = &self.plan.segments;
        let total_rounds = self.plan.total_rounds;

        let mut round = self.state.round;
        let mut index = self.state.segment_index + 1;
        if index >= segments.len() {
            round += 1;
            index = 0;
        }
        if round > total_rounds {
            return None;
        }

        let segment = &segments[index];
        // The final round never presents its trailing break.
        if round == total_rounds && index == segments.len() - 1 && segment.is_break() {
            return None;
        }

        Some(NextSegment {
            segment: segment.clone(),
            round,
            index,
        })
    }

    /// Snapshot of the live state.
    pub fn state(&self) -> &WorkoutState {
        &self.state
    }

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    pub fn status(&self) -> WorkoutStatus {
        self.state.status()
    }

    /// The segment at the current position.
    pub fn current_segment(&self) -> &Segment {
        &self.plan.segments[self.state.segment_index]
    }

    pub fn time_left(&self) -> u32 {
        self.state.time_left
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    pub fn is_driver_running(&self) -> bool {
        self.driver.is_running()
    }

    /// Progress through the current segment, 0-100.
    pub fn segment_progress_percent(&self) -> f64 {
        let duration = self.current_segment().duration;
        if duration == 0 {
            return 100.0;
        }
        let elapsed = duration.saturating_sub(self.state.time_left);
        elapsed as f64 / duration as f64 * 100.0
    }

    /// Progress through the whole workout, 0-100.
    pub fn overall_progress_percent(&self) -> f64 {
        if self.state.finished {
            return 100.0;
        }

        let per_round = self.plan.segments.len();
        let total = per_round * self.plan.total_rounds as usize;
        let completed = (self.state.round as usize - 1) * per_round + self.state.segment_index;

        let duration = self.current_segment().duration;
        let fraction = if duration > 0 {
            duration.saturating_sub(self.state.time_left) as f64 / duration as f64
        } else {
            0.0
        };

        ((completed as f64 + fraction) / total as f64 * 100.0).min(100.0)
    }
}

impl std::fmt::Debug for WorkoutTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkoutTimer")
            .field("plan", &self.plan.name)
            .field("state", &self.state)
            .field("driver_running", &self.driver.is_running())
            .finish()
    }
}
