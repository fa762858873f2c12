//! Workout types and enums.
//!
//! Segments, plans, live timer state and the errors raised by the timer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of workout segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Work interval
    Exercise,
    /// Rest interval
    Break,
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentKind::Exercise => write!(f, "Exercise"),
            SegmentKind::Break => write!(f, "Break"),
        }
    }
}

/// A single exercise or break interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Display name
    pub name: String,
    /// Duration in seconds
    pub duration: u32,
    /// Exercise or break
    pub kind: SegmentKind,
}

impl Segment {
    /// Create a segment.
    pub fn new(name: impl Into<String>, duration: u32, kind: SegmentKind) -> Self {
        Self {
            name: name.into(),
            duration,
            kind,
        }
    }

    /// Create an exercise segment.
    pub fn exercise(name: impl Into<String>, duration: u32) -> Self {
        Self::new(name, duration, SegmentKind::Exercise)
    }

    /// Create a break segment.
    pub fn rest(name: impl Into<String>, duration: u32) -> Self {
        Self::new(name, duration, SegmentKind::Break)
    }

    pub fn is_break(&self) -> bool {
        self.kind == SegmentKind::Break
    }
}

/// An ordered segment sequence repeated for a number of rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    /// Workout name
    pub name: String,
    /// Segments making up one round
    pub segments: Vec<Segment>,
    /// Number of rounds (at least 1)
    pub total_rounds: u32,
}

impl WorkoutPlan {
    /// Create a validated plan.
    pub fn new(
        name: impl Into<String>,
        segments: Vec<Segment>,
        total_rounds: u32,
    ) -> Result<Self, WorkoutError> {
        let plan = Self {
            name: name.into(),
            segments,
            total_rounds,
        };
        plan.validate()?;
        Ok(plan)
    }

    /// Check the plan can be executed.
    ///
    /// Plans deserialized from disk bypass [`WorkoutPlan::new`], so the timer
    /// validates again before accepting one.
    ///
    /// The trailing-break rule applies to the wrapped position, so a plan made
    /// of one break never shows it in the final round and a single round of it
    /// is rejected.
    pub fn validate(&self) -> Result<(), WorkoutError> {
        if self.segments.is_empty() {
            return Err(WorkoutError::InvalidWorkout(
                "Workout has no segments".to_string(),
            ));
        }
        if self.total_rounds == 0 {
            return Err(WorkoutError::InvalidWorkout(
                "Workout needs at least one round".to_string(),
            ));
        }
        // A lone break in a single round is a trailing break and would never be shown.
        if self.total_rounds == 1 && self.segments.len() == 1 && self.segments[0].is_break() {
            return Err(WorkoutError::InvalidWorkout(
                "Workout has no presentable segments".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the final round drops its last segment.
    pub fn skips_trailing_break(&self) -> bool {
        self.segments.last().is_some_and(Segment::is_break)
    }

    /// Number of segments presented over the whole workout.
    pub fn presented_segment_count(&self) -> usize {
        let total = self.segments.len() * self.total_rounds as usize;
        if self.skips_trailing_break() {
            total - 1
        } else {
            total
        }
    }

    /// Total workout time in seconds, excluding the skipped trailing break.
    ///
    /// Saturates at `u32::MAX` for oversized plans.
    pub fn total_duration_secs(&self) -> u32 {
        let round = self
            .segments
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(s.duration));
        let total = round.saturating_mul(self.total_rounds);
        match self.segments.last() {
            Some(last) if last.is_break() && total < u32::MAX => total - last.duration,
            _ => total,
        }
    }
}

/// Execution status derived from the timer flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkoutStatus {
    /// Not started, or reset
    #[default]
    Idle,
    /// Counting down
    Running,
    /// Running but not decrementing
    Paused,
    /// Last segment done
    Finished,
}

impl std::fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkoutStatus::Idle => write!(f, "Idle"),
            WorkoutStatus::Running => write!(f, "Running"),
            WorkoutStatus::Paused => write!(f, "Paused"),
            WorkoutStatus::Finished => write!(f, "Finished"),
        }
    }
}

/// Mutable timer state, owned by the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkoutState {
    /// Current round, 1-indexed
    pub round: u32,
    /// Index into the plan's segments
    pub segment_index: usize,
    /// Seconds remaining in the current segment
    pub time_left: u32,
    pub running: bool,
    pub paused: bool,
    pub finished: bool,
}

impl WorkoutState {
    /// Idle state positioned on the first segment.
    pub fn initial(first_duration: u32) -> Self {
        Self {
            round: 1,
            segment_index: 0,
            time_left: first_duration,
            running: false,
            paused: false,
            finished: false,
        }
    }

    pub fn status(&self) -> WorkoutStatus {
        if self.finished {
            WorkoutStatus::Finished
        } else if self.running && self.paused {
            WorkoutStatus::Paused
        } else if self.running {
            WorkoutStatus::Running
        } else {
            WorkoutStatus::Idle
        }
    }
}

/// The position that follows the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextSegment {
    pub segment: Segment,
    /// Round of the next segment, 1-indexed
    pub round: u32,
    /// Index of the next segment within the round
    pub index: usize,
}

/// Result of advancing past the current segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// A new segment is now current
    Segment(NextSegment),
    /// The workout finished
    Finished,
}

/// Format seconds as `m:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Errors related to workout operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkoutError {
    /// Invalid workout structure
    #[error("Invalid workout: {0}")]
    InvalidWorkout(String),

    /// Operation requires a running workout
    #[error("Workout not running")]
    NotRunning,

    /// Workout file could not be read or written
    #[error("Failed to access workout file: {0}")]
    FileError(String),

    /// Workout file could not be parsed
    #[error("Failed to parse workout: {0}")]
    ParseError(String),
}
