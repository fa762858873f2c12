//! Workout module for interval training sessions.

pub mod driver;
pub mod engine;
pub mod library;
pub mod types;

pub use driver::{IntervalDriver, ManualDriver, TickDriver, TickEvent, TICK_PERIOD};
pub use engine::{TimerCallbacks, WorkoutTimer};
pub use library::{load_plan, parse_plan, save_plan, Preset, DEFAULT_ROUNDS};
pub use types::{
    format_clock, AdvanceOutcome, NextSegment, Segment, SegmentKind, WorkoutError, WorkoutPlan,
    WorkoutState, WorkoutStatus,
};
