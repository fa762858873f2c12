//! IntervalTimer - Interval Workout Timer
//!
//! Steps through exercise and break segments over a number of rounds, counting
//! each segment down once per second, while scheduling audio cues off the time
//! remaining and keeping the screen awake for the duration of the workout.

pub mod audio;
pub mod session;
pub mod storage;
pub mod wake_lock;
pub mod workouts;

// Re-export commonly used types
pub use audio::SoundScheduler;
pub use session::{SessionCommand, WorkoutSession};
pub use storage::config::AppConfig;
pub use wake_lock::WakeLockGuard;
pub use workouts::engine::WorkoutTimer;
