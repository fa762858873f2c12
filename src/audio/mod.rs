//! Audio Cue Module
//!
//! Preloads the four workout cues and plays them immediately or from
//! cancellable triggers keyed off the time remaining in a segment.

pub mod engine;
pub mod scheduler;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// Re-export main types
pub use engine::{CueBackend, LoadedClip, MockCueBackend, RodioBackend, SilentBackend};
pub use scheduler::{beep_lead_secs, plan_triggers, SoundScheduler, TriggerKind, TriggerPlan};

/// The fixed set of workout cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Lead-in before an exercise starts
    Countdown,
    /// Entering a break
    Rest,
    /// Workout finished
    Complete,
    /// Segment is about to end
    Beep,
}

impl Cue {
    pub const ALL: [Cue; 4] = [Cue::Countdown, Cue::Rest, Cue::Complete, Cue::Beep];

    pub fn name(&self) -> &'static str {
        match self {
            Cue::Countdown => "countdown",
            Cue::Rest => "rest",
            Cue::Complete => "complete",
            Cue::Beep => "beep",
        }
    }

    /// File name looked up in the sound directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Cue::Countdown => "countdown.mp3",
            Cue::Rest => "rest.mp3",
            Cue::Complete => "complete.mp3",
            Cue::Beep => "beep.mp3",
        }
    }
}

impl std::fmt::Display for Cue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Errors that can occur during audio operations
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Audio device not available")]
    DeviceNotAvailable,

    #[error("Sound file not found: {0}")]
    SoundNotFound(String),

    #[error("Failed to load cue {cue}: {reason}")]
    LoadFailed { cue: Cue, reason: String },

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Audio configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master enable for all cues
    pub enabled: bool,
    /// Master volume (0-100)
    pub volume: u8,
    /// Directory holding the cue files
    pub sound_dir: PathBuf,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 80,
            sound_dir: PathBuf::from("sounds"),
        }
    }
}

impl AudioConfig {
    /// Path of the file for a cue.
    pub fn cue_path(&self, cue: Cue) -> PathBuf {
        self.sound_dir.join(cue.file_name())
    }

    /// Volume as a gain factor (0.0 - 1.0).
    pub fn gain(&self) -> f32 {
        self.volume.min(100) as f32 / 100.0
    }
}

/// Audio events for monitoring
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// Cue decoded and ready
    CueLoaded { cue: Cue, duration: Duration },
    /// Cue could not be loaded and will never play
    CueLoadFailed { cue: Cue, message: String },
    /// Cue playback started
    CuePlayed { cue: Cue },
    /// Delayed trigger armed
    TriggerArmed { kind: TriggerKind, delay: Duration },
    /// All pending triggers cancelled
    TriggersCancelled,
    /// Audio error occurred
    Error { message: String },
}
