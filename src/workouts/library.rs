//! Built-in workout library.
//!
//! Curated presets plus JSON import/export of user plans.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::types::{Segment, WorkoutError, WorkoutPlan};

/// Default number of rounds for presets.
pub const DEFAULT_ROUNDS: u32 = 3;

/// A built-in curated workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Core circuit with short breaks between moves
    AbWorkout,
    /// 20s on / 10s off
    Tabata,
    /// Longer holds with a one minute rest per round
    PlankLadder,
}

impl Preset {
    pub fn all() -> Vec<Preset> {
        vec![Preset::AbWorkout, Preset::Tabata, Preset::PlankLadder]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Preset::AbWorkout => "Ab Workout",
            Preset::Tabata => "Tabata",
            Preset::PlankLadder => "Plank Ladder",
        }
    }

    /// Segments making up one round.
    pub fn segments(&self) -> Vec<Segment> {
        match self {
            Preset::AbWorkout => vec![
                Segment::exercise("Crunches", 45),
                Segment::rest("Rest", 15),
                Segment::exercise("Leg Raises", 45),
                Segment::rest("Rest", 15),
                Segment::exercise("Russian Twists", 45),
                Segment::rest("Rest", 15),
                Segment::exercise("Bicycle Crunches", 45),
                Segment::rest("Rest", 15),
                Segment::exercise("Plank", 60),
                Segment::rest("Round Break", 60),
            ],
            Preset::Tabata => vec![
                Segment::exercise("Mountain Climbers", 20),
                Segment::rest("Rest", 10),
                Segment::exercise("Flutter Kicks", 20),
                Segment::rest("Rest", 10),
            ],
            Preset::PlankLadder => vec![
                Segment::exercise("Front Plank", 30),
                Segment::exercise("Left Side Plank", 30),
                Segment::exercise("Right Side Plank", 30),
                Segment::exercise("Hollow Hold", 30),
                Segment::rest("Rest", 60),
            ],
        }
    }

    /// Build the plan for this preset.
    pub fn plan(&self, total_rounds: u32) -> Result<WorkoutPlan, WorkoutError> {
        WorkoutPlan::new(self.display_name(), self.segments(), total_rounds)
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Parse a plan from JSON and validate it.
pub fn parse_plan(json: &str) -> Result<WorkoutPlan, WorkoutError> {
    let plan: WorkoutPlan =
        serde_json::from_str(json).map_err(|e| WorkoutError::ParseError(e.to_string()))?;
    plan.validate()?;
    Ok(plan)
}

/// Load a plan from a JSON file.
pub fn load_plan(path: &Path) -> Result<WorkoutPlan, WorkoutError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| WorkoutError::FileError(e.to_string()))?;
    let plan = parse_plan(&content)?;

    tracing::info!("Loaded workout '{}' from {}", plan.name, path.display());
    Ok(plan)
}

/// Save a plan as pretty-printed JSON.
pub fn save_plan(plan: &WorkoutPlan, path: &Path) -> Result<(), WorkoutError> {
    let content =
        serde_json::to_string_pretty(plan).map_err(|e| WorkoutError::ParseError(e.to_string()))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| WorkoutError::FileError(e.to_string()))?;
    }
    std::fs::write(path, content).map_err(|e| WorkoutError::FileError(e.to_string()))?;

    Ok(())
}
