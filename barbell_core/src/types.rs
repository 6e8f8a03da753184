//! Core domain types for the barbell tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise records and workout history entries
//! - Per-exercise progression settings
//! - Schedule preferences and weekday helpers

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use uuid::Uuid;

/// Reps per set that count as a successful set
pub const DEFAULT_REP_TARGET: u32 = 5;

/// Successful attempts required at a weight before progressing
pub const DEFAULT_REPEAT_COUNT: u32 = 2;

/// Weight added on progression for most lifts
pub const DEFAULT_WEIGHT_INCREMENT: f64 = 2.5;

/// Weight added on progression for the deadlift
pub const DEADLIFT_WEIGHT_INCREMENT: f64 = 5.0;

pub const DEADLIFT: &str = "Deadlift";

// ============================================================================
// Exercise Records
// ============================================================================

fn default_attempt() -> u32 {
    1
}

/// One exercise's outcome in a session
///
/// `sets` holds the reps done per set; `None` means the set was not attempted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseRecord {
    pub name: String,
    pub weight: f64,
    pub sets: Vec<Option<u32>>,
    #[serde(default = "default_attempt")]
    pub attempt: u32,
}

impl ExerciseRecord {
    pub fn new(name: impl Into<String>, weight: f64, sets: Vec<Option<u32>>) -> Self {
        Self {
            name: name.into(),
            weight,
            sets,
            attempt: default_attempt(),
        }
    }

    pub fn with_attempt(mut self, attempt: u32) -> Self {
        self.attempt = attempt;
        self
    }

    /// Every set hit exactly `rep_target` reps. An empty record is a failure.
    pub fn is_successful(&self, rep_target: u32) -> bool {
        !self.sets.is_empty() && self.sets.iter().all(|set| *set == Some(rep_target))
    }
}

// ============================================================================
// Progression Settings
// ============================================================================

/// Per-exercise progression maps stored in the user profile
///
/// Any exercise missing from a map falls back to the defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProgressionSettings {
    #[serde(default)]
    pub repeat_count: HashMap<String, u32>,
    #[serde(default)]
    pub weight_increment: HashMap<String, f64>,
    #[serde(default)]
    pub consecutive_failures: HashMap<String, u32>,
}

impl ProgressionSettings {
    /// Resolve the settings for one exercise, filling gaps with defaults
    pub fn for_exercise(&self, name: &str) -> ExerciseProgression {
        let defaults = ExerciseProgression::defaults_for(name);
        ExerciseProgression {
            repeat_count: self
                .repeat_count
                .get(name)
                .copied()
                .unwrap_or(defaults.repeat_count)
                .max(1),
            weight_increment: self
                .weight_increment
                .get(name)
                .copied()
                .unwrap_or(defaults.weight_increment),
            consecutive_failures: self
                .consecutive_failures
                .get(name)
                .copied()
                .unwrap_or(0),
            rep_target: defaults.rep_target,
        }
    }
}

/// Resolved progression settings for a single exercise
#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseProgression {
    pub repeat_count: u32,
    pub weight_increment: f64,
    pub consecutive_failures: u32,
    pub rep_target: u32,
}

impl ExerciseProgression {
    pub fn defaults_for(name: &str) -> Self {
        let weight_increment = if name == DEADLIFT {
            DEADLIFT_WEIGHT_INCREMENT
        } else {
            DEFAULT_WEIGHT_INCREMENT
        };

        Self {
            repeat_count: DEFAULT_REPEAT_COUNT,
            weight_increment,
            consecutive_failures: 0,
            rep_target: DEFAULT_REP_TARGET,
        }
    }

    pub fn with_rep_target(mut self, rep_target: u32) -> Self {
        self.rep_target = rep_target;
        self
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// Workout schedule preferences
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSchedule {
    /// Target workouts per week
    pub frequency: u32,
    /// Weekday indices (0=Sunday..6=Saturday). Empty means any day.
    #[serde(default)]
    pub preferred_days: BTreeSet<u8>,
    #[serde(default)]
    pub flexible: bool,
}

impl WorkoutSchedule {
    pub fn new(frequency: u32, preferred_days: impl IntoIterator<Item = u8>, flexible: bool) -> Self {
        Self {
            frequency,
            preferred_days: preferred_days.into_iter().filter(|d| *d < 7).collect(),
            flexible,
        }
    }

    /// Whether a weekday is acceptable under these preferences
    pub fn allows(&self, weekday: u8) -> bool {
        self.preferred_days.is_empty() || self.preferred_days.contains(&weekday)
    }
}

// ============================================================================
// Workout History
// ============================================================================

/// Which half of the A/B program a session belongs to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum WorkoutType {
    A,
    B,
}

impl WorkoutType {
    pub fn alternate(self) -> Self {
        match self {
            WorkoutType::A => WorkoutType::B,
            WorkoutType::B => WorkoutType::A,
        }
    }
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkoutType::A => write!(f, "A"),
            WorkoutType::B => write!(f, "B"),
        }
    }
}

/// An immutable record of a past session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutHistoryEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub workout_type: Option<WorkoutType>,
    pub exercises: Vec<ExerciseRecord>,
    pub completed: bool,
}

impl WorkoutHistoryEntry {
    /// A completed session on `date`
    pub fn completed(
        date: NaiveDate,
        workout_type: Option<WorkoutType>,
        exercises: Vec<ExerciseRecord>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            workout_type,
            exercises,
            completed: true,
        }
    }

    pub fn exercise(&self, name: &str) -> Option<&ExerciseRecord> {
        self.exercises.iter().find(|e| e.name == name)
    }
}

/// Unit the user records weights in. The engines are unit-less.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightUnit::Kg => write!(f, "kg"),
            WeightUnit::Lb => write!(f, "lb"),
        }
    }
}

// ============================================================================
// Weekday and numeric helpers
// ============================================================================

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Weekday index with 0=Sunday
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

pub fn weekday_name(index: u8) -> &'static str {
    WEEKDAY_NAMES[usize::from(index % 7)]
}

/// Parse a weekday name, three-letter abbreviation, or index (0=Sunday)
pub fn parse_weekday(s: &str) -> Option<u8> {
    let s = s.trim().to_lowercase();
    if let Ok(index) = s.parse::<u8>() {
        return (index < 7).then_some(index);
    }
    if s.len() < 3 {
        return None;
    }
    WEEKDAY_NAMES
        .iter()
        .position(|name| name.to_lowercase().starts_with(&s))
        .map(|i| i as u8)
}

/// Round to one decimal place, half away from zero
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
