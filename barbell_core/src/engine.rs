//! Adaptive scheduling and workout prescription.
//!
//! - Adaptive date: when history shows a stable set of training days that
//!   differs from the stated preferences, schedule against the observed days
//! - Prescription: working weight and attempt for each lift of the next workout

use crate::catalog::get_program;
use crate::pattern::analyze_pattern;
use crate::schedule::next_workout_date;
use crate::types::{WorkoutHistoryEntry, WorkoutSchedule, WorkoutType};
use crate::{Config, UserProfile};
use chrono::NaiveDate;
use serde::Serialize;

/// Observed days needed before they override the preferences
const MIN_ADAPTIVE_DAYS: usize = 2;

/// Resolve the next workout date, preferring observed training days
///
/// If the trailing pattern has two or more actual days that don't match the
/// preferences, resolution runs against a flexible schedule built from those
/// days. Otherwise the stated schedule is used as-is.
pub fn adaptive_next_workout_date(
    schedule: Option<&WorkoutSchedule>,
    last_workout: Option<NaiveDate>,
    history: &[WorkoutHistoryEntry],
    today: NaiveDate,
) -> NaiveDate {
    let derived = schedule
        .filter(|_| !history.is_empty())
        .and_then(|s| {
            let analysis = analyze_pattern(history, Some(s), today)?;
            if analysis.matches_preferred || analysis.actual_days.len() < MIN_ADAPTIVE_DAYS {
                return None;
            }
            tracing::info!(
                "Adapting schedule to observed days {:?} (preferred {:?})",
                analysis.actual_days,
                s.preferred_days
            );
            Some(WorkoutSchedule {
                frequency: s.frequency,
                preferred_days: analysis.actual_days.into_iter().collect(),
                flexible: true,
            })
        });

    next_workout_date(derived.as_ref().or(schedule), last_workout, today)
}

/// One lift of a prescribed workout
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PrescribedExercise {
    pub name: String,
    pub weight: f64,
    pub attempt: u32,
    pub sets: usize,
    pub reps: u32,
}

/// Working weights for every lift of a workout type
pub fn prescribe(
    profile: &UserProfile,
    workout_type: WorkoutType,
    config: &Config,
) -> Vec<PrescribedExercise> {
    get_program()
        .exercises(workout_type)
        .iter()
        .map(|exercise| PrescribedExercise {
            name: exercise.name.to_string(),
            weight: profile.working_weight(exercise.name, config.program.starting_weight),
            attempt: profile.attempt(exercise.name),
            sets: exercise.sets,
            reps: config.progression.rep_target,
        })
        .collect()
}
