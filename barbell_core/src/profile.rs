//! User profile: current working state per lift.
//!
//! The profile is the fold of progression outcomes over history. It can be
//! updated one session at a time with [`UserProfile::apply_session`] or
//! rebuilt from the log with [`UserProfile::recompute_from_history`].

use crate::catalog::{get_program, is_program_exercise};
use crate::progression::{compute_progression, ProgressionOutcome, DELOAD_FAILURE_THRESHOLD};
use crate::types::{
    ExerciseProgression, ExerciseRecord, ProgressionSettings, WeightUnit, WorkoutHistoryEntry,
    WorkoutSchedule,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Weights closer than this are the same plate load
const WEIGHT_EPSILON: f64 = 1e-6;

fn same_weight(a: f64, b: f64) -> bool {
    (a - b).abs() < WEIGHT_EPSILON
}

/// Persistent user state
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    #[serde(default)]
    pub unit: WeightUnit,
    /// Current working weight per lift
    #[serde(default)]
    pub weights: HashMap<String, f64>,
    /// Current attempt number at the working weight, per lift
    #[serde(default)]
    pub attempts: HashMap<String, u32>,
    #[serde(default)]
    pub progression: ProgressionSettings,
    #[serde(default)]
    pub schedule: Option<WorkoutSchedule>,
}

/// Progression result for one lift of a session
#[derive(Clone, Debug, PartialEq)]
pub struct AppliedProgression {
    pub exercise: String,
    pub outcome: ProgressionOutcome,
}

impl UserProfile {
    pub fn working_weight(&self, name: &str, starting_weight: f64) -> f64 {
        self.weights.get(name).copied().unwrap_or(starting_weight)
    }

    pub fn attempt(&self, name: &str) -> u32 {
        self.attempts.get(name).copied().unwrap_or(1).max(1)
    }

    /// Attempt number for a session at `weight`
    ///
    /// Anything other than the established working weight starts over at 1.
    pub fn attempt_at(&self, name: &str, weight: f64) -> u32 {
        if self.is_new_weight(name, weight) {
            1
        } else {
            self.attempt(name)
        }
    }

    fn is_new_weight(&self, name: &str, weight: f64) -> bool {
        self.weights
            .get(name)
            .is_some_and(|working| !same_weight(*working, weight))
    }

    pub fn settings_for(&self, name: &str, rep_target: u32) -> ExerciseProgression {
        self.progression.for_exercise(name).with_rep_target(rep_target)
    }

    /// Write an outcome back into the per-lift maps
    pub fn apply_outcome(&mut self, name: &str, outcome: &ProgressionOutcome) {
        self.weights.insert(name.to_string(), outcome.next_weight);
        self.attempts.insert(name.to_string(), outcome.next_attempt);
        self.progression
            .consecutive_failures
            .insert(name.to_string(), outcome.next_consecutive_failures);
    }

    /// Advance every program lift in a completed session
    ///
    /// Incomplete sessions and custom exercises leave the profile untouched.
    /// A lift logged at a weight other than its working weight starts fresh:
    /// attempt 1 and no failures carried over.
    pub fn apply_session(
        &mut self,
        entry: &WorkoutHistoryEntry,
        rep_target: u32,
    ) -> Vec<AppliedProgression> {
        if !entry.completed {
            tracing::debug!("Session {} not completed, no progression applied", entry.id);
            return Vec::new();
        }

        let mut applied = Vec::new();
        for record in &entry.exercises {
            if !is_program_exercise(&record.name) {
                tracing::debug!("Skipping progression for custom exercise {}", record.name);
                continue;
            }

            let mut settings = self.settings_for(&record.name, rep_target);
            let outcome = if self.is_new_weight(&record.name, record.weight) {
                tracing::debug!(
                    "{}: logged at {} instead of working weight, starting fresh",
                    record.name,
                    record.weight
                );
                settings.consecutive_failures = 0;
                compute_progression(&record.clone().with_attempt(1), &settings)
            } else {
                compute_progression(record, &settings)
            };
            self.apply_outcome(&record.name, &outcome);

            tracing::info!(
                "{}: next {} (attempt {}, failures {})",
                record.name,
                outcome.next_weight,
                outcome.next_attempt,
                outcome.next_consecutive_failures
            );

            applied.push(AppliedProgression {
                exercise: record.name.clone(),
                outcome,
            });
        }
        applied
    }

    /// Rebuild per-lift state from history
    ///
    /// For each program lift, replays the most recent completed performance.
    /// The failure count going into it is the run of failed sessions right
    /// before it at the same weight, and a lift whose previous session was at
    /// another weight is on attempt 1. Running this twice gives the same
    /// profile.
    pub fn recompute_from_history(
        &mut self,
        history: &[WorkoutHistoryEntry],
        rep_target: u32,
    ) -> Vec<AppliedProgression> {
        let mut completed: Vec<_> = history.iter().filter(|e| e.completed).collect();
        completed.sort_by_key(|e| e.date);

        let mut applied = Vec::new();
        for name in get_program().exercise_names() {
            let performances: Vec<&ExerciseRecord> =
                completed.iter().filter_map(|e| e.exercise(name)).collect();

            let Some((last, earlier)) = performances.split_last() else {
                continue;
            };

            let prior_failures = earlier
                .iter()
                .rev()
                .take_while(|r| same_weight(r.weight, last.weight) && !r.is_successful(rep_target))
                .count() as u32;

            let mut settings = self.settings_for(name, rep_target);
            settings.consecutive_failures = prior_failures.min(DELOAD_FAILURE_THRESHOLD - 1);

            let weight_changed = earlier
                .last()
                .is_some_and(|previous| !same_weight(previous.weight, last.weight));
            let outcome = if weight_changed {
                compute_progression(&(*last).clone().with_attempt(1), &settings)
            } else {
                compute_progression(last, &settings)
            };
            self.apply_outcome(name, &outcome);
            applied.push(AppliedProgression {
                exercise: name.to_string(),
                outcome,
            });
        }

        tracing::info!("Recomputed {} lifts from {} sessions", applied.len(), completed.len());
        applied
    }
}
