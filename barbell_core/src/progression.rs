//! Progression logic for barbell lifts.
//!
//! Rules per completed exercise:
//! - Success (every set at the rep target) resets the failure count and
//!   either advances the attempt or, once `repeat_count` attempts are done,
//!   adds `weight_increment` and starts over at attempt 1.
//! - Failure holds weight and attempt. The third consecutive failure
//!   deloads the weight by 10% and clears the failure count.

use crate::types::{round_one_decimal, ExerciseProgression, ExerciseRecord};
use serde::{Deserialize, Serialize};

/// Consecutive failed sessions that trigger a deload
pub const DELOAD_FAILURE_THRESHOLD: u32 = 3;

/// Fraction of the working weight kept after a deload
pub const DELOAD_FACTOR: f64 = 0.9;

/// Emitted when repeated failure forces a weight reduction
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DeloadInfo {
    pub old_weight: f64,
    pub new_weight: f64,
    pub reason: String,
}

/// Next state for one exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgressionOutcome {
    pub next_weight: f64,
    pub next_attempt: u32,
    pub next_consecutive_failures: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deload: Option<DeloadInfo>,
}

impl ProgressionOutcome {
    pub fn is_deload(&self) -> bool {
        self.deload.is_some()
    }
}

/// Compute the next weight, attempt, and failure count for an exercise
///
/// Pure: no clock, no I/O. Unknown exercises should be passed the defaults
/// from [`ExerciseProgression::defaults_for`].
pub fn compute_progression(
    record: &ExerciseRecord,
    settings: &ExerciseProgression,
) -> ProgressionOutcome {
    let attempt = record.attempt.max(1);

    if record.is_successful(settings.rep_target) {
        let outcome = if attempt >= settings.repeat_count {
            ProgressionOutcome {
                next_weight: record.weight + settings.weight_increment,
                next_attempt: 1,
                next_consecutive_failures: 0,
                deload: None,
            }
        } else {
            ProgressionOutcome {
                next_weight: record.weight,
                next_attempt: attempt + 1,
                next_consecutive_failures: 0,
                deload: None,
            }
        };

        tracing::debug!(
            "{}: success at {} (attempt {}/{}), next {} attempt {}",
            record.name,
            record.weight,
            attempt,
            settings.repeat_count,
            outcome.next_weight,
            outcome.next_attempt
        );
        return outcome;
    }

    let failures = settings.consecutive_failures + 1;

    if failures >= DELOAD_FAILURE_THRESHOLD {
        let new_weight = round_one_decimal(record.weight * DELOAD_FACTOR);
        tracing::info!(
            "{}: {} consecutive failures, deloading {} -> {}",
            record.name,
            failures,
            record.weight,
            new_weight
        );

        return ProgressionOutcome {
            next_weight: new_weight,
            next_attempt: 1,
            next_consecutive_failures: 0,
            deload: Some(DeloadInfo {
                old_weight: record.weight,
                new_weight,
                reason: format!(
                    "Plateau detected: {} consecutive failed sessions at this weight, reducing by 10%",
                    failures
                ),
            }),
        };
    }

    tracing::debug!(
        "{}: failure {} of {} at {}",
        record.name,
        failures,
        DELOAD_FAILURE_THRESHOLD,
        record.weight
    );

    ProgressionOutcome {
        next_weight: record.weight,
        next_attempt: attempt,
        next_consecutive_failures: failures,
        deload: None,
    }
}
