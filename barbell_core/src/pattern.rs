//! Workout-day pattern analysis over the trailing four weeks.
//!
//! A weekday counts as an "actual day" once it has at least two completed
//! sessions in the window; a single session is treated as noise.

use crate::types::{round_one_decimal, weekday_index, weekday_name, WorkoutHistoryEntry, WorkoutSchedule};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Length of the analysis window
pub const PATTERN_WINDOW_DAYS: i64 = 28;

/// Sessions on a weekday needed before it counts as a pattern
pub const MIN_OCCURRENCES: usize = 2;

const WINDOW_WEEKS: f64 = 4.0;
const LOW_FREQUENCY_RATIO: f64 = 0.7;
const HIGH_FREQUENCY_RATIO: f64 = 1.3;

/// Advice derived from a pattern analysis
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternSuggestion {
    /// Training happens on different days than the preferences say
    UpdatePreferredDays { days: Vec<u8> },
    /// Training happens noticeably less often than planned
    LowerFrequency { actual: f64, target: u32 },
    /// Training happens noticeably more often than planned
    HigherThanPlanned { actual: f64, target: u32 },
}

impl fmt::Display for PatternSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternSuggestion::UpdatePreferredDays { days } => {
                let names: Vec<_> = days.iter().map(|d| weekday_name(*d)).collect();
                write!(
                    f,
                    "You usually train on {}. Consider updating your preferred days to match.",
                    names.join(", ")
                )
            }
            PatternSuggestion::LowerFrequency { actual, target } => write!(
                f,
                "You're averaging {:.1} workouts per week against a target of {}. Consider lowering your target frequency.",
                actual, target
            ),
            PatternSuggestion::HigherThanPlanned { actual, target } => write!(
                f,
                "Great consistency! You're averaging {:.1} workouts per week, more than your planned {}.",
                actual, target
            ),
        }
    }
}

/// Observed training pattern compared against schedule preferences
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatternAnalysis {
    /// Weekdays trained at least twice in the window, ascending
    pub actual_days: Vec<u8>,
    /// Completed sessions per week, one decimal
    pub actual_frequency: f64,
    pub matches_preferred: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<PatternSuggestion>,
}

/// Analyze completed history from the four weeks up to `today`
///
/// Returns `None` without a schedule or without any completed session in
/// the window.
pub fn analyze_pattern(
    history: &[WorkoutHistoryEntry],
    schedule: Option<&WorkoutSchedule>,
    today: NaiveDate,
) -> Option<PatternAnalysis> {
    let schedule = schedule?;
    let window_start = today - Duration::days(PATTERN_WINDOW_DAYS);

    let recent: Vec<_> = history
        .iter()
        .filter(|entry| entry.completed && entry.date >= window_start && entry.date <= today)
        .collect();

    if recent.is_empty() {
        tracing::debug!("No completed workouts since {}, skipping pattern analysis", window_start);
        return None;
    }

    let mut counts = [0usize; 7];
    for entry in &recent {
        counts[usize::from(weekday_index(entry.date))] += 1;
    }

    let actual_days: Vec<u8> = (0u8..7)
        .filter(|day| counts[usize::from(*day)] >= MIN_OCCURRENCES)
        .collect();
    let actual_frequency = round_one_decimal(recent.len() as f64 / WINDOW_WEEKS);

    let actual_set: BTreeSet<u8> = actual_days.iter().copied().collect();
    let matches_preferred = !actual_set.is_empty() && actual_set == schedule.preferred_days;

    let target = f64::from(schedule.frequency);
    let suggestion = if !matches_preferred && !actual_days.is_empty() {
        Some(PatternSuggestion::UpdatePreferredDays {
            days: actual_days.clone(),
        })
    } else if actual_frequency < LOW_FREQUENCY_RATIO * target {
        Some(PatternSuggestion::LowerFrequency {
            actual: actual_frequency,
            target: schedule.frequency,
        })
    } else if actual_frequency > HIGH_FREQUENCY_RATIO * target {
        Some(PatternSuggestion::HigherThanPlanned {
            actual: actual_frequency,
            target: schedule.frequency,
        })
    } else {
        None
    };

    tracing::debug!(
        "Pattern: days {:?}, {:.1}/week, matches preferred: {}",
        actual_days,
        actual_frequency,
        matches_preferred
    );

    Some(PatternAnalysis {
        actual_days,
        actual_frequency,
        matches_preferred,
        suggestion,
    })
}
