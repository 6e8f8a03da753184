//! Next-workout date resolution from static schedule preferences.
//!
//! No history awareness here; see [`crate::engine`] for the adaptive variant.

use crate::types::{weekday_index, WorkoutSchedule};
use chrono::{Duration, NaiveDate};

/// Days a flexible search looks ahead for a preferred weekday
pub const LOOKAHEAD_DAYS: i64 = 14;

/// Minimum rest between sessions for a weekly frequency
pub fn min_rest_days(frequency: u32) -> i64 {
    match frequency {
        f if f >= 3 => 1,
        2 => 2,
        _ => 3,
    }
}

/// Resolve the next workout date
///
/// Never returns a date before `today`. A workout already logged today
/// pushes the result to a later day.
pub fn next_workout_date(
    schedule: Option<&WorkoutSchedule>,
    last_workout: Option<NaiveDate>,
    today: NaiveDate,
) -> NaiveDate {
    let tomorrow = today + Duration::days(1);

    let Some(schedule) = schedule else {
        return tomorrow;
    };

    let min_rest = min_rest_days(schedule.frequency);

    if let Some(last) = last_workout {
        let days_since = (today - last).num_days();
        if days_since < min_rest {
            let earliest = today + Duration::days(min_rest - days_since);
            tracing::debug!(
                "Only {} day(s) since last workout, earliest permissible is {}",
                days_since,
                earliest
            );
            if schedule.allows(weekday_index(earliest)) {
                return earliest;
            }
            return next_preferred_from(schedule, earliest).unwrap_or(tomorrow);
        }
    }

    let worked_out_today = last_workout == Some(today);
    if !worked_out_today && schedule.allows(weekday_index(today)) {
        return today;
    }

    next_preferred_from(schedule, tomorrow).unwrap_or(tomorrow)
}

/// First date on or after `start` whose weekday is preferred
///
/// Flexible schedules scan day by day within the lookahead window; strict
/// ones jump straight to the nearest preferred weekday.
fn next_preferred_from(schedule: &WorkoutSchedule, start: NaiveDate) -> Option<NaiveDate> {
    if schedule.flexible {
        (0..LOOKAHEAD_DAYS)
            .map(|offset| start + Duration::days(offset))
            .find(|date| schedule.allows(weekday_index(*date)))
    } else if schedule.preferred_days.is_empty() {
        Some(start)
    } else {
        let from = i64::from(weekday_index(start));
        schedule
            .preferred_days
            .iter()
            .map(|day| (i64::from(*day) - from).rem_euclid(7))
            .min()
            .map(|offset| start + Duration::days(offset))
    }
}
