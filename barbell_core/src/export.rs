//! CSV export of workout history.
//!
//! One row per exercise record, suitable for spreadsheets.

use crate::{ExerciseRecord, Result, WorkoutHistoryEntry};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    session_id: String,
    date: String,
    workout_type: Option<String>,
    completed: bool,
    exercise: String,
    weight: f64,
    attempt: u32,
    sets: String,
}

impl CsvRow {
    fn new(entry: &WorkoutHistoryEntry, record: &ExerciseRecord) -> Self {
        CsvRow {
            session_id: entry.id.to_string(),
            date: entry.date.to_string(),
            workout_type: entry.workout_type.map(|t| t.to_string()),
            completed: entry.completed,
            exercise: record.name.clone(),
            weight: record.weight,
            attempt: record.attempt,
            sets: format_sets(&record.sets),
        }
    }
}

/// Render sets as `5/5/4/-/-`
pub fn format_sets(sets: &[Option<u32>]) -> String {
    sets.iter()
        .map(|set| set.map_or_else(|| "-".to_string(), |reps| reps.to_string()))
        .collect::<Vec<_>>()
        .join("/")
}

/// Write the history to a CSV file, replacing any existing file
///
/// Returns the number of rows written. The file is synced before returning.
pub fn export_history_csv(history: &[WorkoutHistoryEntry], csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(csv_path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(true).from_writer(file);

    let mut rows = 0;
    for entry in history {
        for record in &entry.exercises {
            writer.serialize(CsvRow::new(entry, record))?;
            rows += 1;
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} rows to {:?}", rows, csv_path);
    Ok(rows)
}
