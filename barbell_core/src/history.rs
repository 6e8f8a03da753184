//! Append-only workout history.
//!
//! Sessions are appended to a JSONL (JSON Lines) file with file locking.
//! Entries are never rewritten; corrections happen by recomputing the
//! profile from the log.

use crate::{Result, WorkoutHistoryEntry};
use chrono::NaiveDate;
use fs2::FileExt;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// JSONL-backed history log
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one finished session
    pub fn append(&self, entry: &WorkoutHistoryEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(entry)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.sync_all()?;
        file.unlock()?;

        tracing::debug!("Appended session {} ({}) to history", entry.id, entry.date);
        Ok(())
    }

    /// Read the whole log; see [`read_history`]
    pub fn read(&self) -> Result<Vec<WorkoutHistoryEntry>> {
        read_history(&self.path)
    }
}

/// Read all entries from a history file, oldest first
///
/// A missing file is an empty history. Unparseable lines and duplicate ids
/// are skipped with a warning.
pub fn read_history(path: &Path) -> Result<Vec<WorkoutHistoryEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();
    let mut seen_ids = HashSet::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutHistoryEntry>(&line) {
            Ok(entry) => {
                if seen_ids.insert(entry.id) {
                    entries.push(entry);
                } else {
                    tracing::warn!("Duplicate session {} at line {}, skipping", entry.id, line_num + 1);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to parse session at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;

    // Stable sort keeps log order within a day
    entries.sort_by_key(|e| e.date);
    tracing::debug!("Read {} sessions from history", entries.len());
    Ok(entries)
}

/// Date of the most recent completed session
pub fn last_completed_date(history: &[WorkoutHistoryEntry]) -> Option<NaiveDate> {
    history
        .iter()
        .filter(|e| e.completed)
        .map(|e| e.date)
        .max()
}
