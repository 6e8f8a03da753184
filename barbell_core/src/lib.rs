#![forbid(unsafe_code)]

//! Core domain model and business logic for the barbell training tracker.
//!
//! This crate provides:
//! - Domain types (exercise records, history entries, schedules)
//! - The fixed A/B program catalog
//! - Progression engine (weight/attempt/deload)
//! - Schedule engine (date resolution, pattern analysis, adaptive scheduling)
//! - Thin persistence (profile store, history log, CSV export)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod progression;
pub mod schedule;
pub mod pattern;
pub mod engine;
pub mod profile;
pub mod state;
pub mod history;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{get_program, is_program_exercise, next_workout_type};
pub use config::Config;
pub use progression::{compute_progression, DeloadInfo, ProgressionOutcome};
pub use schedule::next_workout_date;
pub use pattern::{analyze_pattern, PatternAnalysis, PatternSuggestion};
pub use engine::{adaptive_next_workout_date, prescribe, PrescribedExercise};
pub use profile::UserProfile;
pub use state::ProfileStore;
pub use history::{read_history, HistoryLog};
pub use export::export_history_csv;
