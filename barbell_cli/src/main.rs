use barbell_core::history::last_completed_date;
use barbell_core::profile::AppliedProgression;
use barbell_core::*;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "barbell")]
#[command(about = "A/B barbell program tracker with auto-progression and adaptive scheduling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use a specific config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the next workout and when to do it (default)
    Next,

    /// Log a finished session and apply progression
    Log {
        /// Exercise as NAME[=WEIGHT]@REPS,REPS,... ('-' for a set not attempted)
        #[arg(short, long = "exercise", required = true)]
        exercises: Vec<String>,

        /// Session date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Record the session without completing it (no progression)
        #[arg(long)]
        incomplete: bool,
    },

    /// Set schedule preferences
    Schedule {
        /// Target workouts per week
        #[arg(long)]
        frequency: u32,

        /// Preferred weekdays, e.g. mon,wed,fri (empty means any day)
        #[arg(long, value_delimiter = ',')]
        days: Vec<String>,

        /// Only ever schedule on preferred days
        #[arg(long)]
        strict: bool,
    },

    /// Compare actual training days with the schedule
    Analyze,

    /// Rebuild lift state from the history log
    Recompute,

    /// Export history as CSV
    Export {
        /// Output file
        #[arg(long)]
        csv: PathBuf,
    },
}

struct Paths {
    profile: PathBuf,
    history: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path) -> Self {
        Self {
            profile: data_dir.join("profile.json"),
            history: data_dir.join("history.jsonl"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    barbell_core::logging::init_with_level(barbell_core::logging::level_for_verbosity(cli.verbose));

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = Paths::new(&data_dir);
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());

    tracing::debug!("Data directory {:?}, today {}", data_dir, today);

    match cli.command {
        Some(Commands::Next) | None => cmd_next(&paths, &config, today),
        Some(Commands::Log {
            exercises,
            date,
            incomplete,
        }) => cmd_log(&paths, &config, &exercises, date.unwrap_or(today), incomplete),
        Some(Commands::Schedule {
            frequency,
            days,
            strict,
        }) => cmd_schedule(&paths, frequency, &days, strict),
        Some(Commands::Analyze) => cmd_analyze(&paths, today),
        Some(Commands::Recompute) => cmd_recompute(&paths, &config),
        Some(Commands::Export { csv }) => cmd_export(&paths, &csv),
    }
}

fn cmd_next(paths: &Paths, config: &Config, today: NaiveDate) -> Result<()> {
    let profile = ProfileStore::new(&paths.profile).load()?;
    let history = read_history(&paths.history)?;

    let workout_type = next_workout_type(&history);
    let plan = prescribe(&profile, workout_type, config);
    let date = adaptive_next_workout_date(
        profile.schedule.as_ref(),
        last_completed_date(&history),
        &history,
        today,
    );

    println!("\nWorkout {}", workout_type);
    println!(
        "  Next session: {} {}{}",
        weekday_name(weekday_index(date)),
        date,
        if date == today { " (today)" } else { "" }
    );
    println!();
    for exercise in &plan {
        println!(
            "  {:<16} {}x{} @ {} {} (attempt {})",
            exercise.name,
            exercise.sets,
            exercise.reps,
            format_weight(exercise.weight),
            profile.unit,
            exercise.attempt
        );
    }

    if profile.schedule.is_none() {
        println!("\n  No schedule set. Use `barbell schedule` to set preferred days.");
    }
    println!();
    Ok(())
}

fn cmd_log(
    paths: &Paths,
    config: &Config,
    specs: &[String],
    date: NaiveDate,
    incomplete: bool,
) -> Result<()> {
    let log = HistoryLog::new(&paths.history);
    let store = ProfileStore::new(&paths.profile);
    let rep_target = config.progression.rep_target;
    let starting_weight = config.program.starting_weight;

    // History append and profile update happen under the profile lock so the
    // two never disagree about which sessions have been applied.
    let (profile, (entry, applied)) = store.update(|profile| {
        let mut history = log.read()?;
        let workout_type = next_workout_type(&history);
        let backdated = last_completed_date(&history).is_some_and(|last| date < last);
        let exercises = specs
            .iter()
            .map(|spec| parse_exercise(spec, profile, starting_weight))
            .collect::<Result<Vec<_>>>()?;

        let mut entry = WorkoutHistoryEntry::completed(date, Some(workout_type), exercises);
        entry.completed = !incomplete;
        log.append(&entry)?;

        // Later sessions already shaped the profile; rebuild instead of
        // applying this one on top of them.
        let applied = if backdated && entry.completed {
            tracing::info!("Session on {} predates logged history, recomputing", entry.date);
            history.push(entry.clone());
            profile.recompute_from_history(&history, rep_target)
        } else {
            profile.apply_session(&entry, rep_target)
        };
        Ok((entry, applied))
    })?;

    println!(
        "\n✓ Session logged (Workout {}, {}{})",
        entry.workout_type.unwrap_or(WorkoutType::A),
        entry.date,
        if entry.completed { "" } else { ", incomplete" }
    );
    display_progressions(&applied, profile.unit);
    println!();
    Ok(())
}

fn cmd_schedule(paths: &Paths, frequency: u32, days: &[String], strict: bool) -> Result<()> {
    let preferred = days
        .iter()
        .filter(|d| !d.trim().is_empty())
        .map(|d| parse_weekday(d).ok_or_else(|| Error::Parse(format!("Unknown weekday: {}", d))))
        .collect::<Result<Vec<_>>>()?;

    let schedule = WorkoutSchedule::new(frequency, preferred, !strict);
    let (profile, ()) = ProfileStore::new(&paths.profile).update(|profile| {
        profile.schedule = Some(schedule);
        Ok(())
    })?;

    if let Some(schedule) = &profile.schedule {
        let days = if schedule.preferred_days.is_empty() {
            "any day".to_string()
        } else {
            schedule
                .preferred_days
                .iter()
                .map(|d| weekday_name(*d))
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!(
            "✓ Schedule: {}x per week on {} ({})",
            schedule.frequency,
            days,
            if schedule.flexible { "flexible" } else { "strict" }
        );
    }
    Ok(())
}

fn cmd_analyze(paths: &Paths, today: NaiveDate) -> Result<()> {
    let profile = ProfileStore::new(&paths.profile).load()?;
    let history = read_history(&paths.history)?;

    if profile.schedule.is_none() {
        println!("No schedule set. Use `barbell schedule` first.");
        return Ok(());
    }

    let Some(analysis) = analyze_pattern(&history, profile.schedule.as_ref(), today) else {
        println!("Not enough recent history to analyze (no completed workouts in the last 4 weeks).");
        return Ok(());
    };

    let days = if analysis.actual_days.is_empty() {
        "no consistent days yet".to_string()
    } else {
        analysis
            .actual_days
            .iter()
            .map(|d| weekday_name(*d))
            .collect::<Vec<_>>()
            .join(", ")
    };

    println!("Actual training days: {}", days);
    println!("Actual frequency: {:.1} per week", analysis.actual_frequency);
    println!(
        "Matches preferred days: {}",
        if analysis.matches_preferred { "yes" } else { "no" }
    );
    if let Some(suggestion) = &analysis.suggestion {
        println!("\n  {}", suggestion);
    }
    Ok(())
}

fn cmd_recompute(paths: &Paths, config: &Config) -> Result<()> {
    let history = read_history(&paths.history)?;
    let rep_target = config.progression.rep_target;

    let (profile, applied) = ProfileStore::new(&paths.profile)
        .update(|profile| Ok(profile.recompute_from_history(&history, rep_target)))?;

    let completed = history.iter().filter(|entry| entry.completed).count();
    println!("✓ Recomputed {} lifts from {} sessions", applied.len(), completed);
    display_progressions(&applied, profile.unit);
    Ok(())
}

fn cmd_export(paths: &Paths, csv: &Path) -> Result<()> {
    let history = read_history(&paths.history)?;
    let rows = export_history_csv(&history, csv)?;

    println!("✓ Exported {} rows", rows);
    println!("  CSV: {}", csv.display());
    Ok(())
}

fn display_progressions(applied: &[AppliedProgression], unit: WeightUnit) {
    for progression in applied {
        let outcome = &progression.outcome;
        println!(
            "  {}: next {} {} (attempt {}, failures {})",
            progression.exercise,
            format_weight(outcome.next_weight),
            unit,
            outcome.next_attempt,
            outcome.next_consecutive_failures
        );
        if let Some(deload) = &outcome.deload {
            println!(
                "  ⚠ Deload: {} {} → {} {}. {}",
                format_weight(deload.old_weight),
                unit,
                format_weight(deload.new_weight),
                unit,
                deload.reason
            );
        }
    }
}

/// Whole numbers without decimals, everything else to one place
fn format_weight(weight: f64) -> String {
    if weight.fract().abs() < f64::EPSILON {
        format!("{:.0}", weight)
    } else {
        format!("{:.1}", weight)
    }
}

/// Parse `NAME[=WEIGHT]@REPS,REPS,...`
///
/// Missing weight uses the profile's working weight. The attempt comes from
/// the profile, or starts at 1 for any other weight.
fn parse_exercise(spec: &str, profile: &UserProfile, starting_weight: f64) -> Result<ExerciseRecord> {
    let (head, reps) = spec
        .rsplit_once('@')
        .ok_or_else(|| Error::Parse(format!("Expected NAME[=WEIGHT]@REPS in '{}'", spec)))?;

    let (name, weight) = match head.split_once('=') {
        Some((name, weight)) => {
            let weight = weight
                .trim()
                .parse::<f64>()
                .map_err(|e| Error::Parse(format!("Invalid weight '{}': {}", weight, e)))?;
            (name.trim(), Some(weight))
        }
        None => (head.trim(), None),
    };

    if name.is_empty() {
        return Err(Error::Parse(format!("Missing exercise name in '{}'", spec)));
    }

    let sets = reps
        .split(',')
        .map(|set| match set.trim() {
            "" | "-" => Ok(None),
            n => n
                .parse::<u32>()
                .map(Some)
                .map_err(|e| Error::Parse(format!("Invalid rep count '{}': {}", n, e))),
        })
        .collect::<Result<Vec<_>>>()?;

    let weight = weight.unwrap_or_else(|| profile.working_weight(name, starting_weight));
    Ok(ExerciseRecord::new(name, weight, sets).with_attempt(profile.attempt_at(name, weight)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exercise_with_weight() {
        let record = parse_exercise("Bench Press=42.5@5,5,4,-,-", &UserProfile::default(), 20.0).unwrap();
        assert_eq!(record.name, "Bench Press");
        assert_eq!(record.weight, 42.5);
        assert_eq!(record.sets, vec![Some(5), Some(5), Some(4), None, None]);
        assert_eq!(record.attempt, 1);
    }

    #[test]
    fn test_parse_exercise_uses_profile() {
        let mut profile = UserProfile::default();
        profile.weights.insert("Squat".into(), 80.0);
        profile.attempts.insert("Squat".into(), 2);

        let record = parse_exercise("Squat@5,5,5,5,5", &profile, 20.0).unwrap();
        assert_eq!(record.weight, 80.0);
        assert_eq!(record.attempt, 2);

        let fresh = parse_exercise("Deadlift@5", &profile, 20.0).unwrap();
        assert_eq!(fresh.weight, 20.0);
    }

    #[test]
    fn test_parse_exercise_new_weight_starts_at_first_attempt() {
        let mut profile = UserProfile::default();
        profile.weights.insert("Squat".into(), 80.0);
        profile.attempts.insert("Squat".into(), 2);

        let heavier = parse_exercise("Squat=100@5,5,5,5,5", &profile, 20.0).unwrap();
        assert_eq!(heavier.attempt, 1);

        let same = parse_exercise("Squat=80@5,5,5,5,5", &profile, 20.0).unwrap();
        assert_eq!(same.attempt, 2);
    }

    #[test]
    fn test_parse_exercise_errors() {
        let profile = UserProfile::default();
        assert!(parse_exercise("Squat", &profile, 20.0).is_err());
        assert!(parse_exercise("Squat=heavy@5", &profile, 20.0).is_err());
        assert!(parse_exercise("Squat@5,x", &profile, 20.0).is_err());
        assert!(parse_exercise("=40@5", &profile, 20.0).is_err());
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(100.0), "100");
        assert_eq!(format_weight(42.5), "42.5");
        assert_eq!(format_weight(38.3), "38.3");
    }
}
