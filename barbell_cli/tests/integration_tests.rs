//! Integration tests for the barbell binary.
//!
//! These tests verify end-to-end behavior including:
//! - Prescription and next-date output
//! - Logging sessions and progression/deload through the profile
//! - Schedule, analysis, reconciliation, and export

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI pointed at a data directory, with a missing config so defaults apply
fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("barbell").expect("Failed to find barbell binary");
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn read_profile(data_dir: &Path) -> serde_json::Value {
    let contents = fs::read_to_string(data_dir.join("profile.json")).expect("Failed to read profile");
    serde_json::from_str(&contents).expect("Profile is not valid JSON")
}

fn log_session(data_dir: &Path, date: &str, exercises: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = cli(data_dir);
    cmd.arg("log").arg("--date").arg(date);
    for exercise in exercises {
        cmd.arg("-e").arg(exercise);
    }
    cmd.assert()
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("A/B barbell program tracker"));
}

#[test]
fn test_next_on_fresh_data_dir() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("next")
        .arg("--today")
        .arg("2024-01-04")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout A"))
        .stdout(predicate::str::contains("Squat"))
        .stdout(predicate::str::contains("5x5 @ 20 kg"))
        // No schedule: tomorrow
        .stdout(predicate::str::contains("2024-01-05"))
        .stdout(predicate::str::contains("No schedule set"));
}

#[test]
fn test_default_command_is_next() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout A"));
}

#[test]
fn test_schedule_drives_next_date() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["schedule", "--frequency", "3", "--days", "mon,wed,fri"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Monday, Wednesday, Friday"))
        .stdout(predicate::str::contains("flexible"));

    let profile = read_profile(data_dir);
    assert_eq!(profile["schedule"]["frequency"], 3);

    // Thursday -> Friday
    cli(data_dir)
        .args(["next", "--today", "2024-01-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Friday 2024-01-05"));
}

#[test]
fn test_schedule_rejects_unknown_day() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["schedule", "--frequency", "3", "--days", "mon,someday"])
        .assert()
        .failure();
}

#[test]
fn test_progression_after_two_successes() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    log_session(data_dir, "2024-01-01", &["Bench Press=40@5,5,5,5,5"]).success();
    let profile = read_profile(data_dir);
    assert_eq!(profile["weights"]["Bench Press"], 40.0);
    assert_eq!(profile["attempts"]["Bench Press"], 2);

    log_session(data_dir, "2024-01-03", &["Bench Press@5,5,5,5,5"])
        .success()
        .stdout(predicate::str::contains("Bench Press: next 42.5 kg (attempt 1"));

    let profile = read_profile(data_dir);
    assert_eq!(profile["weights"]["Bench Press"], 42.5);
    assert_eq!(profile["attempts"]["Bench Press"], 1);
}

#[test]
fn test_workout_type_alternates() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    log_session(data_dir, "2024-01-01", &["Squat@5,5,5,5,5"])
        .success()
        .stdout(predicate::str::contains("Workout A"));

    cli(data_dir)
        .args(["next", "--today", "2024-01-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout B"))
        .stdout(predicate::str::contains("Deadlift"))
        .stdout(predicate::str::contains("Squat            5x5 @ 20 kg (attempt 2)"));
}

#[test]
fn test_three_failures_deload() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    log_session(data_dir, "2024-01-01", &["Squat=100@5,5,4,5,5"]).success();
    log_session(data_dir, "2024-01-03", &["Squat=100@5,5,4,5,5"])
        .success()
        .stdout(predicate::str::contains("Deload").not());
    log_session(data_dir, "2024-01-05", &["Squat=100@5,5,4,5,5"])
        .success()
        .stdout(predicate::str::contains("Deload: 100 kg → 90 kg"))
        .stdout(predicate::str::contains("Plateau detected"));

    let profile = read_profile(data_dir);
    assert_eq!(profile["weights"]["Squat"], 90.0);
    assert_eq!(profile["progression"]["consecutive_failures"]["Squat"], 0);
}

#[test]
fn test_custom_exercise_bypasses_progression() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    log_session(data_dir, "2024-01-01", &["Bicep Curl=12.5@10,10,10"]).success();

    let profile = read_profile(data_dir);
    assert!(profile["weights"].get("Bicep Curl").is_none());

    let history = fs::read_to_string(data_dir.join("history.jsonl")).unwrap();
    assert!(history.contains("Bicep Curl"));
}

#[test]
fn test_incomplete_session_not_progressed() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["log", "--date", "2024-01-01", "--incomplete", "-e", "Squat=60@5,5,5,5,5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("incomplete"));

    let profile = read_profile(data_dir);
    assert!(profile["weights"].get("Squat").is_none());
}

#[test]
fn test_invalid_exercise_spec_fails_without_writing() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    log_session(data_dir, "2024-01-01", &["Squat=60"]).failure();

    assert!(!data_dir.join("history.jsonl").exists());
    assert!(!data_dir.join("profile.json").exists());
}

#[test]
fn test_analyze_requires_schedule() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("analyze")
        .assert()
        .success()
        .stdout(predicate::str::contains("No schedule set"));
}

#[test]
fn test_analyze_detects_drift() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli(data_dir)
        .args(["schedule", "--frequency", "3", "--days", "mon,wed,fri"])
        .assert()
        .success();

    // Tuesdays and Thursdays
    for date in ["2024-01-02", "2024-01-04", "2024-01-09", "2024-01-11"] {
        log_session(data_dir, date, &["Squat@5,5,5,5,5"]).success();
    }

    cli(data_dir)
        .args(["analyze", "--today", "2024-01-13"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Actual training days: Tuesday, Thursday"))
        .stdout(predicate::str::contains("Matches preferred days: no"))
        .stdout(predicate::str::contains("Consider updating your preferred days"));

    // Saturday: adaptive scheduling picks Tuesday over Monday
    cli(data_dir)
        .args(["next", "--today", "2024-01-13"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tuesday 2024-01-16"));
}

#[test]
fn test_recompute_restores_lost_profile() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    log_session(data_dir, "2024-01-01", &["Squat=60@5,5,5,5,5", "Bench Press=40@5,5,3,3,3"]).success();
    log_session(data_dir, "2024-01-03", &["Squat@5,5,5,5,5", "Bench Press@5,5,3,3,3"]).success();
    let before = read_profile(data_dir);

    fs::remove_file(data_dir.join("profile.json")).unwrap();

    cli(data_dir)
        .arg("recompute")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recomputed 2 lifts from 2 sessions"));

    let after = read_profile(data_dir);
    assert_eq!(after["weights"], before["weights"]);
    assert_eq!(after["attempts"], before["attempts"]);
    assert_eq!(
        after["progression"]["consecutive_failures"],
        before["progression"]["consecutive_failures"]
    );
    assert_eq!(after["weights"]["Squat"], 62.5);
    assert_eq!(after["progression"]["consecutive_failures"]["Bench Press"], 2);
}

fn lift_state(profile: &serde_json::Value) -> [serde_json::Value; 3] {
    [
        profile["weights"].clone(),
        profile["attempts"].clone(),
        profile["progression"]["consecutive_failures"].clone(),
    ]
}

#[test]
fn test_new_weight_starts_fresh() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    log_session(data_dir, "2024-01-01", &["Squat=60@5,5,4,5,5"]).success();
    log_session(data_dir, "2024-01-03", &["Squat@5,5,4,5,5"]).success();
    // Third failure in a row, but the first at 100
    log_session(data_dir, "2024-01-05", &["Squat=100@5,5,4,5,5"])
        .success()
        .stdout(predicate::str::contains("Deload").not())
        .stdout(predicate::str::contains("Squat: next 100 kg (attempt 1, failures 1)"));

    cli(data_dir)
        .args(["log", "--date", "2024-01-06", "--incomplete", "-e", "Squat=100@5,-,-,-,-"])
        .assert()
        .success();

    let incremental = read_profile(data_dir);
    assert_eq!(incremental["weights"]["Squat"], 100.0);

    cli(data_dir)
        .arg("recompute")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recomputed 1 lifts from 3 sessions"));

    assert_eq!(lift_state(&read_profile(data_dir)), lift_state(&incremental));
}

#[test]
fn test_backdated_session_does_not_override_later_one() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    log_session(data_dir, "2024-01-10", &["Squat=60@5,5,5,5,5"]).success();
    log_session(data_dir, "2024-01-03", &["Squat=50@5,5,4,5,5"])
        .success()
        .stdout(predicate::str::contains("Squat: next 60 kg (attempt 2, failures 0)"));

    let incremental = read_profile(data_dir);
    assert_eq!(incremental["weights"]["Squat"], 60.0);
    assert_eq!(incremental["attempts"]["Squat"], 2);

    cli(data_dir).arg("recompute").assert().success();

    assert_eq!(lift_state(&read_profile(data_dir)), lift_state(&incremental));
}

#[test]
fn test_corrupted_profile_is_kept_aside() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    log_session(data_dir, "2024-01-01", &["Squat=60@5,5,5,5,5"]).success();
    fs::write(data_dir.join("profile.json"), "not json").unwrap();

    cli(data_dir)
        .args(["schedule", "--frequency", "3", "--days", "mon,wed,fri"])
        .assert()
        .success();

    let kept = fs::read_to_string(data_dir.join("profile.json.corrupt")).unwrap();
    assert_eq!(kept, "not json");

    cli(data_dir).arg("recompute").assert().success();
    let profile = read_profile(data_dir);
    assert_eq!(profile["weights"]["Squat"], 60.0);
    assert_eq!(profile["schedule"]["frequency"], 3);
}

#[test]
fn test_export_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let csv_path = data_dir.join("export.csv");

    log_session(data_dir, "2024-01-01", &["Squat@5,5,5,5,5", "Bench Press@5,5,5,-,-"]).success();

    cli(data_dir)
        .arg("export")
        .arg("--csv")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 rows"));

    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("session_id,date,workout_type"));
    assert!(csv.contains("5/5/5/-/-"));
}
