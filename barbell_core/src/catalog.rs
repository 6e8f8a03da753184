//! The fixed A/B barbell program.
//!
//! Workout A: Squat, Bench Press, Barbell Row.
//! Workout B: Squat, Overhead Press, Deadlift.
//!
//! Anything logged under another name is a custom exercise and does not
//! take part in progression.

use crate::types::{WorkoutHistoryEntry, WorkoutType, DEADLIFT};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A lift in the program
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramExercise {
    pub name: &'static str,
    pub sets: usize,
}

/// The complete program: exercise order for each workout type
#[derive(Clone, Debug)]
pub struct Program {
    pub workouts: HashMap<WorkoutType, Vec<ProgramExercise>>,
}

impl Program {
    /// Exercises for a workout type, in performing order
    pub fn exercises(&self, workout_type: WorkoutType) -> &[ProgramExercise] {
        self.workouts
            .get(&workout_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Look up an exercise by name across both workouts
    pub fn find(&self, name: &str) -> Option<&ProgramExercise> {
        self.workouts
            .values()
            .flat_map(|exercises| exercises.iter())
            .find(|e| e.name == name)
    }

    /// All distinct exercise names, A before B
    pub fn exercise_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for workout_type in [WorkoutType::A, WorkoutType::B] {
            for exercise in self.exercises(workout_type) {
                if !names.contains(&exercise.name) {
                    names.push(exercise.name);
                }
            }
        }
        names
    }
}

static PROGRAM: Lazy<Program> = Lazy::new(build_program);

/// Get a reference to the cached program
pub fn get_program() -> &'static Program {
    &PROGRAM
}

fn build_program() -> Program {
    let lift = |name: &'static str| ProgramExercise {
        name,
        sets: if name == DEADLIFT { 1 } else { 5 },
    };

    let mut workouts = HashMap::new();
    workouts.insert(
        WorkoutType::A,
        vec![lift("Squat"), lift("Bench Press"), lift("Barbell Row")],
    );
    workouts.insert(
        WorkoutType::B,
        vec![lift("Squat"), lift("Overhead Press"), lift(DEADLIFT)],
    );

    Program { workouts }
}

/// True for lifts that belong to the program
pub fn is_program_exercise(name: &str) -> bool {
    get_program().find(name).is_some()
}

/// Alternate from the most recent completed session; start with A
///
/// `history` need not be sorted.
pub fn next_workout_type(history: &[WorkoutHistoryEntry]) -> WorkoutType {
    history
        .iter()
        .filter(|entry| entry.completed)
        .filter_map(|entry| entry.workout_type.map(|t| (entry.date, t)))
        .max_by_key(|(date, _)| *date)
        .map(|(_, last)| last.alternate())
        .unwrap_or(WorkoutType::A)
}
