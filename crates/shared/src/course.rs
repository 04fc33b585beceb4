//! Course structure helpers: aggregate metrics, module ordering and
//! authoring warnings for a course's module list.

use serde::{Deserialize, Serialize};

/// Modules longer than this (in minutes) are flagged by [`validate_structure`].
pub const MAX_MODULE_DURATION_MINUTES: u32 = 120;
/// A module that lists exercises should list at least this many.
pub const MIN_EXERCISES_PER_MODULE: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseModule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub order: u32,
    #[serde(default)]
    pub duration: u32,
    pub difficulty: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<String>>,
}

impl CourseModule {
    fn display_name(&self, position: usize) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!("Module {}", position + 1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseMetrics {
    pub total_duration: u32,
    pub average_difficulty: f64,
    pub total_exercises: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Order,
    Difficulty,
    Duration,
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "order" => Ok(Self::Order),
            "difficulty" => Ok(Self::Difficulty),
            "duration" => Ok(Self::Duration),
            other => Err(format!(
                "unknown sort key `{other}` (expected order, difficulty or duration)"
            )),
        }
    }
}

pub fn calculate_metrics(modules: &[CourseModule]) -> CourseMetrics {
    let total_duration = modules.iter().map(|module| module.duration).sum();
    let total_exercises = modules
        .iter()
        .filter_map(|module| module.exercises.as_ref())
        .map(Vec::len)
        .sum();

    let average_difficulty = if modules.is_empty() {
        0.0
    } else {
        let sum: u32 = modules.iter().map(|module| u32::from(module.difficulty)).sum();
        round_to_hundredths(f64::from(sum) / modules.len() as f64)
    };

    CourseMetrics {
        total_duration,
        average_difficulty,
        total_exercises,
    }
}

/// Returns a copy of `modules` sorted by `sort_by`. Ties keep their input order.
pub fn organize_modules(modules: &[CourseModule], sort_by: SortBy) -> Vec<CourseModule> {
    let mut sorted = modules.to_vec();
    match sort_by {
        SortBy::Order => sorted.sort_by_key(|module| module.order),
        SortBy::Difficulty => sorted.sort_by_key(|module| module.difficulty),
        SortBy::Duration => sorted.sort_by_key(|module| module.duration),
    }
    sorted
}

pub fn validate_structure(modules: &[CourseModule]) -> Vec<String> {
    let mut warnings = Vec::new();
    for (position, module) in modules.iter().enumerate() {
        if module.title.is_none() {
            warnings.push(format!("Module {} missing title", position + 1));
        }
        if module.duration > MAX_MODULE_DURATION_MINUTES {
            warnings.push(format!(
                "Module '{}' duration exceeds 2 hours",
                module.display_name(position)
            ));
        }
        if let Some(exercises) = &module.exercises {
            if exercises.len() < MIN_EXERCISES_PER_MODULE {
                warnings.push(format!(
                    "Module '{}' has insufficient exercises",
                    module.display_name(position)
                ));
            }
        }
    }
    warnings
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "tests/course_tests.rs"]
mod tests;
