//! Accounts, courses and lesson completions served by the development backend.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use shared::{
    course::{validate_structure, CourseModule},
    domain::{CourseId, CourseProgress, IdentityToken},
};
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Course {
    pub id: CourseId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub modules: Vec<CourseModule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Completion {
    pub user: IdentityToken,
    pub course: CourseId,
    pub completed: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub completions: Vec<Completion>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    accounts: HashMap<String, String>,
    courses: HashMap<CourseId, Course>,
    completions: HashMap<(IdentityToken, CourseId), u32>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog '{}'", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid catalog '{}'", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(raw)?;
        Self::from_file(file)
    }

    pub fn from_file(file: CatalogFile) -> Result<Self> {
        let mut catalog = Self::default();

        for account in file.accounts {
            if account.email.is_empty() || account.password.is_empty() {
                bail!("accounts need a non-empty email and password");
            }
            catalog.accounts.insert(account.email, account.password);
        }

        for course in file.courses {
            for warning in validate_structure(&course.modules) {
                warn!(course_id = %course.id, %warning, "course structure warning");
            }
            if catalog.courses.contains_key(&course.id) {
                bail!("duplicate course id '{}'", course.id);
            }
            catalog.courses.insert(course.id.clone(), course);
        }

        for completion in file.completions {
            let Some(course) = catalog.courses.get(&completion.course) else {
                bail!("completion references unknown course '{}'", completion.course);
            };
            if completion.completed as usize > course.modules.len() {
                warn!(
                    user = %completion.user,
                    course_id = %completion.course,
                    completed = completion.completed,
                    total = course.modules.len(),
                    "completion exceeds lesson count"
                );
            }
            catalog
                .completions
                .insert((completion.user, completion.course), completion.completed);
        }

        Ok(catalog)
    }

    /// Small built-in catalog used when no catalog file is configured.
    pub fn demo() -> Self {
        Self::from_toml(DEMO_CATALOG).unwrap_or_default()
    }

    pub fn authenticate(&self, email: &str, password: &str) -> bool {
        self.accounts
            .get(email)
            .is_some_and(|expected| expected == password)
    }

    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.courses.values()
    }

    /// Progress for a known account and course. Accounts without a recorded
    /// completion have finished zero lessons.
    pub fn progress(&self, user: &IdentityToken, course_id: &CourseId) -> Option<CourseProgress> {
        if !self.accounts.contains_key(user.as_str()) {
            return None;
        }
        let course = self.courses.get(course_id)?;
        let completed = self
            .completions
            .get(&(user.clone(), course_id.clone()))
            .copied()
            .unwrap_or(0);
        let total = u32::try_from(course.modules.len()).unwrap_or(u32::MAX);
        Some(CourseProgress::new(completed, total))
    }
}

const DEMO_CATALOG: &str = r#"
[[accounts]]
email = "demo@example.com"
password = "demo"

[[courses]]
id = "course1"
title = "Python Foundations"

[[courses.modules]]
title = "Introduction to Python"
order = 1
duration = 60
difficulty = 3
exercises = ["Hello World", "Basic Calculations"]

[[courses.modules]]
title = "Control Flow"
order = 2
duration = 90
difficulty = 4
exercises = ["If Statements", "Loops", "Function Practice"]

[[courses.modules]]
title = "Data Structures"
order = 3
duration = 120
difficulty = 4
exercises = ["Lists", "Dictionaries"]

[[completions]]
user = "demo@example.com"
course = "course1"
completed = 2
"#;

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
