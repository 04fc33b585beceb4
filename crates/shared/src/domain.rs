use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_newtype!(IdentityToken);
string_newtype!(CourseId);

/// The signed-in user as seen by the client after a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: IdentityToken,
}

/// Lesson completion for one user in one course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseProgress {
    pub completed_lessons: u32,
    pub total_lessons: u32,
}

impl CourseProgress {
    pub fn new(completed_lessons: u32, total_lessons: u32) -> Self {
        Self {
            completed_lessons,
            total_lessons,
        }
    }

    /// Share of completed lessons in `0.0..=100.0`.
    ///
    /// An empty course reports 0 % and a completion count above the total is
    /// capped at 100 %.
    pub fn percentage(&self) -> f64 {
        if self.total_lessons == 0 {
            return 0.0;
        }
        let completed = self.completed_lessons.min(self.total_lessons);
        f64::from(completed) / f64::from(self.total_lessons) * 100.0
    }

    pub fn rounded_percentage(&self) -> u32 {
        self.percentage().round() as u32
    }

    pub fn is_consistent(&self) -> bool {
        self.total_lessons > 0 && self.completed_lessons <= self.total_lessons
    }

    pub fn summary(&self) -> String {
        format!(
            "{} of {} lessons completed",
            self.completed_lessons, self.total_lessons
        )
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
