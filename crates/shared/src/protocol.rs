use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{CourseId, CourseProgress, IdentityToken};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const COURSE_PROGRESS_PATH: &str = "/api/progress/course";

#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<IdentityToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LoginResponse {
    pub fn accepted(user_id: IdentityToken) -> Self {
        Self {
            success: true,
            user_id: Some(user_id),
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            user_id: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgressRequest {
    pub user_id: IdentityToken,
    pub course_id: CourseId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseProgressResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_lessons: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_lessons: Option<u32>,
}

impl CourseProgressResponse {
    pub fn found(progress: CourseProgress) -> Self {
        Self {
            success: true,
            completed_lessons: Some(progress.completed_lessons),
            total_lessons: Some(progress.total_lessons),
        }
    }

    pub fn not_found() -> Self {
        Self {
            success: false,
            completed_lessons: None,
            total_lessons: None,
        }
    }

    /// Returns the payload only when the backend reported success and sent
    /// both counters.
    pub fn into_progress(self) -> Option<CourseProgress> {
        if !self.success {
            return None;
        }
        Some(CourseProgress::new(
            self.completed_lessons?,
            self.total_lessons?,
        ))
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
