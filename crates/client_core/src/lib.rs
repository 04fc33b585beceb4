use std::sync::Arc;

use anyhow::Result;
use shared::domain::{CourseId, CourseProgress, IdentityToken, Session};
use storage::IdentityStore;

pub mod controller;
pub mod error;
pub mod operations;
pub mod transport;

pub use controller::{Operation, RequestController, RequestState, SubmitOutcome};
pub use error::{FailureReason, PreconditionError, RequestError};
pub use operations::{
    Credentials, LoginController, LoginOperation, ProgressController, ProgressOperation,
};
pub use transport::{BackendApi, ClientConfig, HttpBackend, DEFAULT_REQUEST_TIMEOUT};

/// Login and progress controllers wired to one backend and one identity store.
pub struct PortalClient {
    identity: Arc<dyn IdentityStore>,
    login: LoginController,
    progress: ProgressController,
}

impl PortalClient {
    pub fn new(config: ClientConfig, identity: Arc<dyn IdentityStore>) -> Result<Self> {
        let api: Arc<dyn BackendApi> = Arc::new(HttpBackend::new(config)?);
        Ok(Self::with_backend(api, identity))
    }

    pub fn with_backend(api: Arc<dyn BackendApi>, identity: Arc<dyn IdentityStore>) -> Self {
        Self {
            login: LoginController::login(api.clone(), identity.clone()),
            progress: ProgressController::progress(api, identity.clone()),
            identity,
        }
    }

    pub fn login_controller(&self) -> &LoginController {
        &self.login
    }

    pub fn progress_controller(&self) -> &ProgressController {
        &self.progress
    }

    pub async fn login(&self, credentials: Credentials) -> Result<SubmitOutcome<Session>> {
        self.login.submit(credentials).await
    }

    /// Fetches progress for `course_id`, resetting a finished previous fetch
    /// first so a new course always triggers a request.
    pub async fn course_progress(
        &self,
        course_id: CourseId,
    ) -> Result<SubmitOutcome<CourseProgress>> {
        self.progress.reset();
        self.progress.submit(course_id).await
    }

    pub async fn current_user(&self) -> Result<Option<IdentityToken>> {
        self.identity.get().await
    }

    pub async fn logout(&self) -> Result<()> {
        self.identity.clear().await?;
        self.login.reset();
        self.progress.reset();
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
