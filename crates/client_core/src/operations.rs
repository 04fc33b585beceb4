use std::{fmt, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{CourseId, CourseProgress, IdentityToken, Session},
    protocol::{CourseProgressRequest, LoginRequest},
};
use storage::IdentityStore;
use tracing::{info, warn};

use crate::{
    controller::{Operation, RequestController},
    error::{PreconditionError, RequestError},
    transport::BackendApi,
};

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Email/password sign-in. On success the submitted email becomes the stored
/// identity token.
pub struct LoginOperation;

#[async_trait]
impl Operation for LoginOperation {
    type Input = Credentials;
    type Context = ();
    type Request = LoginRequest;
    type Output = Session;

    const NAME: &'static str = "login";
    const REQUEST_FAILURE: RequestError = RequestError::LoginFailed;

    async fn load_context(&self, _identity: &dyn IdentityStore) -> Result<()> {
        Ok(())
    }

    fn prepare(&self, input: Credentials, _: ()) -> Result<LoginRequest, PreconditionError> {
        if input.email.is_empty() || input.password.is_empty() {
            return Err(PreconditionError::MissingCredentials);
        }
        Ok(LoginRequest {
            email: input.email,
            password: input.password,
        })
    }

    async fn perform(
        &self,
        api: &dyn BackendApi,
        request: LoginRequest,
    ) -> Result<Option<Session>> {
        let response = api.login(&request).await?;
        if !response.success {
            if let Some(message) = response.message.as_deref() {
                info!(email = %request.email, %message, "login rejected");
            }
            return Ok(None);
        }
        Ok(Some(Session {
            user_id: IdentityToken::new(request.email),
        }))
    }

    async fn commit(&self, output: &Session, identity: &dyn IdentityStore) -> Result<()> {
        identity.set(&output.user_id).await
    }
}

/// Lesson completion lookup for the stored user.
pub struct ProgressOperation;

#[async_trait]
impl Operation for ProgressOperation {
    type Input = CourseId;
    type Context = Option<IdentityToken>;
    type Request = CourseProgressRequest;
    type Output = CourseProgress;

    const NAME: &'static str = "course_progress";
    const REQUEST_FAILURE: RequestError = RequestError::ProgressUnavailable;

    async fn load_context(&self, identity: &dyn IdentityStore) -> Result<Option<IdentityToken>> {
        identity.get().await
    }

    fn prepare(
        &self,
        course_id: CourseId,
        user_id: Option<IdentityToken>,
    ) -> Result<CourseProgressRequest, PreconditionError> {
        let user_id = user_id.ok_or(PreconditionError::MissingIdentity)?;
        Ok(CourseProgressRequest { user_id, course_id })
    }

    async fn perform(
        &self,
        api: &dyn BackendApi,
        request: CourseProgressRequest,
    ) -> Result<Option<CourseProgress>> {
        let progress = api.course_progress(&request).await?.into_progress();
        if let Some(progress) = progress.filter(|progress| !progress.is_consistent()) {
            warn!(
                course_id = %request.course_id,
                completed = progress.completed_lessons,
                total = progress.total_lessons,
                "backend reported inconsistent lesson counts"
            );
        }
        Ok(progress)
    }
}

pub type LoginController = RequestController<LoginOperation>;
pub type ProgressController = RequestController<ProgressOperation>;

impl RequestController<LoginOperation> {
    pub fn login(api: Arc<dyn BackendApi>, identity: Arc<dyn IdentityStore>) -> Self {
        Self::new(LoginOperation, api, identity)
    }
}

impl RequestController<ProgressOperation> {
    pub fn progress(api: Arc<dyn BackendApi>, identity: Arc<dyn IdentityStore>) -> Self {
        Self::new(ProgressOperation, api, identity)
    }
}
