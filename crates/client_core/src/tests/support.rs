//! In-process doubles for the backend and identity store.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::IdentityToken,
    protocol::{CourseProgressRequest, CourseProgressResponse, LoginRequest, LoginResponse},
};
use storage::IdentityStore;
use tokio::sync::Notify;

use crate::transport::BackendApi;

#[derive(Clone)]
pub(crate) enum Reply<T> {
    Respond(T),
    TransportError,
}

pub(crate) struct FakeBackend {
    login_reply: Reply<LoginResponse>,
    progress_reply: Reply<CourseProgressResponse>,
    pub(crate) login_calls: AtomicUsize,
    pub(crate) progress_calls: AtomicUsize,
    pub(crate) progress_requests: Mutex<Vec<CourseProgressRequest>>,
    gate: Option<Arc<Notify>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            login_reply: Reply::Respond(LoginResponse::accepted(IdentityToken::new("server-id"))),
            progress_reply: Reply::Respond(CourseProgressResponse {
                success: true,
                completed_lessons: Some(3),
                total_lessons: Some(10),
            }),
            login_calls: AtomicUsize::new(0),
            progress_calls: AtomicUsize::new(0),
            progress_requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub(crate) fn with_login_reply(mut self, reply: Reply<LoginResponse>) -> Self {
        self.login_reply = reply;
        self
    }

    pub(crate) fn with_progress_reply(mut self, reply: Reply<CourseProgressResponse>) -> Self {
        self.progress_reply = reply;
        self
    }

    /// Holds every call until the returned handle is notified.
    pub(crate) fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub(crate) fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn progress_calls(&self) -> usize {
        self.progress_calls.load(Ordering::SeqCst)
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for_gate().await;
        match &self.login_reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::TransportError => Err(anyhow!("connection refused")),
        }
    }

    async fn course_progress(
        &self,
        request: &CourseProgressRequest,
    ) -> Result<CourseProgressResponse> {
        self.progress_calls.fetch_add(1, Ordering::SeqCst);
        self.progress_requests
            .lock()
            .expect("progress requests lock")
            .push(request.clone());
        self.wait_for_gate().await;
        match &self.progress_reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::TransportError => Err(anyhow!("connection refused")),
        }
    }
}

/// Identity store whose every operation fails, standing in for a broken disk.
pub(crate) struct BrokenIdentityStore;

#[async_trait]
impl IdentityStore for BrokenIdentityStore {
    async fn get(&self) -> Result<Option<IdentityToken>> {
        Err(anyhow!("disk I/O error"))
    }

    async fn set(&self, _token: &IdentityToken) -> Result<()> {
        Err(anyhow!("disk I/O error"))
    }

    async fn clear(&self) -> Result<()> {
        Err(anyhow!("disk I/O error"))
    }
}
