use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{
    CourseProgressRequest, CourseProgressResponse, LoginRequest, LoginResponse,
    COURSE_PROGRESS_PATH, LOGIN_PATH,
};
use tracing::debug;
use url::Url;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Network capability used by the controllers. One call per method, no
/// retries; any error is a transport or decode failure.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;
    async fn course_progress(
        &self,
        request: &CourseProgressRequest,
    ) -> Result<CourseProgressResponse>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid api base url '{base_url}'"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("api base url must be http or https, got '{base_url}'");
        }
        Ok(Self {
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Appends `path` to the base address, keeping any path prefix the base
    /// already carries.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

pub struct HttpBackend {
    http: Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let url = self.config.endpoint(LOGIN_PATH);
        debug!(%url, email = %request.email, "sending login request");
        let body = self
            .http
            .post(url)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("malformed login response")?;
        Ok(body)
    }

    async fn course_progress(
        &self,
        request: &CourseProgressRequest,
    ) -> Result<CourseProgressResponse> {
        let url = self.config.endpoint(COURSE_PROGRESS_PATH);
        debug!(%url, course_id = %request.course_id, "sending course progress request");
        let body = self
            .http
            .post(url)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("malformed course progress response")?;
        Ok(body)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
