use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::{
    domain::IdentityToken,
    error::{ApiError, ErrorCode},
    protocol::{
        CourseProgressRequest, CourseProgressResponse, LoginRequest, LoginResponse,
        COURSE_PROGRESS_PATH, LOGIN_PATH,
    },
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod catalog;
mod config;

use catalog::Catalog;
use config::load_settings;

struct AppState {
    catalog: Catalog,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    let catalog = match &settings.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => {
            info!("no catalog configured, serving built-in demo catalog");
            Catalog::demo()
        }
    };
    for course in catalog.courses() {
        info!(
            course_id = %course.id,
            title = course.title.as_deref().unwrap_or("untitled"),
            lessons = course.modules.len(),
            "course loaded"
        );
    }

    let app = build_router(Arc::new(AppState { catalog }), settings.max_body_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(LOGIN_PATH, post(login))
        .route(COURSE_PROGRESS_PATH, post(course_progress))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ApiError>)> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::new(
                ErrorCode::Validation,
                "email and password are required",
            )),
        ));
    }

    if !state.catalog.authenticate(&req.email, &req.password) {
        warn!(email = %req.email, "login rejected");
        return Ok(Json(LoginResponse::rejected("invalid credentials")));
    }

    info!(email = %req.email, "login accepted");
    Ok(Json(LoginResponse::accepted(IdentityToken::new(req.email))))
}

async fn course_progress(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CourseProgressRequest>,
) -> Json<CourseProgressResponse> {
    match state.catalog.progress(&req.user_id, &req.course_id) {
        Some(progress) => Json(CourseProgressResponse::found(progress)),
        None => {
            info!(
                user = %req.user_id,
                course_id = %req.course_id,
                "no progress for user and course"
            );
            Json(CourseProgressResponse::not_found())
        }
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
