use super::*;
use axum::{body, body::Body, http::Request};
use tower::ServiceExt;

fn test_app() -> Router {
    build_router(
        Arc::new(AppState {
            catalog: Catalog::demo(),
        }),
        16 * 1024,
    )
}

async fn post_json(app: Router, path: &str, payload: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let request = Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, value)
}

#[tokio::test]
async fn healthz_reports_ok() {
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = test_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn login_accepts_known_account() {
    let (status, body) = post_json(
        test_app(),
        LOGIN_PATH,
        serde_json::json!({ "email": "demo@example.com", "password": "demo" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["userId"], "demo@example.com");
}

#[tokio::test]
async fn login_rejects_wrong_password_with_success_false() {
    let (status, body) = post_json(
        test_app(),
        LOGIN_PATH,
        serde_json::json!({ "email": "demo@example.com", "password": "nope" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn login_with_empty_fields_is_a_validation_error() {
    let (status, body) = post_json(
        test_app(),
        LOGIN_PATH,
        serde_json::json!({ "email": "", "password": "demo" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
}

#[tokio::test]
async fn progress_route_reports_lesson_counts() {
    let (status, body) = post_json(
        test_app(),
        COURSE_PROGRESS_PATH,
        serde_json::json!({ "userId": "demo@example.com", "courseId": "course1" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        serde_json::json!({ "success": true, "completedLessons": 2, "totalLessons": 3 })
    );
}

#[tokio::test]
async fn progress_route_for_unknown_course_reports_failure() {
    let (status, body) = post_json(
        test_app(),
        COURSE_PROGRESS_PATH,
        serde_json::json!({ "userId": "demo@example.com", "courseId": "nope" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "success": false }));
}

#[tokio::test]
async fn oversized_body_is_refused() {
    let app = build_router(
        Arc::new(AppState {
            catalog: Catalog::demo(),
        }),
        32,
    );
    let (status, _) = post_json(
        app,
        LOGIN_PATH,
        serde_json::json!({ "email": "demo@example.com", "password": "x".repeat(64) }),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}
