//! Whole-router scenarios through `oneshot` (memory repos, real middleware).

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::services::auth::Role;
use crate::test_support::TestApp;

pub async fn send(router: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = router.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn job_body(title: &str, location: &str, salary: i64) -> Value {
    json!({
        "title": title,
        "description": "Build things",
        "company": "Acme",
        "location": location,
        "salary": salary,
        "jobType": "Full-Time",
    })
}

/// Creates a job through the API and returns its id.
pub async fn create_job(app: &TestApp, token: &str, body: Value) -> String {
    let (status, job) = send(
        app.router(),
        request(Method::POST, "/api/v1/jobs", Some(token), Some(body)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{job}");
    job["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, body) = send(app.router(), request(Method::GET, "/api/v1/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn unknown_route_is_a_json_404() {
    let app = TestApp::new();
    for uri in ["/nope", "/api/v1/nope", "/api/v1/jobs/a/b/c"] {
        let (status, body) = send(app.router(), request(Method::GET, uri, None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn dashboard_is_for_employers_only() {
    let app = TestApp::new();
    let employer = app.seed_user("ann@x.com", Role::Employer).await;
    let applicant = app.seed_user("bob@x.com", Role::Applicant).await;

    let (status, body) = send(
        app.router(),
        request(Method::GET, "/api/v1/protected/dashboard", Some(&app.token_for(&employer)), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("Welcome, employer {}", employer.id));

    let (status, body) = send(
        app.router(),
        request(Method::GET, "/api/v1/protected/dashboard", Some(&app.token_for(&applicant)), None),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "ROLE_DENIED");

    let (status, body) = send(
        app.router(),
        request(Method::GET, "/api/v1/protected/dashboard", None, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "MISSING_TOKEN");
}
