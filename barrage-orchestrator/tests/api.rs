//! Control API end to end: router driven with `oneshot`, load sent to a
//! local target server.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
    routing::get,
};
use barrage_orchestrator::api::create_router;
use barrage_orchestrator::config::OrchestratorConfig;
use barrage_orchestrator::repository::InMemoryJobStore;
use barrage_orchestrator::state::AppState;
use barrage_runner::HttpRequestExecutor;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

async fn spawn_target() -> SocketAddr {
    let app = Router::new()
        .route("/ok", get(|| async { "fine" }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                "late"
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn app() -> (Router, Arc<InMemoryJobStore>) {
    let mut config = OrchestratorConfig::default();
    config.runner.wave_pause = Duration::ZERO;
    config.limits.max_iterations = 10_000;

    let store = Arc::new(InMemoryJobStore::new());
    let executor = HttpRequestExecutor::new(&config.runner).unwrap();
    let state = AppState::new(store.clone(), Arc::new(executor), &config);
    (create_router(state), store)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn submit(app: &Router, profile: Value) -> String {
    let response = send(app, post_json("/api/jobs", profile)).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["jobId"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Polls until the job is terminal, returning every poll body
async fn poll_until_terminal(app: &Router, id: &str) -> Vec<Value> {
    let mut polls = Vec::new();
    for _ in 0..500 {
        let response = send(app, get_req(&format!("/api/jobs/{}", id))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let poll = body_json(response).await;
        let terminal = poll["status"] != "RUNNING";
        polls.push(poll);
        if terminal {
            return polls;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} never finished", id);
}

#[tokio::test]
async fn test_health_and_service_info() {
    let (app, _) = app();

    let response = send(&app, get_req("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");

    let info = body_json(send(&app, get_req("/")).await).await;
    assert_eq!(info["name"], "barrage-orchestrator");
    assert!(info["version"].is_string());
}

#[tokio::test]
async fn test_twenty_five_requests_in_five_waves() {
    let target = spawn_target().await;
    let (app, _) = app();

    let id = submit(
        &app,
        json!({
            "targetUrl": format!("http://{}/ok", target),
            "method": "GET",
            "iterations": 25,
            "concurrency": 5,
            "timeoutMs": 5000,
            "cacheBusting": true
        }),
    )
    .await;

    let polls = poll_until_terminal(&app, &id).await;
    let last = polls.last().unwrap();

    assert_eq!(last["status"], "COMPLETED");
    assert_eq!(last["progress"], 25);
    assert_eq!(last["total"], 25);
    assert!(last.get("error").is_none());

    let delivered: Vec<&Value> = polls
        .iter()
        .flat_map(|p| p["newResults"].as_array().unwrap())
        .collect();
    assert_eq!(delivered.len(), 25);

    let mut ids: Vec<u64> = delivered.iter().map(|r| r["id"].as_u64().unwrap()).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..25).collect::<Vec<_>>());

    for result in &delivered {
        assert_eq!(result["status"], 200);
        assert_eq!(result["outcome"], "completed");
        assert_eq!(result["success"], true);
    }

    let all = last["allResults"].as_array().unwrap();
    assert_eq!(all.len(), 25);
}

#[tokio::test]
async fn test_repeated_poll_returns_no_new_results() {
    let target = spawn_target().await;
    let (app, _) = app();

    let id = submit(
        &app,
        json!({ "targetUrl": format!("http://{}/ok", target), "iterations": 3 }),
    )
    .await;
    poll_until_terminal(&app, &id).await;

    let again = body_json(send(&app, get_req(&format!("/api/jobs/{}", id))).await).await;
    assert_eq!(again["newResults"].as_array().unwrap().len(), 0);
    assert_eq!(again["progress"], 3);
    assert_eq!(again["allResults"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unknown_job_is_not_found_and_creates_nothing() {
    let (app, store) = app();

    let unknown = uuid::Uuid::new_v4();
    let response = send(&app, get_req(&format!("/api/jobs/{}", unknown))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({ "error": "Job not found" }));

    let response = send(&app, get_req("/api/jobs/not-a-job-id")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({ "error": "Job not found" }));

    let response = send(
        &app,
        Request::post(format!("/api/jobs/{}/cancel", unknown))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert!(store.is_empty());
}

#[tokio::test]
async fn test_invalid_profiles_are_rejected() {
    let (app, store) = app();

    for profile in [
        json!({ "targetUrl": "ftp://example.test/file", "iterations": 1 }),
        json!({ "targetUrl": "not a url", "iterations": 1 }),
        json!({ "targetUrl": "http://example.test", "iterations": 1, "concurrency": 0 }),
        json!({ "targetUrl": "http://example.test", "iterations": 1, "timeoutMs": 0 }),
        json!({ "targetUrl": "http://example.test", "iterations": 10_001 }),
        json!({ "targetUrl": "http://example.test", "iterations": 1, "method": "TRACE" }),
    ] {
        let response = send(&app, post_json("/api/jobs", profile.clone())).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "profile accepted: {}",
            profile
        );
        assert!(body_json(response).await["error"].is_string());
    }

    let response = send(
        &app,
        Request::post("/api/jobs")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(store.is_empty());
}

#[tokio::test]
async fn test_cancel_running_job_then_conflict() {
    let target = spawn_target().await;
    let (app, _) = app();

    let id = submit(
        &app,
        json!({
            "targetUrl": format!("http://{}/slow", target),
            "iterations": 20,
            "concurrency": 2,
            "timeoutMs": 60000
        }),
    )
    .await;

    tokio::time::sleep(Duration::from_millis(100)).await;

    let cancel_uri = format!("/api/jobs/{}/cancel", id);
    let response = send(&app, Request::post(&cancel_uri).body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["jobId"], id.as_str());
    assert_eq!(body["status"], "RUNNING");

    let polls = poll_until_terminal(&app, &id).await;
    let last = polls.last().unwrap();
    assert_eq!(last["status"], "CANCELLED");
    assert!(last["progress"].as_u64().unwrap() < 20);
    assert!(last.get("allResults").is_none());

    let response = send(&app, Request::post(&cancel_uri).body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_jobs_newest_first() {
    let target = spawn_target().await;
    let (app, _) = app();

    let first = submit(
        &app,
        json!({ "targetUrl": format!("http://{}/ok", target), "iterations": 1 }),
    )
    .await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = submit(
        &app,
        json!({ "targetUrl": format!("http://{}/ok", target), "iterations": 2, "method": "HEAD" }),
    )
    .await;

    let listed = body_json(send(&app, get_req("/api/jobs")).await).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], second.as_str());
    assert_eq!(listed[0]["method"], "HEAD");
    assert_eq!(listed[0]["total"], 2);
    assert_eq!(listed[1]["id"], first.as_str());
}
