use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::post;
use axum::{Json, Router};
use solace_gateway::models::RateLimitBody;
use solace_gateway::rate_limit::{AdmissionController, Limits, ManualClock, next_minute_boundary};
use solace_gateway::{AppState, build_router};

type TestResult = Result<(), Box<dyn std::error::Error>>;

const T0: f64 = 1_700_000_000.0;

async fn serve(app: Router) -> Result<SocketAddr, std::io::Error> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await;
    });
    Ok(addr)
}

async fn stub_backend() -> Result<SocketAddr, std::io::Error> {
    let app = Router::new().route(
        "/chat",
        post(|Json(body): Json<serde_json::Value>| async move {
            Json(serde_json::json!({ "response": "peace be with you", "echo": body["message"] }))
        }),
    );
    serve(app).await
}

struct Gateway {
    addr: SocketAddr,
    clock: Arc<ManualClock>,
    http: reqwest::Client,
}

impl Gateway {
    async fn start(limits: Limits) -> Result<Self, Box<dyn std::error::Error>> {
        let backend = stub_backend().await?;
        let clock = Arc::new(ManualClock::new(T0));
        let admission = Arc::new(AdmissionController::with_clock(limits, clock.clone()));
        let state = Arc::new(AppState::new(
            admission,
            format!("http://{backend}"),
            Duration::from_secs(5),
        )?);
        let addr = serve(build_router(state)).await?;
        Ok(Self { addr, clock, http: reqwest::Client::new() })
    }

    async fn chat(&self, client: &str, message: &str) -> reqwest::Result<reqwest::Response> {
        self.http
            .post(format!("http://{}/chat", self.addr))
            .header("x-forwarded-for", client)
            .json(&serde_json::json!({ "user_id": "u1", "message": message }))
            .send()
            .await
    }
}

fn header<'a>(response: &'a reqwest::Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn admitted_chat_is_relayed_with_headers() -> TestResult {
    let gateway = Gateway::start(Limits::new(10, 100, 500, 5)?).await?;

    let response = gateway.chat("203.0.113.1", "I feel anxious").await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(header(&response, "x-ratelimit-limit"), Some("10"));
    assert_eq!(header(&response, "x-ratelimit-remaining"), Some("9"));
    let reset = next_minute_boundary(T0).to_string();
    assert_eq!(header(&response, "x-ratelimit-reset"), Some(reset.as_str()));

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["response"], "peace be with you");
    assert_eq!(body["echo"], "I feel anxious");
    Ok(())
}

#[tokio::test]
async fn minute_ceiling_returns_429_without_reaching_backend() -> TestResult {
    let gateway = Gateway::start(Limits::new(2, 100, 500, 5)?).await?;

    for _ in 0..2 {
        let response = gateway.chat("203.0.113.2", "hello").await?;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        gateway.clock.advance(2.0);
    }

    let denied = gateway.chat("203.0.113.2", "hello").await?;
    assert_eq!(denied.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&denied, "x-ratelimit-remaining"), Some("0"));
    let body: RateLimitBody = denied.json().await?;
    assert_eq!(body.error, "rate_limit_exceeded");
    assert_eq!(body.retry_after, next_minute_boundary(T0 + 4.0));
    assert!(!body.detail.is_empty());

    // a different forwarded address is a different client
    let other = gateway.chat("198.51.100.7", "hello").await?;
    assert_eq!(other.status(), reqwest::StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn burst_denial_leaves_minute_allowance() -> TestResult {
    let gateway = Gateway::start(Limits::new(10, 100, 500, 5)?).await?;

    for _ in 0..5 {
        let response = gateway.chat("203.0.113.3", "quick").await?;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        gateway.clock.advance(0.04);
    }

    let denied = gateway.chat("203.0.113.3", "quick").await?;
    assert_eq!(denied.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&denied, "x-ratelimit-remaining"), Some("5"));
    let body: RateLimitBody = denied.json().await?;
    assert_eq!(body.detail, "Too many requests in a short time. Please slow down your requests.");
    Ok(())
}

#[tokio::test]
async fn exempt_paths_bypass_admission() -> TestResult {
    let gateway = Gateway::start(Limits::new(1, 100, 500, 1)?).await?;

    for _ in 0..5 {
        let response = gateway
            .http
            .get(format!("http://{}/health", gateway.addr))
            .header("x-forwarded-for", "203.0.113.4")
            .send()
            .await?;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert!(response.headers().get("x-ratelimit-limit").is_none());
        let body: serde_json::Value = response.json().await?;
        assert_eq!(body["status"], "healthy");
    }

    // health checks did not consume the single allowed request
    let response = gateway.chat("203.0.113.4", "hello").await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn empty_message_is_rejected_but_counted() -> TestResult {
    let gateway = Gateway::start(Limits::new(10, 100, 500, 5)?).await?;

    let response = gateway.chat("203.0.113.5", "   ").await?;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(header(&response, "x-ratelimit-remaining"), Some("9"));
    Ok(())
}

#[tokio::test]
async fn malformed_chat_body_gets_json_detail() -> TestResult {
    let gateway = Gateway::start(Limits::new(10, 100, 500, 5)?).await?;

    let missing_field = gateway
        .http
        .post(format!("http://{}/chat", gateway.addr))
        .header("x-forwarded-for", "203.0.113.6")
        .json(&serde_json::json!({ "user_id": "u1" }))
        .send()
        .await?;
    assert_eq!(missing_field.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = missing_field.json().await?;
    assert!(body["detail"].as_str().is_some_and(|d| d.starts_with("Invalid request")));

    gateway.clock.advance(2.0);
    let not_json = gateway
        .http
        .post(format!("http://{}/chat", gateway.addr))
        .header("x-forwarded-for", "203.0.113.6")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(not_json.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(header(&not_json, "x-ratelimit-remaining"), Some("8"));
    let body: serde_json::Value = not_json.json().await?;
    assert!(body["detail"].is_string());
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_is_bad_gateway() -> TestResult {
    let clock = Arc::new(ManualClock::new(T0));
    let admission = Arc::new(AdmissionController::with_clock(
        Limits::new(10, 100, 500, 5)?,
        clock,
    ));
    // bind then drop to get a port nothing listens on
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await?.local_addr()?;
    let state = Arc::new(AppState::new(
        admission,
        format!("http://{dead}"),
        Duration::from_secs(2),
    )?);
    let addr = serve(build_router(state)).await?;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/chat"))
        .json(&serde_json::json!({ "user_id": "u1", "message": "hello" }))
        .send()
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
    assert!(response.headers().get("x-ratelimit-limit").is_some());
    Ok(())
}
