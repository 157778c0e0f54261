use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, info};

use crate::metrics::{ADMISSIONS, DENIALS, HIGH_LOAD, REQUEST_TOTAL, TRACKED_CLIENTS};
use crate::models::RateLimitBody;
use crate::rate_limit::{Decision, RateLimitHeaders};
use crate::state::AppState;

/// Paths that bypass admission control entirely.
pub const EXEMPT_PATHS: &[&str] = &["/", "/health", "/metrics"];

static LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
static REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
static RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Key a request by the first `X-Forwarded-For` hop, falling back to the peer address.
pub fn client_key(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(peer)| peer.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn apply_rate_limit_headers(headers: &mut HeaderMap, values: &RateLimitHeaders) {
    headers.insert(LIMIT.clone(), HeaderValue::from(values.limit));
    headers.insert(REMAINING.clone(), HeaderValue::from(values.remaining));
    headers.insert(RESET.clone(), HeaderValue::from(values.reset));
}

/// Admission gate in front of every non-exempt route.
///
/// Denied requests get a 429 and never reach the handler. Every checked
/// response carries the advisory rate limit headers.
pub async fn admission_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    if EXEMPT_PATHS.contains(&path.as_str()) {
        return next.run(request).await;
    }

    REQUEST_TOTAL.inc();
    let client = client_key(&request);
    let decision = state.admission.check(&client);

    let high_load = state.admission.is_high_load();
    HIGH_LOAD.set(if high_load { 1.0 } else { 0.0 });
    TRACKED_CLIENTS.set(state.admission.tracked_clients() as f64);

    match decision {
        Decision::Denied { reason, message } => {
            DENIALS.with_label_values(&[reason.as_str()]).inc();
            info!(client = %client, path = %path, reason = reason.as_str(), high_load, "Request denied");

            let headers = state.admission.headers_for(&client);
            let body = RateLimitBody {
                detail: message,
                error: "rate_limit_exceeded".to_string(),
                retry_after: headers.reset,
            };
            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            apply_rate_limit_headers(response.headers_mut(), &headers);
            response
        }
        Decision::Admitted => {
            ADMISSIONS.inc();
            debug!(client = %client, path = %path, "Request admitted");

            let mut response = next.run(request).await;
            let headers = state.admission.headers_for(&client);
            apply_rate_limit_headers(response.headers_mut(), &headers);
            response
        }
    }
}
