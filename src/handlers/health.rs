use axum::Json;
use axum::response::IntoResponse;

pub const SERVICE_NAME: &str = "solace-gateway";

pub async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": format!("{SERVICE_NAME} is running"),
        "status": "healthy"
    }))
}

// health handler, never rate limited
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
