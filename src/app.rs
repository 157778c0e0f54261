use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::handlers::{
    admission_middleware, chat_handler, health_handler, metrics_handler, root_handler,
};
use crate::state::AppState;

// creating the router, every route sits behind the admission gate
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/chat", post(chat_handler))
        .layer(middleware::from_fn_with_state(state.clone(), admission_middleware))
        .with_state(state)
}
