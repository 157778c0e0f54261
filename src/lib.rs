pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod sweeper;

pub use app::build_router;
pub use error::{ConfigError, GatewayError, Result};
pub use rate_limit::{AdmissionController, Decision, DenyReason, Limits, RateLimitHeaders, Window};
pub use state::AppState;
