mod admission;
mod chat;
mod health;
mod metrics;

pub use admission::{EXEMPT_PATHS, admission_middleware, apply_rate_limit_headers, client_key};
pub use chat::chat_handler;
pub use health::{health_handler, root_handler};
pub use metrics::metrics_handler;
