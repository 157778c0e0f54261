use serde::{Deserialize, Serialize};

// Chat request accepted from clients and forwarded as-is
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ChatRequest {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub message: String,
}

// Body of a 429 response
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RateLimitBody {
    pub detail: String,
    pub error: String,
    pub retry_after: u64,
}
