pub const LIMIT_HEADER: &str = "X-RateLimit-Limit";
pub const REMAINING_HEADER: &str = "X-RateLimit-Remaining";
pub const RESET_HEADER: &str = "X-RateLimit-Reset";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitHeaders {
    pub limit: u32,
    pub remaining: u32,
    pub reset: u64, // unix second of the next minute boundary
}

impl RateLimitHeaders {
    pub fn pairs(&self) -> [(&'static str, String); 3] {
        [
            (LIMIT_HEADER, self.limit.to_string()),
            (REMAINING_HEADER, self.remaining.to_string()),
            (RESET_HEADER, self.reset.to_string()),
        ]
    }
}

// next multiple of 60 strictly after now
pub fn next_minute_boundary(now: f64) -> u64 {
    let secs = now.max(0.0) as u64;
    secs + (60 - secs % 60)
}
