use std::time::Duration;

use clap::Parser;

use crate::error::ConfigError;
use crate::rate_limit::Limits;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "solace-gateway")]
#[command(about = "Admission-controlled gateway for a conversational reply service")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    // Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    // Reply generation service the chat route forwards to
    // Example: "localhost:9000" or "http://replies.internal:9000"
    #[arg(long, env = "CHAT_BACKEND_URL", default_value = "localhost:9000")]
    pub chat_backend: String,

    // Upstream request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub upstream_timeout: u64,

    #[arg(long, env = "RATE_LIMIT_PER_MINUTE", default_value_t = 10)]
    pub rate_limit_per_minute: u32,

    #[arg(long, env = "RATE_LIMIT_PER_HOUR", default_value_t = 100)]
    pub rate_limit_per_hour: u32,

    #[arg(long, env = "RATE_LIMIT_PER_DAY", default_value_t = 500)]
    pub rate_limit_per_day: u32,

    #[arg(long, env = "RATE_LIMIT_BURST_SIZE", default_value_t = 5)]
    pub rate_limit_burst_size: u32,

    // Burst slice length in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub burst_window_ms: u64,

    // Idle gap after which burst tracking starts over
    #[arg(long, default_value_t = 10_000)]
    pub burst_idle_reset_ms: u64,

    // Aggregate load ratio at which denial messages go generic
    #[arg(long, default_value_t = 0.8)]
    pub load_threshold: f64,

    // Idle client sweep interval in seconds
    #[arg(long, default_value_t = 300)]
    pub sweep_interval: u64,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn limits(&self) -> Result<Limits, ConfigError> {
        Limits::new(
            self.rate_limit_per_minute,
            self.rate_limit_per_hour,
            self.rate_limit_per_day,
            self.rate_limit_burst_size,
        )?
        .with_burst_timing(
            Duration::from_millis(self.burst_window_ms),
            Duration::from_millis(self.burst_idle_reset_ms),
        )?
        .with_load_threshold(self.load_threshold)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn chat_backend_url(&self) -> String {
        normalize_backend_url(&self.chat_backend)
    }
}

// add http:// if not present, drop trailing slashes
pub fn normalize_backend_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}
