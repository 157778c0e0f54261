use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_BURST_WINDOW: Duration = Duration::from_secs(1);
const DEFAULT_BURST_IDLE_RESET: Duration = Duration::from_secs(10);
const DEFAULT_LOAD_THRESHOLD: f64 = 0.8;

// Trailing windows, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    Minute,
    Hour,
    Day,
}

impl Window {
    pub const ALL: [Window; 3] = [Window::Minute, Window::Hour, Window::Day];

    pub fn span_secs(self) -> f64 {
        match self {
            Window::Minute => 60.0,
            Window::Hour => 3_600.0,
            Window::Day => 86_400.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Window::Minute => "minute",
            Window::Hour => "hour",
            Window::Day => "day",
        }
    }
}

// Ceilings are exclusive: with a limit of N, the request that would be the
// N+1th inside the window is denied.
#[derive(Debug, Clone, PartialEq)]
pub struct Limits {
    requests_per_minute: u32,
    requests_per_hour: u32,
    requests_per_day: u32,
    burst_size: u32,
    burst_window: Duration,
    burst_idle_reset: Duration,
    load_threshold: f64,
}

impl Limits {
    pub fn new(
        requests_per_minute: u32,
        requests_per_hour: u32,
        requests_per_day: u32,
        burst_size: u32,
    ) -> Result<Self, ConfigError> {
        for (name, value) in [
            ("requests_per_minute", requests_per_minute),
            ("requests_per_hour", requests_per_hour),
            ("requests_per_day", requests_per_day),
            ("burst_size", burst_size),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroLimit { name });
            }
        }

        Ok(Self {
            requests_per_minute,
            requests_per_hour,
            requests_per_day,
            burst_size,
            burst_window: DEFAULT_BURST_WINDOW,
            burst_idle_reset: DEFAULT_BURST_IDLE_RESET,
            load_threshold: DEFAULT_LOAD_THRESHOLD,
        })
    }

    pub fn with_burst_timing(
        mut self,
        window: Duration,
        idle_reset: Duration,
    ) -> Result<Self, ConfigError> {
        if window.is_zero() {
            return Err(ConfigError::ZeroBurstWindow);
        }
        if idle_reset < window {
            return Err(ConfigError::IdleResetTooShort { window, idle_reset });
        }
        self.burst_window = window;
        self.burst_idle_reset = idle_reset;
        Ok(self)
    }

    pub fn with_load_threshold(mut self, threshold: f64) -> Result<Self, ConfigError> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(ConfigError::InvalidLoadThreshold(threshold));
        }
        self.load_threshold = threshold;
        Ok(self)
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }

    pub fn requests_per_hour(&self) -> u32 {
        self.requests_per_hour
    }

    pub fn requests_per_day(&self) -> u32 {
        self.requests_per_day
    }

    pub fn burst_size(&self) -> u32 {
        self.burst_size
    }

    pub fn burst_window(&self) -> Duration {
        self.burst_window
    }

    pub fn burst_idle_reset(&self) -> Duration {
        self.burst_idle_reset
    }

    pub fn load_threshold(&self) -> f64 {
        self.load_threshold
    }

    pub fn ceiling(&self, window: Window) -> u32 {
        match window {
            Window::Minute => self.requests_per_minute,
            Window::Hour => self.requests_per_hour,
            Window::Day => self.requests_per_day,
        }
    }

    pub fn history_capacity(&self) -> usize {
        self.requests_per_day.max(self.requests_per_hour) as usize
    }
}
