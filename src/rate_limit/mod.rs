// Per-client admission control. One mutex guards all bookkeeping so a whole
// check is atomic with respect to concurrent requests.

mod burst;
mod clock;
mod decision;
mod headers;
mod limits;
mod load;

pub use burst::{BurstOutcome, BurstState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use decision::{Decision, DenyReason, window_message};
pub use headers::{
    LIMIT_HEADER, REMAINING_HEADER, RESET_HEADER, RateLimitHeaders, next_minute_boundary,
};
pub use limits::{Limits, Window};
pub use load::{exceeds_threshold, load_ratio};

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

// oldest history entry that can still matter
const RETENTION_SECS: f64 = 86_400.0;

#[derive(Default)]
struct AdmissionState {
    histories: HashMap<String, VecDeque<f64>>,
    bursts: HashMap<String, BurstState>,
    high_load: bool,
}

impl AdmissionState {
    fn recompute_load(&mut self, limits: &Limits) {
        let Some(ratio) = load_ratio(
            self.histories.values().map(VecDeque::len),
            limits.requests_per_minute(),
        ) else {
            return;
        };

        let high_load = exceeds_threshold(ratio, limits.load_threshold());
        if high_load != self.high_load {
            if high_load {
                warn!(ratio, clients = self.histories.len(), "Entering high load");
            } else {
                info!(ratio, clients = self.histories.len(), "Load back to normal");
            }
        }
        self.high_load = high_load;
    }
}

/// Process-wide admission controller. Build once, share behind an `Arc`.
pub struct AdmissionController {
    limits: Limits,
    clock: Arc<dyn Clock>,
    state: Mutex<AdmissionState>,
}

impl AdmissionController {
    pub fn new(limits: Limits) -> Self {
        Self::with_clock(limits, Arc::new(SystemClock))
    }

    pub fn with_clock(limits: Limits, clock: Arc<dyn Clock>) -> Self {
        Self { limits, clock, state: Mutex::new(AdmissionState::default()) }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn check(&self, client_key: &str) -> Decision {
        self.check_at(client_key, self.clock.now())
    }

    /// Decide a request from `client_key` arriving at `now`.
    ///
    /// Windows are evaluated minute, hour, day, then burst; the first one
    /// that fails is reported. Only admitted requests are recorded.
    pub fn check_at(&self, client_key: &str, now: f64) -> Decision {
        let mut guard = self.lock();
        let state = &mut *guard;

        let exceeded = {
            let history = state.histories.entry(client_key.to_owned()).or_default();
            purge_expired(history, now);
            Window::ALL
                .into_iter()
                .find(|&window| {
                    count_since(history, now - window.span_secs())
                        >= self.limits.ceiling(window) as usize
                })
        };

        if let Some(window) = exceeded {
            state.recompute_load(&self.limits);
            debug!(client = client_key, window = window.name(), "Window ceiling reached");
            return Decision::window(window, self.limits.ceiling(window), state.high_load);
        }

        let prev = state.bursts.get(client_key).copied();
        match BurstState::advance(prev, now, &self.limits) {
            BurstOutcome::Deny => {
                state.recompute_load(&self.limits);
                debug!(client = client_key, "Burst ceiling reached");
                return Decision::burst();
            }
            BurstOutcome::Allow(next) => match state.bursts.get_mut(client_key) {
                Some(slot) => *slot = next,
                None => {
                    state.bursts.insert(client_key.to_owned(), next);
                }
            },
        }

        if let Some(history) = state.histories.get_mut(client_key) {
            // keep entries non-decreasing even if the wall clock steps back
            let stamp = history.back().map_or(now, |&last| last.max(now));
            if history.len() >= self.limits.history_capacity() {
                history.pop_front();
            }
            history.push_back(stamp);
        }
        state.recompute_load(&self.limits);

        Decision::Admitted
    }

    pub fn headers_for(&self, client_key: &str) -> RateLimitHeaders {
        self.headers_at(client_key, self.clock.now())
    }

    /// Advisory per-minute figures for `client_key` at `now`. Read-only.
    pub fn headers_at(&self, client_key: &str, now: f64) -> RateLimitHeaders {
        let limit = self.limits.requests_per_minute();
        let recent = self
            .lock()
            .histories
            .get(client_key)
            .map_or(0, |history| count_since(history, now - Window::Minute.span_secs()));

        RateLimitHeaders {
            limit,
            remaining: limit.saturating_sub(u32::try_from(recent).unwrap_or(u32::MAX)),
            reset: next_minute_boundary(now),
        }
    }

    pub fn is_high_load(&self) -> bool {
        self.lock().high_load
    }

    pub fn tracked_clients(&self) -> usize {
        self.lock().histories.len()
    }

    pub fn history_len(&self, client_key: &str) -> usize {
        self.lock().histories.get(client_key).map_or(0, VecDeque::len)
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(self.clock.now())
    }

    /// Purge expired history for every client and forget clients that have
    /// nothing left to remember. Returns how many clients were dropped.
    ///
    /// A forgotten client is indistinguishable from a new one, so sweeping
    /// never changes what a later check decides.
    pub fn sweep_at(&self, now: f64) -> usize {
        let mut guard = self.lock();
        let AdmissionState { histories, bursts, .. } = &mut *guard;
        let idle_reset = self.limits.burst_idle_reset().as_secs_f64();

        let before = histories.len();
        histories.retain(|key, history| {
            purge_expired(history, now);
            let burst_live = bursts
                .get(key)
                .is_some_and(|burst| now - burst.window_start <= idle_reset);
            !history.is_empty() || burst_live
        });
        bursts.retain(|key, _| histories.contains_key(key));

        let dropped = before - histories.len();
        if dropped > 0 {
            debug!(dropped, remaining = histories.len(), "Swept idle clients");
        }
        dropped
    }

    fn lock(&self) -> MutexGuard<'_, AdmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn purge_expired(history: &mut VecDeque<f64>, now: f64) {
    let cutoff = now - RETENTION_SECS;
    while history.front().is_some_and(|&t| t < cutoff) {
        history.pop_front();
    }
}

// entries strictly newer than cutoff, history must be sorted
fn count_since(history: &VecDeque<f64>, cutoff: f64) -> usize {
    history.len() - history.partition_point(|&t| t <= cutoff)
}
