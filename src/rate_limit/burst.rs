use super::limits::Limits;

// requests in the current short slice, and when that slice opened
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstState {
    pub count: u32,
    pub window_start: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BurstOutcome {
    Allow(BurstState),
    // slice is full, previous state stays as-is
    Deny,
}

impl BurstState {
    fn fresh(now: f64) -> Self {
        Self { count: 1, window_start: now }
    }

    // Capped at burst_size within one slice. Leaving the slice or going idle
    // past the idle reset opens a new one.
    pub fn advance(prev: Option<BurstState>, now: f64, limits: &Limits) -> BurstOutcome {
        let Some(prev) = prev else {
            return BurstOutcome::Allow(Self::fresh(now));
        };

        let elapsed = now - prev.window_start;
        if elapsed > limits.burst_idle_reset().as_secs_f64() {
            return BurstOutcome::Allow(Self::fresh(now));
        }

        if elapsed <= limits.burst_window().as_secs_f64() {
            if prev.count >= limits.burst_size() {
                return BurstOutcome::Deny;
            }
            return BurstOutcome::Allow(BurstState { count: prev.count + 1, ..prev });
        }

        BurstOutcome::Allow(Self::fresh(now))
    }
}
