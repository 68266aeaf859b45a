/// Upper bound on shots released by a single tick (long stalls don't dump a backlog)
pub const MAX_SHOTS_PER_TICK: u32 = 120;

/// Fixed-interval auto-fire clock. A rate of 0 disables it.
#[derive(Debug, Clone, Default)]
pub struct AutoFireTimer {
    accumulated_secs: f64,
    total_shots: u64,
}

impl AutoFireTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt_secs` at `rate` shots per second; returns shots due
    pub fn advance(&mut self, dt_secs: f32, rate: f64) -> u32 {
        if !(rate > 0.0 && rate.is_finite()) || !(dt_secs > 0.0) {
            if rate <= 0.0 {
                self.accumulated_secs = 0.0;
            }
            return 0;
        }
        let interval = 1.0 / rate;
        self.accumulated_secs += dt_secs as f64;
        let due = (self.accumulated_secs / interval).floor();
        if due < 1.0 {
            return 0;
        }
        let shots = (due as u32).min(MAX_SHOTS_PER_TICK);
        if shots < due as u32 {
            tracing::debug!(target: "idle_core::engine", due, shots, "Auto-fire backlog truncated");
            self.accumulated_secs = 0.0;
        } else {
            self.accumulated_secs -= shots as f64 * interval;
        }
        self.total_shots += shots as u64;
        shots
    }

    pub fn reset(&mut self) {
        self.accumulated_secs = 0.0;
    }

    pub fn total_shots(&self) -> u64 {
        self.total_shots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_at_rate_zero() {
        let mut timer = AutoFireTimer::new();
        assert_eq!(timer.advance(10.0, 0.0), 0);
        assert_eq!(timer.total_shots(), 0);
    }

    #[test]
    fn test_fires_on_interval() {
        let mut timer = AutoFireTimer::new();
        assert_eq!(timer.advance(0.5, 1.0), 0);
        assert_eq!(timer.advance(0.5, 1.0), 1);
        assert_eq!(timer.advance(2.25, 2.0), 4);
        assert_eq!(timer.total_shots(), 5);
    }

    #[test]
    fn test_backlog_is_capped() {
        let mut timer = AutoFireTimer::new();
        assert_eq!(timer.advance(1000.0, 1.0), MAX_SHOTS_PER_TICK);
        assert_eq!(timer.advance(0.5, 1.0), 0);
    }
}
