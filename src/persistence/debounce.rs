//! Write-coalescing policy for persistence.
//!
//! A pending flag plus two clocks: the quiet period since the last mutation
//! (reset on every mutation) and the total time the write has been pending
//! (bounded by `max_deferral_secs`, so a steady stream of clicks still saves).

#[derive(Debug, Clone)]
pub struct SaveScheduler {
    debounce_secs: f32,
    max_deferral_secs: f32,
    pending: bool,
    since_last_mutation: f32,
    since_first_mutation: f32,
    writes: u64,
    failures: u64,
}

impl SaveScheduler {
    pub fn new(debounce_secs: f32, max_deferral_secs: f32) -> Self {
        Self {
            debounce_secs: debounce_secs.max(0.0),
            max_deferral_secs: max_deferral_secs.max(debounce_secs),
            pending: false,
            since_last_mutation: 0.0,
            since_first_mutation: 0.0,
            writes: 0,
            failures: 0,
        }
    }

    /// Record a qualifying mutation and restart the quiet period
    pub fn mark_dirty(&mut self) {
        if !self.pending {
            self.pending = true;
            self.since_first_mutation = 0.0;
        }
        self.since_last_mutation = 0.0;
    }

    /// Advance the clocks; returns true when a pending write should go out now
    pub fn advance(&mut self, dt_secs: f32) -> bool {
        if !self.pending {
            return false;
        }
        let dt = if dt_secs.is_finite() { dt_secs.max(0.0) } else { 0.0 };
        self.since_last_mutation += dt;
        self.since_first_mutation += dt;
        self.since_last_mutation >= self.debounce_secs
            || self.since_first_mutation >= self.max_deferral_secs
    }

    pub fn complete(&mut self) {
        self.pending = false;
        self.since_last_mutation = 0.0;
        self.since_first_mutation = 0.0;
        self.writes += 1;
    }

    /// Keep the write pending and wait a full debounce cycle before retrying
    pub fn fail(&mut self) {
        self.failures += 1;
        self.since_last_mutation = 0.0;
        self.since_first_mutation = 0.0;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }
}
