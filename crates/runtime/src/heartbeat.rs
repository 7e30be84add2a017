/// Timestamp of the most recent frame, in host milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Heartbeat {
    last: f64,
}

impl Heartbeat {
    pub fn new(now: f64) -> Self {
        Self { last: now }
    }

    /// Records a frame at `now`.
    pub fn beat(&mut self, now: f64) {
        self.last = now;
    }

    pub fn last(&self) -> f64 {
        self.last
    }

    /// Milliseconds since the last beat. Negative if the clock went backwards.
    pub fn age(&self, now: f64) -> f64 {
        now - self.last
    }
}
