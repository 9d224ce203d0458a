use std::time::{Duration, Instant};

/// Handle for one repeating tick stream. Dropping it cancels the stream.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    pub fn start(now: Instant, period: Duration) -> Self {
        Ticker { period, next: now + period }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    pub fn deadline(&self) -> Instant {
        self.next
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Moves on to the following tick. Keeps a fixed phase unless the
    /// caller has fallen a whole period behind, in which case missed
    /// ticks are dropped rather than replayed.
    pub fn fire(&mut self, now: Instant) {
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
    }
}

/// Boolean gate that closes for a while and reopens on its own.
#[derive(Debug, Default)]
pub struct Gate {
    reopens_at: Option<Instant>,
}

impl Gate {
    pub fn is_open(&self, now: Instant) -> bool {
        self.reopens_at.map_or(true, |t| now >= t)
    }

    pub fn close_for(&mut self, now: Instant, duration: Duration) {
        self.reopens_at = Some(now + duration);
    }
}
