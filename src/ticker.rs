use std::time::{Duration, Instant};

/// Default tick interval in milliseconds
pub const DEFAULT_TICK_MS: u64 = 250;

/// Shortest interval accepted from config
pub const MIN_TICK_MS: u64 = 16;

/// Tick duration for a configured interval
pub fn tick_duration(tick_ms: u64) -> Duration {
    Duration::from_millis(tick_ms.max(MIN_TICK_MS))
}

/// Paces `Event::Tick` independently of how often input wakes the loop
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    last: Instant,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Instant::now(),
        }
    }

    /// How long input polling may block before the next tick is due
    pub fn timeout(&self) -> Duration {
        self.interval.saturating_sub(self.last.elapsed())
    }

    /// True once per interval; restarts the interval when it fires
    pub fn fire(&mut self) -> bool {
        if self.last.elapsed() >= self.interval {
            self.last = Instant::now();
            true
        } else {
            false
        }
    }
}
