use chrono::{DateTime, Duration, Utc};

/// Display clamp for formatted timers (99:59:59)
const MAX_DISPLAY_SECONDS: i64 = 99 * 3600 + 59 * 60 + 59;

/// Per-task focus timer.
///
/// Elapsed time is computed from `started_at`, never ticked. While paused the
/// value computed at pause time is kept in `frozen_elapsed`; resuming
/// re-baselines `started_at` so the running formula continues from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTimer {
    pub started_at: DateTime<Utc>,
    pub paused_duration: Duration,
    pub is_paused: bool,
    pub frozen_elapsed: Duration,
}

impl TaskTimer {
    /// Start a fresh timer at `now`
    pub fn start(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            paused_duration: Duration::zero(),
            is_paused: false,
            frozen_elapsed: Duration::zero(),
        }
    }

    /// Elapsed focus time at `now`, always within `[0, now - started_at]`
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let wall = std::cmp::max(now - self.started_at, Duration::zero());
        let value = if self.is_paused {
            self.frozen_elapsed
        } else {
            // Overflow only happens for a negative paused_duration
            wall.checked_sub(&self.paused_duration).unwrap_or(wall)
        };
        value.clamp(Duration::zero(), wall)
    }

    /// Freeze elapsed time. No-op if already paused.
    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.is_paused {
            return;
        }
        self.frozen_elapsed = self.elapsed(now);
        self.is_paused = true;
    }

    /// Continue from the frozen value. No-op if running.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if !self.is_paused {
            return;
        }
        self.started_at = now - self.elapsed(now);
        self.paused_duration = Duration::zero();
        self.frozen_elapsed = Duration::zero();
        self.is_paused = false;
    }

    /// Elapsed time as zero-padded "HH:MM:SS"
    pub fn formatted_time(&self, now: DateTime<Utc>) -> String {
        format_hms(self.elapsed(now))
    }

    /// Elapsed time in fractional hours
    pub fn elapsed_hours(&self, now: DateTime<Utc>) -> f64 {
        self.elapsed(now).num_milliseconds() as f64 / 3_600_000.0
    }
}

/// Format a duration as "HH:MM:SS". Negative values show as zero and the
/// display caps at 99:59:59.
pub fn format_hms(duration: Duration) -> String {
    let total = duration.num_seconds().clamp(0, MAX_DISPLAY_SECONDS);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Format a duration as "MM:SS" (focus countdowns)
pub fn format_ms(duration: Duration) -> String {
    let total = std::cmp::max(duration.num_seconds(), 0);
    format!("{:02}:{:02}", total / 60, total % 60)
}
