use super::enums::FocusPhase;
use super::task::Task;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Durations and automation flags for focus sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusSettings {
    pub work_duration: Duration,
    pub short_break_duration: Duration,
    pub long_break_duration: Duration,
    pub sessions_until_long_break: u32,
    pub auto_start_break: bool,
    pub auto_start_work: bool,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            work_duration: Duration::minutes(25),
            short_break_duration: Duration::minutes(5),
            long_break_duration: Duration::minutes(15),
            sessions_until_long_break: 4,
            auto_start_break: false,
            auto_start_work: false,
        }
    }
}

impl FocusSettings {
    /// Configured length of a phase (zero for COMPLETED)
    pub fn duration_of(&self, phase: FocusPhase) -> Duration {
        match phase {
            FocusPhase::Work => self.work_duration,
            FocusPhase::ShortBreak => self.short_break_duration,
            FocusPhase::LongBreak => self.long_break_duration,
            FocusPhase::Completed => Duration::zero(),
        }
    }
}

/// Commands the presentation layer can send to a running session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusCommand {
    Pause,
    Resume,
    AddTime,
    SubtractTime,
    StartBreak,
    Acknowledge,
    CompleteTask,
}

/// A phase boundary crossed by `tick` or a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    pub from: FocusPhase,
    pub to: FocusPhase,
    /// True when the new phase waits for acknowledgement before counting down
    pub awaiting_ack: bool,
}

/// Persisted history entry for a focus session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSessionRecord {
    pub task_id: String,
    /// Session start, milliseconds since the Unix epoch
    pub start_time: i64,
    /// Wall-clock length in milliseconds
    pub duration: i64,
    pub completed: bool,
    pub sessions_completed: u32,
}

/// Pomodoro-style cycle attached to one task.
///
/// The countdown is computed: `time_remaining` is the value at
/// `running_since`, and `remaining(now)` subtracts the wall time since then.
/// `running_since` is `None` while paused, waiting for acknowledgement, or
/// completed.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusSession {
    pub task: Task,
    pub phase: FocusPhase,
    pub time_remaining: Duration,
    pub sessions_completed: u32,
    pub is_paused: bool,
    pub transition_pending: bool,
    pub settings: FocusSettings,
    pub started_at: DateTime<Utc>,
    running_since: Option<DateTime<Utc>>,
}

impl FocusSession {
    pub fn new(task: Task, mut settings: FocusSettings, now: DateTime<Utc>) -> Self {
        settings.sessions_until_long_break = settings.sessions_until_long_break.max(1);
        Self {
            task,
            phase: FocusPhase::Work,
            time_remaining: settings.work_duration,
            sessions_completed: 0,
            is_paused: false,
            transition_pending: false,
            settings,
            started_at: now,
            running_since: Some(now),
        }
    }

    /// Remaining time in the current phase at `now`, never negative
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        match self.running_since {
            Some(since) => {
                let spent = std::cmp::max(now - since, Duration::zero());
                std::cmp::max(self.time_remaining - spent, Duration::zero())
            }
            None => std::cmp::max(self.time_remaining, Duration::zero()),
        }
    }

    pub fn is_counting_down(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.phase == FocusPhase::Completed
    }

    /// Whether the next break should be a long one
    pub fn is_long_break_time(&self) -> bool {
        self.sessions_completed > 0
            && self.sessions_completed % self.settings.sessions_until_long_break.max(1) == 0
    }

    pub fn phase_duration(&self) -> Duration {
        self.settings.duration_of(self.phase)
    }

    /// Fraction of the current phase already spent, in [0, 1]
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        let total = self.phase_duration().num_milliseconds();
        if total <= 0 {
            return 1.0;
        }
        let spent = total - self.remaining(now).num_milliseconds();
        (spent as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Fold elapsed wall time into `time_remaining`
    fn sync(&mut self, now: DateTime<Utc>) {
        if self.running_since.is_some() {
            self.time_remaining = self.remaining(now);
            self.running_since = Some(now);
        }
    }

    /// Advance the countdown. Crosses at most one phase boundary.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<PhaseChange> {
        if self.running_since.is_none() {
            return None;
        }
        self.sync(now);
        if self.time_remaining > Duration::zero() {
            return None;
        }
        match self.phase {
            FocusPhase::Work => Some(self.finish_work(now, false)),
            FocusPhase::ShortBreak | FocusPhase::LongBreak => Some(self.enter(
                FocusPhase::Work,
                now,
                !self.settings.auto_start_work,
            )),
            FocusPhase::Completed => None,
        }
    }

    /// Count the work phase and route to the right break
    fn finish_work(&mut self, now: DateTime<Utc>, force_start: bool) -> PhaseChange {
        self.sessions_completed += 1;
        let target = if self.is_long_break_time() {
            FocusPhase::LongBreak
        } else {
            FocusPhase::ShortBreak
        };
        let wait = !force_start && !self.settings.auto_start_break;
        self.enter(target, now, wait)
    }

    fn enter(&mut self, phase: FocusPhase, now: DateTime<Utc>, wait: bool) -> PhaseChange {
        let from = self.phase;
        self.phase = phase;
        self.time_remaining = self.settings.duration_of(phase);
        self.transition_pending = wait;
        self.running_since = if wait || self.is_paused || phase == FocusPhase::Completed {
            None
        } else {
            Some(now)
        };
        tracing::debug!(?from, to = ?phase, awaiting_ack = wait, "focus phase change");
        PhaseChange {
            from,
            to: phase,
            awaiting_ack: wait,
        }
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        if self.is_paused || self.is_completed() {
            return;
        }
        self.sync(now);
        self.is_paused = true;
        self.running_since = None;
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        if !self.is_paused {
            return;
        }
        self.is_paused = false;
        if !self.transition_pending && !self.is_completed() {
            self.running_since = Some(now);
        }
    }

    /// Start the new phase after a pending transition
    pub fn acknowledge(&mut self, now: DateTime<Utc>) {
        if !self.transition_pending {
            return;
        }
        self.transition_pending = false;
        if !self.is_paused && !self.is_completed() {
            self.running_since = Some(now);
        }
    }

    pub fn add_time(&mut self, delta: Duration, now: DateTime<Utc>) {
        if self.is_completed() {
            return;
        }
        self.sync(now);
        self.time_remaining = self.time_remaining + delta;
    }

    pub fn subtract_time(&mut self, delta: Duration, now: DateTime<Utc>) {
        if self.is_completed() {
            return;
        }
        self.sync(now);
        self.time_remaining = std::cmp::max(self.time_remaining - delta, Duration::zero());
    }

    /// End the work phase early and start the appropriate break right away.
    /// Ignored outside WORK.
    pub fn start_break_manually(&mut self, now: DateTime<Utc>) -> Option<PhaseChange> {
        if self.phase != FocusPhase::Work {
            return None;
        }
        self.transition_pending = false;
        Some(self.finish_work(now, true))
    }

    /// Terminal transition from any phase
    pub fn complete_task(&mut self, now: DateTime<Utc>) -> Option<PhaseChange> {
        if self.is_completed() {
            return None;
        }
        Some(self.enter(FocusPhase::Completed, now, false))
    }

    /// Apply a presentation-layer command. `step` is the add/subtract delta.
    pub fn apply(
        &mut self,
        command: FocusCommand,
        step: Duration,
        now: DateTime<Utc>,
    ) -> Option<PhaseChange> {
        match command {
            FocusCommand::Pause => {
                self.pause(now);
                None
            }
            FocusCommand::Resume => {
                self.resume(now);
                None
            }
            FocusCommand::AddTime => {
                self.add_time(step, now);
                None
            }
            FocusCommand::SubtractTime => {
                self.subtract_time(step, now);
                None
            }
            FocusCommand::StartBreak => self.start_break_manually(now),
            FocusCommand::Acknowledge => {
                self.acknowledge(now);
                None
            }
            FocusCommand::CompleteTask => self.complete_task(now),
        }
    }

    /// History entry for this session as of `now`
    pub fn record(&self, now: DateTime<Utc>) -> FocusSessionRecord {
        FocusSessionRecord {
            task_id: self.task.id.clone(),
            start_time: self.started_at.timestamp_millis(),
            duration: std::cmp::max(now - self.started_at, Duration::zero()).num_milliseconds(),
            completed: self.is_completed(),
            sessions_completed: self.sessions_completed,
        }
    }
}
