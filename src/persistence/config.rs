use crate::domain::{Board, ColumnDef, FocusSettings, TaskStatus};
use anyhow::Result;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

fn default_work_minutes() -> i64 {
    25
}

fn default_short_break_minutes() -> i64 {
    5
}

fn default_long_break_minutes() -> i64 {
    15
}

fn default_sessions_until_long_break() -> u32 {
    4
}

fn default_time_step_minutes() -> i64 {
    5
}

/// Longest phase or step accepted from config, in minutes
const MAX_MINUTES: i64 = 24 * 60;

fn minutes(value: i64, floor: i64) -> Duration {
    Duration::minutes(value.clamp(floor, MAX_MINUTES))
}

fn default_tick_ms() -> u64 {
    crate::ticker::DEFAULT_TICK_MS
}

fn default_wip_limits() -> BTreeMap<TaskStatus, u32> {
    BTreeMap::from([(TaskStatus::InProgress, 3), (TaskStatus::InReview, 2)])
}

/// Workspace settings stored in config.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: i64,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: i64,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: i64,
    #[serde(default = "default_sessions_until_long_break")]
    pub sessions_until_long_break: u32,
    #[serde(default)]
    pub auto_start_break: bool,
    #[serde(default)]
    pub auto_start_work: bool,

    /// Step used by the focus add/subtract time commands
    #[serde(default = "default_time_step_minutes")]
    pub time_step_minutes: i64,

    /// UI refresh interval
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Advisory WIP limits applied to new boards
    #[serde(default = "default_wip_limits")]
    pub wip_limits: BTreeMap<TaskStatus, u32>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            sessions_until_long_break: default_sessions_until_long_break(),
            auto_start_break: false,
            auto_start_work: false,
            time_step_minutes: default_time_step_minutes(),
            tick_ms: default_tick_ms(),
            wip_limits: default_wip_limits(),
        }
    }
}

impl WorkspaceConfig {
    pub fn focus_settings(&self) -> FocusSettings {
        FocusSettings {
            work_duration: minutes(self.work_minutes, 0),
            short_break_duration: minutes(self.short_break_minutes, 0),
            long_break_duration: minutes(self.long_break_minutes, 0),
            sessions_until_long_break: self.sessions_until_long_break.max(1),
            auto_start_break: self.auto_start_break,
            auto_start_work: self.auto_start_work,
        }
    }

    pub fn time_step(&self) -> Duration {
        minutes(self.time_step_minutes, 1)
    }

    pub fn tick_duration(&self) -> std::time::Duration {
        crate::ticker::tick_duration(self.tick_ms)
    }

    /// Default columns with the configured WIP limits
    pub fn default_columns(&self) -> Vec<ColumnDef> {
        let mut columns = Board::default_columns();
        for column in &mut columns {
            column.wip_limit = self.wip_limits.get(&column.status).copied();
        }
        columns
    }
}

/// Load config.json; a missing file yields defaults
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<WorkspaceConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Ok(WorkspaceConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: WorkspaceConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Save config.json
pub fn save_config<P: AsRef<Path>>(path: P, config: &WorkspaceConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    crate::persistence::atomic_write(path, &json)?;
    Ok(())
}
