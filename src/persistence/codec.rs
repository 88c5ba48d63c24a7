//! Board State Codec
//!
//! Versioned snapshot of the whole board (columns + tasks). Instants and
//! durations travel as integer milliseconds; absent optional fields are
//! omitted. `decode` is fail-soft: anything unreadable becomes an empty board.

use crate::clock::from_millis;
use crate::domain::{
    Board, ColumnDef, Priority, Subtask, Tag, TagColor, Task, TaskStatus, TaskTimer,
};
use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub columns: Vec<ColumnEntry>,
    #[serde(default)]
    pub tasks: Vec<TaskEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnEntry {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub is_collapsed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wip_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagEntry {
    pub label: String,
    #[serde(default)]
    pub color: TagColor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<TagEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_hours: Option<f64>,
    #[serde(default)]
    pub subtasks: Vec<SubtaskEntry>,
    #[serde(default)]
    pub linked_note_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_started_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_paused_duration: Option<i64>,
    #[serde(default)]
    pub timer_is_paused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_frozen_elapsed: Option<i64>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub completed: bool,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub order: i64,
}

/// Encode a board into its snapshot value
pub fn encode(board: &Board) -> BoardSnapshot {
    BoardSnapshot {
        version: SNAPSHOT_VERSION,
        columns: board.columns.iter().map(encode_column).collect(),
        tasks: board.tasks.iter().map(encode_task).collect(),
    }
}

/// Encode a board as pretty-printed JSON
pub fn encode_json(board: &Board) -> Result<String> {
    Ok(serde_json::to_string_pretty(&encode(board))?)
}

fn encode_column(column: &ColumnDef) -> ColumnEntry {
    ColumnEntry {
        id: column.id.clone(),
        title: column.title.clone(),
        status: column.status,
        order: column.order,
        is_collapsed: column.is_collapsed,
        wip_limit: column.wip_limit,
    }
}

fn encode_task(task: &Task) -> TaskEntry {
    let timer = task.timer.as_ref();
    TaskEntry {
        id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone(),
        status: task.status,
        priority: task.priority,
        tags: task
            .tags
            .iter()
            .map(|t| TagEntry {
                label: t.label.clone(),
                color: t.color,
            })
            .collect(),
        points: task.points,
        assignee: task.assignee.clone(),
        due_date: task.due_date.map(|d| d.timestamp_millis()),
        start_date: task.start_date.map(|d| d.timestamp_millis()),
        estimated_hours: task.estimated_hours,
        actual_hours: task.actual_hours,
        subtasks: task
            .subtasks
            .iter()
            .map(|st| SubtaskEntry {
                id: st.id.clone(),
                title: st.title.clone(),
                is_completed: st.is_completed,
                order: st.order,
            })
            .collect(),
        linked_note_ids: task.linked_note_ids.clone(),
        timer_started_at: timer.map(|t| t.started_at.timestamp_millis()),
        timer_paused_duration: timer.map(|t| t.paused_duration.num_milliseconds()),
        timer_is_paused: timer.is_some_and(|t| t.is_paused),
        timer_frozen_elapsed: timer.map(|t| t.frozen_elapsed.num_milliseconds()),
        is_active: task.is_active,
        completed: task.completed,
        created_at: task.created_at.timestamp_millis(),
        updated_at: task.updated_at.timestamp_millis(),
        completed_at: task.completed_at.map(|d| d.timestamp_millis()),
        order: task.order,
    }
}

/// Decode a snapshot, failing with `Error::Decode` on invalid content
pub fn try_decode(snapshot: &BoardSnapshot) -> Result<Board> {
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(Error::Decode(format!(
            "unsupported snapshot version {} (newest known is {})",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }
    let columns = snapshot.columns.iter().map(decode_column).collect();
    let tasks = snapshot
        .tasks
        .iter()
        .map(decode_task)
        .collect::<Result<Vec<_>>>()?;
    Ok(Board::new(columns, tasks))
}

/// Decode a snapshot; invalid content yields an empty board
pub fn decode(snapshot: &BoardSnapshot) -> Board {
    try_decode(snapshot).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "board snapshot rejected, starting empty");
        Board::default()
    })
}

/// Parse and decode snapshot JSON, failing on malformed input
pub fn try_decode_str(input: &str) -> Result<Board> {
    let snapshot: BoardSnapshot =
        serde_json::from_str(input).map_err(|e| Error::Decode(e.to_string()))?;
    try_decode(&snapshot)
}

/// Parse and decode snapshot JSON; malformed input yields an empty board
pub fn decode_str(input: &str) -> Board {
    try_decode_str(input).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "board snapshot unreadable, starting empty");
        Board::default()
    })
}

fn decode_column(entry: &ColumnEntry) -> ColumnDef {
    ColumnDef {
        id: entry.id.clone(),
        title: entry.title.clone(),
        status: entry.status,
        order: entry.order,
        is_collapsed: entry.is_collapsed,
        wip_limit: entry.wip_limit,
    }
}

fn instant(millis: i64, field: &str, task_id: &str) -> Result<DateTime<Utc>> {
    from_millis(millis).ok_or_else(|| {
        Error::Decode(format!(
            "task {}: {} out of range ({})",
            task_id, field, millis
        ))
    })
}

fn optional_instant(
    millis: Option<i64>,
    field: &str,
    task_id: &str,
) -> Result<Option<DateTime<Utc>>> {
    millis.map(|m| instant(m, field, task_id)).transpose()
}

/// Non-negative millisecond span; absent reads as zero
fn span(millis: Option<i64>, field: &str, task_id: &str) -> Result<Duration> {
    let millis = millis.unwrap_or(0);
    if millis < 0 {
        return Err(Error::Decode(format!(
            "task {}: {} is negative ({})",
            task_id, field, millis
        )));
    }
    Duration::try_milliseconds(millis).ok_or_else(|| {
        Error::Decode(format!(
            "task {}: {} out of range ({})",
            task_id, field, millis
        ))
    })
}

fn decode_task(entry: &TaskEntry) -> Result<Task> {
    let id = entry.id.as_str();
    let timer = match entry.timer_started_at {
        Some(started) => Some(TaskTimer {
            started_at: instant(started, "timerStartedAt", id)?,
            paused_duration: span(entry.timer_paused_duration, "timerPausedDuration", id)?,
            is_paused: entry.timer_is_paused,
            frozen_elapsed: span(entry.timer_frozen_elapsed, "timerFrozenElapsed", id)?,
        }),
        None => None,
    };

    Ok(Task {
        id: entry.id.clone(),
        title: entry.title.clone(),
        description: entry.description.clone(),
        status: entry.status,
        priority: entry.priority,
        tags: entry
            .tags
            .iter()
            .map(|t| Tag::new(t.label.clone(), t.color))
            .collect(),
        points: entry.points,
        assignee: entry.assignee.clone(),
        due_date: optional_instant(entry.due_date, "dueDate", id)?,
        start_date: optional_instant(entry.start_date, "startDate", id)?,
        estimated_hours: entry.estimated_hours,
        actual_hours: entry.actual_hours,
        subtasks: entry
            .subtasks
            .iter()
            .map(|st| Subtask {
                id: st.id.clone(),
                title: st.title.clone(),
                is_completed: st.is_completed,
                order: st.order,
            })
            .collect(),
        linked_note_ids: entry.linked_note_ids.clone(),
        timer,
        is_active: entry.is_active,
        completed: entry.completed,
        created_at: instant(entry.created_at, "createdAt", id)?,
        updated_at: instant(entry.updated_at, "updatedAt", id)?,
        completed_at: optional_instant(entry.completed_at, "completedAt", id)?,
        order: entry.order,
    })
}
