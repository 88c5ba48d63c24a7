use super::enums::{Priority, TagColor, TaskStatus};
use super::timer::TaskTimer;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A label attached to a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub label: String,
    pub color: TagColor,
}

impl Tag {
    pub fn new(label: impl Into<String>, color: TagColor) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

/// A checklist entry inside a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub is_completed: bool,
    pub order: i64,
}

impl Subtask {
    pub fn new(title: impl Into<String>, order: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            is_completed: false,
            order,
        }
    }
}

/// User-editable attributes of a task.
///
/// `update_task` replaces all of them at once; there is no partial merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub tags: Vec<Tag>,
    pub points: Option<u32>,
    pub assignee: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub subtasks: Vec<Subtask>,
    pub linked_note_ids: Vec<String>,
}

impl TaskFields {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// The atomic unit of work on the board
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub tags: Vec<Tag>,
    pub points: Option<u32>,
    pub assignee: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub subtasks: Vec<Subtask>,
    pub linked_note_ids: Vec<String>,
    /// Present only while a timer is running or paused
    pub timer: Option<TaskTimer>,
    /// Current focus-mode target
    pub is_active: bool,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Position within the status column (unique per status, not contiguous)
    pub order: i64,
}

impl Task {
    pub fn new(fields: TaskFields, status: TaskStatus, order: i64, now: DateTime<Utc>) -> Self {
        let mut task = Self {
            id: Uuid::new_v4().to_string(),
            title: String::new(),
            description: String::new(),
            status,
            priority: Priority::None,
            tags: Vec::new(),
            points: None,
            assignee: None,
            due_date: None,
            start_date: None,
            estimated_hours: None,
            actual_hours: None,
            subtasks: Vec::new(),
            linked_note_ids: Vec::new(),
            timer: None,
            is_active: false,
            completed: false,
            created_at: now,
            updated_at: now,
            completed_at: None,
            order,
        };
        task.apply_fields(fields);
        task
    }

    /// Editable fields as a value, for edit forms
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority,
            tags: self.tags.clone(),
            points: self.points,
            assignee: self.assignee.clone(),
            due_date: self.due_date,
            start_date: self.start_date,
            estimated_hours: self.estimated_hours,
            actual_hours: self.actual_hours,
            subtasks: self.subtasks.clone(),
            linked_note_ids: self.linked_note_ids.clone(),
        }
    }

    fn apply_fields(&mut self, fields: TaskFields) {
        self.title = fields.title;
        self.description = fields.description;
        self.priority = fields.priority;
        self.tags = fields.tags;
        self.points = fields.points;
        self.assignee = fields.assignee;
        self.due_date = fields.due_date;
        self.start_date = fields.start_date;
        self.estimated_hours = fields.estimated_hours;
        self.actual_hours = fields.actual_hours;
        self.subtasks = fields.subtasks;
        self.linked_note_ids = fields.linked_note_ids;
    }

    pub fn has_active_timer(&self) -> bool {
        self.timer.is_some()
    }

    /// Past due and not completed
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < now)
    }

    /// (completed, total) subtask counts
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|st| st.is_completed).count();
        (done, self.subtasks.len())
    }

    /// Stop the timer, logging its elapsed time into `actual_hours`
    fn clear_timer(&mut self, now: DateTime<Utc>) {
        if let Some(timer) = self.timer.take() {
            let tracked = timer.elapsed_hours(now);
            if tracked > 0.0 {
                self.actual_hours = Some(self.actual_hours.unwrap_or(0.0) + tracked);
            }
        }
    }
}

fn find_mut<'a>(tasks: &'a mut [Task], id: &str) -> Result<&'a mut Task> {
    tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| Error::TaskNotFound(id.to_string()))
}

/// Look up a task by id
pub fn find_task<'a>(tasks: &'a [Task], id: &str) -> Result<&'a Task> {
    tasks
        .iter()
        .find(|t| t.id == id)
        .ok_or_else(|| Error::TaskNotFound(id.to_string()))
}

/// Order index for a task appended to the end of `status`
pub fn next_order(tasks: &[Task], status: TaskStatus) -> i64 {
    tasks
        .iter()
        .filter(|t| t.status == status)
        .map(|t| t.order)
        .max()
        .map_or(0, |max| max + 1)
}

/// Create a task at the end of the `status` column
pub fn create_task(
    tasks: &mut Vec<Task>,
    fields: TaskFields,
    status: TaskStatus,
    now: DateTime<Utc>,
) -> Task {
    let order = next_order(tasks, status);
    let task = Task::new(fields, status, order, now);
    tasks.push(task.clone());
    task
}

/// Replace every editable field of a task
pub fn update_task(
    tasks: &mut [Task],
    id: &str,
    fields: TaskFields,
    now: DateTime<Utc>,
) -> Result<Task> {
    let task = find_mut(tasks, id)?;
    task.apply_fields(fields);
    task.updated_at = now;
    Ok(task.clone())
}

/// Flip the completion flag. Completing stops any timer.
pub fn toggle_completion(tasks: &mut [Task], id: &str, now: DateTime<Utc>) -> Result<Task> {
    let task = find_mut(tasks, id)?;
    task.completed = !task.completed;
    if task.completed {
        task.completed_at = Some(now);
        task.clear_timer(now);
    } else {
        task.completed_at = None;
    }
    task.updated_at = now;
    Ok(task.clone())
}

/// Remove a task, returning it
pub fn delete_task(tasks: &mut Vec<Task>, id: &str) -> Result<Task> {
    let index = tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
    Ok(tasks.remove(index))
}

/// Move a task to `target_index` of the `target_status` column.
///
/// Both the source and destination columns are reindexed from 0 so order
/// stays unique and increasing. Returns every task whose status or order
/// changed (the moved task always included), to be persisted as one batch.
pub fn move_task(
    tasks: &mut [Task],
    id: &str,
    target_status: TaskStatus,
    target_index: usize,
    now: DateTime<Utc>,
) -> Result<Vec<Task>> {
    let source_status = find_task(tasks, id)?.status;

    let column_ids = |status: TaskStatus| -> Vec<String> {
        let mut column: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.status == status && t.id != id)
            .collect();
        column.sort_by_key(|t| t.order);
        column.into_iter().map(|t| t.id.clone()).collect()
    };

    let mut destination = column_ids(target_status);
    let index = target_index.min(destination.len());
    destination.insert(index, id.to_string());

    let source = if source_status != target_status {
        column_ids(source_status)
    } else {
        Vec::new()
    };

    let mut changed = Vec::new();
    let mut reindex = |ids: &[String], status: TaskStatus| {
        for (order, task_id) in ids.iter().enumerate() {
            if let Some(task) = tasks.iter_mut().find(|t| &t.id == task_id) {
                let order = order as i64;
                if task.id == id || task.order != order || task.status != status {
                    task.status = status;
                    task.order = order;
                    task.updated_at = now;
                    changed.push(task.clone());
                }
            }
        }
    };
    reindex(&destination, target_status);
    reindex(&source, source_status);

    Ok(changed)
}

/// Start (or restart) the task's timer
pub fn start_timer(tasks: &mut [Task], id: &str, now: DateTime<Utc>) -> Result<Task> {
    let task = find_mut(tasks, id)?;
    task.timer = Some(TaskTimer::start(now));
    task.updated_at = now;
    Ok(task.clone())
}

/// Pause the running timer; a task without a timer is returned unchanged
pub fn pause_timer(tasks: &mut [Task], id: &str, now: DateTime<Utc>) -> Result<Task> {
    let task = find_mut(tasks, id)?;
    if let Some(timer) = task.timer.as_mut() {
        timer.pause(now);
        task.updated_at = now;
    }
    Ok(task.clone())
}

/// Resume a paused timer; a task without a timer is returned unchanged
pub fn resume_timer(tasks: &mut [Task], id: &str, now: DateTime<Utc>) -> Result<Task> {
    let task = find_mut(tasks, id)?;
    if let Some(timer) = task.timer.as_mut() {
        timer.resume(now);
        task.updated_at = now;
    }
    Ok(task.clone())
}

/// Clear the timer, adding its elapsed time to `actual_hours`
pub fn stop_timer(tasks: &mut [Task], id: &str, now: DateTime<Utc>) -> Result<Task> {
    let task = find_mut(tasks, id)?;
    if task.timer.is_some() {
        task.clear_timer(now);
        task.updated_at = now;
    }
    Ok(task.clone())
}

/// Mark `id` as the focus target, clearing the flag everywhere else.
/// Returns the tasks whose flag changed.
pub fn set_active(
    tasks: &mut [Task],
    id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Vec<Task>> {
    if let Some(id) = id {
        find_task(tasks, id)?;
    }
    let mut changed = Vec::new();
    for task in tasks.iter_mut() {
        let active = Some(task.id.as_str()) == id;
        if task.is_active != active {
            task.is_active = active;
            task.updated_at = now;
            changed.push(task.clone());
        }
    }
    Ok(changed)
}
