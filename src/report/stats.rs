use crate::domain::{FocusSessionRecord, Task, TaskStatus};
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};

/// Board-wide task statistics
#[derive(Debug, Clone, PartialEq)]
pub struct BoardStats {
    pub total_tasks: usize,
    pub by_status: BTreeMap<TaskStatus, usize>,
    pub completed_count: usize,
    pub overdue_count: usize,
    pub running_timers: usize,
    pub estimated_hours: f64,
    pub actual_hours: f64,
}

/// Estimation accuracy over tasks that have both estimate and actual hours
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationStats {
    pub over_estimate_count: usize,
    pub under_estimate_count: usize,
    pub perfect_count: usize,
    pub avg_accuracy_percent: f64,
}

/// Focus-session statistics from the history file
#[derive(Debug, Clone, PartialEq)]
pub struct FocusStats {
    pub session_count: usize,
    pub completed_count: usize,
    pub work_phases: u32,
    pub total_time: Duration,
    pub avg_session: Duration,
    pub longest_session: Duration,
}

/// Per-tag statistics
#[derive(Debug, Clone, PartialEq)]
pub struct TagStats {
    pub task_count: usize,
    pub completed_count: usize,
    pub actual_hours: f64,
}

pub fn calculate_board_stats(tasks: &[Task], now: DateTime<Utc>) -> BoardStats {
    let mut by_status = BTreeMap::new();
    for status in TaskStatus::all() {
        by_status.insert(*status, 0);
    }
    for task in tasks {
        *by_status.entry(task.status).or_insert(0) += 1;
    }

    BoardStats {
        total_tasks: tasks.len(),
        by_status,
        completed_count: tasks.iter().filter(|t| t.completed).count(),
        overdue_count: tasks.iter().filter(|t| t.is_overdue(now)).count(),
        running_timers: tasks.iter().filter(|t| t.has_active_timer()).count(),
        estimated_hours: tasks.iter().filter_map(|t| t.estimated_hours).sum(),
        actual_hours: tasks.iter().filter_map(|t| t.actual_hours).sum(),
    }
}

pub fn calculate_estimation_stats(tasks: &[Task]) -> EstimationStats {
    let mut over_estimate_count = 0;
    let mut under_estimate_count = 0;
    let mut perfect_count = 0;
    let mut accuracy_sum = 0.0;
    let mut accuracy_count = 0;

    for task in tasks {
        let (Some(estimate), Some(actual)) = (task.estimated_hours, task.actual_hours) else {
            continue;
        };

        if actual > estimate {
            over_estimate_count += 1;
        } else if actual < estimate {
            under_estimate_count += 1;
        } else {
            perfect_count += 1;
        }

        if estimate > 0.0 {
            let ratio = actual / estimate;
            // 100% is a perfect estimate, overruns and underruns both pull it down
            let accuracy = if ratio > 1.0 { 100.0 / ratio } else { ratio * 100.0 };
            accuracy_sum += accuracy;
            accuracy_count += 1;
        }
    }

    let avg_accuracy_percent = if accuracy_count > 0 {
        accuracy_sum / accuracy_count as f64
    } else {
        0.0
    };

    EstimationStats {
        over_estimate_count,
        under_estimate_count,
        perfect_count,
        avg_accuracy_percent,
    }
}

pub fn calculate_focus_stats(records: &[FocusSessionRecord]) -> FocusStats {
    let durations: Vec<Duration> = records
        .iter()
        .map(|r| Duration::milliseconds(r.duration.max(0)))
        .collect();
    let total_time = durations.iter().fold(Duration::zero(), |acc, d| acc + *d);

    let avg_session = if durations.is_empty() {
        Duration::zero()
    } else {
        Duration::milliseconds(total_time.num_milliseconds() / durations.len() as i64)
    };

    FocusStats {
        session_count: records.len(),
        completed_count: records.iter().filter(|r| r.completed).count(),
        work_phases: records.iter().map(|r| r.sessions_completed).sum(),
        total_time,
        avg_session,
        longest_session: durations.into_iter().max().unwrap_or_else(Duration::zero),
    }
}

/// Focus time per task id
pub fn focus_time_by_task(records: &[FocusSessionRecord]) -> HashMap<String, Duration> {
    let mut totals: HashMap<String, Duration> = HashMap::new();
    for record in records {
        let entry = totals.entry(record.task_id.clone()).or_insert_with(Duration::zero);
        *entry = *entry + Duration::milliseconds(record.duration.max(0));
    }
    totals
}

pub fn calculate_tag_stats(tasks: &[Task]) -> BTreeMap<String, TagStats> {
    let mut tag_map: BTreeMap<String, TagStats> = BTreeMap::new();

    for task in tasks {
        for tag in &task.tags {
            let entry = tag_map.entry(tag.label.clone()).or_insert(TagStats {
                task_count: 0,
                completed_count: 0,
                actual_hours: 0.0,
            });
            entry.task_count += 1;
            if task.completed {
                entry.completed_count += 1;
            }
            entry.actual_hours += task.actual_hours.unwrap_or(0.0);
        }
    }

    tag_map
}
