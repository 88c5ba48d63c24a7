use crate::domain::{Board, FocusSessionRecord, TaskStatus};
use crate::report::stats::{
    calculate_board_stats, calculate_estimation_stats, calculate_focus_stats, calculate_tag_stats,
    focus_time_by_task,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Format duration as "Xh Ym" or "Xm" for display
fn format_duration(duration: Duration) -> String {
    let total_mins = duration.num_minutes();
    if total_mins < 60 {
        format!("{}m", total_mins)
    } else {
        let hours = total_mins / 60;
        let mins = total_mins % 60;
        if mins == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, mins)
        }
    }
}

fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

fn format_hours(hours: f64) -> String {
    format!("{:.1}h", hours)
}

/// Render the markdown report for a board and its focus history
pub fn render_report(board: &Board, history: &[FocusSessionRecord], now: DateTime<Utc>) -> String {
    let tasks = &board.tasks;
    let stats = calculate_board_stats(tasks, now);
    let estimation = calculate_estimation_stats(tasks);
    let focus = calculate_focus_stats(history);
    let focus_by_task = focus_time_by_task(history);
    let tag_stats = calculate_tag_stats(tasks);

    let mut report = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(report, "# Board Report - {}\n", now.format("%Y-%m-%d %H:%M UTC"));

    report.push_str("## Summary\n\n");
    let _ = writeln!(
        report,
        "- **Total Tasks:** {} (Completed: {}, Overdue: {})",
        stats.total_tasks, stats.completed_count, stats.overdue_count
    );
    let _ = writeln!(report, "- **Running Timers:** {}", stats.running_timers);
    let _ = writeln!(
        report,
        "- **Hours:** {} tracked / {} estimated\n",
        format_hours(stats.actual_hours),
        format_hours(stats.estimated_hours)
    );

    report.push_str("## Columns\n\n");
    for column in board.column_views() {
        let count = stats.by_status.get(&column.column.status).copied().unwrap_or(0);
        let limit = column
            .column
            .wip_limit
            .map(|l| format!(" / WIP {}", l))
            .unwrap_or_default();
        let flag = if column.is_over_wip_limit() { " (over limit)" } else { "" };
        let _ = writeln!(report, "- **{}:** {}{}{}", column.column.title, count, limit, flag);
    }
    report.push('\n');

    report.push_str("## Estimation Accuracy\n\n");
    let _ = writeln!(report, "- **Over Estimate:** {}", estimation.over_estimate_count);
    let _ = writeln!(report, "- **Under Estimate:** {}", estimation.under_estimate_count);
    let _ = writeln!(report, "- **Perfect Estimates:** {}", estimation.perfect_count);
    let _ = writeln!(
        report,
        "- **Average Accuracy:** {}\n",
        format_percent(estimation.avg_accuracy_percent)
    );

    report.push_str("## Focus Sessions\n\n");
    let _ = writeln!(
        report,
        "- **Sessions:** {} ({} ended with the task completed)",
        focus.session_count, focus.completed_count
    );
    let _ = writeln!(report, "- **Work Phases:** {}", focus.work_phases);
    let _ = writeln!(report, "- **Total Focus Time:** {}", format_duration(focus.total_time));
    let _ = writeln!(report, "- **Average Session:** {}", format_duration(focus.avg_session));
    let _ = writeln!(report, "- **Longest Session:** {}\n", format_duration(focus.longest_session));

    if !tag_stats.is_empty() {
        report.push_str("## Tag Analysis\n\n");
        let mut tags: Vec<_> = tag_stats.iter().collect();
        tags.sort_by(|a, b| b.1.actual_hours.total_cmp(&a.1.actual_hours));
        for (label, tag) in tags {
            let _ = writeln!(
                report,
                "- **#{}:** {} tasks, {} completed, {}",
                label,
                tag.task_count,
                tag.completed_count,
                format_hours(tag.actual_hours)
            );
        }
        report.push('\n');
    }

    report.push_str("## Tasks Breakdown\n\n");
    for status in TaskStatus::all() {
        let column_tasks = board.tasks_in(*status);
        if column_tasks.is_empty() {
            continue;
        }
        let _ = writeln!(report, "### {}\n", status.title());
        for task in column_tasks {
            let check = if task.completed { "x" } else { " " };
            let _ = writeln!(
                report,
                "- [{}] **{}** ({})",
                check,
                task.title,
                task.priority.to_tag()
            );
            if let Some(timer) = &task.timer {
                let _ = writeln!(report, "  - Timer: {}", timer.formatted_time(now));
            }
            if let Some(spent) = focus_by_task.get(&task.id) {
                let _ = writeln!(report, "  - Focus: {}", format_duration(*spent));
            }
            let (done, total) = task.subtask_progress();
            if total > 0 {
                let _ = writeln!(report, "  - Subtasks: {}/{}", done, total);
            }
        }
        report.push('\n');
    }

    report
}

/// Write the report to `output`, or to `report-<date>.md` in `dir`
pub fn generate_report(
    dir: &Path,
    board: &Board,
    history: &[FocusSessionRecord],
    now: DateTime<Utc>,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let report = render_report(board, history, now);
    let output = output.unwrap_or_else(|| dir.join(format!("report-{}.md", now.format("%Y-%m-%d"))));
    std::fs::write(&output, report)
        .with_context(|| format!("Failed to write report: {}", output.display()))?;
    Ok(output)
}
