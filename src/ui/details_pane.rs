use crate::domain::Task;
use crate::engine::BoardView;
use crate::ui::styles::{
    border_style, default_style, priority_style, running_style, tag_style, title_style,
    warning_style,
};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn field<'a>(label: &'static str, value: String) -> Line<'a> {
    Line::from(vec![Span::styled(label, title_style()), Span::raw(value)])
}

fn hours(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |h| format!("{:.1}h", h))
}

fn detail_lines(task: &Task, now: DateTime<Utc>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    lines.push(field("Title:    ", task.title.clone()));
    lines.push(Line::raw(""));
    lines.push(field("Status:   ", task.status.title().to_string()));
    lines.push(Line::from(vec![
        Span::styled("Priority: ", title_style()),
        Span::styled(task.priority.to_tag(), priority_style(task.priority)),
    ]));
    lines.push(field(
        "Assignee: ",
        task.assignee.clone().unwrap_or_else(|| "-".to_string()),
    ));
    if let Some(points) = task.points {
        lines.push(field("Points:   ", points.to_string()));
    }

    if let Some(due) = task.due_date {
        let style = if task.is_overdue(now) {
            warning_style()
        } else {
            default_style()
        };
        lines.push(Line::from(vec![
            Span::styled("Due:      ", title_style()),
            Span::styled(due.format("%Y-%m-%d %H:%M").to_string(), style),
        ]));
    }

    lines.push(field(
        "Hours:    ",
        format!("{} / {} est", hours(task.actual_hours), hours(task.estimated_hours)),
    ));

    if let Some(timer) = &task.timer {
        let state = if timer.is_paused { " (paused)" } else { "" };
        lines.push(Line::from(vec![
            Span::styled("Timer:    ", title_style()),
            Span::styled(format!("{}{}", timer.formatted_time(now), state), running_style()),
        ]));
    }

    if !task.tags.is_empty() {
        let mut spans = vec![Span::styled("Tags:     ", title_style())];
        for tag in &task.tags {
            spans.push(Span::styled(
                format!("[{}] ", tag.label),
                tag_style(tag.color.display_color()),
            ));
        }
        lines.push(Line::from(spans));
    }

    if task.completed {
        lines.push(field("Done:     ", "yes".to_string()));
    }

    if !task.subtasks.is_empty() {
        lines.push(Line::raw(""));
        let (done, total) = task.subtask_progress();
        lines.push(Line::from(Span::styled(
            format!("Subtasks {}/{}:", done, total),
            title_style(),
        )));
        let mut subtasks: Vec<_> = task.subtasks.iter().collect();
        subtasks.sort_by_key(|s| s.order);
        for subtask in subtasks {
            let check = if subtask.is_completed { "x" } else { " " };
            lines.push(Line::raw(format!("  [{}] {}", check, subtask.title)));
        }
    }

    lines.push(Line::raw(""));
    if task.description.trim().is_empty() {
        lines.push(Line::from(Span::styled("Description: (empty)", default_style())));
    } else {
        lines.push(Line::from(Span::styled("Description:", title_style())));
        for text in task.description.lines() {
            lines.push(Line::raw(format!("  {}", text)));
        }
    }

    lines
}

/// Render the details pane for the selected task
pub fn render_details_pane(f: &mut Frame, view: &BoardView, now: DateTime<Utc>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" Details ", title_style()));

    let selected = view.selected_task.as_deref().and_then(|id| {
        view.columns
            .iter()
            .flat_map(|c| c.tasks.iter())
            .find(|t| t.id == id)
    });

    let Some(task) = selected else {
        f.render_widget(Paragraph::new("No task selected").block(block), area);
        return;
    };

    let paragraph = Paragraph::new(detail_lines(task, now))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::domain::{Subtask, TaskFields, TaskStatus};

    #[test]
    fn test_detail_lines_include_subtasks() {
        let clock = ManualClock::at_epoch_millis(1_700_000_000_000);
        let mut fields = TaskFields::titled("Ship");
        fields.subtasks = vec![Subtask::new("write", 0), Subtask::new("review", 1)];
        fields.subtasks[0].is_completed = true;
        let task = Task::new(fields, TaskStatus::InReview, 0, clock.now());

        let text: Vec<String> = detail_lines(&task, clock.now())
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(text.iter().any(|l| l == "Subtasks 1/2:"));
        assert!(text.iter().any(|l| l == "  [x] write"));
        assert!(text.iter().any(|l| l == "Hours:    - / - est"));
    }
}
