use crate::domain::Task;
use crate::engine::{BoardView, ColumnSnapshot};
use crate::ui::layout::column_areas;
use crate::ui::styles::{
    border_style, default_style, done_style, paused_style, priority_style, running_style,
    selected_style, tag_style, title_style, warning_style,
};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// One row for a task card
/// Format: ● Write proposal  ⏱ 00:12:30  [ui] ◎
pub fn task_line(task: &Task, now: DateTime<Utc>, show_tags: bool) -> Line<'static> {
    let mut spans = Vec::new();

    spans.push(Span::styled("● ", priority_style(task.priority)));

    if task.completed {
        spans.push(Span::styled(task.title.clone(), done_style()));
    } else {
        spans.push(Span::raw(task.title.clone()));
    }

    if task.is_overdue(now) {
        spans.push(Span::styled(" !", warning_style()));
    }

    if let Some(timer) = &task.timer {
        let style = if timer.is_paused {
            paused_style()
        } else {
            running_style()
        };
        spans.push(Span::styled(format!("  ⏱ {}", timer.formatted_time(now)), style));
    }

    let (done, total) = task.subtask_progress();
    if total > 0 {
        spans.push(Span::raw(format!("  {}/{}", done, total)));
    }

    if show_tags {
        for tag in &task.tags {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                format!("[{}]", tag.label),
                tag_style(tag.color.display_color()),
            ));
        }
    }

    if task.is_active {
        spans.push(Span::styled(" ◎", running_style()));
    }

    Line::from(spans)
}

fn column_title(column: &ColumnSnapshot) -> Span<'static> {
    let count = match column.column.wip_limit {
        Some(limit) => format!("{}/{}", column.total, limit),
        None => column.total.to_string(),
    };
    let style = if column.over_wip_limit {
        warning_style()
    } else {
        title_style()
    };
    Span::styled(format!(" {} {} ", column.column.title, count), style)
}

fn render_column(
    f: &mut Frame,
    column: &ColumnSnapshot,
    selected: Option<&str>,
    is_current: bool,
    now: DateTime<Utc>,
    area: Rect,
) {
    let border = if is_current { title_style() } else { border_style() };

    if column.column.is_collapsed {
        // Vertical strip with the initial and the count
        let initial = column.column.title.chars().next().unwrap_or(' ');
        let items = vec![
            ListItem::new(Line::raw(initial.to_string())),
            ListItem::new(Line::raw(column.total.to_string())),
        ];
        let list = List::new(items).block(Block::default().borders(Borders::ALL).border_style(border));
        f.render_widget(list, area);
        return;
    }

    let items: Vec<ListItem> = column
        .tasks
        .iter()
        .map(|task| {
            let style = if Some(task.id.as_str()) == selected {
                selected_style()
            } else {
                default_style()
            };
            ListItem::new(task_line(task, now, false)).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(column_title(column)),
    );
    f.render_widget(list, area);
}

/// Render the kanban board, one pane per column
pub fn render_board_pane(
    f: &mut Frame,
    view: &BoardView,
    column_index: usize,
    now: DateTime<Utc>,
    area: Rect,
) {
    let areas = column_areas(area, &view.columns, view.view_mode);
    for (idx, (column, column_area)) in view.columns.iter().zip(areas).enumerate() {
        render_column(
            f,
            column,
            view.selected_task.as_deref(),
            idx == column_index,
            now,
            column_area,
        );
    }
}
