use crate::engine::BoardView;
use crate::ui::board_pane::task_line;
use crate::ui::styles::{border_style, default_style, hint_style, selected_style, title_style};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the flat filtered and sorted list
pub fn render_list_pane(f: &mut Frame, view: &BoardView, now: DateTime<Utc>, area: Rect) {
    let items: Vec<ListItem> = view
        .list
        .iter()
        .map(|task| {
            let mut line = task_line(task, now, true);
            line.spans.insert(0, Span::styled(format!("{:<12}", task.status.title()), hint_style()));
            let style = if view.selected_task.as_deref() == Some(task.id.as_str()) {
                selected_style()
            } else {
                default_style()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let title = format!(
        " Tasks ({}) · sort: {} {} ",
        view.list.len(),
        view.sort.field.name(),
        match view.sort.direction {
            crate::domain::SortDirection::Ascending => "↑",
            crate::domain::SortDirection::Descending => "↓",
        }
    );

    let list = if items.is_empty() {
        List::new(vec![ListItem::new(Line::raw("No tasks match"))])
    } else {
        List::new(items)
    };
    let list = list.block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );

    f.render_widget(list, area);
}
