use crate::app::{FormTarget, InputFormState};
use crate::ui::{
    layout::create_modal_area,
    styles::{modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const LABELS: [&str; 4] = ["Title:", "Description:", "Tags (comma-separated):", "Assignee:"];

/// Render the input form for adding or editing a task
pub fn render_input_form(f: &mut Frame, form: &InputFormState, area: Rect) {
    let modal_area = create_modal_area(area, 16);

    // Clear the area behind the form
    f.render_widget(Clear, modal_area);

    let title_text = match &form.target {
        FormTarget::NewTask(status) => format!(" Add Task to {} ", status.title()),
        FormTarget::Edit(_) => " Edit Task ".to_string(),
    };

    let values = [&form.title, &form.description, &form.tags, &form.assignee];
    let mut lines = vec![Line::raw("")];

    for (idx, (label, value)) in LABELS.iter().zip(values).enumerate() {
        let editing = form.editing_field == idx;
        if editing {
            lines.push(Line::raw(format!("{} (editing)", label)));
        } else {
            lines.push(Line::raw(*label));
        }
        lines.push(Line::from(vec![
            Span::raw("> "),
            Span::styled(value.as_str(), modal_title_style()),
            if editing {
                Span::styled("█", modal_title_style()) // Cursor
            } else {
                Span::raw("")
            },
        ]));
        lines.push(Line::raw(""));
    }

    lines.push(Line::raw("Tab to switch fields  ·  Enter to save  ·  Esc to cancel"));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title_text, modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}
