use crate::engine::{MessageKind, UserMessage};
use crate::ui::{
    layout::create_modal_area,
    styles::{error_style, modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render a user-visible error or warning
pub fn render_message_modal(f: &mut Frame, message: &UserMessage, area: Rect) {
    let modal_area = create_modal_area(area, 9);

    // Clear the area behind the modal
    f.render_widget(Clear, modal_area);

    let (title, title_style) = match message.kind {
        MessageKind::Error => (" Error ", error_style()),
        MessageKind::Warning => (" Warning ", modal_title_style()),
        MessageKind::Info => (" Info ", modal_title_style()),
    };

    let lines = vec![
        Line::raw(""),
        Line::raw(format!("  {}", message.text)),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  [Esc]", modal_title_style()),
            Span::raw(" Close"),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title, title_style))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}
