use crate::domain::{format_ms, FocusPhase};
use crate::engine::FocusView;
use crate::ui::layout::create_modal_area;
use crate::ui::styles::{gauge_style, modal_bg_style, modal_title_style, paused_style, running_style};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};

fn status_text(focus: &FocusView) -> &'static str {
    if focus.phase == FocusPhase::Completed {
        "Session complete. Esc to leave focus mode."
    } else if focus.transition_pending {
        "Phase finished. Enter to start the next one."
    } else if focus.is_paused {
        "Paused"
    } else {
        "Running"
    }
}

/// Render the focus session overlay
pub fn render_focus_pane(f: &mut Frame, focus: &FocusView, area: Rect) {
    let modal_area = create_modal_area(area, 11);
    f.render_widget(Clear, modal_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" ◎ {} ", focus.phase.name()),
            modal_title_style(),
        ))
        .style(modal_bg_style());
    let inner = block.inner(modal_area);
    f.render_widget(block, modal_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Task title
            Constraint::Length(2), // Countdown
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Status
        ])
        .split(inner);

    f.render_widget(Paragraph::new(Line::raw(format!(" {}", focus.task_title))), chunks[0]);

    let countdown_style = if focus.is_paused || focus.transition_pending {
        paused_style()
    } else {
        running_style()
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(format!(" {}", format_ms(focus.remaining)), countdown_style),
            Span::raw(format!("   sessions: {}", focus.sessions_completed)),
        ])),
        chunks[1],
    );

    let gauge = Gauge::default()
        .gauge_style(gauge_style())
        .ratio(focus.progress.clamp(0.0, 1.0))
        .label(format!("{:.0}%", focus.progress.clamp(0.0, 1.0) * 100.0));
    f.render_widget(gauge, chunks[2]);

    f.render_widget(Paragraph::new(Line::raw(format!(" {}", status_text(focus)))), chunks[4]);
}
