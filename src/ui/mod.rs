pub mod board_pane;
pub mod details_pane;
pub mod focus_pane;
pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod list_pane;
pub mod modal;
pub mod styles;

use crate::app::UiState;
use crate::domain::{UiMode, ViewMode};
use crate::engine::BoardView;
use board_pane::render_board_pane;
use chrono::{DateTime, Utc};
use details_pane::render_details_pane;
use focus_pane::render_focus_pane;
use input_form::render_input_form;
use keybindings::render_keybindings;
use layout::create_layout;
use list_pane::render_list_pane;
use modal::render_message_modal;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use styles::{hint_style, modal_title_style};

/// Main render function - draws the entire UI from a board snapshot
pub fn render(f: &mut Frame, view: &BoardView, ui: &UiState, now: DateTime<Utc>) {
    let size = f.size();
    let layout = create_layout(size);

    render_keybindings(f, ui.ui_mode, layout.keybindings_area);

    match view.view_mode {
        ViewMode::Board => render_board_pane(f, view, ui.column_index, now, layout.board_area),
        ViewMode::List => render_list_pane(f, view, now, layout.board_area),
    }
    render_details_pane(f, view, now, layout.details_area);
    render_status_line(f, view, ui, layout.status_area);

    if let Some(focus) = &view.focus {
        if ui.ui_mode == UiMode::Focus {
            render_focus_pane(f, focus, size);
        }
    }

    if let Some(form) = &ui.input_form {
        render_input_form(f, form, size);
    }

    // Messages take precedence over everything else
    if let Some(message) = &view.message {
        render_message_modal(f, message, size);
    }
}

fn render_status_line(f: &mut Frame, view: &BoardView, ui: &UiState, area: Rect) {
    let mut spans = Vec::new();

    if ui.ui_mode == UiMode::EditingQuery {
        spans.push(Span::styled(format!(" /{}█", view.filter.query), modal_title_style()));
    } else if !view.filter.is_empty() {
        spans.push(Span::styled(format!(" filter: {}", view.filter.summary()), modal_title_style()));
    }

    if let Some(status) = &ui.status_line {
        spans.push(Span::styled(format!("  {}", status), hint_style()));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
