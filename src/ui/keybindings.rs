use crate::domain::UiMode;
use crate::ui::styles::hint_style;
use ratatui::{layout::Rect, text::{Line, Span}, widgets::Paragraph, Frame};

fn hints(mode: UiMode) -> Vec<&'static str> {
    match mode {
        UiMode::Normal => vec![
            " ←/→ column   ",
            "↑/↓ select   ",
            "Shift+arrows move   ",
            "a add   ",
            "e edit   ",
            "t timer   ",
            "T stop   ",
            "c complete   ",
            "p priority   ",
            "x delete   ",
            "f focus   ",
            "/ search   ",
            "o overdue   ",
            "s/S sort   ",
            "v view   ",
            "z collapse   ",
            "q quit",
        ],
        UiMode::AddingTask | UiMode::EditingTask => {
            vec![" Tab next field   ", "Enter save   ", "Esc cancel"]
        }
        UiMode::EditingQuery => vec![" type to filter   ", "Enter/Esc done"],
        UiMode::Focus => vec![
            " Space pause/resume   ",
            "+/- time   ",
            "b break   ",
            "Enter continue   ",
            "c complete   ",
            "s save & exit   ",
            "Esc exit",
        ],
    }
}

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, mode: UiMode, area: Rect) {
    let line = Line::from(hints(mode).into_iter().map(Span::raw).collect::<Vec<_>>());
    let paragraph = Paragraph::new(line).style(hint_style());
    f.render_widget(paragraph, area);
}
