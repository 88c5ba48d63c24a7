use crate::domain::{DisplayColor, Priority};
use ratatui::style::{Color, Modifier, Style};

/// Terminal color for a domain display color
pub fn color(display: DisplayColor) -> Color {
    match display {
        DisplayColor::Red => Color::Red,
        DisplayColor::Orange => Color::LightRed,
        DisplayColor::Yellow => Color::Yellow,
        DisplayColor::Green => Color::Green,
        DisplayColor::Blue => Color::Blue,
        DisplayColor::Purple => Color::Magenta,
        DisplayColor::Pink => Color::LightMagenta,
        DisplayColor::Gray => Color::Gray,
    }
}

/// Default text style
pub fn default_style() -> Style {
    Style::default().fg(Color::White)
}

/// Selected row highlight style
pub fn selected_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::LightCyan)
        .add_modifier(Modifier::BOLD)
}

/// Priority marker style
pub fn priority_style(priority: Priority) -> Style {
    Style::default().fg(color(priority.color()))
}

/// Running timer style
pub fn running_style() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD)
}

/// Paused timer style
pub fn paused_style() -> Style {
    Style::default().fg(Color::Yellow)
}

/// WIP limit exceeded / overdue style
pub fn warning_style() -> Style {
    Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD)
}

/// Title style for panes
pub fn title_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Border style
pub fn border_style() -> Style {
    Style::default().fg(Color::Gray)
}

/// Modal background style
pub fn modal_bg_style() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

/// Modal title style
pub fn modal_title_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

/// Keybinding hint style
pub fn hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Focus progress gauge style
pub fn gauge_style() -> Style {
    Style::default().fg(Color::Green).bg(Color::DarkGray)
}

/// Error message style
pub fn error_style() -> Style {
    Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD)
}

/// Completed task style
pub fn done_style() -> Style {
    Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::CROSSED_OUT)
}

/// Tag badge style
pub fn tag_style(tag_color: DisplayColor) -> Style {
    Style::default().fg(color(tag_color))
}
