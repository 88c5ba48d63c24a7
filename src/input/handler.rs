use crate::app::AppState;
use crate::clock::Clock;
use crate::domain::{FocusCommand, UiMode};
use crate::persistence::{SessionHistory, TaskStore};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the app should quit.
pub fn handle_key<S, H, C>(app: &mut AppState<S, H, C>, key: KeyEvent) -> bool
where
    S: TaskStore,
    H: SessionHistory,
    C: Clock,
{
    // An open message swallows input until closed
    if app.engine().state().message.is_some() {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
            app.close_message();
        }
        return false;
    }

    match app.ui.ui_mode {
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::AddingTask | UiMode::EditingTask => {
            handle_input_form_mode(app, key);
            false
        }
        UiMode::EditingQuery => {
            handle_query_mode(app, key);
            false
        }
        UiMode::Focus => {
            handle_focus_mode(app, key);
            false
        }
    }
}

/// Handle keys in normal mode
fn handle_normal_mode<S, H, C>(app: &mut AppState<S, H, C>, key: KeyEvent) -> bool
where
    S: TaskStore,
    H: SessionHistory,
    C: Clock,
{
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        // Navigation (with Shift modifier for moving the task)
        KeyCode::Up | KeyCode::Char('k') => {
            if shift {
                app.move_task_vertical(-1);
            } else {
                app.move_selection(-1);
            }
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if shift {
                app.move_task_vertical(1);
            } else {
                app.move_selection(1);
            }
        }
        KeyCode::Left | KeyCode::Char('h') => {
            if shift {
                app.move_task_horizontal(-1);
            } else {
                app.move_column(-1);
            }
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if shift {
                app.move_task_horizontal(1);
            } else {
                app.move_column(1);
            }
        }
        KeyCode::Char('K') => app.move_task_vertical(-1),
        KeyCode::Char('J') => app.move_task_vertical(1),
        KeyCode::Char('H') => app.move_task_horizontal(-1),
        KeyCode::Char('L') => app.move_task_horizontal(1),

        // Task editing
        KeyCode::Char('a') => app.start_add_task(),
        KeyCode::Char('e') => app.start_edit_task(),
        KeyCode::Char('p') => app.cycle_priority(),
        KeyCode::Char('c') | KeyCode::Char(' ') => app.toggle_completion(),
        KeyCode::Char('x') | KeyCode::Delete => app.delete_selected(),

        // Timers
        KeyCode::Char('t') | KeyCode::Enter => app.toggle_timer(),
        KeyCode::Char('T') => app.stop_timer(),

        // Filter, sort, view
        KeyCode::Char('/') => app.start_query_edit(),
        KeyCode::Char('o') => app.toggle_overdue_filter(),
        KeyCode::Char('F') => app.clear_filters(),
        KeyCode::Char('s') => app.cycle_sort_field(),
        KeyCode::Char('S') => app.toggle_sort_direction(),
        KeyCode::Char('v') => app.toggle_view_mode(),
        KeyCode::Char('z') => app.toggle_column_collapsed(),
        KeyCode::Char('r') => app.refresh(),

        KeyCode::Char('f') => app.enter_focus(),

        // Quit
        KeyCode::Char('q') | KeyCode::Char('Q') => return true,

        KeyCode::Esc => app.close_message(),

        _ => {}
    }
    false
}

/// Handle keys in input form mode (adding or editing a task)
fn handle_input_form_mode<S, H, C>(app: &mut AppState<S, H, C>, key: KeyEvent)
where
    S: TaskStore,
    H: SessionHistory,
    C: Clock,
{
    match key.code {
        KeyCode::Enter => app.submit_input_form(),
        KeyCode::Esc => app.cancel_input_form(),
        KeyCode::Tab => app.input_form_toggle_field(),
        KeyCode::Backspace => app.input_form_backspace(),
        KeyCode::Char(c) => app.input_form_add_char(c),
        _ => {}
    }
}

/// Handle keys while typing the search query
fn handle_query_mode<S, H, C>(app: &mut AppState<S, H, C>, key: KeyEvent)
where
    S: TaskStore,
    H: SessionHistory,
    C: Clock,
{
    match key.code {
        KeyCode::Enter | KeyCode::Esc => app.finish_query_edit(),
        KeyCode::Backspace => app.query_backspace(),
        KeyCode::Char(c) => app.query_add_char(c),
        _ => {}
    }
}

/// Handle keys in focus mode
fn handle_focus_mode<S, H, C>(app: &mut AppState<S, H, C>, key: KeyEvent)
where
    S: TaskStore,
    H: SessionHistory,
    C: Clock,
{
    match key.code {
        KeyCode::Char(' ') => app.toggle_focus_pause(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.focus_command(FocusCommand::AddTime),
        KeyCode::Char('-') | KeyCode::Char('_') => app.focus_command(FocusCommand::SubtractTime),
        KeyCode::Char('b') => app.focus_command(FocusCommand::StartBreak),
        KeyCode::Enter => app.focus_command(FocusCommand::Acknowledge),
        KeyCode::Char('c') => app.focus_command(FocusCommand::CompleteTask),
        KeyCode::Char('s') => app.exit_focus(true),
        KeyCode::Esc | KeyCode::Char('q') => app.exit_focus(false),
        _ => {}
    }
}
