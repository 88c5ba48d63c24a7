//! Board state and its reducer.
//!
//! `reduce` is pure: one event in, the next state plus a list of effects
//! out. Persistence and notifications are effects the driver carries out.

use crate::domain::filter;
use crate::domain::task::{self, find_task, TaskFields};
use crate::domain::{
    Board, ColumnDef, FilterChange, FocusCommand, FocusPhase, FocusSession, FocusSessionRecord,
    FocusSettings, PhaseChange, SortSpec, Task, TaskFilter, TaskStatus, ViewMode, WipWarning,
};
use crate::error::Error;
use chrono::{DateTime, Duration, Utc};

/// Closed set of events accepted from the presentation layer and driver
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Store pushed a fresh task set
    TasksLoaded(Vec<Task>),
    TaskClicked(String),
    TaskCreated { status: TaskStatus, fields: TaskFields },
    TaskEdited { id: String, fields: TaskFields },
    TaskDeleted(String),
    TaskMoved { id: String, status: TaskStatus, index: usize },
    CompletionToggled(String),
    TimerStarted(String),
    TimerPaused(String),
    TimerResumed(String),
    TimerStopped(String),
    FilterChanged(FilterChange),
    SortChanged(SortSpec),
    ColumnToggled(TaskStatus),
    ViewModeChanged(ViewMode),
    ModalClosed,
    RefreshRequested,
    FocusEntered(String),
    Focus(FocusCommand),
    /// Leave focus mode; `record` keeps an unfinished session in the history
    FocusExited { record: bool },
    /// Periodic re-evaluation against the clock
    Tick,
    /// A store request failed; carries the user-visible reason
    PersistenceFailed(String),
}

/// Side effects requested by the reducer
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Create(Task),
    Update(Task),
    /// Several task updates that must commit as one unit
    UpdateBatch(Vec<Task>),
    Delete(String),
    SaveColumns(Vec<ColumnDef>),
    Reload,
    RecordSession(FocusSessionRecord),
    Notify(Notice),
}

/// Things worth telling the user about outside the board itself
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    PhaseChanged { task_title: String, change: PhaseChange },
    TaskCompleted { title: String },
    WipExceeded(WipWarning),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Warning,
    Error,
}

/// Message shown by the presentation layer until `ModalClosed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl UserMessage {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Warning,
            text: text.into(),
        }
    }
}

/// Everything the engine knows, as one value
#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    pub board: Board,
    pub filter: TaskFilter,
    pub sort: SortSpec,
    pub view_mode: ViewMode,
    pub selected_task: Option<String>,
    pub focus: Option<FocusSession>,
    pub message: Option<UserMessage>,
    pub focus_settings: FocusSettings,
    /// Delta for focus add/subtract time
    pub time_step: Duration,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new(Board::default(), FocusSettings::default(), Duration::minutes(5))
    }
}

impl BoardState {
    pub fn new(board: Board, focus_settings: FocusSettings, time_step: Duration) -> Self {
        Self {
            board,
            filter: TaskFilter::default(),
            sort: SortSpec::default(),
            view_mode: ViewMode::default(),
            selected_task: None,
            focus: None,
            message: None,
            focus_settings,
            time_step,
        }
    }

    pub fn selected(&self) -> Option<&Task> {
        let id = self.selected_task.as_deref()?;
        find_task(&self.board.tasks, id).ok()
    }

    /// Immutable snapshot for rendering
    pub fn view(&self, now: DateTime<Utc>) -> BoardView {
        let visible = filter::apply(&self.board.tasks, &self.filter, &self.sort, now);

        let mut defs: Vec<&ColumnDef> = self.board.columns.iter().collect();
        defs.sort_by_key(|c| c.order);
        let columns = defs
            .into_iter()
            .map(|column| {
                let total = self
                    .board
                    .tasks
                    .iter()
                    .filter(|t| t.status == column.status)
                    .count();
                ColumnSnapshot {
                    column: column.clone(),
                    tasks: visible
                        .iter()
                        .filter(|t| t.status == column.status)
                        .map(|t| (*t).clone())
                        .collect(),
                    total,
                    over_wip_limit: column.wip_limit.is_some_and(|limit| total > limit as usize),
                }
            })
            .collect();

        BoardView {
            columns,
            list: visible.into_iter().cloned().collect(),
            filter: self.filter.clone(),
            sort: self.sort,
            view_mode: self.view_mode,
            selected_task: self.selected_task.clone(),
            message: self.message.clone(),
            focus: self.focus.as_ref().map(|session| FocusView {
                task_id: session.task.id.clone(),
                task_title: session.task.title.clone(),
                phase: session.phase,
                remaining: session.remaining(now),
                progress: session.progress(now),
                sessions_completed: session.sessions_completed,
                is_paused: session.is_paused,
                transition_pending: session.transition_pending,
            }),
        }
    }

    fn report(&mut self, error: Error) {
        tracing::warn!(error = %error, "board operation failed");
        self.message = Some(UserMessage::error(error.user_message()));
    }
}

/// Column with the tasks that pass the current filter
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSnapshot {
    pub column: ColumnDef,
    pub tasks: Vec<Task>,
    /// Tasks in the column before filtering
    pub total: usize,
    pub over_wip_limit: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FocusView {
    pub task_id: String,
    pub task_title: String,
    pub phase: FocusPhase,
    pub remaining: Duration,
    pub progress: f64,
    pub sessions_completed: u32,
    pub is_paused: bool,
    pub transition_pending: bool,
}

/// Rendering snapshot handed to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub columns: Vec<ColumnSnapshot>,
    /// Flat filtered and sorted list, for list mode
    pub list: Vec<Task>,
    pub filter: TaskFilter,
    pub sort: SortSpec,
    pub view_mode: ViewMode,
    pub selected_task: Option<String>,
    pub message: Option<UserMessage>,
    pub focus: Option<FocusView>,
}

/// Apply one event
pub fn reduce(mut state: BoardState, event: Event, now: DateTime<Utc>) -> (BoardState, Vec<Effect>) {
    let mut effects = Vec::new();

    match event {
        Event::TasksLoaded(tasks) => {
            state.board.tasks = tasks;
            if state.selected().is_none() {
                state.selected_task = None;
            }
        }
        Event::TaskClicked(id) => match find_task(&state.board.tasks, &id) {
            Ok(_) => state.selected_task = Some(id),
            Err(e) => state.report(e),
        },
        Event::TaskCreated { status, fields } => {
            if state.board.column(status).is_none() {
                state.report(Error::ColumnNotFound(status));
            } else {
                let task = task::create_task(&mut state.board.tasks, fields, status, now);
                tracing::debug!(id = %task.id, ?status, "task created");
                state.selected_task = Some(task.id.clone());
                effects.push(Effect::Create(task));
            }
        }
        Event::TaskEdited { id, fields } => {
            match task::update_task(&mut state.board.tasks, &id, fields, now) {
                Ok(task) => effects.push(Effect::Update(task)),
                Err(e) => state.report(e),
            }
        }
        Event::TaskDeleted(id) => match task::delete_task(&mut state.board.tasks, &id) {
            Ok(_) => {
                if state.selected_task.as_deref() == Some(id.as_str()) {
                    state.selected_task = None;
                }
                if state.focus.as_ref().is_some_and(|s| s.task.id == id) {
                    state.focus = None;
                }
                effects.push(Effect::Delete(id));
            }
            Err(e) => state.report(e),
        },
        Event::TaskMoved { id, status, index } => {
            match state.board.move_task(&id, status, index, now) {
                Ok(outcome) => {
                    tracing::debug!(%id, ?status, index, changed = outcome.changed.len(), "task moved");
                    if let Some(warning) = outcome.wip_warning {
                        state.message = Some(UserMessage::warning(format!(
                            "{} has {} tasks (WIP limit {})",
                            status.title(),
                            warning.count,
                            warning.limit
                        )));
                        effects.push(Effect::Notify(Notice::WipExceeded(warning)));
                    }
                    effects.push(Effect::UpdateBatch(outcome.changed));
                }
                Err(e) => state.report(e),
            }
        }
        Event::CompletionToggled(id) => {
            match task::toggle_completion(&mut state.board.tasks, &id, now) {
                Ok(task) => {
                    if task.completed {
                        effects.push(Effect::Notify(Notice::TaskCompleted {
                            title: task.title.clone(),
                        }));
                    }
                    effects.push(Effect::Update(task));
                }
                Err(e) => state.report(e),
            }
        }
        Event::TimerStarted(id) => timer_event(&mut state, &mut effects, task::start_timer, &id, now),
        Event::TimerPaused(id) => timer_event(&mut state, &mut effects, task::pause_timer, &id, now),
        Event::TimerResumed(id) => timer_event(&mut state, &mut effects, task::resume_timer, &id, now),
        Event::TimerStopped(id) => timer_event(&mut state, &mut effects, task::stop_timer, &id, now),
        Event::FilterChanged(change) => state.filter.apply_change(change),
        Event::SortChanged(sort) => state.sort = sort,
        Event::ColumnToggled(status) => match state.board.toggle_collapsed(status) {
            Ok(_) => effects.push(Effect::SaveColumns(state.board.columns.clone())),
            Err(e) => state.report(e),
        },
        Event::ViewModeChanged(mode) => state.view_mode = mode,
        Event::ModalClosed => state.message = None,
        Event::RefreshRequested => effects.push(Effect::Reload),
        Event::FocusEntered(id) => enter_focus(&mut state, &mut effects, &id, now),
        Event::Focus(command) => focus_command(&mut state, &mut effects, command, now),
        Event::FocusExited { record } => {
            match state.focus.take() {
                // A completed session was recorded when it completed
                Some(session) if record && !session.is_completed() => {
                    let entry = session.record(now);
                    tracing::debug!(task = %entry.task_id, "focus session recorded on exit");
                    effects.push(Effect::RecordSession(entry));
                }
                Some(_) => tracing::debug!("focus session discarded"),
                None => {}
            }
            clear_active(&mut state, &mut effects, now);
        }
        Event::Tick => {
            if let Some(session) = state.focus.as_mut() {
                if let Some(change) = session.tick(now) {
                    effects.push(Effect::Notify(Notice::PhaseChanged {
                        task_title: session.task.title.clone(),
                        change,
                    }));
                }
            }
        }
        Event::PersistenceFailed(reason) => {
            state.report(Error::Persistence(reason));
            effects.push(Effect::Reload);
        }
    }

    (state, effects)
}

type TimerOp = fn(&mut [Task], &str, DateTime<Utc>) -> crate::error::Result<Task>;

fn timer_event(
    state: &mut BoardState,
    effects: &mut Vec<Effect>,
    op: TimerOp,
    id: &str,
    now: DateTime<Utc>,
) {
    match op(&mut state.board.tasks, id, now) {
        Ok(task) => effects.push(Effect::Update(task)),
        Err(e) => state.report(e),
    }
}

fn enter_focus(state: &mut BoardState, effects: &mut Vec<Effect>, id: &str, now: DateTime<Utc>) {
    match task::set_active(&mut state.board.tasks, Some(id), now) {
        Ok(changed) => {
            // set_active verified the id
            if let Ok(task) = find_task(&state.board.tasks, id) {
                state.focus = Some(FocusSession::new(
                    task.clone(),
                    state.focus_settings.clone(),
                    now,
                ));
            }
            if !changed.is_empty() {
                effects.push(Effect::UpdateBatch(changed));
            }
        }
        Err(e) => state.report(e),
    }
}

fn clear_active(state: &mut BoardState, effects: &mut Vec<Effect>, now: DateTime<Utc>) {
    if let Ok(changed) = task::set_active(&mut state.board.tasks, None, now) {
        if !changed.is_empty() {
            effects.push(Effect::UpdateBatch(changed));
        }
    }
}

fn focus_command(
    state: &mut BoardState,
    effects: &mut Vec<Effect>,
    command: FocusCommand,
    now: DateTime<Utc>,
) {
    let step = state.time_step;
    let Some(session) = state.focus.as_mut() else {
        return;
    };
    let change = session.apply(command, step, now);
    let task_id = session.task.id.clone();
    let task_title = session.task.title.clone();
    let record = (command == FocusCommand::CompleteTask && change.is_some())
        .then(|| session.record(now));

    if let Some(change) = change {
        effects.push(Effect::Notify(Notice::PhaseChanged {
            task_title: task_title.clone(),
            change,
        }));
    }

    let Some(record) = record else {
        return;
    };
    effects.push(Effect::RecordSession(record));

    let already_done = find_task(&state.board.tasks, &task_id).is_ok_and(|t| t.completed);
    if !already_done {
        match task::toggle_completion(&mut state.board.tasks, &task_id, now) {
            Ok(task) => {
                effects.push(Effect::Notify(Notice::TaskCompleted { title: task_title }));
                effects.push(Effect::Update(task));
            }
            Err(e) => state.report(e),
        }
    }
    clear_active(state, effects, now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::domain::{Priority, SortDirection, SortField};

    fn clock() -> ManualClock {
        ManualClock::at_epoch_millis(1_700_000_000_000)
    }

    fn state() -> BoardState {
        BoardState::new(
            Board::new(Board::default_columns(), Vec::new()),
            FocusSettings::default(),
            Duration::minutes(5),
        )
    }

    fn create(state: BoardState, title: &str, status: TaskStatus, now: DateTime<Utc>) -> (BoardState, Task) {
        let (state, effects) = reduce(
            state,
            Event::TaskCreated {
                status,
                fields: TaskFields::titled(title),
            },
            now,
        );
        let task = match &effects[0] {
            Effect::Create(task) => task.clone(),
            other => panic!("unexpected effect {:?}", other),
        };
        (state, task)
    }

    #[test]
    fn test_create_emits_create_effect_and_selects() {
        let clock = clock();
        let (state, task) = create(state(), "Write docs", TaskStatus::Todo, clock.now());
        assert_eq!(state.board.tasks.len(), 1);
        assert_eq!(state.selected_task, Some(task.id.clone()));
        assert_eq!(task.status, TaskStatus::Todo);
    }

    #[test]
    fn test_unknown_task_reports_message_without_effects() {
        let clock = clock();
        let (state, effects) = reduce(state(), Event::TimerStarted("ghost".into()), clock.now());
        assert!(effects.is_empty());
        assert_eq!(state.message.as_ref().unwrap().kind, MessageKind::Error);

        let (state, _) = reduce(state, Event::ModalClosed, clock.now());
        assert!(state.message.is_none());
    }

    #[test]
    fn test_move_commits_single_batch() {
        let clock = clock();
        let (state, first) = create(state(), "a", TaskStatus::Todo, clock.now());
        let (state, _) = create(state, "b", TaskStatus::Todo, clock.now());

        let (state, effects) = reduce(
            state,
            Event::TaskMoved {
                id: first.id.clone(),
                status: TaskStatus::InProgress,
                index: 0,
            },
            clock.now(),
        );
        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::UpdateBatch(tasks) => assert_eq!(tasks.len(), 2),
            other => panic!("unexpected effect {:?}", other),
        }
        assert_eq!(state.board.tasks_in(TaskStatus::InProgress)[0].id, first.id);
    }

    #[test]
    fn test_move_over_wip_limit_warns() {
        let clock = clock();
        let mut initial = state();
        initial.board.column_mut(TaskStatus::InProgress).unwrap().wip_limit = Some(0);
        let (state, task) = create(initial, "a", TaskStatus::Todo, clock.now());

        let (state, effects) = reduce(
            state,
            Event::TaskMoved {
                id: task.id,
                status: TaskStatus::InProgress,
                index: 0,
            },
            clock.now(),
        );
        assert_eq!(state.message.as_ref().unwrap().kind, MessageKind::Warning);
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::Notify(Notice::WipExceeded(_)))));
        assert!(effects.iter().any(|e| matches!(e, Effect::UpdateBatch(_))));
    }

    #[test]
    fn test_persistence_failure_surfaces_and_reloads() {
        let clock = clock();
        let (state, effects) = reduce(
            state(),
            Event::PersistenceFailed("disk full".into()),
            clock.now(),
        );
        assert_eq!(effects, vec![Effect::Reload]);
        assert!(state.message.unwrap().text.contains("disk full"));
    }

    #[test]
    fn test_view_filters_within_columns_and_counts_totals() {
        let clock = clock();
        let (state, _) = create(state(), "alpha", TaskStatus::Todo, clock.now());
        let (state, _) = create(state, "beta", TaskStatus::Todo, clock.now());
        let (state, _) = reduce(
            state,
            Event::FilterChanged(FilterChange::Query("alp".into())),
            clock.now(),
        );

        let view = state.view(clock.now());
        assert_eq!(view.columns.len(), 5);
        let todo = &view.columns[1];
        assert_eq!(todo.total, 2);
        assert_eq!(todo.tasks.len(), 1);
        assert_eq!(todo.tasks[0].title, "alpha");
        assert_eq!(view.list.len(), 1);
    }

    #[test]
    fn test_sort_change_reorders_list() {
        let clock = clock();
        let (state, low) = create(state(), "low", TaskStatus::Todo, clock.now());
        let (state, high) = create(state, "high", TaskStatus::Todo, clock.now());
        let mut fields = low.fields();
        fields.priority = Priority::Low;
        let (state, _) = reduce(state, Event::TaskEdited { id: low.id, fields }, clock.now());
        let mut fields = high.fields();
        fields.priority = Priority::High;
        let (state, _) = reduce(state, Event::TaskEdited { id: high.id, fields }, clock.now());

        let (state, _) = reduce(
            state,
            Event::SortChanged(SortSpec::new(SortField::Priority, SortDirection::Ascending)),
            clock.now(),
        );
        let titles: Vec<String> = state.view(clock.now()).list.into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["high", "low"]);
    }

    #[test]
    fn test_column_toggle_saves_columns() {
        let clock = clock();
        let (state, effects) = reduce(state(), Event::ColumnToggled(TaskStatus::Done), clock.now());
        assert!(state.board.column(TaskStatus::Done).unwrap().is_collapsed);
        assert!(matches!(&effects[0], Effect::SaveColumns(cols) if cols.len() == 5));
    }

    #[test]
    fn test_focus_exit_discards_without_record() {
        let clock = clock();
        let (state, task) = create(state(), "deep", TaskStatus::InProgress, clock.now());
        let (state, effects) = reduce(state, Event::FocusEntered(task.id.clone()), clock.now());
        assert!(state.focus.is_some());
        assert!(find_task(&state.board.tasks, &task.id).unwrap().is_active);
        assert!(matches!(&effects[0], Effect::UpdateBatch(t) if t.len() == 1));

        clock.advance(Duration::minutes(10));
        let (state, effects) = reduce(state, Event::FocusExited { record: false }, clock.now());
        assert!(state.focus.is_none());
        assert!(!effects.iter().any(|e| matches!(e, Effect::RecordSession(_))));
        assert!(!find_task(&state.board.tasks, &task.id).unwrap().is_active);
    }

    #[test]
    fn test_focus_exit_can_record_unfinished_session() {
        let clock = clock();
        let (state, task) = create(state(), "deep", TaskStatus::InProgress, clock.now());
        let (state, _) = reduce(state, Event::FocusEntered(task.id.clone()), clock.now());

        clock.advance(Duration::minutes(25));
        let (state, _) = reduce(state, Event::Tick, clock.now());
        clock.advance(Duration::minutes(2));
        let (state, effects) = reduce(state, Event::FocusExited { record: true }, clock.now());

        let records: Vec<&FocusSessionRecord> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::RecordSession(r) => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].task_id, task.id);
        assert!(!records[0].completed);
        assert_eq!(records[0].sessions_completed, 1);
        assert_eq!(records[0].duration, 27 * 60 * 1000);
        assert!(state.focus.is_none());
        assert!(!find_task(&state.board.tasks, &task.id).unwrap().completed);
        assert!(!find_task(&state.board.tasks, &task.id).unwrap().is_active);
    }

    #[test]
    fn test_focus_exit_after_completion_records_once() {
        let clock = clock();
        let (state, task) = create(state(), "deep", TaskStatus::InProgress, clock.now());
        let (state, _) = reduce(state, Event::FocusEntered(task.id.clone()), clock.now());
        let (state, _) = reduce(state, Event::Focus(FocusCommand::CompleteTask), clock.now());
        let (_, effects) = reduce(state, Event::FocusExited { record: true }, clock.now());
        assert!(!effects.iter().any(|e| matches!(e, Effect::RecordSession(_))));
    }

    #[test]
    fn test_focus_complete_records_and_completes_task() {
        let clock = clock();
        let (state, task) = create(state(), "deep", TaskStatus::InProgress, clock.now());
        let (state, _) = reduce(state, Event::FocusEntered(task.id.clone()), clock.now());

        clock.advance(Duration::minutes(25));
        let (state, effects) = reduce(state, Event::Tick, clock.now());
        assert!(matches!(
            &effects[0],
            Effect::Notify(Notice::PhaseChanged { change, .. }) if change.to == FocusPhase::ShortBreak
        ));

        let (state, effects) = reduce(state, Event::Focus(FocusCommand::CompleteTask), clock.now());
        let record = effects
            .iter()
            .find_map(|e| match e {
                Effect::RecordSession(r) => Some(r.clone()),
                _ => None,
            })
            .unwrap();
        assert!(record.completed);
        assert_eq!(record.sessions_completed, 1);
        assert_eq!(record.task_id, task.id);

        let stored = find_task(&state.board.tasks, &task.id).unwrap();
        assert!(stored.completed);
        assert!(!stored.is_active);
        assert_eq!(state.focus.as_ref().unwrap().phase, FocusPhase::Completed);
    }

    #[test]
    fn test_focus_commands_without_session_are_ignored() {
        let clock = clock();
        let (state, effects) = reduce(state(), Event::Focus(FocusCommand::Pause), clock.now());
        assert!(effects.is_empty());
        assert!(state.message.is_none());
    }

    #[test]
    fn test_tasks_loaded_clears_stale_selection() {
        let clock = clock();
        let (state, _) = create(state(), "a", TaskStatus::Todo, clock.now());
        assert!(state.selected_task.is_some());
        let (state, _) = reduce(state, Event::TasksLoaded(Vec::new()), clock.now());
        assert!(state.selected_task.is_none());
    }
}
