use crate::clock::{Clock, SystemClock};
use crate::domain::{
    FilterChange, FocusCommand, Priority, SortSpec, Tag, TagColor, TaskFields, TaskStatus, UiMode,
    ViewMode,
};
use crate::engine::{BoardView, Engine, Event, Notice};
use crate::notifications;
use crate::persistence::{SessionHistory, TaskStore};
use chrono::{DateTime, Utc};

/// What the input form creates or edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTarget {
    NewTask(TaskStatus),
    Edit(String),
}

pub const FORM_FIELDS: usize = 4;

/// Input form state for adding and editing tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFormState {
    pub target: FormTarget,
    pub title: String,
    pub description: String,
    pub tags: String, // Comma-separated labels
    pub assignee: String,
    pub editing_field: usize, // 0 = title, 1 = description, 2 = tags, 3 = assignee
}

impl InputFormState {
    fn field_mut(&mut self) -> &mut String {
        match self.editing_field {
            0 => &mut self.title,
            1 => &mut self.description,
            2 => &mut self.tags,
            _ => &mut self.assignee,
        }
    }
}

/// Presentation state the engine does not own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub ui_mode: UiMode,
    pub input_form: Option<InputFormState>,
    pub column_index: usize,
    /// Last notice, shown in the status bar
    pub status_line: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            ui_mode: UiMode::Normal,
            input_form: None,
            column_index: 0,
            status_line: None,
        }
    }
}

/// Terminal front end state: the engine plus cursor and form state
pub struct AppState<S: TaskStore, H: SessionHistory, C: Clock = SystemClock> {
    engine: Engine<S, H>,
    clock: C,
    pub ui: UiState,
    pub desktop_notifications: bool,
}

impl<S: TaskStore, H: SessionHistory, C: Clock> AppState<S, H, C> {
    pub fn new(engine: Engine<S, H>, clock: C) -> Self {
        Self {
            engine,
            clock,
            ui: UiState::default(),
            desktop_notifications: true,
        }
    }

    pub fn engine(&self) -> &Engine<S, H> {
        &self.engine
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn view(&self) -> BoardView {
        self.engine.view(self.now())
    }

    fn dispatch(&mut self, event: Event) {
        let now = self.now();
        let notices = self.engine.dispatch(event, now);
        for notice in notices {
            self.ui.status_line = Some(notice_text(&notice));
            if self.desktop_notifications {
                notifications::notify(&notice);
            }
        }
    }

    /// Periodic re-evaluation: focus countdown and store pushes
    pub fn tick(&mut self) {
        self.dispatch(Event::Tick);
    }

    pub fn selected_id(&self) -> Option<String> {
        self.engine.state().selected_task.clone()
    }

    fn current_status(&self) -> Option<TaskStatus> {
        let mut columns: Vec<_> = self.engine.state().board.columns.iter().collect();
        columns.sort_by_key(|c| c.order);
        columns.get(self.ui.column_index).map(|c| c.status)
    }

    /// Ids of the rows the cursor moves through
    fn visible_rows(&self, view: &BoardView) -> Vec<String> {
        match view.view_mode {
            ViewMode::List => view.list.iter().map(|t| t.id.clone()).collect(),
            ViewMode::Board => view
                .columns
                .get(self.ui.column_index)
                .map(|c| c.tasks.iter().map(|t| t.id.clone()).collect())
                .unwrap_or_default(),
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let view = self.view();
        let rows = self.visible_rows(&view);
        if rows.is_empty() {
            return;
        }
        let next = match view
            .selected_task
            .as_ref()
            .and_then(|id| rows.iter().position(|r| r == id))
        {
            Some(idx) => (idx as isize + delta).clamp(0, rows.len() as isize - 1) as usize,
            None => 0,
        };
        self.dispatch(Event::TaskClicked(rows[next].clone()));
    }

    pub fn move_column(&mut self, delta: isize) {
        let count = self.engine.state().board.columns.len();
        if count == 0 {
            return;
        }
        self.ui.column_index =
            (self.ui.column_index as isize + delta).clamp(0, count as isize - 1) as usize;
        let view = self.view();
        if let Some(first) = self.visible_rows(&view).into_iter().next() {
            self.dispatch(Event::TaskClicked(first));
        }
    }

    /// Reorder the selected task within its column
    pub fn move_task_vertical(&mut self, delta: isize) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let state = self.engine.state();
        let Some(task) = state.board.tasks.iter().find(|t| t.id == id) else {
            return;
        };
        let status = task.status;
        let column = state.board.tasks_in(status);
        let Some(idx) = column.iter().position(|t| t.id == id) else {
            return;
        };
        let index = (idx as isize + delta).max(0) as usize;
        self.dispatch(Event::TaskMoved { id, status, index });
    }

    /// Move the selected task to the neighbouring column, at its end
    pub fn move_task_horizontal(&mut self, delta: isize) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let mut columns: Vec<_> = self.engine.state().board.columns.iter().collect();
        columns.sort_by_key(|c| c.order);
        let Some(current) = self
            .engine
            .state()
            .board
            .tasks
            .iter()
            .find(|t| t.id == id)
            .and_then(|t| columns.iter().position(|c| c.status == t.status))
        else {
            return;
        };
        let target = current as isize + delta;
        if target < 0 || target >= columns.len() as isize {
            return;
        }
        let status = columns[target as usize].status;
        self.ui.column_index = target as usize;
        self.dispatch(Event::TaskMoved {
            id,
            status,
            index: usize::MAX,
        });
    }

    /// Start, pause or resume the selected task's timer
    pub fn toggle_timer(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let timer = self
            .engine
            .state()
            .selected()
            .and_then(|t| t.timer.as_ref().map(|timer| timer.is_paused));
        let event = match timer {
            None => Event::TimerStarted(id),
            Some(false) => Event::TimerPaused(id),
            Some(true) => Event::TimerResumed(id),
        };
        self.dispatch(event);
    }

    pub fn stop_timer(&mut self) {
        if let Some(id) = self.selected_id() {
            self.dispatch(Event::TimerStopped(id));
        }
    }

    pub fn toggle_completion(&mut self) {
        if let Some(id) = self.selected_id() {
            self.dispatch(Event::CompletionToggled(id));
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.dispatch(Event::TaskDeleted(id));
        }
    }

    /// HIGH -> MEDIUM -> LOW -> NONE -> HIGH
    pub fn cycle_priority(&mut self) {
        let Some(task) = self.engine.state().selected() else {
            return;
        };
        let all = Priority::all();
        let idx = all.iter().position(|p| *p == task.priority).unwrap_or(0);
        let mut fields = task.fields();
        fields.priority = all[(idx + 1) % all.len()];
        let id = task.id.clone();
        self.dispatch(Event::TaskEdited { id, fields });
    }

    pub fn cycle_sort_field(&mut self) {
        let sort = self.engine.state().sort;
        self.dispatch(Event::SortChanged(SortSpec::new(sort.field.next(), sort.direction)));
    }

    pub fn toggle_sort_direction(&mut self) {
        let sort = self.engine.state().sort;
        self.dispatch(Event::SortChanged(SortSpec::new(sort.field, sort.direction.toggled())));
    }

    pub fn toggle_view_mode(&mut self) {
        let mode = self.engine.state().view_mode.toggled();
        self.dispatch(Event::ViewModeChanged(mode));
    }

    pub fn toggle_overdue_filter(&mut self) {
        let overdue = !self.engine.state().filter.overdue_only;
        self.dispatch(Event::FilterChanged(FilterChange::OverdueOnly(overdue)));
    }

    pub fn clear_filters(&mut self) {
        self.dispatch(Event::FilterChanged(FilterChange::Clear));
    }

    pub fn toggle_column_collapsed(&mut self) {
        if let Some(status) = self.current_status() {
            self.dispatch(Event::ColumnToggled(status));
        }
    }

    pub fn refresh(&mut self) {
        self.dispatch(Event::RefreshRequested);
    }

    pub fn close_message(&mut self) {
        self.ui.status_line = None;
        self.dispatch(Event::ModalClosed);
    }

    /// Open the form for a new task in the current column
    pub fn start_add_task(&mut self) {
        let status = self.current_status().unwrap_or(TaskStatus::Todo);
        self.ui.input_form = Some(InputFormState {
            target: FormTarget::NewTask(status),
            title: String::new(),
            description: String::new(),
            tags: String::new(),
            assignee: String::new(),
            editing_field: 0,
        });
        self.ui.ui_mode = UiMode::AddingTask;
    }

    /// Open the form prefilled with the selected task
    pub fn start_edit_task(&mut self) {
        let Some(task) = self.engine.state().selected() else {
            return;
        };
        self.ui.input_form = Some(InputFormState {
            target: FormTarget::Edit(task.id.clone()),
            title: task.title.clone(),
            description: task.description.clone(),
            tags: task
                .tags
                .iter()
                .map(|t| t.label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            assignee: task.assignee.clone().unwrap_or_default(),
            editing_field: 0,
        });
        self.ui.ui_mode = UiMode::EditingTask;
    }

    pub fn input_form_toggle_field(&mut self) {
        if let Some(form) = &mut self.ui.input_form {
            form.editing_field = (form.editing_field + 1) % FORM_FIELDS;
        }
    }

    pub fn input_form_add_char(&mut self, c: char) {
        if let Some(form) = &mut self.ui.input_form {
            form.field_mut().push(c);
        }
    }

    pub fn input_form_backspace(&mut self) {
        if let Some(form) = &mut self.ui.input_form {
            form.field_mut().pop();
        }
    }

    /// Submit the form; a blank title cancels
    pub fn submit_input_form(&mut self) {
        let Some(form) = self.ui.input_form.take() else {
            return;
        };
        self.ui.ui_mode = UiMode::Normal;
        if form.title.trim().is_empty() {
            return;
        }

        let mut fields = match &form.target {
            FormTarget::Edit(id) => match self.engine.state().board.tasks.iter().find(|t| &t.id == id) {
                Some(task) => task.fields(),
                None => TaskFields::default(),
            },
            FormTarget::NewTask(_) => TaskFields::default(),
        };
        fields.title = form.title.trim().to_string();
        fields.description = form.description;
        fields.tags = parse_tags(&form.tags, &fields.tags);
        let assignee = form.assignee.trim();
        fields.assignee = (!assignee.is_empty()).then(|| assignee.to_string());

        let event = match form.target {
            FormTarget::NewTask(status) => Event::TaskCreated { status, fields },
            FormTarget::Edit(id) => Event::TaskEdited { id, fields },
        };
        self.dispatch(event);
    }

    pub fn cancel_input_form(&mut self) {
        self.ui.input_form = None;
        self.ui.ui_mode = UiMode::Normal;
    }

    pub fn start_query_edit(&mut self) {
        self.ui.ui_mode = UiMode::EditingQuery;
    }

    /// Query edits apply as you type
    pub fn query_add_char(&mut self, c: char) {
        let mut query = self.engine.state().filter.query.clone();
        query.push(c);
        self.dispatch(Event::FilterChanged(FilterChange::Query(query)));
    }

    pub fn query_backspace(&mut self) {
        let mut query = self.engine.state().filter.query.clone();
        query.pop();
        self.dispatch(Event::FilterChanged(FilterChange::Query(query)));
    }

    pub fn finish_query_edit(&mut self) {
        self.ui.ui_mode = UiMode::Normal;
    }

    pub fn enter_focus(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        self.dispatch(Event::FocusEntered(id));
        if self.engine.state().focus.is_some() {
            self.ui.ui_mode = UiMode::Focus;
        }
    }

    pub fn focus_command(&mut self, command: FocusCommand) {
        self.dispatch(Event::Focus(command));
    }

    /// Pause if counting down, resume otherwise
    pub fn toggle_focus_pause(&mut self) {
        let paused = self.engine.state().focus.as_ref().map(|s| s.is_paused);
        match paused {
            Some(true) => self.focus_command(FocusCommand::Resume),
            Some(false) => self.focus_command(FocusCommand::Pause),
            None => {}
        }
    }

    /// Leave focus mode, keeping the session in the history when `record` is set
    pub fn exit_focus(&mut self, record: bool) {
        self.dispatch(Event::FocusExited { record });
        self.ui.ui_mode = UiMode::Normal;
    }
}

/// Keep colors of tags that survive an edit, new labels get the default color
fn parse_tags(input: &str, existing: &[Tag]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    for label in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if tags.iter().any(|t| t.label == label) {
            continue;
        }
        let color = existing
            .iter()
            .find(|t| t.label == label)
            .map(|t| t.color)
            .unwrap_or(TagColor::default());
        tags.push(Tag::new(label, color));
    }
    tags
}

fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::PhaseChanged { task_title, change } => {
            notifications::phase_message(task_title, change)
        }
        Notice::TaskCompleted { title } => format!("Completed: {}", title),
        Notice::WipExceeded(warning) => format!(
            "{} is over its WIP limit ({}/{})",
            warning.status.title(),
            warning.count,
            warning.limit
        ),
    }
}
