use super::state::{reduce, BoardState, BoardView, Effect, Event, Notice};
use crate::domain::{Board, ColumnDef, FocusSettings, Task};
use crate::error::Result;
use crate::persistence::{SessionHistory, TaskStore};
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, TryRecvError};

/// Runs the reducer against a task store and a focus history sink.
///
/// Writes are optimistic: the reducer has already applied the change
/// locally, the store confirms it by pushing the new task set. A failed
/// write is fed back as `Event::PersistenceFailed`, which resyncs from the
/// store.
pub struct Engine<S: TaskStore, H: SessionHistory> {
    store: S,
    history: H,
    state: BoardState,
    updates: Receiver<Vec<Task>>,
}

impl<S: TaskStore, H: SessionHistory> Engine<S, H> {
    pub fn new(
        mut store: S,
        history: H,
        columns: Vec<ColumnDef>,
        focus_settings: FocusSettings,
        time_step: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        let updates = store.observe_all();
        let state = BoardState::new(Board::new(columns, Vec::new()), focus_settings, time_step);
        let mut engine = Self {
            store,
            history,
            state,
            updates,
        };
        engine.sync(now);
        engine
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn view(&self, now: DateTime<Utc>) -> BoardView {
        self.state.view(now)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Reduce `event` and carry out everything it asks for. Returns the
    /// notices raised along the way, in order.
    pub fn dispatch(&mut self, event: Event, now: DateTime<Utc>) -> Vec<Notice> {
        let mut notices = Vec::new();
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let (next, effects) = reduce(std::mem::take(&mut self.state), event, now);
            self.state = next;

            for effect in effects {
                match effect {
                    Effect::Notify(notice) => notices.push(notice),
                    Effect::Reload => self.reload(),
                    other => {
                        if let Err(e) = self.run(other) {
                            tracing::warn!(error = %e, "store request failed");
                            queue.push_back(Event::PersistenceFailed(e.to_string()));
                        }
                    }
                }
            }
            self.sync(now);
        }

        notices
    }

    /// Apply whatever the store has pushed since the last call
    pub fn sync(&mut self, now: DateTime<Utc>) {
        let mut latest = None;
        loop {
            match self.updates.try_recv() {
                Ok(tasks) => latest = Some(tasks),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("task store stopped publishing, resubscribing");
                    self.updates = self.store.observe_all();
                }
            }
        }
        if let Some(tasks) = latest {
            let (next, _) = reduce(std::mem::take(&mut self.state), Event::TasksLoaded(tasks), now);
            self.state = next;
        }
    }

    /// Fresh subscription; the store answers with its current task set
    fn reload(&mut self) {
        self.updates = self.store.observe_all();
    }

    fn run(&mut self, effect: Effect) -> Result<()> {
        match effect {
            Effect::Create(task) => self.store.create(task).map(|_| ()),
            Effect::Update(task) => self.store.update(task).map(|_| ()),
            Effect::UpdateBatch(tasks) if tasks.is_empty() => Ok(()),
            Effect::UpdateBatch(tasks) => self.store.update_all(tasks).map(|_| ()),
            Effect::Delete(id) => self.store.delete(&id),
            Effect::SaveColumns(columns) => self.store.save_columns(&columns),
            Effect::RecordSession(record) => self.history.record(&record),
            Effect::Notify(_) | Effect::Reload => Ok(()),
        }
    }
}
