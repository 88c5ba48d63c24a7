//! Task persistence contract and its two implementations.
//!
//! The engine never touches a storage format directly; it only calls
//! `TaskStore`. `MemoryStore` backs tests, `FileStore` keeps the board in
//! `board.json` through the snapshot codec.

use super::codec;
use super::files::{atomic_write, backup_file, board_file, read_file};
use crate::domain::{Board, ColumnDef, Task};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Persistence contract consumed by the engine
pub trait TaskStore {
    /// Push-based read of the full task set. The current set is sent
    /// immediately and again after every successful write.
    fn observe_all(&mut self) -> Receiver<Vec<Task>>;

    fn create(&mut self, task: Task) -> Result<Task>;

    fn update(&mut self, task: Task) -> Result<Task>;

    /// Commit several updates as one unit: either all land or none do
    fn update_all(&mut self, tasks: Vec<Task>) -> Result<Vec<Task>>;

    fn delete(&mut self, id: &str) -> Result<()>;

    /// Persist column layout (collapse state, WIP limits). Stores that only
    /// keep tasks can ignore it.
    fn save_columns(&mut self, _columns: &[ColumnDef]) -> Result<()> {
        Ok(())
    }
}

/// Fan-out of task-set snapshots to observers
#[derive(Debug, Default)]
struct Subscribers {
    senders: Vec<Sender<Vec<Task>>>,
}

impl Subscribers {
    fn subscribe(&mut self, current: &[Task]) -> Receiver<Vec<Task>> {
        let (tx, rx) = channel();
        // Receiver is alive, this cannot fail
        let _ = tx.send(current.to_vec());
        self.senders.push(tx);
        rx
    }

    /// Send to every live observer, dropping the ones that hung up
    fn publish(&mut self, tasks: &[Task]) {
        self.senders.retain(|tx| tx.send(tasks.to_vec()).is_ok());
    }
}

fn insert(tasks: &mut Vec<Task>, task: &Task) -> Result<()> {
    if tasks.iter().any(|t| t.id == task.id) {
        return Err(Error::Persistence(format!("task {} already exists", task.id)));
    }
    tasks.push(task.clone());
    Ok(())
}

fn replace(tasks: &mut [Task], task: &Task) -> Result<()> {
    let slot = tasks
        .iter_mut()
        .find(|t| t.id == task.id)
        .ok_or_else(|| Error::TaskNotFound(task.id.clone()))?;
    *slot = task.clone();
    Ok(())
}

fn replace_all(tasks: &mut [Task], updates: &[Task]) -> Result<()> {
    if let Some(missing) = updates.iter().find(|u| !tasks.iter().any(|t| t.id == u.id)) {
        return Err(Error::TaskNotFound(missing.id.clone()));
    }
    for update in updates {
        replace(tasks, update)?;
    }
    Ok(())
}

fn remove(tasks: &mut Vec<Task>, id: &str) -> Result<()> {
    let before = tasks.len();
    tasks.retain(|t| t.id != id);
    if tasks.len() == before {
        return Err(Error::TaskNotFound(id.to_string()));
    }
    Ok(())
}

/// In-memory store with optional failure injection
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: Vec<Task>,
    subscribers: Subscribers,
    failure: Option<String>,
}

impl MemoryStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Make every following write fail with `reason` (None to recover)
    pub fn set_failure(&mut self, reason: Option<&str>) {
        self.failure = reason.map(str::to_string);
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(reason) => Err(Error::Persistence(reason.clone())),
            None => Ok(()),
        }
    }
}

impl TaskStore for MemoryStore {
    fn observe_all(&mut self) -> Receiver<Vec<Task>> {
        self.subscribers.subscribe(&self.tasks)
    }

    fn create(&mut self, task: Task) -> Result<Task> {
        self.check()?;
        insert(&mut self.tasks, &task)?;
        self.subscribers.publish(&self.tasks);
        Ok(task)
    }

    fn update(&mut self, task: Task) -> Result<Task> {
        self.check()?;
        replace(&mut self.tasks, &task)?;
        self.subscribers.publish(&self.tasks);
        Ok(task)
    }

    fn update_all(&mut self, tasks: Vec<Task>) -> Result<Vec<Task>> {
        self.check()?;
        replace_all(&mut self.tasks, &tasks)?;
        self.subscribers.publish(&self.tasks);
        Ok(tasks)
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        self.check()?;
        remove(&mut self.tasks, id)?;
        self.subscribers.publish(&self.tasks);
        Ok(())
    }
}

/// Store backed by a board snapshot file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    board: Board,
    subscribers: Subscribers,
}

impl FileStore {
    /// Open `board.json` in `dir`. A missing file starts a board with
    /// `default_columns`; an unreadable one is backed up and starts empty.
    pub fn open(dir: &Path, default_columns: Vec<ColumnDef>) -> Result<Self> {
        let path = board_file(dir);
        let content = read_file(&path).map_err(|e| Error::Persistence(format!("{:#}", e)))?;

        let mut board = if content.trim().is_empty() {
            Board::default()
        } else {
            match codec::try_decode_str(&content) {
                Ok(board) => board,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "board file unreadable");
                    match backup_file(&path) {
                        Ok(backup) => {
                            tracing::warn!(backup = %backup.display(), "kept a copy of the unreadable board")
                        }
                        Err(e) => tracing::warn!(error = %e, "could not back up board file"),
                    }
                    Board::default()
                }
            }
        };
        if board.columns.is_empty() {
            board.columns = default_columns;
        }
        tracing::debug!(path = %path.display(), tasks = board.tasks.len(), "board loaded");

        Ok(Self {
            path,
            board,
            subscribers: Subscribers::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.board.columns
    }

    /// Replace the whole board (import)
    pub fn replace_board(&mut self, board: Board) -> Result<()> {
        self.commit(board)
    }

    /// Write `next` to disk, then make it current
    fn commit(&mut self, next: Board) -> Result<()> {
        let json = codec::encode_json(&next)?;
        atomic_write(&self.path, &json).map_err(|e| Error::Persistence(format!("{:#}", e)))?;
        self.board = next;
        self.subscribers.publish(&self.board.tasks);
        Ok(())
    }

    fn write_tasks<F>(&mut self, change: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Task>) -> Result<()>,
    {
        let mut next = self.board.clone();
        change(&mut next.tasks)?;
        self.commit(next)
    }
}

impl TaskStore for FileStore {
    fn observe_all(&mut self) -> Receiver<Vec<Task>> {
        self.subscribers.subscribe(&self.board.tasks)
    }

    fn create(&mut self, task: Task) -> Result<Task> {
        self.write_tasks(|tasks| insert(tasks, &task))?;
        Ok(task)
    }

    fn update(&mut self, task: Task) -> Result<Task> {
        self.write_tasks(|tasks| replace(tasks, &task))?;
        Ok(task)
    }

    fn update_all(&mut self, tasks: Vec<Task>) -> Result<Vec<Task>> {
        self.write_tasks(|current| replace_all(current, &tasks))?;
        Ok(tasks)
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        self.write_tasks(|tasks| remove(tasks, id))
    }

    fn save_columns(&mut self, columns: &[ColumnDef]) -> Result<()> {
        let mut next = self.board.clone();
        next.columns = columns.to_vec();
        self.commit(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::domain::{TaskFields, TaskStatus};
    use tempfile::tempdir;

    fn task(title: &str, order: i64) -> Task {
        let clock = ManualClock::at_epoch_millis(1_700_000_000_000);
        Task::new(TaskFields::titled(title), TaskStatus::Todo, order, clock.now())
    }

    #[test]
    fn test_memory_store_publishes_after_writes() {
        let mut store = MemoryStore::default();
        let rx = store.observe_all();
        assert!(rx.try_recv().unwrap().is_empty());

        let created = store.create(task("a", 0)).unwrap();
        assert_eq!(rx.try_recv().unwrap().len(), 1);

        store.delete(&created.id).unwrap();
        assert!(rx.try_recv().unwrap().is_empty());
    }

    #[test]
    fn test_memory_store_failure_injection() {
        let mut store = MemoryStore::default();
        store.set_failure(Some("offline"));
        let err = store.create(task("a", 0)).unwrap_err();
        assert!(matches!(err, Error::Persistence(ref m) if m == "offline"));
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_update_all_is_atomic() {
        let a = task("a", 0);
        let mut b = task("b", 1);
        let mut store = MemoryStore::new(vec![a.clone(), b.clone()]);

        b.order = 7;
        let ghost = task("ghost", 2);
        assert!(store.update_all(vec![b.clone(), ghost]).is_err());
        assert_eq!(store.tasks()[1].order, 1);

        store.update_all(vec![b]).unwrap();
        assert_eq!(store.tasks()[1].order, 7);
    }

    #[test]
    fn test_unknown_ids_are_not_found() {
        let mut store = MemoryStore::default();
        assert!(store.update(task("a", 0)).unwrap_err().is_not_found());
        assert!(store.delete("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_file_store_persists_between_opens() {
        let dir = tempdir().unwrap();
        let created = {
            let mut store = FileStore::open(dir.path(), Board::default_columns()).unwrap();
            assert_eq!(store.columns().len(), 5);
            store.create(task("persisted", 0)).unwrap()
        };

        let store = FileStore::open(dir.path(), Vec::new()).unwrap();
        assert_eq!(store.board().tasks, vec![created]);
        assert_eq!(store.columns().len(), 5);
    }

    #[test]
    fn test_file_store_saves_columns() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path(), Board::default_columns()).unwrap();
        let mut columns = store.columns().to_vec();
        columns[0].is_collapsed = true;
        store.save_columns(&columns).unwrap();

        let reopened = FileStore::open(dir.path(), Board::default_columns()).unwrap();
        assert!(reopened.columns()[0].is_collapsed);
    }

    #[test]
    fn test_file_store_backs_up_corrupted_board() {
        let dir = tempdir().unwrap();
        std::fs::write(board_file(dir.path()), "{ broken").unwrap();

        let store = FileStore::open(dir.path(), Board::default_columns()).unwrap();
        assert!(store.board().tasks.is_empty());
        assert_eq!(store.columns().len(), 5);

        let backups = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".bak."))
            .count();
        assert_eq!(backups, 1);
    }
}
