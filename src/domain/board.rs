use super::enums::TaskStatus;
use super::task::{self, Task};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};

/// Column definition. Owns no tasks; its list is derived from the flat
/// task collection on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub order: i64,
    pub is_collapsed: bool,
    /// Advisory maximum; exceeding it warns but never blocks
    pub wip_limit: Option<u32>,
}

impl ColumnDef {
    pub fn for_status(status: TaskStatus, order: i64) -> Self {
        Self {
            id: status.to_tag().to_lowercase(),
            title: status.title().to_string(),
            status,
            order,
            is_collapsed: false,
            wip_limit: None,
        }
    }
}

/// One column with its tasks, ascending by order
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView<'a> {
    pub column: &'a ColumnDef,
    pub tasks: Vec<&'a Task>,
}

impl ColumnView<'_> {
    pub fn is_over_wip_limit(&self) -> bool {
        self.column
            .wip_limit
            .is_some_and(|limit| self.tasks.len() > limit as usize)
    }
}

/// Group tasks by status into one view per defined column, even if empty
pub fn columns_from_tasks<'a>(tasks: &'a [Task], column_defs: &'a [ColumnDef]) -> Vec<ColumnView<'a>> {
    let mut defs: Vec<&ColumnDef> = column_defs.iter().collect();
    defs.sort_by_key(|c| c.order);
    defs.into_iter()
        .map(|column| {
            let mut column_tasks: Vec<&Task> =
                tasks.iter().filter(|t| t.status == column.status).collect();
            column_tasks.sort_by_key(|t| t.order);
            ColumnView {
                column,
                tasks: column_tasks,
            }
        })
        .collect()
}

/// Advisory WIP overrun produced by a move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WipWarning {
    pub status: TaskStatus,
    pub count: usize,
    pub limit: u32,
}

/// Result of a board move: the tasks to persist and any WIP overrun
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    pub changed: Vec<Task>,
    pub wip_warning: Option<WipWarning>,
}

/// Columns plus the full task collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    pub columns: Vec<ColumnDef>,
    pub tasks: Vec<Task>,
}

impl Board {
    pub fn new(columns: Vec<ColumnDef>, tasks: Vec<Task>) -> Self {
        Self { columns, tasks }
    }

    /// One column per status, in board order
    pub fn default_columns() -> Vec<ColumnDef> {
        TaskStatus::all()
            .iter()
            .enumerate()
            .map(|(i, status)| ColumnDef::for_status(*status, i as i64))
            .collect()
    }

    pub fn column_views(&self) -> Vec<ColumnView<'_>> {
        columns_from_tasks(&self.tasks, &self.columns)
    }

    pub fn column(&self, status: TaskStatus) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.status == status)
    }

    pub fn column_mut(&mut self, status: TaskStatus) -> Result<&mut ColumnDef> {
        self.columns
            .iter_mut()
            .find(|c| c.status == status)
            .ok_or(Error::ColumnNotFound(status))
    }

    /// Tasks in one column, ascending by order
    pub fn tasks_in(&self, status: TaskStatus) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().filter(|t| t.status == status).collect();
        tasks.sort_by_key(|t| t.order);
        tasks
    }

    /// Move a task; the board reflects it on the next read
    pub fn move_task(
        &mut self,
        task_id: &str,
        to_status: TaskStatus,
        to_index: usize,
        now: DateTime<Utc>,
    ) -> Result<MoveOutcome> {
        if self.column(to_status).is_none() {
            return Err(Error::ColumnNotFound(to_status));
        }
        let changed = task::move_task(&mut self.tasks, task_id, to_status, to_index, now)?;
        let wip_warning = self.wip_warning(to_status);
        if let Some(warning) = &wip_warning {
            tracing::warn!(
                status = ?warning.status,
                count = warning.count,
                limit = warning.limit,
                "WIP limit exceeded"
            );
        }
        Ok(MoveOutcome {
            changed,
            wip_warning,
        })
    }

    /// Current WIP overrun for a column, if any
    pub fn wip_warning(&self, status: TaskStatus) -> Option<WipWarning> {
        let limit = self.column(status)?.wip_limit?;
        let count = self.tasks.iter().filter(|t| t.status == status).count();
        (count > limit as usize).then_some(WipWarning {
            status,
            count,
            limit,
        })
    }

    pub fn toggle_collapsed(&mut self, status: TaskStatus) -> Result<&ColumnDef> {
        let column = self.column_mut(status)?;
        column.is_collapsed = !column.is_collapsed;
        Ok(&*column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::domain::task::{create_task, TaskFields};

    fn clock() -> ManualClock {
        ManualClock::at_epoch_millis(1_700_000_000_000)
    }

    fn board_with(titles: &[(&str, TaskStatus)], clock: &ManualClock) -> Board {
        let mut board = Board::new(Board::default_columns(), Vec::new());
        for (title, status) in titles {
            create_task(&mut board.tasks, TaskFields::titled(*title), *status, clock.now());
        }
        board
    }

    fn column_titles(board: &Board, status: TaskStatus) -> Vec<String> {
        board.tasks_in(status).iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn test_every_column_present_even_if_empty() {
        let clock = clock();
        let board = board_with(&[("a", TaskStatus::Todo)], &clock);
        let views = board.column_views();
        assert_eq!(views.len(), 5);
        assert_eq!(views[0].column.status, TaskStatus::Backlog);
        assert!(views[0].tasks.is_empty());
        assert_eq!(views[1].tasks.len(), 1);
    }

    #[test]
    fn test_columns_sorted_by_task_order() {
        let clock = clock();
        let mut board = board_with(
            &[("a", TaskStatus::Todo), ("b", TaskStatus::Todo), ("c", TaskStatus::Todo)],
            &clock,
        );
        board.tasks[0].order = 10;
        let views = board.column_views();
        let titles: Vec<&str> = views[1].tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_move_todo_to_in_progress_front() {
        let clock = clock();
        let mut board = board_with(
            &[
                ("t0", TaskStatus::Todo),
                ("t1", TaskStatus::Todo),
                ("t2", TaskStatus::Todo),
                ("p0", TaskStatus::InProgress),
            ],
            &clock,
        );
        let id = board.tasks_in(TaskStatus::Todo)[0].id.clone();

        board.move_task(&id, TaskStatus::InProgress, 0, clock.now()).unwrap();

        let in_progress = board.tasks_in(TaskStatus::InProgress);
        assert_eq!(in_progress[0].id, id);
        let todo = board.tasks_in(TaskStatus::Todo);
        assert_eq!(todo[0].order, 0);
        assert_eq!(todo[1].order, 1);
        assert_eq!(column_titles(&board, TaskStatus::Todo), vec!["t1", "t2"]);
    }

    #[test]
    fn test_wip_limit_warns_but_allows_move() {
        let clock = clock();
        let mut board = board_with(
            &[("p0", TaskStatus::InProgress), ("t0", TaskStatus::Todo)],
            &clock,
        );
        board.column_mut(TaskStatus::InProgress).unwrap().wip_limit = Some(1);
        let id = board.tasks_in(TaskStatus::Todo)[0].id.clone();

        let outcome = board.move_task(&id, TaskStatus::InProgress, 1, clock.now()).unwrap();
        assert_eq!(
            outcome.wip_warning,
            Some(WipWarning {
                status: TaskStatus::InProgress,
                count: 2,
                limit: 1
            })
        );
        assert_eq!(board.tasks_in(TaskStatus::InProgress).len(), 2);
        assert!(board.column_views()[2].is_over_wip_limit());
    }

    #[test]
    fn test_move_to_undefined_column_fails() {
        let clock = clock();
        let mut board = board_with(&[("t0", TaskStatus::Todo)], &clock);
        board.columns.retain(|c| c.status != TaskStatus::Done);
        let id = board.tasks[0].id.clone();
        let err = board.move_task(&id, TaskStatus::Done, 0, clock.now()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_toggle_collapsed() {
        let mut board = Board::new(Board::default_columns(), Vec::new());
        assert!(board.toggle_collapsed(TaskStatus::Done).unwrap().is_collapsed);
        assert!(!board.toggle_collapsed(TaskStatus::Done).unwrap().is_collapsed);
    }
}
