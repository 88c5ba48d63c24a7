pub mod board;
pub mod enums;
pub mod filter;
pub mod focus;
pub mod task;
pub mod timer;

pub use board::{columns_from_tasks, Board, ColumnDef, ColumnView, MoveOutcome, WipWarning};
pub use enums::{
    DisplayColor, FocusPhase, Priority, SortDirection, SortField, TagColor, TaskStatus, UiMode,
    ViewMode,
};
pub use filter::{FilterChange, SortSpec, TaskFilter};
pub use focus::{FocusCommand, FocusSession, FocusSessionRecord, FocusSettings, PhaseChange};
pub use task::{Subtask, Tag, Task, TaskFields};
pub use timer::{format_hms, format_ms, TaskTimer};
