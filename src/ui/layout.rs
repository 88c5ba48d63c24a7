use crate::domain::ViewMode;
use crate::engine::ColumnSnapshot;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of a collapsed column strip
pub const COLLAPSED_WIDTH: u16 = 5;

/// Main layout structure
pub struct MainLayout {
    pub keybindings_area: Rect,
    pub board_area: Rect,
    pub details_area: Rect,
    pub status_area: Rect,
}

/// Create the main layout
/// - Top bar: keybindings (1 row)
/// - Main area: Board or list (70%) | Details (30%)
/// - Bottom bar: status line (1 row)
pub fn create_layout(area: Rect) -> MainLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Keybindings bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status line
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(main_chunks[1]);

    MainLayout {
        keybindings_area: main_chunks[0],
        board_area: horizontal[0],
        details_area: horizontal[1],
        status_area: main_chunks[2],
    }
}

/// One area per column; collapsed columns get a narrow strip
pub fn column_areas(area: Rect, columns: &[ColumnSnapshot], mode: ViewMode) -> Vec<Rect> {
    if mode == ViewMode::List || columns.is_empty() {
        return Vec::new();
    }
    let expanded = columns.iter().filter(|c| !c.column.is_collapsed).count().max(1) as u32;
    let constraints: Vec<Constraint> = columns
        .iter()
        .map(|c| {
            if c.column.is_collapsed {
                Constraint::Length(COLLAPSED_WIDTH)
            } else {
                Constraint::Ratio(1, expanded)
            }
        })
        .collect();

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area)
        .to_vec()
}

/// Create centered modal area
pub fn create_modal_area(area: Rect, height: u16) -> Rect {
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(height),
            Constraint::Percentage(25),
        ])
        .split(area);

    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(vertical_chunks[1]);

    horizontal_chunks[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Board, TaskStatus};

    fn snapshots(collapsed: &[TaskStatus]) -> Vec<ColumnSnapshot> {
        Board::default_columns()
            .into_iter()
            .map(|mut column| {
                column.is_collapsed = collapsed.contains(&column.status);
                ColumnSnapshot {
                    column,
                    tasks: Vec::new(),
                    total: 0,
                    over_wip_limit: false,
                }
            })
            .collect()
    }

    #[test]
    fn test_create_layout() {
        let area = Rect::new(0, 0, 100, 50);
        let layout = create_layout(area);

        assert_eq!(layout.keybindings_area.height, 1);
        assert_eq!(layout.status_area.height, 1);
        assert!(layout.board_area.width > layout.details_area.width);
        assert_eq!(layout.board_area.height, 48);
    }

    #[test]
    fn test_collapsed_columns_are_narrow() {
        let area = Rect::new(0, 0, 120, 40);
        let areas = column_areas(area, &snapshots(&[TaskStatus::Done]), ViewMode::Board);
        assert_eq!(areas.len(), 5);
        assert_eq!(areas[4].width, COLLAPSED_WIDTH);
        assert!(areas[0].width > COLLAPSED_WIDTH);

        assert!(column_areas(area, &snapshots(&[]), ViewMode::List).is_empty());
    }

    #[test]
    fn test_create_modal_area() {
        let area = Rect::new(0, 0, 100, 50);
        let modal = create_modal_area(area, 12);

        assert!(modal.width < area.width);
        assert_eq!(modal.height, 12);
    }
}
