use serde::{Deserialize, Serialize};

/// Board column a task lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Backlog,
    Todo,
    InProgress,
    InReview,
    Done,
}

impl TaskStatus {
    /// Parse status from a tag like "IN_PROGRESS" or "in-progress"
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_uppercase().replace('-', "_").as_str() {
            "BACKLOG" => Some(Self::Backlog),
            "TODO" => Some(Self::Todo),
            "IN_PROGRESS" => Some(Self::InProgress),
            "IN_REVIEW" => Some(Self::InReview),
            "DONE" => Some(Self::Done),
            _ => None,
        }
    }

    /// Wire/tag form, e.g. "IN_PROGRESS"
    pub fn to_tag(&self) -> &'static str {
        match self {
            Self::Backlog => "BACKLOG",
            Self::Todo => "TODO",
            Self::InProgress => "IN_PROGRESS",
            Self::InReview => "IN_REVIEW",
            Self::Done => "DONE",
        }
    }

    /// Default column title
    pub fn title(&self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::InReview => "In Review",
            Self::Done => "Done",
        }
    }

    /// All statuses in board order
    pub fn all() -> &'static [TaskStatus] {
        &[
            TaskStatus::Backlog,
            TaskStatus::Todo,
            TaskStatus::InProgress,
            TaskStatus::InReview,
            TaskStatus::Done,
        ]
    }
}

/// Fixed display colors. Only ever produced by the priority and tag mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Gray,
}

impl DisplayColor {
    pub fn hex(&self) -> &'static str {
        match self {
            Self::Red => "#E5484D",
            Self::Orange => "#F76B15",
            Self::Yellow => "#FFC53D",
            Self::Green => "#30A46C",
            Self::Blue => "#0090FF",
            Self::Purple => "#8E4EC6",
            Self::Pink => "#D6409F",
            Self::Gray => "#8B8D98",
        }
    }
}

/// Task priority
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Priority {
    /// Fixed priority color: HIGH=red, MEDIUM=yellow, LOW=blue, NONE=gray
    pub const fn color(&self) -> DisplayColor {
        match self {
            Self::High => DisplayColor::Red,
            Self::Medium => DisplayColor::Yellow,
            Self::Low => DisplayColor::Blue,
            Self::None => DisplayColor::Gray,
        }
    }

    /// Sort rank, most urgent first
    pub const fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
            Self::None => 3,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_uppercase().as_str() {
            "NONE" => Some(Self::None),
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }

    pub fn to_tag(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    pub fn all() -> &'static [Priority] {
        &[Priority::High, Priority::Medium, Priority::Low, Priority::None]
    }
}

/// Color category of a tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    #[default]
    Gray,
}

impl TagColor {
    pub fn display_color(&self) -> DisplayColor {
        match self {
            Self::Red => DisplayColor::Red,
            Self::Orange => DisplayColor::Orange,
            Self::Yellow => DisplayColor::Yellow,
            Self::Green => DisplayColor::Green,
            Self::Blue => DisplayColor::Blue,
            Self::Purple => DisplayColor::Purple,
            Self::Pink => DisplayColor::Pink,
            Self::Gray => DisplayColor::Gray,
        }
    }

    pub fn all() -> &'static [TagColor] {
        &[
            TagColor::Red,
            TagColor::Orange,
            TagColor::Yellow,
            TagColor::Green,
            TagColor::Blue,
            TagColor::Purple,
            TagColor::Pink,
            TagColor::Gray,
        ]
    }
}

/// Phase of a focus session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocusPhase {
    Work,
    ShortBreak,
    LongBreak,
    Completed,
}

impl FocusPhase {
    pub fn name(&self) -> &'static str {
        match self {
            FocusPhase::Work => "Focus",
            FocusPhase::ShortBreak => "Short break",
            FocusPhase::LongBreak => "Long break",
            FocusPhase::Completed => "Completed",
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, FocusPhase::ShortBreak | FocusPhase::LongBreak)
    }
}

/// How the presentation layer lays out the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Board,
    List,
}

impl ViewMode {
    pub fn toggled(&self) -> Self {
        match self {
            ViewMode::Board => ViewMode::List,
            ViewMode::List => ViewMode::Board,
        }
    }
}

/// Key a task view can be sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Column position: status, then order index
    #[default]
    Manual,
    Priority,
    DueDate,
    CreatedAt,
    UpdatedAt,
    Title,
}

impl SortField {
    pub fn name(&self) -> &'static str {
        match self {
            SortField::Manual => "manual",
            SortField::Priority => "priority",
            SortField::DueDate => "due date",
            SortField::CreatedAt => "created",
            SortField::UpdatedAt => "updated",
            SortField::Title => "title",
        }
    }

    /// Next field when cycling through sort options
    pub fn next(&self) -> Self {
        match self {
            SortField::Manual => SortField::Priority,
            SortField::Priority => SortField::DueDate,
            SortField::DueDate => SortField::CreatedAt,
            SortField::CreatedAt => SortField::UpdatedAt,
            SortField::UpdatedAt => SortField::Title,
            SortField::Title => SortField::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Input mode of the terminal front end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Normal,
    AddingTask,
    EditingTask,
    EditingQuery,
    Focus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_status_from_tag() {
        assert_eq!(TaskStatus::from_tag("TODO"), Some(TaskStatus::Todo));
        assert_eq!(TaskStatus::from_tag("in-progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::from_tag("in_review"), Some(TaskStatus::InReview));
        assert_eq!(TaskStatus::from_tag("INVALID"), None);
    }

    #[test]
    fn test_status_tag_matches_serde() {
        for status in TaskStatus::all() {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.to_tag()));
        }
    }

    #[test]
    fn test_priority_colors() {
        assert_eq!(Priority::High.color(), DisplayColor::Red);
        assert_eq!(Priority::Medium.color(), DisplayColor::Yellow);
        assert_eq!(Priority::Low.color(), DisplayColor::Blue);
        assert_eq!(Priority::None.color(), DisplayColor::Gray);

        let distinct: HashSet<_> = Priority::all().iter().map(|p| p.color()).collect();
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn test_priority_rank_order() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
        assert!(Priority::Low.rank() < Priority::None.rank());
    }

    #[test]
    fn test_sort_field_cycle_returns_to_start() {
        let mut field = SortField::Manual;
        for _ in 0..6 {
            field = field.next();
        }
        assert_eq!(field, SortField::Manual);
    }
}
