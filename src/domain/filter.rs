use super::enums::{Priority, SortDirection, SortField, TaskStatus};
use super::task::Task;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Multi-facet task filter.
///
/// Facets combine with AND; within a facet any element matches (OR). An
/// empty facet places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub assignees: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub priorities: BTreeSet<Priority>,
    pub statuses: BTreeSet<TaskStatus>,
    pub query: String,
    pub overdue_only: bool,
}

/// A single-facet edit, as emitted by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Assignees(BTreeSet<String>),
    Tags(BTreeSet<String>),
    Priorities(BTreeSet<Priority>),
    Statuses(BTreeSet<TaskStatus>),
    Query(String),
    OverdueOnly(bool),
    Clear,
}

impl TaskFilter {
    pub fn apply_change(&mut self, change: FilterChange) {
        match change {
            FilterChange::Assignees(set) => self.assignees = set,
            FilterChange::Tags(set) => self.tags = set,
            FilterChange::Priorities(set) => self.priorities = set,
            FilterChange::Statuses(set) => self.statuses = set,
            FilterChange::Query(query) => self.query = query,
            FilterChange::OverdueOnly(flag) => self.overdue_only = flag,
            FilterChange::Clear => *self = TaskFilter::default(),
        }
    }

    /// True when no facet constrains anything
    pub fn is_empty(&self) -> bool {
        self.assignees.is_empty()
            && self.tags.is_empty()
            && self.priorities.is_empty()
            && self.statuses.is_empty()
            && self.query.trim().is_empty()
            && !self.overdue_only
    }

    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> bool {
        if !self.assignees.is_empty()
            && !task
                .assignee
                .as_ref()
                .is_some_and(|a| self.assignees.contains(a))
        {
            return false;
        }
        if !self.tags.is_empty() && !task.tags.iter().any(|t| self.tags.contains(&t.label)) {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&task.priority) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&task.status) {
            return false;
        }
        let query = self.query.trim();
        if !query.is_empty() {
            let needle = query.to_lowercase();
            if !task.title.to_lowercase().contains(&needle)
                && !task.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if self.overdue_only && !task.is_overdue(now) {
            return false;
        }
        true
    }

    /// Short description of active facets, for status lines
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.query.trim().is_empty() {
            parts.push(format!("\"{}\"", self.query.trim()));
        }
        if !self.assignees.is_empty() {
            parts.push(format!("@{}", join(self.assignees.iter())));
        }
        if !self.tags.is_empty() {
            parts.push(format!("#{}", join(self.tags.iter())));
        }
        if !self.priorities.is_empty() {
            parts.push(join(self.priorities.iter().map(|p| p.to_tag())));
        }
        if !self.statuses.is_empty() {
            parts.push(join(self.statuses.iter().map(|s| s.to_tag())));
        }
        if self.overdue_only {
            parts.push("overdue".to_string());
        }
        parts.join(" ")
    }
}

fn join<I, S>(items: I) -> String
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    items.map(|s| s.as_ref().to_string()).collect::<Vec<_>>().join("|")
}

/// Sort key and direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        // Missing due dates go last in either direction
        if self.field == SortField::DueDate {
            return match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => self.directed(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
        }
        let ordering = match self.field {
            SortField::Manual => a.status.cmp(&b.status).then(a.order.cmp(&b.order)),
            SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::DueDate => Ordering::Equal,
        };
        self.directed(ordering)
    }

    fn directed(&self, ordering: Ordering) -> Ordering {
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Filter then stable-sort a task collection
pub fn apply<'a>(
    tasks: &'a [Task],
    filter: &TaskFilter,
    sort: &SortSpec,
    now: DateTime<Utc>,
) -> Vec<&'a Task> {
    let mut view: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t, now)).collect();
    view.sort_by(|a, b| sort.compare(a, b));
    view
}
