//! Property-based tests for the domain layer and the board codec.

use chrono::{DateTime, Duration, Utc};
use focusboard::clock::{Clock, ManualClock};
use focusboard::domain::filter::apply;
use focusboard::domain::task::{create_task, move_task, start_timer};
use focusboard::domain::{
    Board, ColumnDef, Priority, SortSpec, Subtask, Tag, TagColor, Task, TaskFields, TaskFilter,
    TaskStatus, TaskTimer,
};
use focusboard::persistence::{decode_str, encode_json};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

const EPOCH_MS: i64 = 1_700_000_000_000;

fn now() -> DateTime<Utc> {
    ManualClock::at_epoch_millis(EPOCH_MS).now()
}

fn status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop::sample::select(TaskStatus::all().to_vec())
}

fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::all().to_vec())
}

/// Tasks with a spread of facets so filters have something to bite on
fn task_strategy() -> impl Strategy<Value = (String, String, TaskStatus, Priority, Option<String>, Vec<String>, Option<i64>)> {
    (
        "[a-z ]{1,12}",
        "[a-z ]{0,16}",
        status_strategy(),
        priority_strategy(),
        prop::option::of(prop::sample::select(vec!["ana".to_string(), "bo".to_string()])),
        prop::collection::vec(prop::sample::select(vec!["ui", "api", "docs"]).prop_map(String::from), 0..3),
        prop::option::of(-5i64..5),
    )
}

fn build_tasks(
    specs: Vec<(String, String, TaskStatus, Priority, Option<String>, Vec<String>, Option<i64>)>,
) -> Vec<Task> {
    let now = now();
    let mut tasks = Vec::new();
    for (title, description, status, priority, assignee, tags, due_days) in specs {
        let mut fields = TaskFields::titled(title);
        fields.description = description;
        fields.priority = priority;
        fields.assignee = assignee;
        fields.tags = tags
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|label| Tag::new(label, TagColor::Blue))
            .collect();
        fields.due_date = due_days.map(|d| now + Duration::days(d));
        create_task(&mut tasks, fields, status, now);
    }
    tasks
}

/// Instant within about four months of the fixed epoch, or absent
fn optional_instant_strategy() -> impl Strategy<Value = Option<DateTime<Utc>>> {
    prop::option::of(-10_000_000_000i64..10_000_000_000)
        .prop_map(|offset| offset.map(|ms| now() + Duration::milliseconds(ms)))
}

/// Absent, running, or paused timers
fn timer_strategy() -> impl Strategy<Value = Option<TaskTimer>> {
    prop::option::of((0i64..86_400_000, any::<bool>(), 0i64..3_600_000, 0i64..3_600_000)).prop_map(
        |timer| {
            timer.map(|(ago, is_paused, paused, frozen)| TaskTimer {
                started_at: now() - Duration::milliseconds(ago),
                paused_duration: Duration::milliseconds(paused),
                is_paused,
                frozen_elapsed: if is_paused {
                    Duration::milliseconds(frozen)
                } else {
                    Duration::zero()
                },
            })
        },
    )
}

fn tag_strategy() -> impl Strategy<Value = Tag> {
    (
        "[a-z]{1,8}",
        prop::sample::select(TagColor::all().to_vec()),
    )
        .prop_map(|(label, color)| Tag::new(label, color))
}

fn subtasks_strategy() -> impl Strategy<Value = Vec<Subtask>> {
    prop::collection::vec(("[a-zA-Z ]{1,10}", any::<bool>()), 0..4).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(order, (title, done))| {
                let mut subtask = Subtask::new(title, order as i64);
                subtask.is_completed = done;
                subtask
            })
            .collect()
    })
}

/// Every editable field, absent and present optionals alike
fn fields_strategy() -> impl Strategy<Value = TaskFields> {
    (
        ("[a-zA-Z0-9 ]{1,16}", "[a-zA-Z0-9 \n]{0,24}", priority_strategy()),
        prop::collection::vec(tag_strategy(), 0..3),
        prop::option::of(0u32..100),
        prop::option::of("[a-z]{1,8}"),
        (optional_instant_strategy(), optional_instant_strategy()),
        (prop::option::of(0.0f64..500.0), prop::option::of(0.0f64..500.0)),
        subtasks_strategy(),
        prop::collection::vec("note-[0-9]{1,4}", 0..3),
    )
        .prop_map(
            |(
                (title, description, priority),
                tags,
                points,
                assignee,
                (due_date, start_date),
                (estimated_hours, actual_hours),
                subtasks,
                linked_note_ids,
            )| TaskFields {
                title,
                description,
                priority,
                tags,
                points,
                assignee,
                due_date,
                start_date,
                estimated_hours,
                actual_hours,
                subtasks,
                linked_note_ids,
            },
        )
}

/// A task with every wire field populated or left empty at random
fn full_task_strategy() -> impl Strategy<Value = Task> {
    (
        fields_strategy(),
        status_strategy(),
        0i64..1000,
        timer_strategy(),
        (any::<bool>(), any::<bool>()),
        optional_instant_strategy(),
        0i64..86_400_000,
    )
        .prop_map(
            |(fields, status, order, timer, (is_active, completed), completed_at, edited_ms)| {
                let mut task = Task::new(fields, status, order, now());
                task.timer = timer;
                task.is_active = is_active;
                task.completed = completed;
                task.completed_at = completed_at;
                task.updated_at = task.created_at + Duration::milliseconds(edited_ms);
                task
            },
        )
}

/// Default columns with random WIP limits and collapse flags
fn columns_strategy() -> impl Strategy<Value = Vec<ColumnDef>> {
    prop::collection::vec((prop::option::of(0u32..10), any::<bool>()), 5).prop_map(|flags| {
        Board::default_columns()
            .into_iter()
            .zip(flags)
            .map(|(mut column, (wip_limit, is_collapsed))| {
                column.wip_limit = wip_limit;
                column.is_collapsed = is_collapsed;
                column
            })
            .collect()
    })
}

fn ids(view: &[&Task]) -> HashSet<String> {
    view.iter().map(|t| t.id.clone()).collect()
}

#[test]
fn test_priority_colors_are_distinct() {
    let colors: HashSet<_> = Priority::all().iter().map(|p| p.color()).collect();
    assert_eq!(colors.len(), Priority::all().len());
}

#[test]
fn test_empty_board_round_trips() {
    let board = Board::new(Vec::new(), Vec::new());
    let json = encode_json(&board).unwrap();
    assert_eq!(decode_str(&json), board);
}

proptest! {
    #[test]
    fn test_formatted_time_shape(elapsed_ms in 0i64..(100 * 3600 * 1000)) {
        let start = now();
        let timer = TaskTimer::start(start);
        let text = timer.formatted_time(start + Duration::milliseconds(elapsed_ms));
        let parts: Vec<&str> = text.split(':').collect();
        prop_assert_eq!(parts.len(), 3);
        for part in &parts {
            prop_assert_eq!(part.len(), 2);
            prop_assert!(part.chars().all(|c| c.is_ascii_digit()));
        }
        prop_assert!(parts[1].parse::<u32>().unwrap() < 60);
        prop_assert!(parts[2].parse::<u32>().unwrap() < 60);
    }

    #[test]
    fn test_paused_timer_is_frozen(run_ms in 0i64..3_600_000, idle_ms in 0i64..3_600_000) {
        let start = now();
        let mut timer = TaskTimer::start(start);
        let paused_at = start + Duration::milliseconds(run_ms);
        timer.pause(paused_at);
        let later = paused_at + Duration::milliseconds(idle_ms);
        prop_assert_eq!(timer.elapsed(later), Duration::milliseconds(run_ms));
    }

    #[test]
    fn test_active_timer_follows_timer_presence(start in any::<bool>()) {
        let now = now();
        let mut tasks = Vec::new();
        let task = create_task(&mut tasks, TaskFields::titled("t"), TaskStatus::Todo, now);
        if start {
            start_timer(&mut tasks, &task.id, now).unwrap();
        }
        prop_assert_eq!(tasks[0].has_active_timer(), tasks[0].timer.is_some());
    }

    #[test]
    fn test_codec_round_trip(
        columns in columns_strategy(),
        tasks in prop::collection::vec(full_task_strategy(), 0..12),
    ) {
        let board = Board::new(columns, tasks);
        let json = encode_json(&board).unwrap();
        prop_assert_eq!(decode_str(&json), board);
    }

    #[test]
    fn test_garbage_decodes_to_empty_board(input in "\\PC{0,64}") {
        prop_assume!(!input.trim_start().starts_with('{'));
        let board = decode_str(&input);
        prop_assert!(board.tasks.is_empty());
        prop_assert!(board.columns.is_empty());
    }

    #[test]
    fn test_adding_a_facet_never_widens(
        specs in prop::collection::vec(task_strategy(), 0..16),
        priority in priority_strategy(),
        status in status_strategy(),
        query in "[a-z]{0,2}",
    ) {
        let tasks = build_tasks(specs);
        let sort = SortSpec::default();
        let now = now();

        let mut filter = TaskFilter::default();
        let all = ids(&apply(&tasks, &filter, &sort, now));
        prop_assert_eq!(all.len(), tasks.len());

        filter.priorities.insert(priority);
        let by_priority = ids(&apply(&tasks, &filter, &sort, now));
        prop_assert!(by_priority.is_subset(&all));

        filter.statuses.insert(status);
        let by_status = ids(&apply(&tasks, &filter, &sort, now));
        prop_assert!(by_status.is_subset(&by_priority));

        filter.query = query;
        let by_query = ids(&apply(&tasks, &filter, &sort, now));
        prop_assert!(by_query.is_subset(&by_status));

        filter.overdue_only = true;
        let overdue = ids(&apply(&tasks, &filter, &sort, now));
        prop_assert!(overdue.is_subset(&by_query));
    }

    #[test]
    fn test_move_keeps_orders_contiguous(
        specs in prop::collection::vec(task_strategy(), 1..12),
        pick in any::<prop::sample::Index>(),
        target in status_strategy(),
        index in 0usize..16,
    ) {
        let mut tasks = build_tasks(specs);
        let id = tasks[pick.index(tasks.len())].id.clone();
        move_task(&mut tasks, &id, target, index, now()).unwrap();

        for status in TaskStatus::all() {
            let mut orders: Vec<i64> = tasks
                .iter()
                .filter(|t| t.status == *status)
                .map(|t| t.order)
                .collect();
            orders.sort_unstable();
            let expected: Vec<i64> = (0..orders.len() as i64).collect();
            prop_assert_eq!(orders, expected);
        }
        let moved = tasks.iter().find(|t| t.id == id).unwrap();
        prop_assert_eq!(moved.status, target);
    }
}
