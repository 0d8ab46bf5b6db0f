use chrono::{DateTime, FixedOffset};

use crate::tasks::{Status, Task, TaskPatch};

/// Board lanes in display order. Column ids are the drag-and-drop drop-zone
/// ids, which predate the three-state status names ("in-progress" and "done"
/// rather than "in_progress" and "completed").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KanbanColumn {
    Todo,
    InProgress,
    Done,
}

pub const COLUMNS: [KanbanColumn; 3] = [
    KanbanColumn::Todo,
    KanbanColumn::InProgress,
    KanbanColumn::Done,
];

impl KanbanColumn {
    pub fn column_id(&self) -> &'static str {
        match self {
            KanbanColumn::Todo => "todo",
            KanbanColumn::InProgress => "in-progress",
            KanbanColumn::Done => "done",
        }
    }

    pub fn from_column_id(id: &str) -> Option<Self> {
        match id {
            "todo" => Some(KanbanColumn::Todo),
            "in-progress" => Some(KanbanColumn::InProgress),
            "done" => Some(KanbanColumn::Done),
            _ => None,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            KanbanColumn::Todo => Status::Todo,
            KanbanColumn::InProgress => Status::InProgress,
            KanbanColumn::Done => Status::Completed,
        }
    }

    pub fn for_status(status: Status) -> Self {
        match status {
            Status::Todo => KanbanColumn::Todo,
            Status::InProgress => KanbanColumn::InProgress,
            Status::Completed => KanbanColumn::Done,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KanbanColumn::Todo => "To Do",
            KanbanColumn::InProgress => "In Progress",
            KanbanColumn::Done => "Done",
        }
    }
}

/// Decides what a drop onto `target` means for `task`. Dropping a card back
/// onto its own column is a no-op and produces no patch. Dropping onto Done
/// stamps `completed_at`; dropping onto any other column leaves the server to
/// clear it as part of the status transition.
pub fn plan_drop(
    task: &Task,
    target: KanbanColumn,
    now: DateTime<FixedOffset>,
) -> Option<TaskPatch> {
    let status = target.status();
    if task.status == status {
        return None;
    }
    let mut patch = TaskPatch::status_only(status);
    if status == Status::Completed {
        patch.completed_at = Some(now);
    }
    Some(patch)
}

/// Groups tasks into the three lanes, preserving list order within each.
pub fn lanes(tasks: &[Task]) -> Vec<(KanbanColumn, Vec<Task>)> {
    COLUMNS
        .iter()
        .map(|column| {
            let cards = tasks
                .iter()
                .filter(|t| KanbanColumn::for_status(t.status) == *column)
                .cloned()
                .collect();
            (*column, cards)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::tasks::Priority;

    use super::*;

    fn task(status: Status) -> Task {
        let now = Utc::now().fixed_offset();
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "card".to_string(),
            description: None,
            status,
            priority: Priority::Medium,
            category: None,
            tags: None,
            due_date: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn column_ids_round_trip() {
        for column in COLUMNS {
            assert_eq!(KanbanColumn::from_column_id(column.column_id()), Some(column));
        }
        assert_eq!(KanbanColumn::from_column_id("archive"), None);
    }

    #[test]
    fn dropping_on_the_same_column_plans_nothing() {
        let now = Utc::now().fixed_offset();
        let card = task(Status::InProgress);

        assert!(plan_drop(&card, KanbanColumn::InProgress, now).is_none());
    }

    #[test]
    fn dropping_on_done_completes_and_stamps_the_time() {
        let now = Utc::now().fixed_offset();
        let card = task(Status::Todo);

        let patch = plan_drop(&card, KanbanColumn::Done, now).expect("drop should plan a patch");

        assert_eq!(patch.status, Some(Status::Completed));
        assert_eq!(patch.completed_at, Some(now));
    }

    #[test]
    fn dropping_a_done_card_back_reopens_it_without_a_stamp() {
        let now = Utc::now().fixed_offset();
        let card = task(Status::Completed);

        let patch = plan_drop(&card, KanbanColumn::Todo, now).expect("drop should plan a patch");

        assert_eq!(patch.status, Some(Status::Todo));
        assert_eq!(patch.completed_at, None);
    }

    #[test]
    fn lanes_group_by_status_in_display_order() {
        let tasks = vec![
            task(Status::Completed),
            task(Status::Todo),
            task(Status::InProgress),
            task(Status::Todo),
        ];

        let lanes = lanes(&tasks);

        assert_eq!(lanes[0].0, KanbanColumn::Todo);
        assert_eq!(lanes[0].1.len(), 2);
        assert_eq!(lanes[1].0, KanbanColumn::InProgress);
        assert_eq!(lanes[1].1.len(), 1);
        assert_eq!(lanes[2].0, KanbanColumn::Done);
        assert_eq!(lanes[2].1.len(), 1);
    }
}
