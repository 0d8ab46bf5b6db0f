use std::time::{Duration, Instant};

use crate::tasks::{Priority, Status, Task};

/// Active dashboard filters. The default value filters nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilters {
    /// Matched case-insensitively against title and description.
    pub search: String,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    /// Case-insensitive substring match against the task category.
    pub category: String,
}

impl TaskFilters {
    pub fn is_identity(&self) -> bool {
        self.search.trim().is_empty()
            && self.priority.is_none()
            && self.status.is_none()
            && self.category.trim().is_empty()
    }
}

/// Applies every active filter conjunctively: search, then priority, then
/// status, then category. Pure; the input list is never mutated.
pub fn filter_tasks(tasks: &[Task], filters: &TaskFilters) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| matches_search(task, &filters.search))
        .filter(|task| filters.priority.is_none_or(|p| task.priority == p))
        .filter(|task| filters.status.is_none_or(|s| task.status == s))
        .filter(|task| matches_category(task, &filters.category))
        .cloned()
        .collect()
}

fn matches_search(task: &Task, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    if task.title.to_lowercase().contains(&needle) {
        return true;
    }
    task.description
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains(&needle))
}

fn matches_category(task: &Task, category: &str) -> bool {
    let needle = category.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    task.category
        .as_deref()
        .is_some_and(|c| c.to_lowercase().contains(&needle))
}

/// Deadline-based debounce for the search box. Every keystroke resets the
/// deadline; `poll` hands back the text once the quiet period has elapsed.
#[derive(Debug)]
pub struct SearchDebounce {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl SearchDebounce {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn note_keystroke(&mut self, text: &str, now: Instant) {
        self.pending = Some((text.to_string(), now + self.delay));
    }

    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = matches!(&self.pending, Some((_, deadline)) if *deadline <= now);
        if due {
            self.pending.take().map(|(text, _)| text)
        } else {
            None
        }
    }
}

impl Default for SearchDebounce {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn task(title: &str, status: Status, priority: Priority, category: Option<&str>) -> Task {
        let now = Utc::now().fixed_offset();
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            status,
            priority,
            category: category.map(str::to_string),
            tags: None,
            due_date: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            task("Buy milk", Status::Todo, Priority::High, Some("errands")),
            task("Write report", Status::InProgress, Priority::High, Some("work")),
            task("Call mom", Status::Completed, Priority::Low, None),
        ]
    }

    #[test]
    fn default_filters_are_the_identity() {
        let tasks = sample();
        let filters = TaskFilters::default();

        assert!(filters.is_identity());
        assert_eq!(filter_tasks(&tasks, &filters), tasks);
    }

    #[test]
    fn filtering_twice_gives_the_same_result() {
        let tasks = sample();
        let filters = TaskFilters {
            priority: Some(Priority::High),
            ..TaskFilters::default()
        };

        let once = filter_tasks(&tasks, &filters);
        let twice = filter_tasks(&once, &filters);

        assert_eq!(once, twice);
    }

    #[test]
    fn status_filter_keeps_only_matching_tasks() {
        let tasks = sample();
        let filters = TaskFilters {
            status: Some(Status::Completed),
            ..TaskFilters::default()
        };

        let visible = filter_tasks(&tasks, &filters);

        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Call mom");
    }

    #[test]
    fn filters_combine_conjunctively() {
        let tasks = sample();
        let filters = TaskFilters {
            priority: Some(Priority::High),
            status: Some(Status::InProgress),
            ..TaskFilters::default()
        };

        let visible = filter_tasks(&tasks, &filters);

        // Two tasks are high priority, but only one of them is in progress.
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Write report");
    }

    #[test]
    fn search_is_case_insensitive_across_title_and_description() {
        let mut tasks = sample();
        tasks[1].description = Some("needs milk numbers".to_string());

        let filters = TaskFilters {
            search: "MILK".to_string(),
            ..TaskFilters::default()
        };
        let visible = filter_tasks(&tasks, &filters);

        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].title, "Buy milk");
        assert_eq!(visible[1].title, "Write report");
    }

    #[test]
    fn search_with_no_matches_yields_an_empty_list() {
        let filters = TaskFilters {
            search: "zzz".to_string(),
            ..TaskFilters::default()
        };

        assert!(filter_tasks(&sample(), &filters).is_empty());
    }

    #[test]
    fn category_matches_as_a_substring() {
        let filters = TaskFilters {
            category: "err".to_string(),
            ..TaskFilters::default()
        };

        let visible = filter_tasks(&sample(), &filters);

        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Buy milk");
    }

    #[test]
    fn tasks_without_a_category_never_match_a_category_filter() {
        let filters = TaskFilters {
            category: "home".to_string(),
            ..TaskFilters::default()
        };

        assert!(filter_tasks(&sample(), &filters).is_empty());
    }

    #[test]
    fn debounce_waits_for_the_quiet_period() {
        let mut debounce = SearchDebounce::new(Duration::from_millis(300));
        let start = Instant::now();

        debounce.note_keystroke("mi", start);
        assert_eq!(debounce.poll(start + Duration::from_millis(100)), None);

        // A second keystroke resets the deadline.
        debounce.note_keystroke("milk", start + Duration::from_millis(200));
        assert_eq!(debounce.poll(start + Duration::from_millis(400)), None);
        assert_eq!(
            debounce.poll(start + Duration::from_millis(500)),
            Some("milk".to_string())
        );

        // Once delivered, nothing is pending.
        assert_eq!(debounce.poll(start + Duration::from_secs(10)), None);
    }
}
