use std::collections::HashMap;

use uuid::Uuid;

use crate::tasks::Task;

#[derive(Debug, Clone)]
struct PendingMutation {
    index: usize,
    prior: Task,
    removed: bool,
}

/// Locally cached task list with optimistic mutations. A mutation applies
/// immediately, remembers the prior row, and is either confirmed with the
/// server's row or reverted when the request fails. At most one mutation per
/// task may be in flight; this is the per-row loading guard.
#[derive(Debug, Default)]
pub struct TaskCache {
    tasks: Vec<Task>,
    pending: HashMap<Uuid, PendingMutation>,
    error: Option<String>,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_pending(&self, id: &Uuid) -> bool {
        self.pending.contains_key(id)
    }

    /// Replaces the whole list with server truth. In-flight mutations are
    /// forgotten; the fetched list wins.
    pub fn replace(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.pending.clear();
        self.error = None;
    }

    pub fn insert(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Optimistically applies an updated row. Returns false when the task is
    /// unknown or already has a mutation in flight.
    pub fn begin_update(&mut self, updated: Task) -> bool {
        if self.pending.contains_key(&updated.id) {
            return false;
        }
        let Some(index) = self.tasks.iter().position(|t| t.id == updated.id) else {
            return false;
        };
        let prior = std::mem::replace(&mut self.tasks[index], updated);
        self.pending.insert(
            prior.id,
            PendingMutation {
                index,
                prior,
                removed: false,
            },
        );
        true
    }

    /// Optimistically removes a row. Returns false when the task is unknown
    /// or already has a mutation in flight.
    pub fn begin_delete(&mut self, id: &Uuid) -> bool {
        if self.pending.contains_key(id) {
            return false;
        }
        let Some(index) = self.tasks.iter().position(|t| t.id == *id) else {
            return false;
        };
        let prior = self.tasks.remove(index);
        self.pending.insert(
            *id,
            PendingMutation {
                index,
                prior,
                removed: true,
            },
        );
        true
    }

    /// Settles an in-flight mutation. `Ok(Some(task))` swaps in the server's
    /// row, `Ok(None)` confirms a deletion, `Err` reverts the optimistic
    /// change and records the failure message.
    pub fn resolve(&mut self, id: &Uuid, outcome: Result<Option<Task>, String>) {
        let Some(mutation) = self.pending.remove(id) else {
            return;
        };
        match outcome {
            Ok(Some(confirmed)) => {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == *id) {
                    *task = confirmed;
                }
            }
            Ok(None) => {}
            Err(message) => {
                if mutation.removed {
                    let index = mutation.index.min(self.tasks.len());
                    self.tasks.insert(index, mutation.prior);
                } else if let Some(task) = self.tasks.iter_mut().find(|t| t.id == *id) {
                    *task = mutation.prior;
                }
                self.error = Some(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::tasks::{Priority, Status};

    use super::*;

    fn task(title: &str) -> Task {
        let now = Utc::now().fixed_offset();
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            status: Status::Todo,
            priority: Priority::Medium,
            category: None,
            tags: None,
            due_date: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn seeded() -> (TaskCache, Uuid) {
        let mut cache = TaskCache::new();
        cache.replace(vec![task("Buy milk"), task("Walk dog"), task("Call mom")]);
        let id = cache.tasks()[1].id;
        (cache, id)
    }

    #[test]
    fn update_applies_immediately_and_confirms_with_server_truth() {
        let (mut cache, id) = seeded();
        let mut optimistic = cache.tasks()[1].clone();
        optimistic.status = Status::Completed;

        assert!(cache.begin_update(optimistic));
        assert_eq!(cache.tasks()[1].status, Status::Completed);
        assert!(cache.is_pending(&id));

        let mut confirmed = cache.tasks()[1].clone();
        confirmed.title = "Walk dog (server)".to_string();
        cache.resolve(&id, Ok(Some(confirmed)));

        assert!(!cache.is_pending(&id));
        assert_eq!(cache.tasks()[1].title, "Walk dog (server)");
    }

    #[test]
    fn failed_update_reverts_to_the_prior_row() {
        let (mut cache, id) = seeded();
        let mut optimistic = cache.tasks()[1].clone();
        optimistic.status = Status::Completed;
        cache.begin_update(optimistic);

        cache.resolve(&id, Err("Update task failed".to_string()));

        assert_eq!(cache.tasks()[1].status, Status::Todo);
        assert_eq!(cache.error(), Some("Update task failed"));
        assert!(!cache.is_pending(&id));
    }

    #[test]
    fn second_mutation_on_the_same_row_is_refused_while_one_is_in_flight() {
        let (mut cache, id) = seeded();
        let optimistic = cache.tasks()[1].clone();
        assert!(cache.begin_update(optimistic.clone()));

        assert!(!cache.begin_update(optimistic));
        assert!(!cache.begin_delete(&id));
    }

    #[test]
    fn failed_delete_restores_the_row_at_its_old_position() {
        let (mut cache, id) = seeded();
        assert!(cache.begin_delete(&id));
        assert_eq!(cache.tasks().len(), 2);

        cache.resolve(&id, Err("Delete task failed".to_string()));

        assert_eq!(cache.tasks().len(), 3);
        assert_eq!(cache.tasks()[1].id, id);
        assert_eq!(cache.error(), Some("Delete task failed"));
    }

    #[test]
    fn confirmed_delete_leaves_the_row_out() {
        let (mut cache, id) = seeded();
        cache.begin_delete(&id);

        cache.resolve(&id, Ok(None));

        assert_eq!(cache.tasks().len(), 2);
        assert!(cache.tasks().iter().all(|t| t.id != id));
    }

    #[test]
    fn replace_drops_pending_state_and_errors() {
        let (mut cache, id) = seeded();
        cache.begin_delete(&id);
        cache.resolve(&id, Err("boom".to_string()));

        cache.replace(vec![task("Fresh")]);

        assert_eq!(cache.tasks().len(), 1);
        assert!(cache.error().is_none());
        assert!(!cache.is_pending(&id));
    }
}
