use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    client::{
        api::{ApiClientError, TaskApi},
        cache::TaskCache,
        filter::{SearchDebounce, TaskFilters, filter_tasks},
        kanban::{self, KanbanColumn},
    },
    events::{EventBus, TaskEvent},
    tasks::{NewTask, Priority, Status, Task, TaskPatch},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Kanban,
}

/// The list view's checkbox toggle: an open task completes, anything else
/// goes back to todo.
pub fn toggle_target(status: Status) -> Status {
    match status {
        Status::Todo => Status::Completed,
        _ => Status::Todo,
    }
}

/// Dashboard state: the cached task list, the active filters, and the view
/// mode. Mutations go through the cache optimistically and are settled with
/// the server's answer.
pub struct Dashboard {
    api: Arc<dyn TaskApi>,
    cache: TaskCache,
    filters: TaskFilters,
    debounce: SearchDebounce,
    view: ViewMode,
    events: broadcast::Receiver<TaskEvent>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn TaskApi>, bus: &EventBus) -> Self {
        Self {
            api,
            cache: TaskCache::new(),
            filters: TaskFilters::default(),
            debounce: SearchDebounce::default(),
            view: ViewMode::default(),
            events: bus.subscribe(),
        }
    }

    pub async fn refresh(&mut self) -> Result<(), ApiClientError> {
        let tasks = self.api.fetch_tasks().await?;
        self.cache.replace(tasks);
        Ok(())
    }

    /// The filtered view of the cache; what the list renders.
    pub fn visible(&self) -> Vec<Task> {
        filter_tasks(self.cache.tasks(), &self.filters)
    }

    /// The filtered view grouped into kanban lanes; what the board renders.
    pub fn lanes(&self) -> Vec<(KanbanColumn, Vec<Task>)> {
        kanban::lanes(&self.visible())
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    pub fn filters(&self) -> &TaskFilters {
        &self.filters
    }

    pub fn error(&self) -> Option<&str> {
        self.cache.error()
    }

    pub fn note_search_keystroke(&mut self, text: &str, now: Instant) {
        self.debounce.note_keystroke(text, now);
    }

    /// Applies a debounced search once its quiet period has elapsed.
    /// Returns true when the filters changed.
    pub fn poll_search(&mut self, now: Instant) -> bool {
        match self.debounce.poll(now) {
            Some(text) => {
                self.filters.search = text;
                true
            }
            None => false,
        }
    }

    pub fn set_priority_filter(&mut self, priority: Option<Priority>) {
        self.filters.priority = priority;
    }

    pub fn set_status_filter(&mut self, status: Option<Status>) {
        self.filters.status = status;
    }

    pub fn set_category_filter(&mut self, category: &str) {
        self.filters.category = category.to_string();
    }

    pub async fn create(&mut self, draft: NewTask) -> Result<(), ApiClientError> {
        let task = self.api.create_task(&draft).await?;
        self.cache.insert(task);
        Ok(())
    }

    /// Checkbox toggle from the list view. Skipped while a mutation for the
    /// same row is still in flight.
    pub async fn toggle_status(&mut self, id: &Uuid) {
        let Some(task) = self.cache.tasks().iter().find(|t| t.id == *id).cloned() else {
            return;
        };
        let target = toggle_target(task.status);
        let mut patch = TaskPatch::status_only(target);
        if target == Status::Completed {
            patch.completed_at = Some(Utc::now().fixed_offset());
        }
        self.apply_patch_optimistically(task, patch).await;
    }

    /// A card dropped on a kanban column. Same-column drops plan nothing and
    /// never touch the network.
    pub async fn drop_on_column(&mut self, id: &Uuid, column_id: &str) {
        let Some(column) = KanbanColumn::from_column_id(column_id) else {
            return;
        };
        let Some(task) = self.cache.tasks().iter().find(|t| t.id == *id).cloned() else {
            return;
        };
        let Some(patch) = kanban::plan_drop(&task, column, Utc::now().fixed_offset()) else {
            return;
        };
        self.apply_patch_optimistically(task, patch).await;
    }

    pub async fn delete(&mut self, id: &Uuid) {
        if !self.cache.begin_delete(id) {
            return;
        }
        let outcome = match self.api.delete_task(id).await {
            Ok(()) => Ok(None),
            Err(err) => Err(err.to_string()),
        };
        self.cache.resolve(id, outcome);
    }

    /// Drains the event bus; a `TasksChanged` signal re-fetches the list.
    /// A lagged receiver means signals were dropped, which still warrants
    /// a refetch.
    pub async fn poll_events(&mut self) -> Result<(), ApiClientError> {
        let mut dirty = false;
        loop {
            match self.events.try_recv() {
                Ok(TaskEvent::TasksChanged) => dirty = true,
                Err(broadcast::error::TryRecvError::Lagged(_)) => dirty = true,
                Err(_) => break,
            }
        }
        if dirty {
            self.refresh().await?;
        }
        Ok(())
    }

    async fn apply_patch_optimistically(&mut self, task: Task, patch: TaskPatch) {
        let id = task.id;
        let mut optimistic = task;
        if let Some(status) = patch.status {
            optimistic.status = status;
            optimistic.completed_at = patch.completed_at;
        }
        if !self.cache.begin_update(optimistic) {
            return;
        }
        let outcome = match self.api.update_task(&id, &patch).await {
            Ok(confirmed) => Ok(Some(confirmed)),
            Err(err) => Err(err.to_string()),
        };
        self.cache.resolve(&id, outcome);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    struct StubApi {
        tasks: Mutex<Vec<Task>>,
        update_calls: Mutex<usize>,
        fetch_calls: Mutex<usize>,
        fail_updates: bool,
    }

    impl StubApi {
        fn seeded(tasks: Vec<Task>) -> Self {
            Self {
                tasks: Mutex::new(tasks),
                ..Self::default()
            }
        }

        fn failing_updates(tasks: Vec<Task>) -> Self {
            Self {
                tasks: Mutex::new(tasks),
                fail_updates: true,
                ..Self::default()
            }
        }

        fn update_calls(&self) -> usize {
            *self.update_calls.lock().unwrap()
        }

        fn fetch_calls(&self) -> usize {
            *self.fetch_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl TaskApi for StubApi {
        async fn fetch_tasks(&self) -> Result<Vec<Task>, ApiClientError> {
            *self.fetch_calls.lock().unwrap() += 1;
            Ok(self.tasks.lock().unwrap().clone())
        }

        async fn create_task(&self, draft: &NewTask) -> Result<Task, ApiClientError> {
            let task = make_task(&draft.title, Status::Todo);
            self.tasks.lock().unwrap().push(task.clone());
            Ok(task)
        }

        async fn update_task(
            &self,
            id: &Uuid,
            patch: &TaskPatch,
        ) -> Result<Task, ApiClientError> {
            *self.update_calls.lock().unwrap() += 1;
            if self.fail_updates {
                return Err(ApiClientError::Http {
                    status: 500,
                    message: "Update task failed".to_string(),
                });
            }
            let mut tasks = self.tasks.lock().unwrap();
            let task = tasks
                .iter_mut()
                .find(|t| t.id == *id)
                .expect("stub should know the task");
            if let Some(status) = patch.status {
                task.status = status;
                task.completed_at = match status {
                    Status::Completed => Some(Utc::now().fixed_offset()),
                    _ => None,
                };
            }
            Ok(task.clone())
        }

        async fn delete_task(&self, id: &Uuid) -> Result<(), ApiClientError> {
            self.tasks.lock().unwrap().retain(|t| t.id != *id);
            Ok(())
        }
    }

    fn make_task(title: &str, status: Status) -> Task {
        let now = Utc::now().fixed_offset();
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.to_string(),
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
    fn toggle_sends_an_open_task_to_completed_and_back() {
        assert_eq!(toggle_target(Status::Todo), Status::Completed);
        assert_eq!(toggle_target(Status::InProgress), Status::Todo);
        assert_eq!(toggle_target(Status::Completed), Status::Todo);
    }

    #[tokio::test]
    async fn refresh_fills_the_cache_and_visible_applies_filters() {
        let api = Arc::new(StubApi::seeded(vec![
            make_task("Buy milk", Status::Todo),
            make_task("Walk dog", Status::Completed),
        ]));
        let bus = EventBus::new();
        let mut dashboard = Dashboard::new(api, &bus);

        dashboard.refresh().await.expect("refresh should succeed");
        assert_eq!(dashboard.visible().len(), 2);

        dashboard.set_status_filter(Some(Status::Todo));
        let visible = dashboard.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Buy milk");
    }

    #[tokio::test]
    async fn toggling_a_todo_task_completes_it() {
        let task = make_task("Buy milk", Status::Todo);
        let id = task.id;
        let api = Arc::new(StubApi::seeded(vec![task]));
        let bus = EventBus::new();
        let mut dashboard = Dashboard::new(api.clone(), &bus);
        dashboard.refresh().await.unwrap();

        dashboard.toggle_status(&id).await;

        assert_eq!(dashboard.visible()[0].status, Status::Completed);
        assert!(dashboard.visible()[0].completed_at.is_some());
        assert_eq!(api.update_calls(), 1);

        // Toggling again reopens the task and clears the stamp.
        dashboard.toggle_status(&id).await;

        assert_eq!(dashboard.visible()[0].status, Status::Todo);
        assert!(dashboard.visible()[0].completed_at.is_none());
    }

    #[tokio::test]
    async fn failed_toggle_reverts_and_records_the_error() {
        let task = make_task("Buy milk", Status::Todo);
        let id = task.id;
        let api = Arc::new(StubApi::failing_updates(vec![task]));
        let bus = EventBus::new();
        let mut dashboard = Dashboard::new(api, &bus);
        dashboard.refresh().await.unwrap();

        dashboard.toggle_status(&id).await;

        assert_eq!(dashboard.visible()[0].status, Status::Todo);
        assert!(dashboard.error().is_some());
    }

    #[tokio::test]
    async fn dropping_a_card_on_its_own_column_never_calls_the_api() {
        let task = make_task("Buy milk", Status::InProgress);
        let id = task.id;
        let api = Arc::new(StubApi::seeded(vec![task]));
        let bus = EventBus::new();
        let mut dashboard = Dashboard::new(api.clone(), &bus);
        dashboard.refresh().await.unwrap();

        dashboard.drop_on_column(&id, "in-progress").await;

        assert_eq!(api.update_calls(), 0);
        assert_eq!(dashboard.visible()[0].status, Status::InProgress);
    }

    #[tokio::test]
    async fn dropping_a_card_on_done_moves_it_to_the_done_lane() {
        let task = make_task("Buy milk", Status::Todo);
        let id = task.id;
        let api = Arc::new(StubApi::seeded(vec![task]));
        let bus = EventBus::new();
        let mut dashboard = Dashboard::new(api, &bus);
        dashboard.refresh().await.unwrap();

        dashboard.drop_on_column(&id, "done").await;

        let lanes = dashboard.lanes();
        assert!(lanes[0].1.is_empty());
        assert_eq!(lanes[2].1.len(), 1);
        assert!(lanes[2].1[0].completed_at.is_some());
    }

    #[tokio::test]
    async fn a_tasks_changed_event_triggers_a_refetch() {
        let api = Arc::new(StubApi::seeded(vec![make_task("Buy milk", Status::Todo)]));
        let bus = EventBus::new();
        let mut dashboard = Dashboard::new(api.clone(), &bus);
        dashboard.refresh().await.unwrap();
        assert_eq!(api.fetch_calls(), 1);

        bus.publish(TaskEvent::TasksChanged);
        tokio::time::sleep(Duration::from_millis(1)).await;
        dashboard.poll_events().await.expect("poll should succeed");

        assert_eq!(api.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn a_lagged_receiver_still_triggers_a_refetch() {
        let api = Arc::new(StubApi::seeded(vec![make_task("Buy milk", Status::Todo)]));
        let bus = EventBus::new();
        let mut dashboard = Dashboard::new(api.clone(), &bus);
        dashboard.refresh().await.unwrap();
        assert_eq!(api.fetch_calls(), 1);

        // Overflow the channel so the receiver falls behind.
        for _ in 0..64 {
            bus.publish(TaskEvent::TasksChanged);
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
        dashboard.poll_events().await.expect("poll should succeed");

        assert_eq!(api.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn debounced_search_applies_after_the_quiet_period() {
        let api = Arc::new(StubApi::seeded(vec![
            make_task("Buy milk", Status::Todo),
            make_task("Walk dog", Status::Todo),
        ]));
        let bus = EventBus::new();
        let mut dashboard = Dashboard::new(api, &bus);
        dashboard.refresh().await.unwrap();

        let start = Instant::now();
        dashboard.note_search_keystroke("milk", start);
        assert!(!dashboard.poll_search(start + Duration::from_millis(100)));
        assert_eq!(dashboard.visible().len(), 2);

        assert!(dashboard.poll_search(start + Duration::from_millis(400)));
        let visible = dashboard.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Buy milk");
    }
}
