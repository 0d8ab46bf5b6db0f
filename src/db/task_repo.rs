use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::task::{self, Entity as Task};
use crate::tasks::{self, NewTask, Priority, Status, TaskPatch};

impl From<task::Model> for tasks::Task {
    fn from(model: task::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            // Stored strings predate the three-state enum; unknown values
            // degrade to the defaults instead of failing the whole read.
            status: Status::try_from(model.status.as_str()).unwrap_or_default(),
            priority: Priority::try_from(model.priority.as_str()).unwrap_or_default(),
            title: model.title,
            description: model.description,
            category: model.category,
            tags: model.tags,
            due_date: model.due_date,
            completed_at: model.completed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub async fn create_task(
    db: &DatabaseConnection,
    user_id: &Uuid,
    draft: &NewTask,
) -> Result<task::Model, sea_orm::DbErr> {
    let completed_at = match draft.status {
        Status::Completed => Some(Utc::now().fixed_offset()),
        _ => None,
    };
    let model = task::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(*user_id),
        title: Set(draft.title.clone()),
        description: Set(draft.description.clone()),
        status: Set(draft.status.as_str().to_string()),
        priority: Set(draft.priority.as_str().to_string()),
        category: Set(draft.category.clone()),
        tags: Set(draft.tags.clone()),
        due_date: Set(draft.due_date),
        completed_at: Set(completed_at),
        ..Default::default()
    };
    model.insert(db).await
}

pub async fn list_tasks(
    db: &DatabaseConnection,
    user_id: &Uuid,
) -> Result<Vec<task::Model>, sea_orm::DbErr> {
    Task::find()
        .filter(task::Column::UserId.eq(*user_id))
        .order_by_asc(task::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn find_task(
    db: &DatabaseConnection,
    user_id: &Uuid,
    task_id: &Uuid,
) -> Result<Option<task::Model>, sea_orm::DbErr> {
    Task::find()
        .filter(task::Column::Id.eq(*task_id))
        .filter(task::Column::UserId.eq(*user_id))
        .one(db)
        .await
}

pub async fn update_task(
    db: &DatabaseConnection,
    user_id: &Uuid,
    task_id: &Uuid,
    patch: &TaskPatch,
) -> Result<Option<task::Model>, sea_orm::DbErr> {
    let Some(existing) = find_task(db, user_id, task_id).await? else {
        return Ok(None);
    };
    let mut active: task::ActiveModel = existing.into();
    apply_patch(&mut active, patch, Utc::now().fixed_offset());
    Ok(Some(active.update(db).await?))
}

pub async fn delete_task(
    db: &DatabaseConnection,
    user_id: &Uuid,
    task_id: &Uuid,
) -> Result<bool, sea_orm::DbErr> {
    let result = Task::delete_many()
        .filter(task::Column::Id.eq(*task_id))
        .filter(task::Column::UserId.eq(*user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Applies a partial update to the active model. A status write recomputes
/// `completed_at` on the server: moving into `Completed` stamps the current
/// time, moving out clears it. Any `completed_at` value the client sent is
/// ignored so the two columns cannot disagree.
pub(crate) fn apply_patch(
    active: &mut task::ActiveModel,
    patch: &TaskPatch,
    now: DateTime<FixedOffset>,
) {
    if let Some(title) = &patch.title {
        active.title = Set(title.clone());
    }
    if let Some(description) = &patch.description {
        active.description = Set(Some(description.clone()));
    }
    if let Some(status) = patch.status {
        active.status = Set(status.as_str().to_string());
        active.completed_at = Set(match status {
            Status::Completed => Some(now),
            _ => None,
        });
    }
    if let Some(priority) = patch.priority {
        active.priority = Set(priority.as_str().to_string());
    }
    if let Some(category) = &patch.category {
        active.category = Set(Some(category.clone()));
    }
    if let Some(tags) = &patch.tags {
        active.tags = Set(Some(tags.clone()));
    }
    if let Some(due_date) = patch.due_date {
        active.due_date = Set(Some(due_date));
    }
    active.updated_at = Set(now);
}

#[cfg(test)]
mod tests {
    use sea_orm::ActiveValue;

    use super::*;

    fn blank_active() -> task::ActiveModel {
        <task::ActiveModel as Default>::default()
    }

    #[test]
    fn completing_a_task_stamps_completed_at() {
        let now = Utc::now().fixed_offset();
        let mut active = blank_active();

        apply_patch(&mut active, &TaskPatch::status_only(Status::Completed), now);

        assert_eq!(active.status, Set("completed".to_string()));
        assert_eq!(active.completed_at, Set(Some(now)));
        assert_eq!(active.updated_at, Set(now));
    }

    #[test]
    fn reopening_a_task_clears_completed_at() {
        let now = Utc::now().fixed_offset();
        for status in [Status::Todo, Status::InProgress] {
            let mut active = blank_active();
            active.completed_at = Set(Some(now));

            apply_patch(&mut active, &TaskPatch::status_only(status), now);

            assert_eq!(active.status, Set(status.as_str().to_string()));
            assert_eq!(active.completed_at, Set(None));
        }
    }

    #[test]
    fn patch_without_status_leaves_completed_at_untouched() {
        let now = Utc::now().fixed_offset();
        let mut active = blank_active();
        let patch = TaskPatch {
            title: Some("Buy milk".to_string()),
            ..TaskPatch::default()
        };

        apply_patch(&mut active, &patch, now);

        assert_eq!(active.title, Set("Buy milk".to_string()));
        assert!(matches!(active.completed_at, ActiveValue::NotSet));
    }

    #[test]
    fn client_supplied_completed_at_is_ignored() {
        let now = Utc::now().fixed_offset();
        let mut active = blank_active();
        let patch = TaskPatch {
            status: Some(Status::Todo),
            completed_at: Some(now),
            ..TaskPatch::default()
        };

        apply_patch(&mut active, &patch, now);

        // The status transition wins over whatever the client claimed.
        assert_eq!(active.completed_at, Set(None));
    }
}
