use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::{
    db::task_repo,
    error::AppError,
    tasks::{NewTask, Task, TaskPatch},
};

pub async fn list_tasks(db: &DatabaseConnection, user_id: &Uuid) -> Result<Vec<Task>, AppError> {
    let models = task_repo::list_tasks(db, user_id)
        .await
        .map_err(|err| AppError::from_db(err, "Task fetch failed"))?;
    Ok(models.into_iter().map(Task::from).collect())
}

pub async fn create_task(
    db: &DatabaseConnection,
    user_id: &Uuid,
    mut draft: NewTask,
) -> Result<Task, AppError> {
    draft.title = draft.title.trim().to_string();
    if draft.title.is_empty() {
        return Err(AppError::bad_request("Title required"));
    }

    let model = task_repo::create_task(db, user_id, &draft)
        .await
        .map_err(|err| AppError::from_db(err, "Create task failed"))?;
    Ok(Task::from(model))
}

pub async fn get_task(
    db: &DatabaseConnection,
    user_id: &Uuid,
    task_id: &Uuid,
) -> Result<Task, AppError> {
    task_repo::find_task(db, user_id, task_id)
        .await
        .map_err(|err| AppError::from_db(err, "Task fetch failed"))?
        .map(Task::from)
        .ok_or_else(|| AppError::not_found("Task not found"))
}

pub async fn update_task(
    db: &DatabaseConnection,
    user_id: &Uuid,
    task_id: &Uuid,
    patch: &TaskPatch,
) -> Result<Task, AppError> {
    if let Some(title) = &patch.title
        && title.trim().is_empty()
    {
        return Err(AppError::bad_request("Title required"));
    }

    task_repo::update_task(db, user_id, task_id, patch)
        .await
        .map_err(|err| AppError::from_db(err, "Update task failed"))?
        .map(Task::from)
        .ok_or_else(|| AppError::not_found("Task not found"))
}

pub async fn delete_task(
    db: &DatabaseConnection,
    user_id: &Uuid,
    task_id: &Uuid,
) -> Result<(), AppError> {
    let deleted = task_repo::delete_task(db, user_id, task_id)
        .await
        .map_err(|err| AppError::from_db(err, "Delete task failed"))?;
    if !deleted {
        return Err(AppError::not_found("Task not found"));
    }
    Ok(())
}
