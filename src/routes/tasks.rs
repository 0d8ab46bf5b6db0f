use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    middleware,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    auth::{Claims, jwt::jwt_auth},
    response::{ApiReply, ApiResult},
    services::task_service,
    state::AppState,
    tasks::{NewTask, Task, TaskPatch},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListData {
    pub tasks: Vec<Task>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth))
        .with_state(state)
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    claims: Claims,
) -> ApiResult<TaskListData> {
    let user_id = claims.user_id()?;
    let tasks = task_service::list_tasks(&state.db, &user_id).await?;
    ApiReply::ok(TaskListData { tasks })
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    claims: Claims,
    Json(body): Json<NewTask>,
) -> ApiResult<Task> {
    let user_id = claims.user_id()?;
    let task = task_service::create_task(&state.db, &user_id, body).await?;
    ApiReply::created(task)
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    claims: Claims,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Task> {
    let user_id = claims.user_id()?;
    let task = task_service::get_task(&state.db, &user_id, &task_id).await?;
    ApiReply::ok(task)
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    claims: Claims,
    Path(task_id): Path<Uuid>,
    Json(body): Json<TaskPatch>,
) -> ApiResult<Task> {
    let user_id = claims.user_id()?;
    let task = task_service::update_task(&state.db, &user_id, &task_id, &body).await?;
    ApiReply::ok(task)
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    claims: Claims,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Value> {
    let user_id = claims.user_id()?;
    task_service::delete_task(&state.db, &user_id, &task_id).await?;
    ApiReply::ok_with_message("Task deleted", Value::Null)
}
