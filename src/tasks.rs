use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::config;
use crate::db::SqliteTaskStore;
use crate::error::TaskError;
use crate::manager::TaskManager;
use crate::task::{ItemId, TaskFields, TaskId, TaskRecord, TaskSort};

pub type AppState = TaskManager<SqliteTaskStore>;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items/{item_id}/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", get(show_task).put(update_task).delete(delete_task))
        .route("/tasks/{id}/complete", post(complete_task))
}

#[derive(Deserialize, Default)]
pub struct ListQuery {
    #[serde(default)]
    pub sort: TaskSort,
}

// GET /items/{item_id}/tasks
async fn list_tasks(
    State(manager): State<AppState>,
    Path(item_id): Path<ItemId>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TaskRecord>>, TaskError> {
    let today = config::today();
    let tasks = manager.list_tasks(item_id, query.sort).await?;
    Ok(Json(tasks.iter().map(|t| t.to_record(today)).collect()))
}

// POST /items/{item_id}/tasks
async fn create_task(
    State(manager): State<AppState>,
    Path(item_id): Path<ItemId>,
    Json(fields): Json<TaskFields>,
) -> Result<(StatusCode, Json<TaskRecord>), TaskError> {
    let task = manager.create_task(item_id, fields).await?;
    Ok((StatusCode::CREATED, Json(task.to_record(config::today()))))
}

// GET /tasks/{id}
async fn show_task(State(manager): State<AppState>, Path(id): Path<TaskId>) -> Result<Json<TaskRecord>, TaskError> {
    let task = manager.get_task(id).await?;
    Ok(Json(task.to_record(config::today())))
}

// PUT /tasks/{id} - the body is the whole form, missing fields are cleared
async fn update_task(
    State(manager): State<AppState>,
    Path(id): Path<TaskId>,
    Json(fields): Json<TaskFields>,
) -> Result<Json<TaskRecord>, TaskError> {
    let task = manager.update_task(id, fields).await?;
    Ok(Json(task.to_record(config::today())))
}

// DELETE /tasks/{id}
async fn delete_task(State(manager): State<AppState>, Path(id): Path<TaskId>) -> Result<StatusCode, TaskError> {
    manager.delete_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /tasks/{id}/complete
async fn complete_task(State(manager): State<AppState>, Path(id): Path<TaskId>) -> Result<Json<TaskRecord>, TaskError> {
    let today = config::today();
    let task = manager.get_task(id).await?;
    let completed = manager.complete_task(&task, today).await?;
    Ok(Json(completed.to_record(today)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::task::TaskStatus;

    async fn setup() -> (AppState, ItemId) {
        let pool = db::init_memory_db().await.unwrap();
        let item_id = db::insert_item(&pool, "Water heater", Some("Garage")).await.unwrap();
        (TaskManager::new(SqliteTaskStore::new(pool)), item_id)
    }

    fn body(json: &str) -> Json<TaskFields> {
        Json(serde_json::from_str(json).unwrap())
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let (state, item_id) = setup().await;

        let (status, Json(created)) = create_task(
            State(state.clone()),
            Path(item_id),
            body(r#"{"name": "Flush tank", "recurrence_type": "yearly"}"#),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.recurrence_type, "yearly");
        assert_eq!(created.status, TaskStatus::Unscheduled);

        let Json(listed) = list_tasks(State(state), Path(item_id), Query(ListQuery::default()))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
    }

    #[tokio::test]
    async fn test_create_with_blank_name_is_unprocessable() {
        let (state, item_id) = setup().await;

        let err = create_task(State(state), Path(item_id), body(r#"{"name": "  "}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
    }

    #[tokio::test]
    async fn test_complete_sets_last_completed_to_today() {
        let (state, item_id) = setup().await;
        let (_, Json(created)) = create_task(
            State(state.clone()),
            Path(item_id),
            body(r#"{"name": "Check anode", "recurrence_type": "custom_days", "recurrence_interval": 10}"#),
        )
        .await
        .unwrap();

        let Json(completed) = complete_task(State(state), Path(created.id)).await.unwrap();

        let today = config::today();
        assert_eq!(completed.last_completed, Some(today));
        assert_eq!(completed.next_due_date, Some(today + chrono::Days::new(10)));
        assert_eq!(completed.status, TaskStatus::Upcoming);
    }

    #[tokio::test]
    async fn test_missing_task_routes() {
        let (state, _) = setup().await;

        assert!(matches!(
            complete_task(State(state.clone()), Path(8)).await,
            Err(TaskError::NotFound(8))
        ));
        assert!(matches!(
            delete_task(State(state.clone()), Path(8)).await,
            Err(TaskError::NotFound(8))
        ));
        assert!(matches!(
            update_task(State(state), Path(8), body(r#"{"name": "x"}"#)).await,
            Err(TaskError::NotFound(8))
        ));
    }

    #[tokio::test]
    async fn test_delete_returns_no_content() {
        let (state, item_id) = setup().await;
        let (_, Json(created)) = create_task(State(state.clone()), Path(item_id), body(r#"{"name": "Drain"}"#))
            .await
            .unwrap();

        let status = delete_task(State(state.clone()), Path(created.id)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(matches!(show_task(State(state), Path(created.id)).await, Err(TaskError::NotFound(_))));
    }
}
