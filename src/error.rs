use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::task::{ItemId, TaskId};

/// Bad input, caught before anything reaches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("unknown recurrence type: '{0}'")]
    UnknownRecurrence(String),

    #[error("custom_days recurrence needs an interval")]
    MissingInterval,

    #[error("interval must be a positive number of days, got {0}")]
    NonPositiveInterval(i64),

    #[error("interval of {0} days is too large")]
    IntervalTooLarge(i64),
}

#[derive(Error, Debug)]
pub enum TaskError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("task {0} not found")]
    NotFound(TaskId),

    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    #[error("storage error: {0}")]
    Persistence(String),
}

impl TaskError {
    /// Missing items are a store rejection, not a missing task.
    pub fn is_persistence(&self) -> bool {
        matches!(self, TaskError::Persistence(_) | TaskError::ItemNotFound(_))
    }
}

impl From<sqlx::Error> for TaskError {
    fn from(err: sqlx::Error) -> Self {
        TaskError::Persistence(err.to_string())
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let status = match &self {
            TaskError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TaskError::NotFound(_) => StatusCode::NOT_FOUND,
            TaskError::ItemNotFound(_) | TaskError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "task store failure");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let validation: TaskError = ValidationError::EmptyName.into();
        assert_eq!(validation.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(TaskError::NotFound(3).into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            TaskError::ItemNotFound(8).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_sqlx_errors_are_persistence_errors() {
        let err: TaskError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, TaskError::Persistence(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_messages_name_the_violated_constraint() {
        let err: TaskError = ValidationError::NonPositiveInterval(-2).into();
        assert_eq!(err.to_string(), "interval must be a positive number of days, got -2");
        assert_eq!(TaskError::ItemNotFound(12).to_string(), "item 12 not found");
        assert!(TaskError::ItemNotFound(12).is_persistence());
        assert!(!TaskError::NotFound(12).is_persistence());
    }
}
