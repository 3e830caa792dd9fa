//! The CRUD contract the task manager persists through.

use async_trait::async_trait;

use crate::error::TaskError;
use crate::task::{ItemId, MaintenanceTask, TaskId, ValidTaskFields};

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All tasks belonging to an item, in no particular order.
    async fn list(&self, item_id: ItemId) -> Result<Vec<MaintenanceTask>, TaskError>;

    async fn get(&self, task_id: TaskId) -> Result<MaintenanceTask, TaskError>;

    /// Insert a task and return it with its assigned id.
    /// Fails with `ItemNotFound` when the item does not exist.
    async fn insert(&self, item_id: ItemId, fields: &ValidTaskFields) -> Result<MaintenanceTask, TaskError>;

    /// Overwrite every mutable field. The item reference never changes.
    async fn update(&self, task_id: TaskId, fields: &ValidTaskFields) -> Result<MaintenanceTask, TaskError>;

    async fn delete(&self, task_id: TaskId) -> Result<(), TaskError>;
}
