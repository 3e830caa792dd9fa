use chrono::NaiveDate;

use crate::error::TaskError;
use crate::schedule::next_due_date;
use crate::store::TaskStore;
use crate::task::{sort_tasks, ItemId, MaintenanceTask, TaskFields, TaskId, TaskSort};

/// Lifecycle of the maintenance tasks attached to inventory items.
///
/// Holds no task state of its own: every call is at most one round trip to
/// the store, and nothing is retried.
#[derive(Clone)]
pub struct TaskManager<S> {
    store: S,
}

impl<S: TaskStore> TaskManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list_tasks(&self, item_id: ItemId, sort: TaskSort) -> Result<Vec<MaintenanceTask>, TaskError> {
        let mut tasks = self.store.list(item_id).await?;
        sort_tasks(&mut tasks, sort);
        Ok(tasks)
    }

    pub async fn get_task(&self, task_id: TaskId) -> Result<MaintenanceTask, TaskError> {
        self.store.get(task_id).await
    }

    pub async fn create_task(&self, item_id: ItemId, fields: TaskFields) -> Result<MaintenanceTask, TaskError> {
        let fields = fields.validate().inspect_err(|err| {
            tracing::debug!(item_id, error = %err, "rejected new task");
        })?;

        let task = self.store.insert(item_id, &fields).await?;
        tracing::info!(task_id = task.id, item_id, name = %task.name, "created maintenance task");
        Ok(task)
    }

    /// Full replace: every mutable field comes from `fields`, absent ones are cleared.
    pub async fn update_task(&self, task_id: TaskId, fields: TaskFields) -> Result<MaintenanceTask, TaskError> {
        let fields = fields.validate().inspect_err(|err| {
            tracing::debug!(task_id, error = %err, "rejected task edit");
        })?;

        let task = self.store.update(task_id, &fields).await?;
        tracing::info!(task_id, "updated maintenance task");
        Ok(task)
    }

    pub async fn delete_task(&self, task_id: TaskId) -> Result<(), TaskError> {
        self.store.delete(task_id).await?;
        tracing::info!(task_id, "deleted maintenance task");
        Ok(())
    }

    /// Mark a task done on `today` and schedule its next cycle from that date.
    ///
    /// One-off tasks end up with no next due date.
    pub async fn complete_task(&self, task: &MaintenanceTask, today: NaiveDate) -> Result<MaintenanceTask, TaskError> {
        let mut fields = task.fields();
        fields.last_completed = Some(today);
        fields.next_due = next_due_date(today, task.recurrence);

        let completed = self.store.update(task.id, &fields).await?;
        if !task.recurrence.is_recurring() {
            tracing::info!(task_id = task.id, completed_on = %today, "finished one-off task");
            return Ok(completed);
        }
        tracing::info!(
            task_id = task.id,
            completed_on = %today,
            next_due = ?completed.next_due,
            "completed maintenance task"
        );
        Ok(completed)
    }
}
