use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::FromRow;

use crate::error::TaskError;
use crate::schedule::Recurrence;
use crate::store::TaskStore;
use crate::task::{ItemId, MaintenanceTask, TaskId, ValidTaskFields};

pub type DbPool = SqlitePool;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub async fn init_db(database_url: &str) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?.foreign_keys(true);
    let pool = SqlitePool::connect_with(options).await?;
    create_tables(&pool).await?;
    Ok(pool)
}

// Each connection to :memory: is its own database, so keep exactly one.
#[cfg(test)]
pub async fn init_memory_db() -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    create_tables(&pool).await?;
    Ok(pool)
}

async fn create_tables(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            location TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS maintenance_tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            item_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            recurrence_type TEXT NOT NULL DEFAULT 'none',
            -- only set for custom_days
            recurrence_interval INTEGER,
            next_due_date TEXT,
            last_completed TEXT,
            color TEXT,
            FOREIGN KEY (item_id) REFERENCES items(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_maintenance_tasks_item_id ON maintenance_tasks(item_id)")
        .execute(pool)
        .await?;

    Ok(())
}

// Insert an item; tasks can only be attached to items that exist
pub async fn insert_item(pool: &DbPool, name: &str, location: Option<&str>) -> Result<ItemId> {
    let result = sqlx::query("INSERT INTO items (name, location) VALUES (?, ?)")
        .bind(name)
        .bind(location)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

// Deleting an item takes its tasks with it
#[cfg(test)]
pub async fn delete_item(pool: &DbPool, item_id: ItemId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM items WHERE id = ?")
        .bind(item_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[derive(Debug, FromRow)]
pub struct DbTask {
    pub id: i64,
    pub item_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub recurrence_type: String,
    pub recurrence_interval: Option<i64>,
    pub next_due_date: Option<String>,
    pub last_completed: Option<String>,
    pub color: Option<String>,
}

// A date that is present but unreadable is a corrupt row, not a missing date
fn parse_date(task_id: TaskId, column: &str, s: &Option<String>) -> Result<Option<NaiveDate>, TaskError> {
    s.as_ref()
        .map(|d| {
            NaiveDate::parse_from_str(d, DATE_FORMAT).map_err(|err| {
                TaskError::Persistence(format!("task {} has unreadable {} '{}': {}", task_id, column, d, err))
            })
        })
        .transpose()
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

impl DbTask {
    pub fn into_task(self) -> Result<MaintenanceTask, TaskError> {
        let recurrence = Recurrence::from_stored(&self.recurrence_type, self.recurrence_interval)
            .ok_or_else(|| {
                TaskError::Persistence(format!(
                    "task {} has unknown recurrence type '{}'",
                    self.id, self.recurrence_type
                ))
            })?;

        let next_due = parse_date(self.id, "next_due_date", &self.next_due_date)?;
        let last_completed = parse_date(self.id, "last_completed", &self.last_completed)?;

        Ok(MaintenanceTask {
            id: self.id,
            item_id: self.item_id,
            next_due,
            last_completed,
            name: self.name,
            description: self.description,
            recurrence,
            color: self.color,
        })
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_foreign_key_violation())
}

#[derive(Clone)]
pub struct SqliteTaskStore {
    pool: DbPool,
}

impl SqliteTaskStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn list(&self, item_id: ItemId) -> Result<Vec<MaintenanceTask>, TaskError> {
        let rows: Vec<DbTask> = sqlx::query_as("SELECT * FROM maintenance_tasks WHERE item_id = ?")
            .bind(item_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(DbTask::into_task).collect()
    }

    async fn get(&self, task_id: TaskId) -> Result<MaintenanceTask, TaskError> {
        let row: Option<DbTask> = sqlx::query_as("SELECT * FROM maintenance_tasks WHERE id = ?")
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(TaskError::NotFound(task_id))?.into_task()
    }

    async fn insert(&self, item_id: ItemId, fields: &ValidTaskFields) -> Result<MaintenanceTask, TaskError> {
        let row: DbTask = sqlx::query_as(
            r#"
            INSERT INTO maintenance_tasks (
                item_id, name, description, recurrence_type, recurrence_interval,
                next_due_date, last_completed, color
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.recurrence.kind_str())
        .bind(fields.recurrence.interval())
        .bind(format_date(fields.next_due))
        .bind(format_date(fields.last_completed))
        .bind(&fields.color)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                TaskError::ItemNotFound(item_id)
            } else {
                err.into()
            }
        })?;

        row.into_task()
    }

    async fn update(&self, task_id: TaskId, fields: &ValidTaskFields) -> Result<MaintenanceTask, TaskError> {
        let row: Option<DbTask> = sqlx::query_as(
            r#"
            UPDATE maintenance_tasks SET
                name = ?,
                description = ?,
                recurrence_type = ?,
                recurrence_interval = ?,
                next_due_date = ?,
                last_completed = ?,
                color = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.recurrence.kind_str())
        .bind(fields.recurrence.interval())
        .bind(format_date(fields.next_due))
        .bind(format_date(fields.last_completed))
        .bind(&fields.color)
        .bind(task_id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(TaskError::NotFound(task_id))?.into_task()
    }

    async fn delete(&self, task_id: TaskId) -> Result<(), TaskError> {
        let result = sqlx::query("DELETE FROM maintenance_tasks WHERE id = ?")
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(TaskError::NotFound(task_id));
        }
        Ok(())
    }
}
