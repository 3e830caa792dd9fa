//! Backup binary for copying the upkeep database to a backup file.
//!
//! Usage: cargo run --bin backup
//!        cargo run --bin backup -- --target my_backup.db
//!        cargo run --bin backup -- --db sqlite:other.db --target backup.db
//!
//! Creates a backup of all database entries to a new file.

mod db;
mod error;
mod schedule;
mod store;
mod task;

use anyhow::Result;
use chrono::Datelike;
use clap::Parser;
use dotenvy::EnvLoader;

#[derive(Parser, Debug)]
#[command(name = "backup")]
#[command(about = "Backup the upkeep database to a new file")]
struct Args {
    /// Source database URL (overrides DATABASE_URL from .env)
    #[arg(long)]
    db: Option<String>,

    /// Target backup file path (default: backup_{year}_{month}_{day}.db)
    #[arg(long)]
    target: Option<String>,
}

type ItemRow = (i64, String, Option<String>);
type TaskRow = (
    i64,
    i64,
    String,
    Option<String>,
    String,
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<String>,
);

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let dotenv = EnvLoader::new()
        .load()
        .unwrap_or_default();

    let source_url = args.db
        .or_else(|| dotenv.get("DATABASE_URL").cloned())
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:upkeep.db?mode=rwc".to_string());

    let now = chrono::Utc::now();
    let default_target = format!("backup_{}_{:02}_{:02}.db", now.year(), now.month(), now.day());
    let target_file = args.target.unwrap_or(default_target);
    let target_url = format!("sqlite:{}?mode=rwc", target_file);

    println!("Source database: {}", source_url);
    println!("Target backup: {}", target_file);

    println!("Connecting to source database...");
    let source_pool = db::init_db(&source_url).await?;

    // init_db creates the tables
    println!("Creating target database...");
    let target_pool = db::init_db(&target_url).await?;

    // Items before tasks so the foreign keys resolve
    println!("Copying items...");
    let items: Vec<ItemRow> = sqlx::query_as("SELECT id, name, location FROM items")
        .fetch_all(&source_pool)
        .await?;

    for item in &items {
        sqlx::query("INSERT INTO items (id, name, location) VALUES (?, ?, ?)")
            .bind(item.0)
            .bind(&item.1)
            .bind(&item.2)
            .execute(&target_pool)
            .await?;
    }
    println!("  Copied {} items", items.len());

    println!("Copying maintenance tasks...");
    let tasks: Vec<TaskRow> = sqlx::query_as(
        "SELECT id, item_id, name, description, recurrence_type, recurrence_interval, next_due_date, last_completed, color FROM maintenance_tasks"
    )
    .fetch_all(&source_pool)
    .await?;

    for task in &tasks {
        sqlx::query(
            "INSERT INTO maintenance_tasks (id, item_id, name, description, recurrence_type, recurrence_interval, next_due_date, last_completed, color) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(task.0)
        .bind(task.1)
        .bind(&task.2)
        .bind(&task.3)
        .bind(&task.4)
        .bind(task.5)
        .bind(&task.6)
        .bind(&task.7)
        .bind(&task.8)
        .execute(&target_pool)
        .await?;
    }
    println!("  Copied {} maintenance tasks", tasks.len());

    println!("\nBackup completed successfully!");
    println!("Backup saved to: {}", target_file);

    Ok(())
}
