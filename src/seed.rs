//! Seed binary for populating the upkeep database with items and their tasks.
//!
//! Usage: cargo run --bin seed
//!        cargo run --bin seed -- --file other_seed.toml
//!
//! Reads seed.toml in the project root. Tasks go through the same validation
//! as the API, so a bad entry is reported and skipped.

mod db;
mod error;
mod manager;
mod schedule;
mod store;
mod task;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use dotenvy::EnvLoader;
use serde::Deserialize;
use std::fs;

use crate::db::SqliteTaskStore;
use crate::manager::TaskManager;
use crate::task::TaskFields;

#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Populate the upkeep database from a TOML file")]
struct Args {
    /// Seed file to read
    #[arg(long, default_value = "seed.toml")]
    file: String,
}

#[derive(Debug, Deserialize)]
struct SeedData {
    items: Vec<SeedItem>,
}

#[derive(Debug, Deserialize)]
struct SeedItem {
    name: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    tasks: Vec<SeedTask>,
}

#[derive(Debug, Deserialize)]
struct SeedTask {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_recurrence")]
    recurrence: String,
    #[serde(default)]
    interval: Option<i64>,
    #[serde(default)]
    next_due: Option<NaiveDate>,
    #[serde(default)]
    color: Option<String>,
}

fn default_recurrence() -> String {
    "none".to_string()
}

impl SeedTask {
    fn to_fields(&self) -> TaskFields {
        TaskFields {
            name: self.name.clone(),
            description: self.description.clone(),
            recurrence_type: self.recurrence.clone(),
            recurrence_interval: self.interval,
            next_due_date: self.next_due,
            last_completed: None,
            color: self.color.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    println!("🌱 Seeding database...");

    let dotenv = EnvLoader::new().load().unwrap_or_default();
    let database_url = dotenv
        .get("DATABASE_URL")
        .cloned()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:upkeep.db?mode=rwc".to_string());
    let pool = db::init_db(&database_url).await?;
    println!("📦 Connected to database: {}", database_url);

    let seed_content = fs::read_to_string(&args.file)?;
    let seed_data: SeedData = toml::from_str(&seed_content)?;
    println!("📋 Found {} items to seed", seed_data.items.len());

    let manager = TaskManager::new(SqliteTaskStore::new(pool.clone()));

    for item in seed_data.items {
        let item_id = db::insert_item(&pool, &item.name, item.location.as_deref()).await?;
        println!("  ✓ Created item: {} (id: {})", item.name, item_id);

        for seed_task in &item.tasks {
            match manager.create_task(item_id, seed_task.to_fields()).await {
                Ok(task) => println!("    ✓ Created task: {} (id: {})", task.name, task.id),
                Err(e) => println!("    ✗ Failed to create task {}: {}", seed_task.name, e),
            }
        }
    }

    println!("✅ Seeding complete!");

    Ok(())
}
