//! Clear binary for resetting the upkeep database.
//!
//! Usage: cargo run --bin clear
//!
//! Deletes all entries from all database tables.

mod db;
mod error;
mod schedule;
mod store;
mod task;

use anyhow::Result;
use dotenvy::EnvLoader;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let dotenv = EnvLoader::new()
        .load()
        .unwrap_or_default();

    // Get database URL
    let database_url = dotenv.get("DATABASE_URL")
        .cloned()
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:upkeep.db?mode=rwc".to_string());

    println!("Connecting to database: {}", database_url);

    let pool = db::init_db(&database_url).await?;

    // Tasks first; the cascade would catch them anyway
    println!("Clearing maintenance_tasks table...");
    sqlx::query("DELETE FROM maintenance_tasks")
        .execute(&pool)
        .await?;

    println!("Clearing items table...");
    sqlx::query("DELETE FROM items")
        .execute(&pool)
        .await?;

    println!("All tables cleared successfully!");

    Ok(())
}
