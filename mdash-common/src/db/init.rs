//! Database initialization
//!
//! Creates the `entity_info` and `metric` tables on first run. Every
//! statement is idempotent so opening an existing database is harmless.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (creating if needed) a database file and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_connection(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// In-memory database with schema, for tests and throwaway tooling
///
/// Limited to a single connection: every SQLite `:memory:` connection is
/// its own database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    configure_connection(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

async fn configure_connection(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;
    Ok(())
}

/// Create all tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_entity_info_table(pool).await?;
    create_metric_table(pool).await?;
    Ok(())
}

async fn create_entity_info_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entity_info (
            entity_id TEXT PRIMARY KEY,
            parent_entity_id TEXT REFERENCES entity_info(entity_id),
            entity_name TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            has_child INTEGER NOT NULL DEFAULT 0,
            deep_link_id TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_entity_info_parent ON entity_info(parent_entity_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_metric_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS metric (
            metric_id TEXT NOT NULL,
            parent_entity_id TEXT NOT NULL REFERENCES entity_info(entity_id),
            text TEXT,
            metric_name TEXT NOT NULL,
            metric_type TEXT NOT NULL,
            metric_unit TEXT,
            min_threshold REAL,
            max_threshold REAL,
            sort INTEGER NOT NULL DEFAULT 0,
            graph_layout TEXT,
            PRIMARY KEY (metric_id, parent_entity_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_metric_parent ON metric(parent_entity_id)")
        .execute(pool)
        .await?;

    Ok(())
}
