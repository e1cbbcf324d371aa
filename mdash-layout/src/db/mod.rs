//! Database access for mdash-layout
//!
//! The service only reads; the default connection is opened read-only.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;

/// Connect to an existing database in read-only mode
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!(
            "Database not found: {}\nRun with --init-schema to create it.",
            db_path.display()
        );
    }

    let db_url = format!("sqlite://{}?mode=ro", db_path.display());

    let pool = SqlitePool::connect(&db_url)
        .await
        .context("Failed to connect to database in read-only mode")?;

    Ok(pool)
}
