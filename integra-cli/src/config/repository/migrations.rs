//! Idempotent schema creation, run on every startup

use anyhow::{Context, Result};
use sqlx::SqlitePool;

pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            badge INTEGER NOT NULL,
            name TEXT NOT NULL,
            equipment_type TEXT NOT NULL,
            sector TEXT NOT NULL,
            area TEXT NOT NULL,
            shift TEXT NOT NULL,
            supervisor TEXT NOT NULL,
            integration TEXT NOT NULL,
            effective_date TEXT NOT NULL,
            note TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create employees table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_employees_badge ON employees(badge)")
        .execute(pool)
        .await
        .context("Failed to create badge index")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS config_lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            list_name TEXT NOT NULL,
            value TEXT NOT NULL,
            UNIQUE(list_name, value)
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create config_lists table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS upload_slots (
            kind TEXT PRIMARY KEY,
            filename TEXT NOT NULL,
            uploaded_at TEXT NOT NULL,
            table_json TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create upload_slots table")?;

    Ok(())
}
