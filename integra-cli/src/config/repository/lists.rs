//! Configurable value lists (equipment type, sector, area, shift, integration)
//!
//! Storage uniqueness is case-sensitive; the mutation API additionally
//! enforces case-insensitive uniqueness. A value cannot be removed while any
//! employee references it.

use anyhow::{Context, Result, bail};
use sqlx::SqlitePool;

use crate::config::{LIST_NAMES, default_list_values};

pub const MAX_VALUE_LEN: usize = 120;

fn validate_list_name(list: &str) -> Result<()> {
    if !LIST_NAMES.contains(&list) {
        bail!("unknown list '{}'; expected one of {:?}", list, LIST_NAMES);
    }
    Ok(())
}

fn validate_value(value: &str) -> Result<&str> {
    let value = value.trim();
    if value.is_empty() {
        bail!("value must not be empty");
    }
    if value.chars().count() > MAX_VALUE_LEN {
        bail!("value exceeds {} characters", MAX_VALUE_LEN);
    }
    Ok(value)
}

/// Employees column referencing a list, for the in-use deletion block.
fn employees_column(list: &str) -> &'static str {
    match list {
        "type" => "equipment_type",
        "sector" => "sector",
        "area" => "area",
        "shift" => "shift",
        "integration" => "integration",
        _ => unreachable!("validated list name"),
    }
}

/// Seed every empty list with its defaults. Runs at startup; lists the user
/// has touched are left alone.
pub async fn seed_defaults(pool: &SqlitePool) -> Result<()> {
    for list in LIST_NAMES {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM config_lists WHERE list_name = ?")
                .bind(list)
                .fetch_one(pool)
                .await
                .context("Failed to count list values")?;
        if count > 0 {
            continue;
        }
        for value in default_list_values(list) {
            sqlx::query(
                "INSERT INTO config_lists (list_name, value) VALUES (?, ?)
                 ON CONFLICT(list_name, value) DO NOTHING",
            )
            .bind(list)
            .bind(value)
            .execute(pool)
            .await
            .context("Failed to seed list value")?;
        }
    }
    Ok(())
}

/// All values of one list, sorted.
pub async fn values(pool: &SqlitePool, list: &str) -> Result<Vec<String>> {
    validate_list_name(list)?;
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT value FROM config_lists WHERE list_name = ? ORDER BY value ASC")
            .bind(list)
            .fetch_all(pool)
            .await
            .context("Failed to fetch list values")?;
    Ok(rows.into_iter().map(|(v,)| v).collect())
}

/// True when `value` is a member of `list` (exact match, as stored).
pub async fn contains(pool: &SqlitePool, list: &str, value: &str) -> Result<bool> {
    validate_list_name(list)?;
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM config_lists WHERE list_name = ? AND value = ?")
            .bind(list)
            .bind(value)
            .fetch_optional(pool)
            .await
            .context("Failed to check list membership")?;
    Ok(row.is_some())
}

async fn exists_case_insensitive(
    pool: &SqlitePool,
    list: &str,
    value: &str,
    exclude: Option<i64>,
) -> Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM config_lists
         WHERE list_name = ? AND lower(value) = lower(?) AND id != COALESCE(?, -1)",
    )
    .bind(list)
    .bind(value)
    .bind(exclude)
    .fetch_optional(pool)
    .await
    .context("Failed to check value uniqueness")?;
    Ok(row.is_some())
}

pub async fn add(pool: &SqlitePool, list: &str, value: &str) -> Result<()> {
    validate_list_name(list)?;
    let value = validate_value(value)?;
    if exists_case_insensitive(pool, list, value, None).await? {
        bail!("value '{}' already exists in list '{}' (case-insensitive)", value, list);
    }
    sqlx::query("INSERT INTO config_lists (list_name, value) VALUES (?, ?)")
        .bind(list)
        .bind(value)
        .execute(pool)
        .await
        .context("Failed to insert list value")?;
    Ok(())
}

pub async fn rename(pool: &SqlitePool, list: &str, old: &str, new: &str) -> Result<()> {
    validate_list_name(list)?;
    let new = validate_value(new)?;
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM config_lists WHERE list_name = ? AND value = ?")
            .bind(list)
            .bind(old)
            .fetch_optional(pool)
            .await
            .context("Failed to look up list value")?;
    let Some((id,)) = row else {
        bail!("value '{}' not found in list '{}'", old, list);
    };
    if exists_case_insensitive(pool, list, new, Some(id)).await? {
        bail!("value '{}' already exists in list '{}' (case-insensitive)", new, list);
    }
    sqlx::query("UPDATE config_lists SET value = ? WHERE id = ?")
        .bind(new)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to rename list value")?;
    Ok(())
}

/// Remove a value; refused while any employee still references it.
pub async fn remove(pool: &SqlitePool, list: &str, value: &str) -> Result<()> {
    validate_list_name(list)?;
    let column = employees_column(list);
    let query = format!("SELECT id FROM employees WHERE {} = ? LIMIT 1", column);
    let in_use: Option<(i64,)> = sqlx::query_as(&query)
        .bind(value)
        .fetch_optional(pool)
        .await
        .context("Failed to check value usage")?;
    if in_use.is_some() {
        bail!("cannot remove '{}': value is in use by existing employees", value);
    }
    let result = sqlx::query("DELETE FROM config_lists WHERE list_name = ? AND value = ?")
        .bind(list)
        .bind(value)
        .execute(pool)
        .await
        .context("Failed to delete list value")?;
    if result.rows_affected() == 0 {
        bail!("value '{}' not found in list '{}'", value, list);
    }
    Ok(())
}
