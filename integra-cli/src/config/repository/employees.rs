//! Persisted employee roster: CRUD, filtered queries and aggregations

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::lists;
use crate::table::{Cell, DataTable};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Employee {
    pub id: i64,
    pub badge: i64,
    pub name: String,
    pub equipment_type: String,
    pub sector: String,
    pub area: String,
    pub shift: String,
    pub supervisor: String,
    pub integration: String,
    pub effective_date: NaiveDate,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub badge: i64,
    pub name: String,
    pub equipment_type: String,
    pub sector: String,
    pub area: String,
    pub shift: String,
    pub supervisor: String,
    pub integration: String,
    pub effective_date: NaiveDate,
    pub note: Option<String>,
}

/// Optional restrictions applied to roster queries and aggregations.
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub name_like: Option<String>,
    pub supervisor_like: Option<String>,
    pub badge: Option<i64>,
    pub shift: Option<String>,
    pub sector: Option<String>,
    pub equipment_type: Option<String>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, f: &EmployeeFilter) {
    if let Some(d) = f.min_date {
        qb.push(" AND effective_date >= ").push_bind(d);
    }
    if let Some(d) = f.max_date {
        qb.push(" AND effective_date <= ").push_bind(d);
    }
    if let Some(name) = &f.name_like {
        qb.push(" AND name LIKE ").push_bind(format!("%{}%", name));
    }
    if let Some(sup) = &f.supervisor_like {
        qb.push(" AND supervisor LIKE ").push_bind(format!("%{}%", sup));
    }
    if let Some(badge) = f.badge {
        qb.push(" AND badge = ").push_bind(badge);
    }
    if let Some(shift) = &f.shift {
        qb.push(" AND shift = ").push_bind(shift.clone());
    }
    if let Some(sector) = &f.sector {
        qb.push(" AND sector = ").push_bind(sector.clone());
    }
    if let Some(t) = &f.equipment_type {
        qb.push(" AND equipment_type = ").push_bind(t.clone());
    }
}

/// Insert a new employee. Categorical fields must be current members of
/// their config lists; the supervisor is stored upper-cased.
pub async fn insert(pool: &SqlitePool, new: &NewEmployee) -> Result<i64> {
    if new.badge <= 0 {
        bail!("badge must be a positive integer");
    }
    if new.name.trim().is_empty() {
        bail!("name is required");
    }
    for (list, value) in [
        ("type", &new.equipment_type),
        ("sector", &new.sector),
        ("area", &new.area),
        ("shift", &new.shift),
        ("integration", &new.integration),
    ] {
        if !lists::contains(pool, list, value).await? {
            bail!("'{}' is not a configured {} value", value, list);
        }
    }

    let result = sqlx::query(
        "INSERT INTO employees
         (badge, name, equipment_type, sector, area, shift, supervisor, integration, effective_date, note)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(new.badge)
    .bind(new.name.trim())
    .bind(&new.equipment_type)
    .bind(&new.sector)
    .bind(&new.area)
    .bind(&new.shift)
    .bind(new.supervisor.trim().to_uppercase())
    .bind(&new.integration)
    .bind(new.effective_date)
    .bind(&new.note)
    .execute(pool)
    .await
    .context("Failed to insert employee")?;
    Ok(result.last_insert_rowid())
}

/// Delete by row id; returns whether a row was removed.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete employee")?;
    Ok(result.rows_affected() > 0)
}

/// Filtered roster, newest effective date first (display order).
pub async fn list(pool: &SqlitePool, filter: &EmployeeFilter) -> Result<Vec<Employee>> {
    let mut qb = QueryBuilder::new("SELECT * FROM employees WHERE 1=1");
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY effective_date DESC, created_at DESC");
    qb.build_query_as::<Employee>()
        .fetch_all(pool)
        .await
        .context("Failed to list employees")
}

/// Aggregation axes for grouped counts.
#[derive(Debug, Clone, Copy)]
pub enum GroupBy {
    Sector,
    Shift,
    EquipmentType,
}

impl GroupBy {
    fn column(self) -> &'static str {
        match self {
            GroupBy::Sector => "sector",
            GroupBy::Shift => "shift",
            GroupBy::EquipmentType => "equipment_type",
        }
    }
}

/// Distinct-badge counts per group value.
pub async fn count_distinct_by(
    pool: &SqlitePool,
    filter: &EmployeeFilter,
    group: GroupBy,
) -> Result<Vec<(String, i64)>> {
    let col = group.column();
    let mut qb = QueryBuilder::new(format!(
        "SELECT {col}, COUNT(DISTINCT badge) FROM employees WHERE 1=1"
    ));
    push_filters(&mut qb, filter);
    qb.push(format!(" GROUP BY {col} ORDER BY {col} ASC"));
    qb.build_query_as::<(String, i64)>()
        .fetch_all(pool)
        .await
        .context("Failed to aggregate employees")
}

/// Row counts (not distinct) per sector, for volume-only analysis.
pub async fn count_rows_by_sector(
    pool: &SqlitePool,
    filter: &EmployeeFilter,
) -> Result<Vec<(String, i64)>> {
    let mut qb = QueryBuilder::new("SELECT sector, COUNT(*) FROM employees WHERE 1=1");
    push_filters(&mut qb, filter);
    qb.push(" GROUP BY sector ORDER BY sector ASC");
    qb.build_query_as::<(String, i64)>()
        .fetch_all(pool)
        .await
        .context("Failed to aggregate employees by sector")
}

/// Daily distinct-badge counts across the filtered range.
pub async fn daily_distinct(
    pool: &SqlitePool,
    filter: &EmployeeFilter,
) -> Result<Vec<(NaiveDate, i64)>> {
    let mut qb = QueryBuilder::new(
        "SELECT effective_date, COUNT(DISTINCT badge) FROM employees WHERE 1=1",
    );
    push_filters(&mut qb, filter);
    qb.push(" GROUP BY effective_date ORDER BY effective_date ASC");
    qb.build_query_as::<(NaiveDate, i64)>()
        .fetch_all(pool)
        .await
        .context("Failed to build daily series")
}

/// Snapshot of the badges currently in the store, optionally restricted to
/// one equipment type. This is what the ingest trained-flag tests against.
pub async fn badge_snapshot(
    pool: &SqlitePool,
    equipment_type: Option<&str>,
) -> Result<HashSet<i64>> {
    let rows: Vec<(i64,)> = if let Some(t) = equipment_type {
        sqlx::query_as("SELECT DISTINCT badge FROM employees WHERE equipment_type = ?")
            .bind(t)
            .fetch_all(pool)
            .await
    } else {
        sqlx::query_as("SELECT DISTINCT badge FROM employees")
            .fetch_all(pool)
            .await
    }
    .context("Failed to snapshot badges")?;
    Ok(rows.into_iter().map(|(b,)| b).collect())
}

/// Badge → shift, first-inserted row wins. Used as the fallback side of the
/// HC shift lookup.
pub async fn shift_map(pool: &SqlitePool) -> Result<HashMap<i64, String>> {
    let rows: Vec<(i64, String)> =
        sqlx::query_as("SELECT badge, shift FROM employees ORDER BY id ASC")
            .fetch_all(pool)
            .await
            .context("Failed to fetch shift map")?;
    let mut map = HashMap::new();
    for (badge, shift) in rows {
        map.entry(badge).or_insert(shift);
    }
    Ok(map)
}

/// Full roster projected to a `DataTable` for joins, in insertion order.
pub async fn projection(pool: &SqlitePool) -> Result<DataTable> {
    let rows: Vec<Employee> = sqlx::query_as("SELECT * FROM employees ORDER BY id ASC")
        .fetch_all(pool)
        .await
        .context("Failed to project employees")?;
    Ok(to_table(&rows))
}

/// Project employee records to the tabular shape shared by every view.
pub fn to_table(rows: &[Employee]) -> DataTable {
    let mut table = DataTable::new(
        [
            "Badge",
            "Name",
            "Type",
            "Sector",
            "Area",
            "Shift",
            "Supervisor",
            "Integration",
            "Date",
            "Note",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    );
    for e in rows {
        table.push_row(vec![
            Cell::Int(e.badge),
            Cell::Text(e.name.clone()),
            Cell::Text(e.equipment_type.clone()),
            Cell::Text(e.sector.clone()),
            Cell::Text(e.area.clone()),
            Cell::Text(e.shift.clone()),
            Cell::Text(e.supervisor.clone()),
            Cell::Text(e.integration.clone()),
            Cell::Date(e.effective_date),
            e.note.clone().map(Cell::Text).unwrap_or(Cell::Empty),
        ]);
    }
    table
}

#[cfg(test)]
pub fn sample_new(badge: i64, name: &str) -> NewEmployee {
    NewEmployee {
        badge,
        name: name.to_string(),
        equipment_type: "Voice".into(),
        sector: "Picking".into(),
        area: "Dry".into(),
        shift: "Shift 1".into(),
        supervisor: "supervisor one".into(),
        integration: "Yes".into(),
        effective_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        note: None,
    }
}
