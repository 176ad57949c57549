//! Single-slot store for the most recent upload of each source kind
//!
//! One row per kind, replaced wholesale by an upsert: last upload wins, and
//! a reader always sees one complete table (a single JSON document), never a
//! half-replaced one. No history is kept.

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use sqlx::SqlitePool;

use crate::table::DataTable;

#[derive(Debug, Clone)]
pub struct UploadSlot {
    pub kind: String,
    pub filename: String,
    pub uploaded_at: NaiveDateTime,
    pub table: DataTable,
}

/// Replace the slot for `kind` with a freshly decoded table.
pub async fn save(pool: &SqlitePool, kind: &str, filename: &str, table: &DataTable) -> Result<()> {
    let json = serde_json::to_string(table).context("Failed to serialize upload table")?;
    sqlx::query(
        "INSERT INTO upload_slots (kind, filename, uploaded_at, table_json)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(kind) DO UPDATE SET
             filename = excluded.filename,
             uploaded_at = excluded.uploaded_at,
             table_json = excluded.table_json",
    )
    .bind(kind)
    .bind(filename)
    .bind(Utc::now().naive_utc())
    .bind(json)
    .execute(pool)
    .await
    .context("Failed to store upload slot")?;
    Ok(())
}

/// The last upload of `kind`, if any.
pub async fn load(pool: &SqlitePool, kind: &str) -> Result<Option<UploadSlot>> {
    let row: Option<(String, String, NaiveDateTime, String)> = sqlx::query_as(
        "SELECT kind, filename, uploaded_at, table_json FROM upload_slots WHERE kind = ?",
    )
    .bind(kind)
    .fetch_optional(pool)
    .await
    .context("Failed to load upload slot")?;
    let Some((kind, filename, uploaded_at, json)) = row else {
        return Ok(None);
    };
    let table: DataTable =
        serde_json::from_str(&json).context("Failed to deserialize upload table")?;
    Ok(Some(UploadSlot {
        kind,
        filename,
        uploaded_at,
        table,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::repository::test_pool;
    use crate::table::Cell;

    fn table_with(value: &str) -> DataTable {
        let mut t = DataTable::new(vec!["Badge".into()]);
        t.push_row(vec![Cell::Text(value.into())]);
        t
    }

    #[tokio::test]
    async fn last_upload_wins_per_kind() {
        let pool = test_pool().await;
        save(&pool, "hc", "HC_old.xlsx", &table_with("1")).await.unwrap();
        save(&pool, "hc", "HC_new.xlsx", &table_with("2")).await.unwrap();
        save(&pool, "execution", "Rastreabilidade_Tra.xlsx", &table_with("3"))
            .await
            .unwrap();

        let hc = load(&pool, "hc").await.unwrap().unwrap();
        assert_eq!(hc.filename, "HC_new.xlsx");
        assert_eq!(*hc.table.cell(0, 0), Cell::Text("2".into()));

        let exec = load(&pool, "execution").await.unwrap().unwrap();
        assert_eq!(*exec.table.cell(0, 0), Cell::Text("3".into()));
    }

    #[tokio::test]
    async fn missing_slot_is_none() {
        let pool = test_pool().await;
        assert!(load(&pool, "hc").await.unwrap().is_none());
    }
}
