//! Reconciliation of the persisted roster against uploaded tables
//!
//! Every view here is recomputed from scratch on each call: the upload slots
//! and the store are read fresh, joined, and the result handed to the table
//! engine. Nothing is cached and the inputs are never mutated, so a
//! recomputation with unchanged inputs is idempotent.

pub mod charts;
pub mod join;
pub mod normalize;

use std::collections::HashMap;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::config::VOICE_EQUIPMENT_TYPE;
use crate::config::repository::{employees, uploads};
use crate::ingest::SourceKind;
use crate::table::{Cell, DataTable};
use join::{DedupeKey, dedupe_by_badge, left_join};
use normalize::{STATUS_TEMPORARY, normalize_badge, normalize_shift};

/// Rows of `table` whose `column` displays exactly `value`.
fn filter_equals(table: &DataTable, column: &str, value: &str) -> Result<DataTable> {
    let idx = table
        .column_index(column)
        .with_context(|| format!("table has no '{}' column", column))?;
    let mut out = DataTable::new(table.columns.clone());
    for row in &table.rows {
        if row.get(idx).map(Cell::display).as_deref() == Some(value) {
            out.push_row(row.clone());
        }
    }
    Ok(out)
}

async fn required_slot(pool: &SqlitePool, kind: SourceKind) -> Result<uploads::UploadSlot> {
    uploads::load(pool, kind.slot_key())
        .await?
        .with_context(|| format!("no {} uploaded yet", kind.label()))
}

/// Cross-reference the uploaded execution log against the voice roster.
///
/// The execution log is the left side: unmatched execution rows stay in the
/// output with empty canonical fields, while canonical employees who do not
/// appear in the log are excluded. The canonical side is deduplicated by
/// badge (first stored occurrence wins) before the equipment-type filter is
/// applied.
pub async fn reconcile_execution(pool: &SqlitePool) -> Result<DataTable> {
    let slot = required_slot(pool, SourceKind::Execution).await?;
    let store = employees::projection(pool).await?;
    let deduped = dedupe_by_badge(&store, "Badge")?;
    let voice = filter_equals(&deduped, "Type", VOICE_EQUIPMENT_TYPE)?;
    left_join(&slot.table, &voice, "Badge", "Badge", DedupeKey::First)
}

/// Merge the uploaded HC roster onto the full canonical store.
///
/// Every canonical employee is retained, with HC fields absent when the
/// badge is not in the file. Duplicated badges in the HC file deliberately
/// fan out rather than being collapsed, so data-quality problems in the
/// export stay visible.
pub async fn reconcile_hc(pool: &SqlitePool) -> Result<DataTable> {
    let slot = required_slot(pool, SourceKind::Hc).await?;
    let store = employees::projection(pool).await?;
    left_join(&store, &slot.table, "Badge", "Badge", DedupeKey::None)
}

/// Badge → canonical shift label from the HC roster. A blank HC shift on a
/// Temporary-status row falls back to the store's own shift for that badge;
/// whatever remains blank defaults to `Shift 1`. First-seen HC row wins per
/// badge.
pub fn shift_lookup(hc: &DataTable, store_shifts: &HashMap<i64, String>) -> HashMap<i64, String> {
    let (Some(badge_idx), Some(shift_idx), Some(status_idx)) = (
        hc.column_index("Badge"),
        hc.column_index("Shift"),
        hc.column_index("Status"),
    ) else {
        return HashMap::new();
    };

    let mut lookup = HashMap::new();
    for row in &hc.rows {
        let Some(badge) = row.get(badge_idx).and_then(normalize_badge) else {
            continue;
        };
        if lookup.contains_key(&badge) {
            continue;
        }
        let mut raw = row.get(shift_idx).map(Cell::display).unwrap_or_default();
        let status = row.get(status_idx).map(Cell::display).unwrap_or_default();
        if raw.trim().is_empty() && status == STATUS_TEMPORARY {
            if let Some(fallback) = store_shifts.get(&badge) {
                raw = fallback.clone();
            }
        }
        lookup.insert(badge, normalize_shift(&raw));
    }
    lookup
}
