//! Project a decoded voice-picking execution log onto the canonical columns
//!
//! Adds the two derived columns: the zone prefix (first character of the
//! zone address) and the trained flag, computed against a snapshot of the
//! voice-equipment badges taken when the file is loaded.

use std::collections::HashSet;

use anyhow::{Result, bail};

use super::header_key;
use crate::recon::normalize::normalize_badge;
use crate::table::{Cell, DataTable};

const EXPECTED: &[(&str, &str)] = &[
    ("endereco", "Zone Address"),
    ("matricula", "Badge"),
    ("nome", "Name"),
    ("data", "Date"),
    ("execucao voz", "Voice Execution"),
];

pub const ZONE_COLUMN: &str = "Zone";
pub const TRAINED_COLUMN: &str = "Trained";

/// Project an execution log. Rows are kept even when the badge fails
/// normalization (the view surfaces them); such rows are simply untrained
/// and unjoinable.
pub fn project(raw: &DataTable, voice_badges: &HashSet<i64>) -> Result<DataTable> {
    let mut indices = Vec::with_capacity(EXPECTED.len());
    for (source, _) in EXPECTED {
        match raw.columns.iter().position(|c| header_key(c) == *source) {
            Some(idx) => indices.push(idx),
            None => bail!("missing expected column '{}'", source),
        }
    }

    let mut columns: Vec<String> = EXPECTED.iter().map(|(_, name)| name.to_string()).collect();
    columns.push(ZONE_COLUMN.to_string());
    columns.push(TRAINED_COLUMN.to_string());
    let mut table = DataTable::new(columns);

    for row in &raw.rows {
        let zone_address = row.get(indices[0]).cloned().unwrap_or(Cell::Empty);
        let badge = row.get(indices[1]).and_then(normalize_badge);
        let name = row.get(indices[2]).cloned().unwrap_or(Cell::Empty);
        let date_cell = row.get(indices[3]).cloned().unwrap_or(Cell::Empty);
        let date = match date_cell.as_date() {
            Some(d) => Cell::Date(d),
            None => date_cell,
        };
        let voice = row.get(indices[4]).cloned().unwrap_or(Cell::Empty);

        let zone = zone_address
            .display()
            .chars()
            .next()
            .map(|c| Cell::Text(c.to_string()))
            .unwrap_or(Cell::Empty);
        let trained = match badge {
            Some(b) if voice_badges.contains(&b) => "Yes",
            _ => "No",
        };

        table.push_row(vec![
            zone_address,
            badge.map(Cell::Int).unwrap_or(Cell::Empty),
            name,
            date,
            voice,
            zone,
            Cell::Text(trained.to_string()),
        ]);
    }
    Ok(table)
}
