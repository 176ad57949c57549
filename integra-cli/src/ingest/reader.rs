//! Decode a spreadsheet file into a raw `DataTable`
//!
//! calamine does the heavy lifting; this module only picks the sheet a
//! source kind expects and maps calamine cells onto `Cell`s.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate};

use super::{HC_SHEET, SourceKind};
use crate::table::{Cell, DataTable};

/// Read the sheet `kind` expects: HC files use the fixed `Base` sheet,
/// execution logs the first sheet in the workbook.
pub fn read_table(path: &Path, kind: SourceKind) -> Result<DataTable> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let sheet_name = match kind {
        SourceKind::Hc => HC_SHEET.to_string(),
        SourceKind::Execution => workbook
            .sheet_names()
            .first()
            .context("workbook has no sheets")?
            .clone(),
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("failed to read sheet '{}'", sheet_name))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataTable::default());
    };
    let columns: Vec<String> = header.iter().map(|c| data_to_cell(c).display()).collect();
    let mut table = DataTable::new(columns);
    for row in rows {
        table.push_row(row.iter().map(data_to_cell).collect());
    }
    Ok(table)
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(trimmed.to_string())
            }
        }
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(d) => Cell::Date(d),
            None => Cell::Empty,
        },
        Data::DateTimeIso(s) => match s.get(..10).and_then(|p| p.parse::<NaiveDate>().ok()) {
            Some(d) => Cell::Date(d),
            None => Cell::Text(s.clone()),
        },
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Excel serial dates count days from 1899-12-30 (the 1900 system with its
/// historical leap-year quirk already folded in). Time-of-day fractions are
/// dropped; these sheets only carry dates.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.trunc() as i64))
}
