//! Project a decoded HC headcount roster onto the canonical column set

use anyhow::{Result, bail};

use super::header_key;
use crate::recon::normalize::{normalize_badge, normalize_status};
use crate::table::{Cell, DataTable};

/// Source header (diacritics-folded, lower-cased) → canonical column name.
const EXPECTED: &[(&str, &str)] = &[
    ("matricula", "Badge"),
    ("cargo", "Job Title"),
    ("situacao", "Status"),
    ("turno", "Shift"),
];

/// Project an HC table: canonical column names, normalized badges and
/// status buckets. Rows whose badge fails normalization are dropped; the
/// drop count is returned alongside the table.
pub fn project(raw: &DataTable) -> Result<(DataTable, usize)> {
    let mut indices = Vec::with_capacity(EXPECTED.len());
    for (source, _) in EXPECTED {
        match raw.columns.iter().position(|c| header_key(c) == *source) {
            Some(idx) => indices.push(idx),
            None => bail!("missing expected column '{}'", source),
        }
    }

    let mut table = DataTable::new(EXPECTED.iter().map(|(_, name)| name.to_string()).collect());
    let mut dropped = 0;
    for row in &raw.rows {
        let Some(badge) = row.get(indices[0]).and_then(normalize_badge) else {
            dropped += 1;
            continue;
        };
        let job_title = row.get(indices[1]).cloned().unwrap_or(Cell::Empty);
        let status = normalize_status(&row.get(indices[2]).map(Cell::display).unwrap_or_default());
        let shift = row.get(indices[3]).cloned().unwrap_or(Cell::Empty);
        table.push_row(vec![
            Cell::Int(badge),
            job_title,
            Cell::Text(status),
            shift,
        ]);
    }
    Ok((table, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> DataTable {
        let mut t = DataTable::new(vec![
            "Matrícula".into(),
            "Cargo".into(),
            "Situação".into(),
            "Turno".into(),
        ]);
        t.push_row(vec![
            Cell::Text("007".into()),
            Cell::Text("Operador".into()),
            Cell::Text("Atividade Normal".into()),
            Cell::Text("1° Turno".into()),
        ]);
        t.push_row(vec![
            Cell::Text("nan".into()),
            Cell::Text("Conferente".into()),
            Cell::Text("Férias".into()),
            Cell::Empty,
        ]);
        t.push_row(vec![
            Cell::Float(12.0),
            Cell::Empty,
            Cell::Empty,
            Cell::Text("2º Turno".into()),
        ]);
        t
    }

    #[test]
    fn projects_normalizes_and_drops_bad_badges() {
        let (table, dropped) = project(&raw()).unwrap();
        assert_eq!(table.columns, vec!["Badge", "Job Title", "Status", "Shift"]);
        assert_eq!(dropped, 1);
        assert_eq!(table.len(), 2);
        assert_eq!(*table.cell(0, 0), Cell::Int(7));
        assert_eq!(*table.cell(0, 2), Cell::Text("Active".into()));
        assert_eq!(*table.cell(1, 0), Cell::Int(12));
        // Blank status buckets to Temporary; the raw shift text is kept.
        assert_eq!(*table.cell(1, 2), Cell::Text("Temporary".into()));
        assert_eq!(*table.cell(1, 3), Cell::Text("2º Turno".into()));
    }

    #[test]
    fn missing_expected_column_aborts_the_file() {
        let t = DataTable::new(vec!["Matrícula".into(), "Cargo".into()]);
        let err = project(&t).unwrap_err();
        assert!(err.to_string().contains("situacao"));
    }

    #[test]
    fn header_matching_ignores_case_and_diacritics() {
        let mut t = DataTable::new(vec![
            "MATRICULA".into(),
            "cargo ".into(),
            "Situacao".into(),
            " TURNO".into(),
        ]);
        t.push_row(vec![
            Cell::Int(1),
            Cell::Empty,
            Cell::Empty,
            Cell::Empty,
        ]);
        assert!(project(&t).is_ok());
    }
}
