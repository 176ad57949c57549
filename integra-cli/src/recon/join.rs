//! Keyed left joins over `DataTable`s
//!
//! Join keys are normalized badges, so `7`, `"007"` and `7.0` all meet.
//! Duplicate handling on the right side is an explicit parameter: the
//! execution reconciliation dedupes its canonical side while the HC
//! reconciliation deliberately keeps fan-out to surface duplicated badges
//! in the source file.

use std::collections::HashMap;

use anyhow::{Result, bail};

use super::normalize::normalize_badge;
use crate::table::{Cell, DataTable};

/// Duplicate-key policy for the right-hand table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeKey {
    /// Keep the first row per key, in table order.
    First,
    /// Keep every row; duplicate keys fan out in the join output.
    None,
}

/// Left-join `right` onto `left` on normalized badge equality. Unmatched
/// left rows are retained with empty right-side cells; right rows whose key
/// fails normalization never match. The right key column is not repeated in
/// the output. Inputs are never mutated.
pub fn left_join(
    left: &DataTable,
    right: &DataTable,
    left_key: &str,
    right_key: &str,
    dedupe: DedupeKey,
) -> Result<DataTable> {
    let Some(left_idx) = left.column_index(left_key) else {
        bail!("left table has no '{}' column", left_key);
    };
    let Some(right_idx) = right.column_index(right_key) else {
        bail!("right table has no '{}' column", right_key);
    };

    let mut lookup: HashMap<i64, Vec<usize>> = HashMap::new();
    for (row_idx, row) in right.rows.iter().enumerate() {
        let Some(badge) = row.get(right_idx).and_then(normalize_badge) else {
            continue;
        };
        let entry = lookup.entry(badge).or_default();
        match dedupe {
            DedupeKey::First if !entry.is_empty() => {}
            _ => entry.push(row_idx),
        }
    }

    let mut columns = left.columns.clone();
    columns.extend(
        right
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != right_idx)
            .map(|(_, c)| c.clone()),
    );
    let right_width = right.columns.len() - 1;

    let mut out = DataTable::new(columns);
    for row in &left.rows {
        let matches = row
            .get(left_idx)
            .and_then(normalize_badge)
            .and_then(|badge| lookup.get(&badge));
        match matches {
            Some(right_rows) if !right_rows.is_empty() => {
                for &r in right_rows {
                    let mut merged = row.clone();
                    merged.extend(
                        right.rows[r]
                            .iter()
                            .enumerate()
                            .filter(|(i, _)| *i != right_idx)
                            .map(|(_, c)| c.clone()),
                    );
                    out.push_row(merged);
                }
            }
            _ => {
                let mut merged = row.clone();
                merged.extend(std::iter::repeat_n(Cell::Empty, right_width));
                out.push_row(merged);
            }
        }
    }
    Ok(out)
}

/// Keep the first row per normalized badge, preserving table order.
pub fn dedupe_by_badge(table: &DataTable, key: &str) -> Result<DataTable> {
    let Some(idx) = table.column_index(key) else {
        bail!("table has no '{}' column", key);
    };
    let mut seen = std::collections::HashSet::new();
    let mut out = DataTable::new(table.columns.clone());
    for row in &table.rows {
        match row.get(idx).and_then(normalize_badge) {
            Some(badge) if !seen.insert(badge) => {}
            _ => out.push_row(row.clone()),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<Cell>>) -> DataTable {
        let mut t = DataTable::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            t.push_row(row);
        }
        t
    }

    #[test]
    fn unmatched_left_rows_keep_empty_right_cells() {
        let left = table(
            &["Badge", "Name"],
            vec![
                vec![Cell::Int(1), Cell::Text("a".into())],
                vec![Cell::Int(9), Cell::Text("b".into())],
            ],
        );
        let right = table(
            &["Badge", "Shift"],
            vec![vec![Cell::Int(1), Cell::Text("Shift 1".into())]],
        );
        let joined = left_join(&left, &right, "Badge", "Badge", DedupeKey::First).unwrap();
        assert_eq!(joined.columns, vec!["Badge", "Name", "Shift"]);
        assert_eq!(joined.len(), 2);
        assert_eq!(*joined.cell(0, 2), Cell::Text("Shift 1".into()));
        assert_eq!(*joined.cell(1, 2), Cell::Empty);
    }

    #[test]
    fn keys_meet_across_representations() {
        let left = table(&["Badge"], vec![vec![Cell::Text("007".into())]]);
        let right = table(
            &["Badge", "X"],
            vec![vec![Cell::Float(7.0), Cell::Text("hit".into())]],
        );
        let joined = left_join(&left, &right, "Badge", "Badge", DedupeKey::First).unwrap();
        assert_eq!(*joined.cell(0, 1), Cell::Text("hit".into()));
    }

    #[test]
    fn dedupe_first_suppresses_fan_out_and_none_preserves_it() {
        let left = table(&["Badge"], vec![vec![Cell::Int(1)]]);
        let right = table(
            &["Badge", "Tag"],
            vec![
                vec![Cell::Int(1), Cell::Text("first".into())],
                vec![Cell::Int(1), Cell::Text("second".into())],
            ],
        );
        let deduped = left_join(&left, &right, "Badge", "Badge", DedupeKey::First).unwrap();
        assert_eq!(deduped.len(), 1);
        assert_eq!(*deduped.cell(0, 1), Cell::Text("first".into()));

        let fanned = left_join(&left, &right, "Badge", "Badge", DedupeKey::None).unwrap();
        assert_eq!(fanned.len(), 2);
    }

    #[test]
    fn missing_key_column_is_an_error() {
        let t = table(&["Badge"], vec![]);
        let err = left_join(&t, &t, "Nope", "Badge", DedupeKey::First).unwrap_err();
        assert!(err.to_string().contains("Nope"));
    }

    #[test]
    fn dedupe_by_badge_keeps_first_occurrence_and_unkeyed_rows() {
        let t = table(
            &["Badge", "Tag"],
            vec![
                vec![Cell::Int(1), Cell::Text("keep".into())],
                vec![Cell::Int(1), Cell::Text("drop".into())],
                vec![Cell::Empty, Cell::Text("unkeyed".into())],
            ],
        );
        let deduped = dedupe_by_badge(&t, "Badge").unwrap();
        assert_eq!(deduped.len(), 2);
        assert_eq!(*deduped.cell(0, 1), Cell::Text("keep".into()));
        assert_eq!(*deduped.cell(1, 1), Cell::Text("unkeyed".into()));
    }
}
