//! Chart payloads: grouped counts, daily series and cross-tabulations
//!
//! Store-backed aggregates run as SQL; upload-backed aggregates recompute
//! from the current slots. Everything serializes straight to JSON for the
//! chart consumer.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use serde::Serialize;
use sqlx::SqlitePool;

use super::normalize::{SHIFT_1, SHIFT_2, normalize_badge, normalize_compliance};
use super::shift_lookup;
use crate::config::repository::employees::{self, EmployeeFilter, GroupBy};
use crate::config::repository::uploads;
use crate::ingest::SourceKind;
use crate::table::Cell;

/// Daily points are pinned to mid-day so a naive-to-local conversion can
/// never land on a daylight-saving boundary.
static MIDDAY: Lazy<NaiveTime> = Lazy::new(|| NaiveTime::from_hms_opt(12, 0, 0).unwrap());

#[derive(Debug, Serialize)]
pub struct CountRow {
    pub label: String,
    pub count: i64,
}

fn count_rows(raw: Vec<(String, i64)>) -> Vec<CountRow> {
    raw.into_iter()
        .map(|(label, count)| CountRow { label, count })
        .collect()
}

/// Grouped distinct-badge counts plus the volume-only sector variant.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub by_sector: Vec<CountRow>,
    pub by_shift: Vec<CountRow>,
    pub by_type: Vec<CountRow>,
    pub sector_volume: Vec<CountRow>,
}

pub async fn summary(pool: &SqlitePool, filter: &EmployeeFilter) -> Result<Summary> {
    Ok(Summary {
        by_sector: count_rows(employees::count_distinct_by(pool, filter, GroupBy::Sector).await?),
        by_shift: count_rows(employees::count_distinct_by(pool, filter, GroupBy::Shift).await?),
        by_type: count_rows(
            employees::count_distinct_by(pool, filter, GroupBy::EquipmentType).await?,
        ),
        sector_volume: count_rows(employees::count_rows_by_sector(pool, filter).await?),
    })
}

#[derive(Debug, Serialize)]
pub struct DailyPoint {
    pub timestamp: NaiveDateTime,
    pub count: i64,
}

/// Daily distinct-badge series over the filtered range, mid-day stamped.
pub async fn daily(pool: &SqlitePool, filter: &EmployeeFilter) -> Result<Vec<DailyPoint>> {
    let rows = employees::daily_distinct(pool, filter).await?;
    Ok(rows
        .into_iter()
        .map(|(date, count)| DailyPoint {
            timestamp: date.and_time(*MIDDAY),
            count,
        })
        .collect())
}

#[derive(Debug, Serialize)]
pub struct CrossTabRow {
    pub status: String,
    pub counts: Vec<i64>,
    pub total: i64,
}

/// Status × compliance counts. `columns` is a subset of {"Yes", "No"};
/// a column with no data at all is dropped entirely.
#[derive(Debug, Serialize)]
pub struct CrossTab {
    pub columns: Vec<String>,
    pub rows: Vec<CrossTabRow>,
}

/// Cross-tabulate HC roster status against voice-execution compliance,
/// counting each badge once. Badges without an HC status row, and execution
/// rows whose compliance is blank, stay out of the denominator.
pub async fn compliance_crosstab(pool: &SqlitePool) -> Result<CrossTab> {
    let hc = super::required_slot(pool, SourceKind::Hc).await?;
    let exec = super::required_slot(pool, SourceKind::Execution).await?;

    let mut status_by_badge: HashMap<i64, String> = HashMap::new();
    if let (Some(badge_idx), Some(status_idx)) =
        (hc.table.column_index("Badge"), hc.table.column_index("Status"))
    {
        for row in &hc.table.rows {
            if let Some(badge) = row.get(badge_idx).and_then(normalize_badge) {
                status_by_badge
                    .entry(badge)
                    .or_insert_with(|| row.get(status_idx).map(Cell::display).unwrap_or_default());
            }
        }
    }

    // A badge complies when any of its rows records a positive mention.
    let mut compliance_by_badge: HashMap<i64, &'static str> = HashMap::new();
    if let (Some(badge_idx), Some(voice_idx)) = (
        exec.table.column_index("Badge"),
        exec.table.column_index("Voice Execution"),
    ) {
        for row in &exec.table.rows {
            let Some(badge) = row.get(badge_idx).and_then(normalize_badge) else {
                continue;
            };
            let Some(bucket) =
                normalize_compliance(&row.get(voice_idx).map(Cell::display).unwrap_or_default())
            else {
                continue;
            };
            let entry = compliance_by_badge.entry(badge).or_insert(bucket);
            if bucket == "Yes" {
                *entry = "Yes";
            }
        }
    }

    let mut counts: BTreeMap<String, (i64, i64)> = BTreeMap::new();
    for (badge, bucket) in &compliance_by_badge {
        let Some(status) = status_by_badge.get(badge) else {
            continue;
        };
        let entry = counts.entry(status.clone()).or_default();
        match *bucket {
            "Yes" => entry.0 += 1,
            _ => entry.1 += 1,
        }
    }

    let yes_total: i64 = counts.values().map(|(y, _)| y).sum();
    let no_total: i64 = counts.values().map(|(_, n)| n).sum();
    let mut columns = Vec::new();
    if yes_total > 0 {
        columns.push("Yes".to_string());
    }
    if no_total > 0 {
        columns.push("No".to_string());
    }

    let mut rows: Vec<CrossTabRow> = counts
        .into_iter()
        .map(|(status, (yes, no))| {
            let mut row_counts = Vec::new();
            if yes_total > 0 {
                row_counts.push(yes);
            }
            if no_total > 0 {
                row_counts.push(no);
            }
            CrossTabRow {
                status,
                total: yes + no,
                counts: row_counts,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.status.cmp(&b.status)));

    Ok(CrossTab { columns, rows })
}

#[derive(Debug, Serialize)]
pub struct ShiftDay {
    pub date: NaiveDate,
    pub voice_yes: i64,
    pub trained_yes: i64,
}

#[derive(Debug, Serialize)]
pub struct ShiftSeries {
    pub shift: String,
    pub days: Vec<ShiftDay>,
}

/// Per-shift daily counts of voice-execution-yes vs trained-yes rows from
/// the execution log, with shifts resolved through the HC lookup and its
/// store fallback. Only the two canonical shifts are reported.
pub async fn shift_series(pool: &SqlitePool) -> Result<Vec<ShiftSeries>> {
    let exec = super::required_slot(pool, SourceKind::Execution).await?;
    let store_shifts = employees::shift_map(pool).await?;
    let lookup = match uploads::load(pool, SourceKind::Hc.slot_key()).await? {
        Some(hc) => shift_lookup(&hc.table, &store_shifts),
        None => HashMap::new(),
    };

    let (Some(badge_idx), Some(date_idx), Some(voice_idx), Some(trained_idx)) = (
        exec.table.column_index("Badge"),
        exec.table.column_index("Date"),
        exec.table.column_index("Voice Execution"),
        exec.table.column_index("Trained"),
    ) else {
        anyhow::bail!("execution table is missing expected columns");
    };

    let mut days: BTreeMap<(String, NaiveDate), (i64, i64)> = BTreeMap::new();
    for row in &exec.table.rows {
        let Some(date) = row.get(date_idx).and_then(Cell::as_date) else {
            continue;
        };
        let shift = row
            .get(badge_idx)
            .and_then(normalize_badge)
            .and_then(|b| lookup.get(&b).cloned())
            .unwrap_or_else(|| SHIFT_1.to_string());
        let entry = days.entry((shift, date)).or_default();
        let voice = row.get(voice_idx).map(Cell::display).unwrap_or_default();
        if normalize_compliance(&voice) == Some("Yes") {
            entry.0 += 1;
        }
        if row.get(trained_idx).map(Cell::display).as_deref() == Some("Yes") {
            entry.1 += 1;
        }
    }

    let mut series = Vec::new();
    for shift in [SHIFT_1, SHIFT_2] {
        let points: Vec<ShiftDay> = days
            .iter()
            .filter(|((s, _), _)| s == shift)
            .map(|((_, date), (voice_yes, trained_yes))| ShiftDay {
                date: *date,
                voice_yes: *voice_yes,
                trained_yes: *trained_yes,
            })
            .collect();
        series.push(ShiftSeries {
            shift: shift.to_string(),
            days: points,
        });
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::repository::employees::sample_new;
    use crate::config::repository::test_pool;
    use crate::table::DataTable;

    fn exec_table(rows: &[(i64, &str, &str, &str)]) -> DataTable {
        let mut t = DataTable::new(
            ["Zone Address", "Badge", "Name", "Date", "Voice Execution", "Zone", "Trained"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        for (badge, date, voice, trained) in rows {
            t.push_row(vec![
                Cell::Text("A-01".into()),
                Cell::Int(*badge),
                Cell::Text("emp".into()),
                Cell::Text(date.to_string()),
                if voice.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(voice.to_string())
                },
                Cell::Text("A".into()),
                Cell::Text(trained.to_string()),
            ]);
        }
        t
    }

    fn hc_table(rows: &[(i64, &str, &str)]) -> DataTable {
        let mut t = DataTable::new(
            ["Badge", "Job Title", "Status", "Shift"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        for (badge, status, shift) in rows {
            t.push_row(vec![
                Cell::Int(*badge),
                Cell::Empty,
                Cell::Text(status.to_string()),
                Cell::Text(shift.to_string()),
            ]);
        }
        t
    }

    #[tokio::test]
    async fn summary_and_daily_come_from_the_store() {
        let pool = test_pool().await;
        employees::insert(&pool, &sample_new(1, "Ana")).await.unwrap();
        employees::insert(&pool, &sample_new(2, "Bruno")).await.unwrap();

        let s = summary(&pool, &EmployeeFilter::default()).await.unwrap();
        assert_eq!(s.by_sector[0].count, 2);
        assert_eq!(s.sector_volume[0].count, 2);

        let d = daily(&pool, &EmployeeFilter::default()).await.unwrap();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].timestamp.time(), *MIDDAY);
    }

    #[tokio::test]
    async fn crosstab_collapses_to_two_buckets_and_excludes_blanks() {
        let pool = test_pool().await;
        uploads::save(
            &pool,
            "hc",
            "HC.xlsx",
            &hc_table(&[
                (1, "Active", ""),
                (2, "Active", ""),
                (3, "Active", ""),
                (4, "Vacation", ""),
            ]),
        )
        .await
        .unwrap();
        uploads::save(
            &pool,
            "execution",
            "Rastreabilidade_Tra.xlsx",
            &exec_table(&[
                (1, "2024-03-01", "sim", "Yes"),
                (2, "2024-03-01", "SIM", "Yes"),
                (3, "2024-03-01", "NAO", "No"),
                (4, "2024-03-01", "", "No"),   // blank: excluded entirely
                (4, "2024-03-02", "nan", "No"), // sentinel: excluded entirely
            ]),
        )
        .await
        .unwrap();

        let ct = compliance_crosstab(&pool).await.unwrap();
        assert_eq!(ct.columns, vec!["Yes", "No"]);
        // Active: 2 yes, 1 no; Vacation has only excluded rows and is absent.
        assert_eq!(ct.rows.len(), 1);
        assert_eq!(ct.rows[0].status, "Active");
        assert_eq!(ct.rows[0].counts, vec![2, 1]);
        assert_eq!(ct.rows[0].total, 3);
    }

    #[tokio::test]
    async fn crosstab_drops_empty_columns_and_sorts_by_total() {
        let pool = test_pool().await;
        uploads::save(
            &pool,
            "hc",
            "HC.xlsx",
            &hc_table(&[(1, "Active", ""), (2, "Active", ""), (3, "Vacation", "")]),
        )
        .await
        .unwrap();
        uploads::save(
            &pool,
            "execution",
            "Rastreabilidade_Tra.xlsx",
            &exec_table(&[
                (1, "2024-03-01", "sim", "Yes"),
                (2, "2024-03-01", "sim", "Yes"),
                (3, "2024-03-01", "sim", "Yes"),
            ]),
        )
        .await
        .unwrap();

        let ct = compliance_crosstab(&pool).await.unwrap();
        assert_eq!(ct.columns, vec!["Yes"]);
        assert_eq!(ct.rows[0].status, "Active");
        assert_eq!(ct.rows[0].counts, vec![2]);
        assert_eq!(ct.rows[1].status, "Vacation");
    }

    #[tokio::test]
    async fn shift_series_groups_by_resolved_shift_and_date() {
        let pool = test_pool().await;
        // Badge 2's HC shift is second shift; badge 1 has no HC row and
        // defaults to Shift 1.
        uploads::save(&pool, "hc", "HC.xlsx", &hc_table(&[(2, "Active", "2° Turno")]))
            .await
            .unwrap();
        uploads::save(
            &pool,
            "execution",
            "Rastreabilidade_Tra.xlsx",
            &exec_table(&[
                (1, "2024-03-01", "sim", "Yes"),
                (1, "2024-03-01", "nao", "Yes"),
                (2, "2024-03-01", "sim", "No"),
            ]),
        )
        .await
        .unwrap();

        let series = shift_series(&pool).await.unwrap();
        assert_eq!(series.len(), 2);
        let first = &series[0];
        assert_eq!(first.shift, SHIFT_1);
        assert_eq!(first.days.len(), 1);
        assert_eq!(first.days[0].voice_yes, 1);
        assert_eq!(first.days[0].trained_yes, 2);
        let second = &series[1];
        assert_eq!(second.shift, SHIFT_2);
        assert_eq!(second.days[0].voice_yes, 1);
        assert_eq!(second.days[0].trained_yes, 0);
    }
}
