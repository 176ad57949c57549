//! Generic filter/sort/paginate engine over a `DataTable`
//!
//! Works for fixed schemas (the employee store) and for schemas only known
//! once a spreadsheet lands (the HC merge). Every view instance owns a
//! parameter namespace prefix so several views can coexist in one query
//! string, and every generated link echoes the other active parameters so
//! paging never drops a filter.
//!
//! Recognized keys under a prefix `p`:
//!   `p.page`, `p.per_page`, `p.sort`, `p.dir` (`asc`|`desc`),
//!   `p.f.<column-slug>` (case-insensitive substring filter).

use std::cmp::Ordering;

use chrono::NaiveDate;

use super::slug::{ColumnSpec, build_columns};
use super::{Cell, DataTable};

/// Page size for views whose schema comes from an upload.
pub const DYNAMIC_PAGE_SIZE: usize = 10;
/// Configurable page-size bounds for the employee view.
pub const MIN_PER_PAGE: usize = 5;
pub const MAX_PER_PAGE: usize = 100;
pub const DEFAULT_PER_PAGE: usize = 25;
/// Page links shown on each side of the current page.
const LINK_WINDOW: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("desc") {
            SortDir::Desc
        } else {
            SortDir::Asc
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

/// Parameters addressed to one view, plus every other parameter that was
/// active in the same query string (echoed verbatim into links).
#[derive(Debug, Clone, Default)]
pub struct ViewParams {
    pub prefix: String,
    pub page: usize,
    pub per_page: Option<usize>,
    pub sort: Option<String>,
    pub dir: SortDir,
    pub filters: Vec<(String, String)>,
    pub extra: Vec<(String, String)>,
}

impl ViewParams {
    /// Split a flat `key=value` list into this view's parameters and the
    /// passthrough rest. Unknown keys are never an error.
    pub fn parse(prefix: &str, params: &[(String, String)]) -> Self {
        let mut out = ViewParams {
            prefix: prefix.to_string(),
            page: 1,
            ..Default::default()
        };
        let own = format!("{}.", prefix);
        for (key, value) in params {
            let Some(rest) = key.strip_prefix(&own) else {
                out.extra.push((key.clone(), value.clone()));
                continue;
            };
            match rest {
                "page" => out.page = value.parse().unwrap_or(1).max(1),
                "per_page" => out.per_page = value.parse().ok(),
                "sort" => out.sort = Some(value.clone()),
                "dir" => out.dir = SortDir::parse(value),
                other => {
                    if let Some(slug) = other.strip_prefix("f.") {
                        if !value.trim().is_empty() {
                            out.filters.push((slug.to_string(), value.clone()));
                        }
                    } else {
                        out.extra.push((key.clone(), value.clone()));
                    }
                }
            }
        }
        out
    }
}

/// One rendered page plus the metadata the caller needs to navigate.
#[derive(Debug)]
pub struct TablePage {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Vec<String>>,
    pub total: usize,
    pub pages: usize,
    pub page: usize,
    pub per_page: usize,
    pub prev: Option<usize>,
    pub next: Option<usize>,
    /// Bounded window of page numbers around the current page.
    pub window: Vec<usize>,
}

/// A `DataTable` bound to one parameter namespace.
pub struct TableView<'a> {
    table: &'a DataTable,
    columns: Vec<ColumnSpec>,
    params: ViewParams,
    default_per_page: usize,
    per_page_configurable: bool,
}

impl<'a> TableView<'a> {
    pub fn new(table: &'a DataTable, params: ViewParams, default_per_page: usize) -> Self {
        Self {
            table,
            columns: build_columns(&table.columns),
            params,
            default_per_page,
            per_page_configurable: false,
        }
    }

    /// Honor the `per_page` parameter (employee view only), clamped to
    /// [MIN_PER_PAGE, MAX_PER_PAGE].
    pub fn with_configurable_page_size(mut self) -> Self {
        self.per_page_configurable = true;
        self
    }

    fn effective_per_page(&self) -> usize {
        if self.per_page_configurable {
            self.params
                .per_page
                .unwrap_or(self.default_per_page)
                .clamp(MIN_PER_PAGE, MAX_PER_PAGE)
        } else {
            self.default_per_page
        }
    }

    fn column_by_slug(&self, slug: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.slug == slug)
    }

    /// Row indices surviving every active filter, in table order.
    fn filtered_indices(&self) -> Vec<usize> {
        let mut active: Vec<(usize, String)> = Vec::new();
        for (slug, needle) in &self.params.filters {
            if let Some(idx) = self.column_by_slug(slug) {
                active.push((idx, needle.to_lowercase()));
            }
        }
        (0..self.table.len())
            .filter(|&row| {
                active.iter().all(|(col, needle)| {
                    self.table.cell(row, *col).display().to_lowercase().contains(needle)
                })
            })
            .collect()
    }

    /// Apply the active sort to a set of row indices. Key derivation tries
    /// numeric, then date, then case-insensitive text; rows whose cell does
    /// not parse under the chosen type sort last regardless of direction.
    /// The underlying sort is stable, so ties keep their prior order.
    fn sort_indices(&self, indices: &mut [usize]) {
        let Some(slug) = self.params.sort.as_deref() else {
            return;
        };
        let Some(col) = self.column_by_slug(slug) else {
            return;
        };
        let dir = self.params.dir;

        let cells: Vec<&Cell> = indices.iter().map(|&r| self.table.cell(r, col)).collect();
        if cells.iter().any(|c| c.as_number().is_some()) {
            let keys: Vec<Option<f64>> = cells.iter().map(|c| c.as_number()).collect();
            sort_by_key_ranks(indices, &keys, dir, |a, b| {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            });
        } else if cells.iter().any(|c| c.as_date().is_some()) {
            let keys: Vec<Option<NaiveDate>> = cells.iter().map(|c| c.as_date()).collect();
            sort_by_key_ranks(indices, &keys, dir, Ord::cmp);
        } else {
            let keys: Vec<Option<String>> = cells
                .iter()
                .map(|c| {
                    if c.is_empty() {
                        None
                    } else {
                        Some(c.display().to_lowercase())
                    }
                })
                .collect();
            sort_by_key_ranks(indices, &keys, dir, Ord::cmp);
        }
    }

    /// The full filtered and sorted table, unpaginated. This is what the
    /// export formatter consumes so a download always matches the on-screen
    /// view.
    pub fn filtered_sorted(&self) -> DataTable {
        let mut indices = self.filtered_indices();
        self.sort_indices(&mut indices);
        let mut out = DataTable::new(self.table.columns.clone());
        for row in indices {
            out.push_row(self.table.rows[row].clone());
        }
        out
    }

    /// One page of formatted rows plus navigation metadata. Out-of-range
    /// page numbers clamp instead of erroring; an empty result is the
    /// canonical `total == 0, pages == 1` page.
    pub fn page(&self) -> TablePage {
        let mut indices = self.filtered_indices();
        self.sort_indices(&mut indices);

        let per_page = self.effective_per_page();
        let total = indices.len();
        let pages = if total == 0 { 1 } else { total.div_ceil(per_page) };
        let page = self.params.page.clamp(1, pages);

        let start = (page - 1) * per_page;
        let rows: Vec<Vec<String>> = indices
            .iter()
            .skip(start)
            .take(per_page)
            .map(|&r| {
                (0..self.table.columns.len())
                    .map(|c| self.table.cell(r, c).display())
                    .collect()
            })
            .collect();

        let window_start = page.saturating_sub(LINK_WINDOW).max(1);
        let window_end = (page + LINK_WINDOW).min(pages);

        TablePage {
            columns: self.columns.clone(),
            rows,
            total,
            pages,
            page,
            per_page,
            prev: (page > 1).then(|| page - 1),
            next: (page < pages).then(|| page + 1),
            window: (window_start..=window_end).collect(),
        }
    }

    /// Query string navigating to `page`, echoing every other active
    /// parameter.
    pub fn page_link(&self, page: usize) -> String {
        self.build_link(Some(page), self.params.sort.as_deref(), self.params.dir)
    }

    /// Query string sorting by `slug`. Selecting the already-active sort
    /// column flips the direction; a new column starts ascending. Sorting
    /// resets to page 1.
    pub fn sort_link(&self, slug: &str) -> String {
        let dir = if self.params.sort.as_deref() == Some(slug) {
            match self.params.dir {
                SortDir::Asc => SortDir::Desc,
                SortDir::Desc => SortDir::Asc,
            }
        } else {
            SortDir::Asc
        };
        self.build_link(None, Some(slug), dir)
    }

    fn build_link(&self, page: Option<usize>, sort: Option<&str>, dir: SortDir) -> String {
        let prefix = &self.params.prefix;
        let mut parts: Vec<(String, String)> = Vec::new();
        for (key, value) in &self.params.extra {
            parts.push((key.clone(), value.clone()));
        }
        for (slug, needle) in &self.params.filters {
            parts.push((format!("{}.f.{}", prefix, slug), needle.clone()));
        }
        if self.per_page_configurable {
            if let Some(pp) = self.params.per_page {
                parts.push((format!("{}.per_page", prefix), pp.to_string()));
            }
        }
        if let Some(sort) = sort {
            parts.push((format!("{}.sort", prefix), sort.to_string()));
            parts.push((format!("{}.dir", prefix), dir.as_str().to_string()));
        }
        if let Some(page) = page {
            parts.push((format!("{}.page", prefix), page.to_string()));
        }
        parts
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Stable sort of `indices` by per-position keys; `None` keys go last in
/// both directions.
fn sort_by_key_ranks<K, F>(indices: &mut [usize], keys: &[Option<K>], dir: SortDir, cmp: F)
where
    F: Fn(&K, &K) -> Ordering,
{
    // `keys` is positional relative to the current indices slice; pair them
    // up before sorting so each index keeps its own key.
    let mut paired: Vec<(usize, usize)> = (0..indices.len()).map(|i| (i, indices[i])).collect();
    paired.sort_by(|(ka, _), (kb, _)| match (&keys[*ka], &keys[*kb]) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ord = cmp(a, b);
            match dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            }
        }
    });
    for (slot, (_, row)) in paired.into_iter().enumerate() {
        indices[slot] = row;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataTable {
        let mut t = DataTable::new(vec!["Badge".into(), "Name".into(), "Date".into()]);
        t.push_row(vec![
            Cell::Int(3),
            Cell::Text("Carla".into()),
            Cell::Text("2024-01-03".into()),
        ]);
        t.push_row(vec![
            Cell::Int(1),
            Cell::Text("ana".into()),
            Cell::Text("2024-01-01".into()),
        ]);
        t.push_row(vec![
            Cell::Int(2),
            Cell::Text("Bruno".into()),
            Cell::Text("2024-01-02".into()),
        ]);
        t
    }

    fn params(prefix: &str, raw: &[(&str, &str)]) -> ViewParams {
        let owned: Vec<(String, String)> = raw
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ViewParams::parse(prefix, &owned)
    }

    #[test]
    fn filter_that_matches_nothing_yields_canonical_empty_page() {
        let t = sample();
        let view = TableView::new(&t, params("v", &[("v.f.name", "zzz")]), 10);
        let page = view.page();
        assert_eq!(page.total, 0);
        assert_eq!(page.pages, 1);
        assert!(page.rows.is_empty());
    }

    #[test]
    fn removing_a_filter_restores_original_order_and_count() {
        let t = sample();
        let filtered = TableView::new(&t, params("v", &[("v.f.name", "an")]), 10);
        assert_eq!(filtered.page().total, 1);
        let unfiltered = TableView::new(&t, params("v", &[]), 10);
        let page = unfiltered.page();
        assert_eq!(page.total, 3);
        let names: Vec<&str> = page.rows.iter().map(|r| r[1].as_str()).collect();
        assert_eq!(names, vec!["Carla", "ana", "Bruno"]);
    }

    #[test]
    fn filtering_is_case_insensitive_substring_with_and_semantics() {
        let t = sample();
        let view = TableView::new(
            &t,
            params("v", &[("v.f.name", "BRU"), ("v.f.badge", "2")]),
            10,
        );
        let page = view.page();
        assert_eq!(page.total, 1);
        assert_eq!(page.rows[0][1], "Bruno");
    }

    #[test]
    fn sort_falls_back_numeric_then_date_then_string() {
        let t = sample();
        // Badge column: numeric.
        let by_badge = TableView::new(&t, params("v", &[("v.sort", "badge")]), 10);
        let badge_page = by_badge.page();
        let badges: Vec<&str> = badge_page.rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(badges, vec!["1", "2", "3"]);
        // Date column: dates stored as text still sort chronologically.
        let by_date = TableView::new(
            &t,
            params("v", &[("v.sort", "date"), ("v.dir", "desc")]),
            10,
        );
        let date_page = by_date.page();
        let dates: Vec<&str> = date_page.rows.iter().map(|r| r[2].as_str()).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-02", "2024-01-01"]);
        // Name column: case-insensitive text.
        let by_name = TableView::new(&t, params("v", &[("v.sort", "name")]), 10);
        let name_page = by_name.page();
        let names: Vec<&str> = name_page.rows.iter().map(|r| r[1].as_str()).collect();
        assert_eq!(names, vec!["ana", "Bruno", "Carla"]);
    }

    #[test]
    fn unsortable_values_sort_last_in_both_directions() {
        let mut t = DataTable::new(vec!["N".into()]);
        t.push_row(vec![Cell::Text("x".into())]);
        t.push_row(vec![Cell::Int(2)]);
        t.push_row(vec![Cell::Int(1)]);
        for dir in ["asc", "desc"] {
            let view = TableView::new(&t, params("v", &[("v.sort", "n"), ("v.dir", dir)]), 10);
            let vals: Vec<String> = view.page().rows.iter().map(|r| r[0].clone()).collect();
            assert_eq!(vals.last().unwrap(), "x", "dir={}", dir);
        }
    }

    #[test]
    fn sort_is_stable_for_duplicate_keys() {
        let mut t = DataTable::new(vec!["K".into(), "Tag".into()]);
        for tag in ["first", "second", "third"] {
            t.push_row(vec![Cell::Int(1), Cell::Text(tag.into())]);
        }
        let view = TableView::new(&t, params("v", &[("v.sort", "k")]), 10);
        let page = view.page();
        let tags: Vec<&str> = page.rows.iter().map(|r| r[1].as_str()).collect();
        assert_eq!(tags, vec!["first", "second", "third"]);
    }

    #[test]
    fn concatenated_pages_reproduce_the_full_sequence() {
        let mut t = DataTable::new(vec!["N".into()]);
        for i in 0..23 {
            t.push_row(vec![Cell::Int(i)]);
        }
        for per_page in 1..=7 {
            let mut seen = Vec::new();
            let mut page_no = 1;
            loop {
                let mut p = params("v", &[]);
                p.page = page_no;
                let view = TableView::new(&t, p, per_page);
                let page = view.page();
                for row in &page.rows {
                    seen.push(row[0].clone());
                }
                if page.next.is_none() {
                    break;
                }
                page_no += 1;
            }
            let expected: Vec<String> = (0..23).map(|i| i.to_string()).collect();
            assert_eq!(seen, expected, "per_page={}", per_page);
        }
    }

    #[test]
    fn out_of_range_pages_clamp() {
        let t = sample();
        let mut p = params("v", &[]);
        p.page = 99;
        let view = TableView::new(&t, p, 2);
        let page = view.page();
        assert_eq!(page.page, 2);
        assert_eq!(page.pages, 2);
        assert_eq!(page.rows.len(), 1);
    }

    #[test]
    fn window_is_bounded_and_clamped() {
        let mut t = DataTable::new(vec!["N".into()]);
        for i in 0..100 {
            t.push_row(vec![Cell::Int(i)]);
        }
        let mut p = params("v", &[]);
        p.page = 5;
        let view = TableView::new(&t, p, 10);
        assert_eq!(view.page().window, vec![3, 4, 5, 6, 7]);

        let mut p = params("v", &[]);
        p.page = 1;
        let view = TableView::new(&t, p, 10);
        assert_eq!(view.page().window, vec![1, 2, 3]);
    }

    #[test]
    fn links_preserve_other_parameters() {
        let t = sample();
        let view = TableView::new(
            &t,
            params(
                "v",
                &[
                    ("v.f.name", "a"),
                    ("other.page", "4"),
                    ("v.sort", "badge"),
                    ("v.dir", "desc"),
                ],
            ),
            10,
        );
        let link = view.page_link(2);
        assert!(link.contains("v.f.name=a"), "{}", link);
        assert!(link.contains("other.page=4"), "{}", link);
        assert!(link.contains("v.sort=badge"), "{}", link);
        assert!(link.contains("v.dir=desc"), "{}", link);
        assert!(link.contains("v.page=2"), "{}", link);

        // Toggling the active sort flips direction and drops the page key.
        let sort_link = view.sort_link("badge");
        assert!(sort_link.contains("v.dir=asc"), "{}", sort_link);
        assert!(!sort_link.contains("v.page="), "{}", sort_link);
    }

    #[test]
    fn per_page_is_clamped_only_when_configurable() {
        let mut t = DataTable::new(vec!["N".into()]);
        for i in 0..10 {
            t.push_row(vec![Cell::Int(i)]);
        }
        let p = params("v", &[("v.per_page", "2")]);
        let fixed = TableView::new(&t, p.clone(), 10);
        assert_eq!(fixed.page().per_page, 10);

        let configurable = TableView::new(&t, p, DEFAULT_PER_PAGE).with_configurable_page_size();
        // 2 is below MIN_PER_PAGE, clamps up to 5.
        assert_eq!(configurable.page().per_page, MIN_PER_PAGE);
    }
}
