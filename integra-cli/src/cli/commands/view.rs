//! Render one page of a table view to the terminal
//!
//! The three targets share the same engine but differ in where the table
//! comes from and in their parameter namespace. Links are printed as query
//! strings so a front end (or the export command) can replay them.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use colored::*;
use sqlx::SqlitePool;

use crate::config::repository::employees::{self, EmployeeFilter};
use crate::recon;
use crate::table::DataTable;
use crate::table::view::{DEFAULT_PER_PAGE, DYNAMIC_PAGE_SIZE, TablePage, TableView, ViewParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewTarget {
    /// The canonical employee store
    Employees,
    /// Canonical store merged with the uploaded HC roster
    Hc,
    /// Uploaded execution log cross-referenced against the voice roster
    Execution,
}

impl ViewTarget {
    /// Parameter namespace of this view.
    pub fn prefix(self) -> &'static str {
        match self {
            ViewTarget::Employees => "emp",
            ViewTarget::Hc => "hc",
            ViewTarget::Execution => "exec",
        }
    }

    pub fn export_prefix(self) -> &'static str {
        match self {
            ViewTarget::Employees => "integra_employees",
            ViewTarget::Hc => "integra_hc",
            ViewTarget::Execution => "integra_execution",
        }
    }

    pub fn sheet_name(self) -> &'static str {
        match self {
            ViewTarget::Employees => "Employees",
            ViewTarget::Hc => "HC",
            ViewTarget::Execution => "Execution",
        }
    }
}

#[derive(Args)]
pub struct ViewArgs {
    #[arg(value_enum)]
    pub target: ViewTarget,

    /// View parameter, repeatable (e.g. --param emp.page=2 --param emp.f.name=ana)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Start of the employee date window (YYYY-MM-DD); employees target only
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// End of the employee date window (YYYY-MM-DD); employees target only
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

/// Materialize the table a target views. The employees target reads the
/// store over a date window (last 30 days unless overridden); the other two
/// recompute their reconciliation from the current upload slots.
pub async fn target_table(
    pool: &SqlitePool,
    target: ViewTarget,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<DataTable> {
    match target {
        ViewTarget::Employees => {
            let (from, to) = super::date_window(from, to);
            let filter = EmployeeFilter {
                min_date: Some(from),
                max_date: Some(to),
                ..Default::default()
            };
            Ok(employees::to_table(&employees::list(pool, &filter).await?))
        }
        ViewTarget::Hc => recon::reconcile_hc(pool).await,
        ViewTarget::Execution => recon::reconcile_execution(pool).await,
    }
}

/// Bind a table to its target's namespace and page-size policy.
pub fn build_view<'a>(
    table: &'a DataTable,
    target: ViewTarget,
    params: &[(String, String)],
) -> TableView<'a> {
    let view_params = ViewParams::parse(target.prefix(), params);
    match target {
        ViewTarget::Employees => {
            TableView::new(table, view_params, DEFAULT_PER_PAGE).with_configurable_page_size()
        }
        _ => TableView::new(table, view_params, DYNAMIC_PAGE_SIZE),
    }
}

pub async fn handle(pool: &SqlitePool, args: ViewArgs) -> Result<()> {
    let params = super::parse_params(&args.params)?;
    let table = target_table(pool, args.target, args.from, args.to).await?;
    let view = build_view(&table, args.target, &params);
    let page = view.page();

    print_page(&page);

    if page.pages > 1 {
        for n in &page.window {
            let label = if *n == page.page {
                format!("[{}]", n).bold().to_string()
            } else {
                n.to_string()
            };
            println!("{} {}", label, view.page_link(*n).dimmed());
        }
        if let Some(prev) = page.prev {
            println!("{} {}", "prev:".dimmed(), view.page_link(prev));
        }
        if let Some(next) = page.next {
            println!("{} {}", "next:".dimmed(), view.page_link(next));
        }
    }
    Ok(())
}

fn print_page(page: &TablePage) {
    let labels: Vec<&str> = page.columns.iter().map(|c| c.label.as_str()).collect();
    let mut widths: Vec<usize> = labels.iter().map(|l| l.chars().count()).collect();
    for row in &page.rows {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(value.chars().count());
        }
    }

    let header: Vec<String> = labels
        .iter()
        .zip(&widths)
        .map(|(l, w)| format!("{:<width$}", l, width = w))
        .collect();
    println!("{}", header.join("  ").bold());

    for row in &page.rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = w))
            .collect();
        println!("{}", line.join("  "));
    }

    println!(
        "{}",
        format!(
            "page {} of {} ({} row{}, {} per page)",
            page.page,
            page.pages,
            page.total,
            if page.total == 1 { "" } else { "s" },
            page.per_page
        )
        .dimmed()
    );
}
