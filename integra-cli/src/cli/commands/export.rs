//! Export command: write the filtered and sorted view to an XLSX file
//!
//! The export consumes the same parameters as the view command, so a
//! download always matches what the equivalent view shows, unpaginated.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use colored::*;
use sqlx::SqlitePool;

use super::view::{ViewTarget, build_view, target_table};
use crate::table::export::{export_filename, to_xlsx_bytes};

#[derive(Args)]
pub struct ExportArgs {
    #[arg(value_enum)]
    pub target: ViewTarget,

    /// View parameter, repeatable; pagination keys are ignored
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Start of the employee date window (YYYY-MM-DD); employees target only
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// End of the employee date window (YYYY-MM-DD); employees target only
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Directory the workbook is written into
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

pub async fn handle(pool: &SqlitePool, args: ExportArgs) -> Result<()> {
    let params = super::parse_params(&args.params)?;
    let table = target_table(pool, args.target, args.from, args.to).await?;
    let view = build_view(&table, args.target, &params);
    let data = view.filtered_sorted();

    let bytes = to_xlsx_bytes(&data, args.target.sheet_name())?;
    let path = args.out.join(export_filename(args.target.export_prefix()));
    fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "{} {} ({} row{})",
        "wrote".green().bold(),
        path.display(),
        data.len(),
        if data.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
