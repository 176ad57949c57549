//! Chart commands: print aggregation payloads as JSON

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::config::repository::employees::EmployeeFilter;
use crate::recon::charts;

#[derive(Args)]
pub struct FilterArgs {
    /// Minimum effective date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Maximum effective date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Substring match on the employee name
    #[arg(long)]
    pub name: Option<String>,

    /// Substring match on the supervisor
    #[arg(long)]
    pub supervisor: Option<String>,

    #[arg(long)]
    pub badge: Option<i64>,

    #[arg(long)]
    pub shift: Option<String>,

    #[arg(long)]
    pub sector: Option<String>,

    #[arg(long = "type")]
    pub equipment_type: Option<String>,
}

impl FilterArgs {
    /// Store filter with the same default date window the view path uses.
    fn into_filter(self) -> EmployeeFilter {
        let (from, to) = super::date_window(self.from, self.to);
        EmployeeFilter {
            min_date: Some(from),
            max_date: Some(to),
            name_like: self.name,
            supervisor_like: self.supervisor,
            badge: self.badge,
            shift: self.shift,
            sector: self.sector,
            equipment_type: self.equipment_type,
        }
    }
}

#[derive(Subcommand)]
pub enum ChartCommands {
    /// Grouped distinct-badge counts (sector, shift, type) plus sector volume
    Summary(FilterArgs),
    /// Daily distinct-badge series over the filtered range
    Daily(FilterArgs),
    /// Roster status crossed with voice-execution compliance
    Crosstab,
    /// Per-shift daily voice-execution and training counts
    Shifts,
}

fn print_json<T: Serialize>(payload: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}

pub async fn handle(pool: &SqlitePool, command: ChartCommands) -> Result<()> {
    match command {
        ChartCommands::Summary(args) => {
            print_json(&charts::summary(pool, &args.into_filter()).await?)
        }
        ChartCommands::Daily(args) => print_json(&charts::daily(pool, &args.into_filter()).await?),
        ChartCommands::Crosstab => print_json(&charts::compliance_crosstab(pool).await?),
        ChartCommands::Shifts => print_json(&charts::shift_series(pool).await?),
    }
}
