//! Employee store commands: add and remove roster entries

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use colored::*;
use sqlx::SqlitePool;

use crate::config::repository::employees::{self, NewEmployee};

#[derive(Subcommand)]
pub enum EmployeeCommands {
    /// Add a roster entry
    Add(AddArgs),
    /// Remove a roster entry by its row id
    Remove { id: i64 },
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(long)]
    pub badge: i64,

    #[arg(long)]
    pub name: String,

    /// Equipment type; must be a configured "type" value
    #[arg(long = "type")]
    pub equipment_type: String,

    #[arg(long)]
    pub sector: String,

    #[arg(long)]
    pub area: String,

    #[arg(long)]
    pub shift: String,

    #[arg(long)]
    pub supervisor: String,

    /// Integration status; must be a configured "integration" value
    #[arg(long)]
    pub integration: String,

    /// Effective date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    #[arg(long)]
    pub note: Option<String>,
}

pub async fn handle(pool: &SqlitePool, command: EmployeeCommands) -> Result<()> {
    match command {
        EmployeeCommands::Add(args) => {
            let new = NewEmployee {
                badge: args.badge,
                name: args.name,
                equipment_type: args.equipment_type,
                sector: args.sector,
                area: args.area,
                shift: args.shift,
                supervisor: args.supervisor,
                integration: args.integration,
                effective_date: args.date.unwrap_or_else(|| Local::now().date_naive()),
                note: args.note,
            };
            let id = employees::insert(pool, &new).await?;
            println!("{} employee #{} (badge {})", "added".green().bold(), id, new.badge);
        }
        EmployeeCommands::Remove { id } => {
            if !employees::delete(pool, id).await? {
                anyhow::bail!("no employee with id {}", id);
            }
            println!("{} employee #{}", "removed".green().bold(), id);
        }
    }
    Ok(())
}
