//! Command-line surface: argument definitions and dispatch

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;

#[derive(Parser)]
#[command(
    name = "integra-cli",
    version,
    about = "Warehouse roster reconciliation and tabular reporting"
)]
pub struct Cli {
    /// SQLite database file (defaults to the platform data directory).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load HC roster and execution-log spreadsheets into their slots
    Ingest(commands::ingest::IngestArgs),
    /// Manage the canonical employee store
    #[command(subcommand)]
    Employee(commands::employee::EmployeeCommands),
    /// Manage the configurable value lists
    #[command(subcommand)]
    Lists(commands::lists::ListCommands),
    /// Render one page of a table view
    View(commands::view::ViewArgs),
    /// Print chart payloads as JSON
    #[command(subcommand)]
    Charts(commands::charts::ChartCommands),
    /// Export a view to a styled XLSX workbook
    Export(commands::export::ExportArgs),
}

pub async fn run(command: Commands, pool: &SqlitePool) -> Result<()> {
    match command {
        Commands::Ingest(args) => commands::ingest::handle(pool, args).await,
        Commands::Employee(cmd) => commands::employee::handle(pool, cmd).await,
        Commands::Lists(cmd) => commands::lists::handle(pool, cmd).await,
        Commands::View(args) => commands::view::handle(pool, args).await,
        Commands::Charts(cmd) => commands::charts::handle(pool, cmd).await,
        Commands::Export(args) => commands::export::handle(pool, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::view::ViewTarget;

    #[test]
    fn view_parses_target_and_repeated_params() {
        let cli = Cli::try_parse_from([
            "integra-cli",
            "view",
            "employees",
            "--param",
            "emp.page=2",
            "--param",
            "emp.f.name=ana",
        ])
        .unwrap();
        let Commands::View(args) = cli.command else {
            panic!("expected view command");
        };
        assert_eq!(args.target, ViewTarget::Employees);
        assert_eq!(args.params.len(), 2);
    }

    #[test]
    fn db_override_is_global() {
        let cli = Cli::try_parse_from([
            "integra-cli",
            "lists",
            "show",
            "--db",
            "/tmp/test.db",
        ])
        .unwrap();
        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/test.db")));
    }

    #[test]
    fn ingest_requires_at_least_one_file() {
        assert!(Cli::try_parse_from(["integra-cli", "ingest"]).is_err());
    }
}
