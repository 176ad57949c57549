//! Ingest command: load spreadsheet batches into the upload slots

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::*;
use sqlx::SqlitePool;

use crate::ingest::{self, Outcome, SourceKind};

#[derive(Args)]
pub struct IngestArgs {
    /// Spreadsheet files to load (xlsx, xlsm, xls or ods)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Force every file to one source kind instead of sniffing filenames
    #[arg(long, value_enum)]
    pub kind: Option<SourceKind>,
}

pub async fn handle(pool: &SqlitePool, args: IngestArgs) -> Result<()> {
    let report = ingest::ingest_files(pool, &args.files, args.kind).await?;

    for file in &report.files {
        match &file.outcome {
            Outcome::Loaded { kind, rows, dropped } => {
                let drop_note = if *dropped > 0 {
                    format!(", {} row(s) dropped", dropped)
                } else {
                    String::new()
                };
                println!(
                    "{} {} as {} ({} rows{})",
                    "loaded".green().bold(),
                    file.filename,
                    kind.label(),
                    rows,
                    drop_note
                );
            }
            Outcome::Skipped { reason } => {
                println!("{} {}: {}", "skipped".yellow().bold(), file.filename, reason);
            }
        }
    }

    let skipped = report.skipped_names();
    if !skipped.is_empty() {
        println!(
            "{}",
            format!("{} file(s) were not processed: {}", skipped.len(), skipped.join(", "))
                .yellow()
        );
    }
    if report.loaded() == 0 {
        anyhow::bail!("no files were loaded");
    }
    Ok(())
}
