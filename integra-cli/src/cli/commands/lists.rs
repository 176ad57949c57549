//! Configurable value-list commands

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use sqlx::SqlitePool;

use crate::config::LIST_NAMES;
use crate::config::repository::lists;

#[derive(Subcommand)]
pub enum ListCommands {
    /// Show the values of one list, or of every list
    Show { list: Option<String> },
    /// Add a value to a list
    Add { list: String, value: String },
    /// Rename a value, keeping existing employees untouched
    Rename {
        list: String,
        old: String,
        new: String,
    },
    /// Remove a value; refused while employees still reference it
    Remove { list: String, value: String },
}

pub async fn handle(pool: &SqlitePool, command: ListCommands) -> Result<()> {
    match command {
        ListCommands::Show { list } => {
            let names: Vec<&str> = match &list {
                Some(name) => vec![name.as_str()],
                None => LIST_NAMES.to_vec(),
            };
            for name in names {
                let values = lists::values(pool, name).await?;
                println!("{}", name.bold());
                for value in values {
                    println!("  {}", value);
                }
            }
        }
        ListCommands::Add { list, value } => {
            lists::add(pool, &list, &value).await?;
            println!("{} '{}' to {}", "added".green().bold(), value, list);
        }
        ListCommands::Rename { list, old, new } => {
            lists::rename(pool, &list, &old, &new).await?;
            println!("{} '{}' to '{}' in {}", "renamed".green().bold(), old, new, list);
        }
        ListCommands::Remove { list, value } => {
            lists::remove(pool, &list, &value).await?;
            println!("{} '{}' from {}", "removed".green().bold(), value, list);
        }
    }
    Ok(())
}
