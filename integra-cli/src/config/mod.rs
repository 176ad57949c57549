//! Application configuration and the SQLite-backed store
//!
//! The store owns the persisted employee roster, the configurable value
//! lists and the single-slot upload snapshots. Everything else in the
//! application recomputes from these on each command.

pub mod repository;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

/// Equipment type whose roster subset backs the voice-training flag.
pub const VOICE_EQUIPMENT_TYPE: &str = "Voice";

/// The configurable value lists, in the order they are displayed.
pub const LIST_NAMES: &[&str] = &["type", "sector", "area", "shift", "integration"];

/// First-boot defaults per list, applied only while a list is empty.
pub fn default_list_values(list: &str) -> &'static [&'static str] {
    match list {
        "type" => &["Voice", "Forklift", "Pallet Jack", "Reach Truck"],
        "sector" => &["Receiving", "Picking", "Packing", "Shipping", "Inventory"],
        "area" => &["Dry", "Chilled", "Frozen"],
        "shift" => &["Shift 1", "Shift 2"],
        "integration" => &["Yes", "No"],
        _ => &[],
    }
}

/// Database location: `INTEGRA_DB` when set, otherwise the platform data
/// directory.
pub fn database_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("INTEGRA_DB") {
        return Ok(PathBuf::from(path));
    }
    let dir = dirs::data_dir()
        .context("could not resolve a data directory; set INTEGRA_DB explicitly")?
        .join("integra");
    Ok(dir.join("integra.db"))
}

/// Open (creating if needed) the SQLite database at `path`.
pub async fn connect(path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    SqlitePool::connect_with(options)
        .await
        .with_context(|| format!("failed to open database at {}", path.display()))
}
