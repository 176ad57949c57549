//! Spreadsheet ingestion: source-kind dispatch, decoding and projection
//!
//! A batch of files is processed with partial success: a file that cannot be
//! recognized, decoded or projected is skipped with a reason, and the rest of
//! the batch continues. Loaded tables replace the per-kind upload slot.

pub mod execution;
pub mod hc;
pub mod reader;

use std::path::Path;

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::VOICE_EQUIPMENT_TYPE;
use crate::config::repository::{employees, uploads};
use crate::table::slug::{collapse_whitespace, fold_diacritics};

/// Sheet HC roster exports keep their data on.
pub const HC_SHEET: &str = "Base";
/// Filename prefix of voice-picking execution logs.
const EXECUTION_PREFIX: &str = "rastreabilidade_tra";
/// Extensions the decoder accepts.
const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Source type of an uploaded file, resolved once per file and dispatched on
/// everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceKind {
    Hc,
    Execution,
}

impl SourceKind {
    /// Resolve a kind from the filename. Returns `None` for files that match
    /// neither signature; the caller may still force a kind explicitly.
    pub fn sniff(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.starts_with("hc") {
            Some(SourceKind::Hc)
        } else if lower.starts_with(EXECUTION_PREFIX) {
            Some(SourceKind::Execution)
        } else {
            None
        }
    }

    /// Key of this kind's upload slot.
    pub fn slot_key(self) -> &'static str {
        match self {
            SourceKind::Hc => "hc",
            SourceKind::Execution => "execution",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Hc => "HC roster",
            SourceKind::Execution => "execution log",
        }
    }
}

/// Canonical header form used to match expected columns: diacritics folded,
/// whitespace collapsed, lower-cased.
pub(crate) fn header_key(raw: &str) -> String {
    collapse_whitespace(&fold_diacritics(raw)).to_lowercase()
}

#[derive(Debug)]
pub enum Outcome {
    Loaded {
        kind: SourceKind,
        rows: usize,
        dropped: usize,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Debug)]
pub struct FileReport {
    pub filename: String,
    pub outcome: Outcome,
}

/// Per-file outcomes for one ingest batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub files: Vec<FileReport>,
}

impl IngestReport {
    pub fn loaded(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, Outcome::Loaded { .. }))
            .count()
    }

    /// Names of every skipped file, for the batch warning.
    pub fn skipped_names(&self) -> Vec<&str> {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, Outcome::Skipped { .. }))
            .map(|f| f.filename.as_str())
            .collect()
    }
}

fn supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Ingest a batch of spreadsheet files. `kind_override` forces every file to
/// one source kind; otherwise the filename decides. The trained-flag badge
/// snapshot is taken once, at the start of the batch.
pub async fn ingest_files(
    pool: &SqlitePool,
    paths: &[std::path::PathBuf],
    kind_override: Option<SourceKind>,
) -> Result<IngestReport> {
    let voice_badges = employees::badge_snapshot(pool, Some(VOICE_EQUIPMENT_TYPE)).await?;

    let mut report = IngestReport::default();
    for path in paths {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<invalid name>")
            .to_string();

        let outcome = if !supported_extension(path) {
            Outcome::Skipped {
                reason: "unsupported file extension".to_string(),
            }
        } else {
            match kind_override.or_else(|| SourceKind::sniff(&filename)) {
                None => Outcome::Skipped {
                    reason: "filename matches no known source signature".to_string(),
                },
                Some(kind) => match load_one(pool, path, &filename, kind, &voice_badges).await {
                    Ok(outcome) => outcome,
                    Err(e) => Outcome::Skipped {
                        reason: format!("{:#}", e),
                    },
                },
            }
        };

        if let Outcome::Skipped { reason } = &outcome {
            log::warn!("skipping {}: {}", filename, reason);
        }
        report.files.push(FileReport { filename, outcome });
    }
    Ok(report)
}

async fn load_one(
    pool: &SqlitePool,
    path: &Path,
    filename: &str,
    kind: SourceKind,
    voice_badges: &std::collections::HashSet<i64>,
) -> Result<Outcome> {
    let raw = reader::read_table(path, kind)?;
    let (table, dropped) = match kind {
        SourceKind::Hc => hc::project(&raw)?,
        SourceKind::Execution => (execution::project(&raw, voice_badges)?, 0),
    };
    let rows = table.len();
    uploads::save(pool, kind.slot_key(), filename, &table).await?;
    log::info!("loaded {} as {}: {} rows", filename, kind.label(), rows);
    Ok(Outcome::Loaded {
        kind,
        rows,
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffing_is_case_insensitive_prefix_matching() {
        assert_eq!(SourceKind::sniff("HC_2024-06.xlsx"), Some(SourceKind::Hc));
        assert_eq!(SourceKind::sniff("hc junho.xlsx"), Some(SourceKind::Hc));
        assert_eq!(
            SourceKind::sniff("Rastreabilidade_Tra_01.xlsx"),
            Some(SourceKind::Execution)
        );
        assert_eq!(SourceKind::sniff("random.xlsx"), None);
    }

    #[test]
    fn extension_gate_accepts_spreadsheets_only() {
        assert!(supported_extension(Path::new("a/HC.xlsx")));
        assert!(supported_extension(Path::new("b.XLS")));
        assert!(!supported_extension(Path::new("c.csv")));
        assert!(!supported_extension(Path::new("noext")));
    }

    #[tokio::test]
    async fn batch_continues_past_bad_files() {
        let pool = crate::config::repository::test_pool().await;
        let paths = vec![
            std::path::PathBuf::from("notes.txt"),
            std::path::PathBuf::from("mystery.xlsx"),
            std::path::PathBuf::from("HC_missing.xlsx"),
        ];
        let report = ingest_files(&pool, &paths, None).await.unwrap();
        assert_eq!(report.files.len(), 3);
        assert_eq!(report.loaded(), 0);
        assert_eq!(
            report.skipped_names(),
            vec!["notes.txt", "mystery.xlsx", "HC_missing.xlsx"]
        );
    }
}
