//! Normalizers for the messy values the source spreadsheets actually contain
//!
//! Badges arrive as integers, floats, zero-padded strings or sentinel text;
//! HR status and shift labels arrive in free-text Portuguese with inconsistent
//! casing and diacritics. Everything here is total: bad input maps to
//! `None` or a default, never to an error.

use crate::table::Cell;
use crate::table::slug::{collapse_whitespace, fold_diacritics};

pub const STATUS_ACTIVE: &str = "Active";
pub const STATUS_ON_LEAVE: &str = "On-leave";
pub const STATUS_VACATION: &str = "Vacation";
pub const STATUS_TERMINATION: &str = "Termination";
pub const STATUS_TEMPORARY: &str = "Temporary";

pub const SHIFT_1: &str = "Shift 1";
pub const SHIFT_2: &str = "Shift 2";

/// Blank-ish markers that spreadsheet round-trips produce for missing data.
fn is_sentinel(trimmed: &str) -> bool {
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("null")
}

/// Canonical employee identifier from a raw cell: a positive integer or
/// nothing. Decimal representations truncate (`"7.0"` → 7), zero-padded
/// strings parse (`"007"` → 7), sentinels and non-positive values are absent.
pub fn normalize_badge(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Int(i) => (*i > 0).then_some(*i),
        Cell::Float(f) => {
            let i = f.trunc() as i64;
            (i > 0).then_some(i)
        }
        Cell::Text(s) => normalize_badge_text(s),
        _ => None,
    }
}

pub fn normalize_badge_text(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if is_sentinel(trimmed) {
        return None;
    }
    let value = match trimmed.parse::<i64>() {
        Ok(i) => i,
        Err(_) => trimmed.parse::<f64>().ok()?.trunc() as i64,
    };
    (value > 0).then_some(value)
}

/// Comparison key: diacritics folded, whitespace collapsed, upper-cased.
fn status_key(trimmed: &str) -> String {
    collapse_whitespace(&fold_diacritics(trimmed)).to_uppercase()
}

/// Bucket a free-text HR status into the canonical vocabulary. Unrecognized
/// labels pass through as the trimmed original rather than being forced into
/// a bucket.
pub fn normalize_status(raw: &str) -> String {
    let trimmed = raw.trim();
    if is_sentinel(trimmed) {
        return STATUS_TEMPORARY.to_string();
    }
    let key = status_key(trimmed);
    if key == "ATIVIDADE NORMAL" {
        STATUS_ACTIVE.to_string()
    } else if key.starts_with("AFASTAMENTO") {
        STATUS_ON_LEAVE.to_string()
    } else if key.starts_with("FERIAS") {
        STATUS_VACATION.to_string()
    } else if key.starts_with("RESCISAO") {
        STATUS_TERMINATION.to_string()
    } else if matches!(key.as_str(), "SEM DADOS" | "NAO INFORMADO" | "SEM INFORMACAO") {
        STATUS_TEMPORARY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Canonicalize a shift label; anything unrecognized falls back to the
/// original text, blanks to `Shift 1`.
pub fn normalize_shift(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return SHIFT_1.to_string();
    }
    let key: String = status_key(trimmed)
        .chars()
        .filter(|c| *c != '°' && *c != 'º')
        .collect();
    let key = collapse_whitespace(&key);
    // "Turno 1" / "Shift 1" reduce to their ordinal before matching.
    let ordinal = key
        .strip_prefix("TURNO ")
        .or_else(|| key.strip_prefix("SHIFT "))
        .unwrap_or(&key);
    if ordinal.starts_with('1') || ordinal.starts_with("PRIMEIRO") || ordinal.starts_with("FIRST") {
        SHIFT_1.to_string()
    } else if ordinal.starts_with('2')
        || ordinal.starts_with("SEGUNDO")
        || ordinal.starts_with("SECOND")
    {
        SHIFT_2.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Voice-execution compliance bucket: `None` for blanks and sentinels
/// (excluded from any denominator), "No" when a negation token is present,
/// "Yes" for any other mention.
pub fn normalize_compliance(raw: &str) -> Option<&'static str> {
    let trimmed = raw.trim();
    if is_sentinel(trimmed) {
        return None;
    }
    let key = status_key(trimmed);
    let negated = key
        .split_whitespace()
        .any(|token| matches!(token, "NAO" | "NO" | "N"));
    Some(if negated { "No" } else { "Yes" })
}
