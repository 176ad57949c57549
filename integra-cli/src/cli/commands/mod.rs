//! Command handlers

pub mod charts;
pub mod employee;
pub mod export;
pub mod ingest;
pub mod lists;
pub mod view;

use anyhow::{Result, bail};
use chrono::{Duration, Local, NaiveDate};

/// Span of the default roster window, inclusive of today: subtracting 29
/// days yields the last 30 calendar days.
const DEFAULT_WINDOW_DAYS: i64 = 29;

/// Resolve an optional date range to the concrete window the store queries
/// run over: the last 30 days including today, unless overridden.
pub(crate) fn date_window(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> (NaiveDate, NaiveDate) {
    let to = to.unwrap_or_else(|| Local::now().date_naive());
    let from = from.unwrap_or(to - Duration::days(DEFAULT_WINDOW_DAYS));
    (from, to)
}

/// Parse one `key=value` view parameter from the command line.
pub(crate) fn parse_param(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => bail!("parameter '{}' is not of the form key=value", raw),
    }
}

pub(crate) fn parse_params(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter().map(|p| parse_param(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_thirty_days_inclusive_of_today() {
        let (from, to) = date_window(None, None);
        assert_eq!((to - from).num_days(), 29);
        assert_eq!(to, Local::now().date_naive());

        let explicit = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(date_window(Some(explicit), Some(explicit)), (explicit, explicit));
    }

    #[test]
    fn params_split_on_the_first_equals() {
        assert_eq!(
            parse_param("emp.f.name=a=b").unwrap(),
            ("emp.f.name".to_string(), "a=b".to_string())
        );
        assert!(parse_param("no-equals").is_err());
        assert!(parse_param("=value").is_err());
    }
}
