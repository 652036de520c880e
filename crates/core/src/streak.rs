//! Longest login/journal streak calculation.
//!
//! A streak is the longest run of consecutive calendar days (UTC) in a set
//! of dates. Input order and duplicates do not affect the result.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Errors that can occur while parsing streak input.
#[derive(Debug, Error)]
pub enum StreakError {
    /// A date string was not valid `YYYY-MM-DD`.
    #[error("invalid date string: {0}")]
    ParseError(String),
}

/// Computes the longest run of consecutive days in `dates`.
///
/// Returns 0 for empty input and 1 for a single date. Duplicates are
/// ignored; input may be in any order.
#[must_use]
pub fn longest_streak(dates: &[NaiveDate]) -> u32 {
    if dates.is_empty() {
        return 0;
    }

    let mut days: Vec<i64> = dates
        .iter()
        .map(|d| i64::from(d.num_days_from_ce()))
        .collect();
    days.sort_unstable();

    let mut best: u32 = 1;
    let mut run: u32 = 1;
    for pair in days.windows(2) {
        match pair[1] - pair[0] {
            0 => {} // duplicate day, run unchanged
            1 => {
                run += 1;
                best = best.max(run);
            }
            _ => run = 1,
        }
    }

    best
}

/// Parses `YYYY-MM-DD` strings, failing on the first malformed entry.
///
/// # Errors
///
/// Returns `StreakError::ParseError` with the offending string.
pub fn parse_dates(raw: &[&str]) -> Result<Vec<NaiveDate>, StreakError> {
    raw.iter()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| StreakError::ParseError((*s).to_string()))
        })
        .collect()
}

/// Parses `YYYY-MM-DD` strings, silently dropping malformed entries.
///
/// Used when the caller prefers a best-effort streak over a hard failure
/// (e.g. computing a summary from historical rows).
#[must_use]
pub fn parse_dates_lenient(raw: &[&str]) -> Vec<NaiveDate> {
    raw.iter()
        .filter_map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn test_single_date() {
        assert_eq!(longest_streak(&[d("2024-03-15")]), 1);
    }

    #[test]
    fn test_run_with_gap() {
        let dates = [
            d("2024-01-01"),
            d("2024-01-02"),
            d("2024-01-03"),
            d("2024-01-05"),
        ];
        assert_eq!(longest_streak(&dates), 3);
    }

    #[test]
    fn test_order_invariant() {
        let sorted = [d("2024-01-01"), d("2024-01-02"), d("2024-01-03")];
        let shuffled = [d("2024-01-03"), d("2024-01-01"), d("2024-01-02")];
        assert_eq!(longest_streak(&sorted), longest_streak(&shuffled));
    }

    #[test]
    fn test_duplicates_ignored() {
        let dates = [
            d("2024-01-01"),
            d("2024-01-02"),
            d("2024-01-02"),
            d("2024-01-03"),
        ];
        assert_eq!(longest_streak(&dates), 3);
    }

    #[test]
    fn test_gap_resets_run() {
        let dates = [
            d("2024-01-01"),
            d("2024-01-02"),
            d("2024-01-10"),
            d("2024-01-11"),
            d("2024-01-12"),
            d("2024-01-13"),
        ];
        assert_eq!(longest_streak(&dates), 4);
    }

    #[test]
    fn test_crosses_month_boundary() {
        let dates = [d("2024-01-31"), d("2024-02-01"), d("2024-02-02")];
        assert_eq!(longest_streak(&dates), 3);
    }

    #[test]
    fn test_parse_strict_rejects_malformed() {
        let err = parse_dates(&["2024-01-01", "not-a-date"]).unwrap_err();
        assert!(matches!(err, StreakError::ParseError(s) if s == "not-a-date"));
    }

    #[test]
    fn test_parse_lenient_filters_malformed() {
        let dates = parse_dates_lenient(&["2024-01-01", "garbage", "2024-01-02"]);
        assert_eq!(dates.len(), 2);
        assert_eq!(longest_streak(&dates), 2);
    }
}
