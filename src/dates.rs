//! Calendar helpers shared by the timeline views.

use chrono::{Datelike, Duration, Months, NaiveDate};

/// Accepted input formats, ISO first.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// Parse a calendar date. ISO `YYYY-MM-DD` is the canonical form; a few
/// common spreadsheet formats are accepted too.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Format as ISO `YYYY-MM-DD`.
pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Signed whole days from `a` to `b`.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Monday of the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// First day of the month containing `date`.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Signed whole weeks between the Mondays of `a` and `b`.
pub fn weeks_between(a: NaiveDate, b: NaiveDate) -> i64 {
    days_between(start_of_week(a), start_of_week(b)) / 7
}

/// Calendar month difference (`year * 12 + month`), ignoring the day.
pub fn months_between(a: NaiveDate, b: NaiveDate) -> i64 {
    month_index(b) - month_index(a)
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// Shift by whole months, clamping the day to the target month's length.
pub fn add_months(date: NaiveDate, months: i64) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs() as u32))
    };
    shifted.unwrap_or(date)
}

/// Every date from `start` to `end`, both inclusive. Empty when `end < start`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_iso_and_day_first() {
        assert_eq!(parse_date("2025-10-01"), Some(d(2025, 10, 1)));
        assert_eq!(parse_date(" 27/10/2025 "), Some(d(2025, 10, 27)));
        assert_eq!(parse_date("next tuesday"), None);
    }

    #[test]
    fn week_starts_on_monday() {
        // 2025-10-01 is a Wednesday.
        assert_eq!(start_of_week(d(2025, 10, 1)), d(2025, 9, 29));
        assert_eq!(start_of_week(d(2025, 9, 29)), d(2025, 9, 29));
        assert_eq!(weeks_between(d(2025, 10, 1), d(2025, 10, 6)), 1);
    }

    #[test]
    fn month_difference_ignores_day() {
        assert_eq!(months_between(d(2025, 1, 31), d(2025, 2, 1)), 1);
        assert_eq!(months_between(d(2024, 11, 15), d(2025, 2, 1)), 3);
        assert_eq!(add_months(d(2025, 1, 31), 1), d(2025, 2, 28));
        assert_eq!(add_months(d(2025, 3, 15), -3), d(2024, 12, 15));
    }

    #[test]
    fn range_is_inclusive() {
        let days = date_range(d(2025, 10, 1), d(2025, 10, 5));
        assert_eq!(days.len(), 5);
        assert_eq!(days[4], d(2025, 10, 5));
        assert!(date_range(d(2025, 10, 5), d(2025, 10, 1)).is_empty());
    }
}
