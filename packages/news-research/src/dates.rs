//! Relative-date normalization.
//!
//! Search providers report publication dates as either relative phrases
//! ("3 weeks ago", "13 hours ago") or absolute dates ("Jul 29, 2015").
//! Everything normalizes to a calendar date; an unparseable string is logged
//! and dropped, never an error.

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use regex::Regex;
use tracing::debug;

/// Normalize a provider date string relative to `now`.
pub fn normalize_date(raw: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    let pattern = Regex::new(
        r"(?i)(\d+)\s+(second|minute|hour|day|week|month|year)s?\s+ago",
    )
    .unwrap();

    if let Some(caps) = pattern.captures(raw) {
        let amount: i64 = caps[1].parse().ok()?;
        let unit = caps[2].to_lowercase();

        let adjusted = match unit.as_str() {
            "second" => now.checked_sub_signed(Duration::seconds(amount)),
            "minute" => now.checked_sub_signed(Duration::minutes(amount)),
            "hour" => now.checked_sub_signed(Duration::hours(amount)),
            "day" => now.checked_sub_signed(Duration::days(amount)),
            "week" => now.checked_sub_signed(Duration::weeks(amount)),
            // Calendar arithmetic, not fixed-length approximations.
            "month" => now.checked_sub_months(Months::new(amount as u32)),
            "year" => now.checked_sub_months(Months::new(amount as u32 * 12)),
            _ => None,
        };
        return adjusted.map(|dt| dt.date_naive());
    }

    match NaiveDate::parse_from_str(raw.trim(), "%b %d, %Y") {
        Ok(date) => Some(date),
        Err(_) => {
            debug!(raw, "unparseable date string");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_relative_units() {
        let now = fixed_now();
        assert_eq!(
            normalize_date("29 minutes ago", now),
            NaiveDate::from_ymd_opt(2026, 8, 26)
        );
        assert_eq!(
            normalize_date("13 hours ago", now),
            NaiveDate::from_ymd_opt(2026, 8, 25)
        );
        assert_eq!(
            normalize_date("3 days ago", now),
            NaiveDate::from_ymd_opt(2026, 8, 23)
        );
        assert_eq!(
            normalize_date("2 weeks ago", now),
            NaiveDate::from_ymd_opt(2026, 8, 12)
        );
        assert_eq!(
            normalize_date("1 week ago", now),
            NaiveDate::from_ymd_opt(2026, 8, 19)
        );
    }

    #[test]
    fn test_calendar_months_and_years() {
        let now = fixed_now();
        assert_eq!(
            normalize_date("2 months ago", now),
            NaiveDate::from_ymd_opt(2026, 6, 26)
        );
        assert_eq!(
            normalize_date("3 years ago", now),
            NaiveDate::from_ymd_opt(2023, 8, 26)
        );
    }

    #[test]
    fn test_absolute_format() {
        assert_eq!(
            normalize_date("Jul 29, 2015", fixed_now()),
            NaiveDate::from_ymd_opt(2015, 7, 29)
        );
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(normalize_date("yesterday-ish", fixed_now()), None);
        assert_eq!(normalize_date("", fixed_now()), None);
    }
}
