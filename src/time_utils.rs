// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting and day-window math.
//!
//! All stored timestamps use RFC3339 UTC with fixed millisecond precision so
//! that Firestore string range filters order them correctly.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a UTC timestamp with fixed millisecond precision.
///
/// Variable sub-second precision breaks lexicographic ordering, so every
/// timestamp that participates in a range filter goes through this.
pub fn format_utc_millis(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// "Yesterday" as a calendar date in the reference time zone.
///
/// The scheduler cadence and this computation share the same zone, so a run
/// triggered shortly after midnight always covers the just-finished day.
pub fn yesterday_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive() - Duration::days(1)
}

/// Closed day window `[00:00:00.000, 23:59:59.999]` for `date` in `tz`,
/// converted to UTC.
pub fn day_window(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);

    // earliest() resolves DST ambiguity; a local midnight that does not exist
    // in `tz` falls back to interpreting the naive time as UTC.
    let start = tz
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    let end = tz
        .from_local_datetime(&date.and_time(end_of_day))
        .latest()
        .unwrap_or_else(|| tz.from_utc_datetime(&date.and_time(end_of_day)));

    (start.with_timezone(&Utc), end.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;

    #[test]
    fn test_day_window_kolkata() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let (start, end) = day_window(date, Kolkata);

        // IST is UTC+05:30, so the local day starts at 18:30 UTC the day before.
        assert_eq!(format_utc_millis(start), "2024-02-29T18:30:00.000Z");
        assert_eq!(format_utc_millis(end), "2024-03-01T18:29:59.999Z");
    }

    #[test]
    fn test_window_is_closed_and_ordered() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let (start, end) = day_window(date, Kolkata);
        assert!(start < end);
        assert_eq!(end - start, Duration::days(1) - Duration::milliseconds(1));
    }

    #[test]
    fn test_millis_format_orders_lexicographically() {
        let earlier = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let later = earlier + Duration::milliseconds(500);
        assert!(format_utc_millis(earlier) < format_utc_millis(later));
    }
}
