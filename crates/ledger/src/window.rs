//! Date windows used to scope summaries and breakdowns.
//!
//! Canonical windows are computed in the user's timezone and stored as UTC
//! instants. Both bounds are inclusive: a window ends on the last nanosecond
//! before the next period starts.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{LedgerError, ResultLedger};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
    AllTime,
}

impl Period {
    pub const ALL: [Period; 5] = [
        Period::Day,
        Period::Week,
        Period::Month,
        Period::Year,
        Period::AllTime,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "today",
            Self::Week => "this week",
            Self::Month => "this month",
            Self::Year => "this year",
            Self::AllTime => "all time",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Period {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "today" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            "all" | "all-time" | "all_time" => Ok(Self::AllTime),
            other => Err(LedgerError::Validation(format!("unknown period: {other}"))),
        }
    }
}

/// A date range; `None` on either side means unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Window {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl Window {
    /// Window with no bounds at all.
    pub const fn all_time() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> ResultLedger<Self> {
        if start > end {
            return Err(LedgerError::Validation(format!(
                "window start {start} is after end {end}"
            )));
        }
        Ok(Self {
            start: Some(start),
            end: Some(end),
        })
    }

    /// From the first instant of `from` to the last instant of `to`, both
    /// calendar days taken in `tz`.
    pub fn for_dates(from: NaiveDate, to: NaiveDate, tz: Tz) -> ResultLedger<Self> {
        if from > to {
            return Err(LedgerError::Validation(format!(
                "window start {from} is after end {to}"
            )));
        }
        Ok(bounded(tz, from, to + Duration::days(1)))
    }

    /// The canonical window of `period` containing `now`.
    pub fn for_period(period: Period, now: DateTime<Utc>, tz: Tz) -> Self {
        let today = now.with_timezone(&tz).date_naive();
        match period {
            Period::Day => bounded(tz, today, today + Duration::days(1)),
            Period::Week => {
                let monday =
                    today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                bounded(tz, monday, monday + Duration::days(7))
            }
            Period::Month => {
                let first = today - Duration::days(i64::from(today.day0()));
                // 31 days past the 1st always lands early in the next month.
                let probe = first + Duration::days(31);
                let next = probe - Duration::days(i64::from(probe.day0()));
                bounded(tz, first, next)
            }
            Period::Year => {
                let first = today - Duration::days(i64::from(today.ordinal0()));
                let probe = first + Duration::days(366);
                let next = probe - Duration::days(i64::from(probe.ordinal0()));
                bounded(tz, first, next)
            }
            Period::AllTime => Self::all_time(),
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| start <= at) && self.end.is_none_or(|end| at <= end)
    }
}

fn bounded(tz: Tz, first_day: NaiveDate, next_first_day: NaiveDate) -> Window {
    Window {
        start: Some(local_midnight(tz, first_day)),
        end: Some(local_midnight(tz, next_first_day) - Duration::nanoseconds(1)),
    }
}

/// First valid instant of `date` in `tz`. A midnight swallowed by a DST gap
/// moves forward to the next existing hour.
fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=3)
        .find_map(|hours| {
            tz.from_local_datetime(&(midnight + Duration::hours(hours)))
                .earliest()
        })
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use chrono_tz::{America::Santiago, Europe::Rome, UTC};

    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn day_window_is_midnight_to_midnight() {
        let window = Window::for_period(Period::Day, utc(2024, 1, 5, 15, 30, 0), UTC);
        assert_eq!(window.start, Some(utc(2024, 1, 5, 0, 0, 0)));
        assert!(window.contains(utc(2024, 1, 5, 23, 59, 59)));
        assert!(!window.contains(utc(2024, 1, 6, 0, 0, 0)));
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-01-07 is a Sunday.
        let window = Window::for_period(Period::Week, utc(2024, 1, 7, 12, 0, 0), UTC);
        assert_eq!(window.start, Some(utc(2024, 1, 1, 0, 0, 0)));
        assert!(window.contains(utc(2024, 1, 7, 23, 59, 59)));
        assert!(!window.contains(utc(2024, 1, 8, 0, 0, 0)));

        // A Monday is its own week start.
        let window = Window::for_period(Period::Week, utc(2024, 1, 8, 0, 0, 0), UTC);
        assert_eq!(window.start, Some(utc(2024, 1, 8, 0, 0, 0)));
    }

    #[test]
    fn month_handles_february_and_december() {
        let feb = Window::for_period(Period::Month, utc(2024, 2, 10, 0, 0, 0), UTC);
        assert_eq!(feb.start, Some(utc(2024, 2, 1, 0, 0, 0)));
        assert!(feb.contains(utc(2024, 2, 29, 23, 59, 59)));
        assert!(!feb.contains(utc(2024, 3, 1, 0, 0, 0)));

        let dec = Window::for_period(Period::Month, utc(2023, 12, 31, 23, 0, 0), UTC);
        assert_eq!(dec.start, Some(utc(2023, 12, 1, 0, 0, 0)));
        assert_eq!(
            dec.end,
            Some(utc(2024, 1, 1, 0, 0, 0) - Duration::nanoseconds(1))
        );
    }

    #[test]
    fn year_covers_leap_years() {
        let window = Window::for_period(Period::Year, utc(2024, 12, 31, 12, 0, 0), UTC);
        assert_eq!(window.start, Some(utc(2024, 1, 1, 0, 0, 0)));
        assert!(window.contains(utc(2024, 12, 31, 23, 59, 59)));
        assert!(!window.contains(utc(2025, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn windows_follow_the_timezone() {
        // 23:30 UTC on Jan 4th is already Jan 5th in Rome.
        let window = Window::for_period(Period::Day, utc(2024, 1, 4, 23, 30, 0), Rome);
        assert_eq!(window.start, Some(utc(2024, 1, 4, 23, 0, 0)));
        assert_eq!(
            window.end,
            Some(utc(2024, 1, 5, 23, 0, 0) - Duration::nanoseconds(1))
        );
    }

    #[test]
    fn dst_gap_midnight_moves_forward() {
        // Chile skipped 00:00-01:00 local on 2023-09-03.
        let window = Window::for_period(Period::Day, utc(2023, 9, 3, 15, 0, 0), Santiago);
        let start = window.start.unwrap().with_timezone(&Santiago);
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2023, 9, 3).unwrap());
        assert_eq!(start.time(), NaiveTime::from_hms_opt(1, 0, 0).unwrap());
    }

    #[test]
    fn bounds_are_inclusive() {
        let start = utc(2024, 1, 1, 0, 0, 0);
        let end = utc(2024, 1, 31, 23, 59, 59);
        let window = Window::between(start, end).unwrap();
        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(end + Duration::seconds(1)));
        assert!(Window::between(end, start).is_err());
    }

    #[test]
    fn for_dates_spans_whole_days() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let window = Window::for_dates(from, to, UTC).unwrap();
        assert!(window.contains(utc(2024, 1, 31, 23, 59, 59)));
        assert!(!window.contains(utc(2024, 2, 1, 0, 0, 0)));
    }

    #[test]
    fn all_time_contains_everything() {
        assert!(Window::all_time().contains(utc(1970, 1, 1, 0, 0, 0)));
        assert!("all".parse::<Period>().unwrap() == Period::AllTime);
    }
}
