//! Business calendar arithmetic
//!
//! This module provides:
//! - Business-day resolution from a timestamp and a cutoff hour
//! - Month/year shifting with end-of-month clamping
//! - Inclusive reporting periods ending on a reference day
//! - Parsing of period tokens such as `7`, `1M` or `2y`

use chrono::{DateTime, Days, FixedOffset, Months, NaiveDate, Offset, TimeZone, Timelike, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static PERIOD_SPEC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([mMyY])?$").unwrap());

/// Errors raised by calendar and period arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("Invalid period spec: {0:?}")]
    InvalidPeriodSpec(String),

    #[error("Invalid period: start {start} is after end {end}")]
    InvalidPeriod { start: NaiveDate, end: NaiveDate },

    #[error("Date arithmetic out of range from {0}")]
    OutOfRange(NaiveDate),
}

/// Result type for calendar operations
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Resolve the business day a timestamp belongs to.
///
/// The hour is read in the timestamp's own time zone. Anything before
/// `cutoff_hour` is attributed to the previous calendar date, so a service
/// running past midnight aggregates under the day it started.
pub fn resolve_business_day<Tz: TimeZone>(timestamp: &DateTime<Tz>, cutoff_hour: u32) -> NaiveDate {
    let date = timestamp.date_naive();
    if timestamp.hour() < cutoff_hour {
        date.pred_opt().unwrap_or(date)
    } else {
        date
    }
}

/// Shift a date by whole months, clamping to the last day of the target month
pub fn add_months(date: NaiveDate, months: i32) -> CalendarResult<NaiveDate> {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.ok_or(CalendarError::OutOfRange(date))
}

/// Shift a date by whole years; Feb 29 becomes Feb 28 in non-leap years
pub fn add_years(date: NaiveDate, years: i32) -> CalendarResult<NaiveDate> {
    let months = years
        .checked_mul(12)
        .ok_or(CalendarError::OutOfRange(date))?;
    add_months(date, months)
}

/// How far back a reporting period reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "unit", content = "count", rename_all = "snake_case")]
pub enum PeriodSpec {
    /// The last N business days, reference day included
    Days(u32),
    /// N calendar months back
    Months(u32),
    /// N calendar years back
    Years(u32),
}

impl FromStr for PeriodSpec {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_period_spec(s)
    }
}

impl fmt::Display for PeriodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(n) => write!(f, "{n}"),
            Self::Months(n) => write!(f, "{n}M"),
            Self::Years(n) => write!(f, "{n}Y"),
        }
    }
}

/// Parse a period token: a bare day count, or digits followed by `M`/`Y`
pub fn parse_period_spec(token: &str) -> CalendarResult<PeriodSpec> {
    let invalid = || CalendarError::InvalidPeriodSpec(token.to_string());

    let caps = PERIOD_SPEC_REGEX.captures(token.trim()).ok_or_else(invalid)?;
    let count: u32 = caps[1].parse().map_err(|_| invalid())?;
    if count == 0 {
        return Err(invalid());
    }

    let spec = match caps.get(2).map(|m| m.as_str()) {
        None => PeriodSpec::Days(count),
        Some("m" | "M") => PeriodSpec::Months(count),
        Some(_) => PeriodSpec::Years(count),
    };
    Ok(spec)
}

/// Inclusive date range used for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    /// Create a period, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> CalendarResult<Self> {
        if start > end {
            return Err(CalendarError::InvalidPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    /// Single-day period
    #[must_use]
    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, both ends included
    #[must_use]
    pub fn len_days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// The equal-length period ending the day before this one starts
    pub fn previous(&self) -> CalendarResult<Self> {
        let end = self
            .start
            .pred_opt()
            .ok_or(CalendarError::OutOfRange(self.start))?;
        let start = end
            .checked_sub_days(Days::new(self.len_days() - 1))
            .ok_or(CalendarError::OutOfRange(end))?;
        Ok(Self { start, end })
    }

    /// Iterate every day in the period
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// The period of a given size ending on (and including) `reference_day`
pub fn period_ending(reference_day: NaiveDate, spec: PeriodSpec) -> CalendarResult<Period> {
    let start = match spec {
        PeriodSpec::Days(n) => reference_day
            .checked_sub_days(Days::new(u64::from(n.saturating_sub(1))))
            .ok_or(CalendarError::OutOfRange(reference_day))?,
        PeriodSpec::Months(n) => next_day(add_months(reference_day, -back(reference_day, n)?)?)?,
        PeriodSpec::Years(n) => next_day(add_years(reference_day, -back(reference_day, n)?)?)?,
    };
    Period::new(start, reference_day)
}

fn back(reference_day: NaiveDate, n: u32) -> CalendarResult<i32> {
    i32::try_from(n).map_err(|_| CalendarError::OutOfRange(reference_day))
}

fn next_day(date: NaiveDate) -> CalendarResult<NaiveDate> {
    date.succ_opt().ok_or(CalendarError::OutOfRange(date))
}

/// Business-day resolver bound to a cutoff hour and a local UTC offset
#[derive(Debug, Clone, Copy)]
pub struct BusinessCalendar {
    cutoff_hour: u32,
    offset: FixedOffset,
}

impl BusinessCalendar {
    /// Create a calendar; `cutoff_hour` is clamped to 0-23
    #[must_use]
    pub fn new(cutoff_hour: u32, offset: FixedOffset) -> Self {
        Self {
            cutoff_hour: cutoff_hour.min(23),
            offset,
        }
    }

    /// Calendar for an offset given in minutes east of UTC
    #[must_use]
    pub fn with_offset_minutes(cutoff_hour: u32, offset_minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(offset_minutes.saturating_mul(60)).unwrap_or(Utc.fix());
        Self::new(cutoff_hour, offset)
    }

    #[must_use]
    pub fn cutoff_hour(&self) -> u32 {
        self.cutoff_hour
    }

    /// Business day for a UTC instant, read in local time
    #[must_use]
    pub fn business_day(&self, instant: DateTime<Utc>) -> NaiveDate {
        resolve_business_day(&instant.with_timezone(&self.offset), self.cutoff_hour)
    }

    /// Business day for the current instant
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.business_day(Utc::now())
    }
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self::with_offset_minutes(11, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, NaiveDateTime};
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap().and_utc()
    }

    #[test]
    fn test_business_day_before_cutoff_is_previous_date() {
        assert_eq!(resolve_business_day(&at(2026, 1, 25, 1, 30), 11), date(2026, 1, 24));
        assert_eq!(resolve_business_day(&at(2026, 1, 25, 10, 59), 11), date(2026, 1, 24));
    }

    #[test]
    fn test_business_day_at_or_after_cutoff_is_same_date() {
        assert_eq!(resolve_business_day(&at(2026, 1, 25, 11, 0), 11), date(2026, 1, 25));
        assert_eq!(resolve_business_day(&at(2026, 1, 25, 23, 59), 11), date(2026, 1, 25));
    }

    #[test]
    fn test_business_day_zero_cutoff_never_shifts() {
        assert_eq!(resolve_business_day(&at(2026, 3, 1, 0, 0), 0), date(2026, 3, 1));
    }

    #[test]
    fn test_business_day_uses_local_offset() {
        // 23:30 UTC is 00:30 next day at UTC+1, which is before an 11:00 cutoff
        let cal = BusinessCalendar::with_offset_minutes(11, 60);
        assert_eq!(cal.business_day(at(2026, 1, 24, 23, 30)), date(2026, 1, 24));
        // 10:30 UTC is 11:30 local
        assert_eq!(cal.business_day(at(2026, 1, 25, 10, 30)), date(2026, 1, 25));
    }

    #[test]
    fn test_add_months_clamps_to_end_of_february() {
        assert_eq!(add_months(date(2026, 1, 31), 1).unwrap(), date(2026, 2, 28));
        assert_eq!(add_months(date(2028, 1, 31), 1).unwrap(), date(2028, 2, 29));
        assert_eq!(add_months(date(2026, 3, 31), -1).unwrap(), date(2026, 2, 28));
        assert_eq!(add_months(date(2028, 3, 31), -1).unwrap(), date(2028, 2, 29));
    }

    #[test]
    fn test_add_months_crosses_year_boundary() {
        assert_eq!(add_months(date(2026, 1, 31), -1).unwrap(), date(2025, 12, 31));
        assert_eq!(add_months(date(2026, 11, 15), 3).unwrap(), date(2027, 2, 15));
    }

    #[test]
    fn test_add_years_leap_day() {
        assert_eq!(add_years(date(2028, 2, 29), 1).unwrap(), date(2029, 2, 28));
        assert_eq!(add_years(date(2028, 2, 29), -4).unwrap(), date(2024, 2, 29));
        assert_eq!(add_years(date(2026, 6, 10), -1).unwrap(), date(2025, 6, 10));
    }

    #[test]
    fn test_parse_period_spec() {
        assert_eq!(parse_period_spec("7").unwrap(), PeriodSpec::Days(7));
        assert_eq!(parse_period_spec("1M").unwrap(), PeriodSpec::Months(1));
        assert_eq!(parse_period_spec("3m").unwrap(), PeriodSpec::Months(3));
        assert_eq!(parse_period_spec("2y").unwrap(), PeriodSpec::Years(2));
        assert_eq!(" 30 ".parse::<PeriodSpec>().unwrap(), PeriodSpec::Days(30));
    }

    #[test]
    fn test_parse_period_spec_rejects_garbage() {
        for token in ["", "M", "1W", "-3", "1.5", "abc", "0", "0M", "1 M", "99999999999"] {
            assert!(
                matches!(parse_period_spec(token), Err(CalendarError::InvalidPeriodSpec(_))),
                "expected {token:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_period_ending_days() {
        let period = period_ending(date(2026, 3, 31), PeriodSpec::Days(7)).unwrap();
        assert_eq!(period.start(), date(2026, 3, 25));
        assert_eq!(period.end(), date(2026, 3, 31));
        assert_eq!(period.len_days(), 7);
    }

    #[test]
    fn test_period_ending_one_month() {
        let spec = parse_period_spec("1M").unwrap();
        let period = period_ending(date(2026, 3, 31), spec).unwrap();
        assert_eq!(period.start(), date(2026, 3, 1));
        assert_eq!(period.end(), date(2026, 3, 31));
    }

    #[test]
    fn test_period_ending_one_year() {
        let period = period_ending(date(2026, 3, 31), PeriodSpec::Years(1)).unwrap();
        assert_eq!(period.start(), date(2025, 4, 1));
        let leap = period_ending(date(2028, 2, 29), PeriodSpec::Years(1)).unwrap();
        assert_eq!(leap.start(), date(2027, 3, 1));
    }

    #[test]
    fn test_period_previous_has_equal_length() {
        let period = period_ending(date(2026, 3, 31), PeriodSpec::Days(7)).unwrap();
        let prev = period.previous().unwrap();
        assert_eq!(prev.end(), date(2026, 3, 24));
        assert_eq!(prev.start(), date(2026, 3, 18));
        assert_eq!(prev.len_days(), period.len_days());
    }

    #[test]
    fn test_period_rejects_inverted_range() {
        let err = Period::new(date(2026, 2, 2), date(2026, 2, 1)).unwrap_err();
        assert!(matches!(err, CalendarError::InvalidPeriod { .. }));
    }

    #[test]
    fn test_period_days_iterates_inclusive() {
        let period = Period::new(date(2026, 2, 27), date(2026, 3, 2)).unwrap();
        let days: Vec<_> = period.days().collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[0], date(2026, 2, 27));
        assert_eq!(days[3], date(2026, 3, 2));
        assert!(period.contains(date(2026, 3, 1)));
        assert!(!period.contains(date(2026, 3, 3)));
    }

    proptest! {
        #[test]
        fn prop_business_day_matches_cutoff_rule(
            secs in 0i64..4_000_000_000i64,
            cutoff in 0u32..24,
        ) {
            let ts: DateTime<Utc> = DateTime::from_timestamp(secs, 0).unwrap();
            let naive: NaiveDateTime = ts.naive_utc();
            let expected = if naive.hour() < cutoff {
                naive.date() - Duration::days(1)
            } else {
                naive.date()
            };
            prop_assert_eq!(resolve_business_day(&ts, cutoff), expected);
        }

        #[test]
        fn prop_period_ending_is_well_formed(days in 1u32..2000, offset in 0i64..20_000) {
            let reference = date(2000, 1, 1) + Duration::days(offset);
            let period = period_ending(reference, PeriodSpec::Days(days)).unwrap();
            prop_assert_eq!(period.end(), reference);
            prop_assert_eq!(period.len_days(), u64::from(days));
            prop_assert!(period.start() <= period.end());
        }

        #[test]
        fn prop_add_months_never_overflows_month(months in -240i32..240, offset in 0i64..20_000) {
            let start = date(2000, 1, 1) + Duration::days(offset);
            let shifted = add_months(start, months).unwrap();
            prop_assert!(shifted.day() <= start.day());
        }
    }
}
