//! Time-window filtering and calendar-aligned frequency counting.
//!
//! [`count_in_period`] walks the query window one increment at a time and
//! counts the events inside each bucket via [`events_in_period`]. Date
//! granularities calibrate the window to UTC midnight first so bucket
//! boundaries land on calendar days regardless of the query's time-of-day;
//! the `hours` granularity buckets from the exact supplied timestamp.
//!
//! Bucket membership is inclusive on both ends, matching the filter
//! primitive. An event sitting exactly on an interior bucket boundary is
//! therefore counted in both adjacent buckets. Known edge case.

use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, TimeZone, Utc, Weekday};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::model::Scrobble;

/// Granularity of a frequency histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    /// Clock-hour buckets from the exact start timestamp
    Hours,
    /// Calendar days, midnight-aligned
    Days,
    /// Calendar weeks, midnight-aligned
    Weeks,
    /// Calendar months, midnight-aligned
    Months,
    /// Calendar years, midnight-aligned
    Years,
    /// 7-day buckets anchored to the weekday of the window start
    Weekdays,
}

impl PeriodUnit {
    /// All date granularities calibrate the window to midnight before
    /// bucketing; `hours` is the only clock granularity.
    fn is_date_unit(self) -> bool {
        !matches!(self, Self::Hours)
    }
}

impl FromStr for PeriodUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hours" => Ok(Self::Hours),
            "days" => Ok(Self::Days),
            "weeks" => Ok(Self::Weeks),
            "months" => Ok(Self::Months),
            "years" => Ok(Self::Years),
            "weekdays" => Ok(Self::Weekdays),
            other => Err(Error::unsupported_unit(other)),
        }
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hours => "hours",
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Years => "years",
            Self::Weekdays => "weekdays",
        };
        f.write_str(name)
    }
}

/// Return all events with `start <= timestamp <= end`, in input order.
///
/// This is the one filtering primitive every aggregation and ranking
/// operation reuses. Inclusive on both ends.
pub fn events_in_period<'a>(
    events: &'a [Scrobble],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&'a Scrobble> {
    events
        .iter()
        .filter(|scrobble| start <= scrobble.timestamp && scrobble.timestamp <= end)
        .collect()
}

/// Count events per calendar-aligned bucket across `[start, end]`.
///
/// Buckets start at the calibrated window start and advance by one
/// `unit` increment; a bucket is emitted only while its end still lies
/// within the calibrated window. Keys are the bucket-start timestamps.
/// A window with `end < start` (after calibration) yields an empty map.
pub fn count_in_period(
    events: &[Scrobble],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    unit: PeriodUnit,
) -> BTreeMap<DateTime<Utc>, u64> {
    let (start, end) = if unit.is_date_unit() {
        (midnight_of(start), midnight_of(end))
    } else {
        (start, end)
    };
    let anchor = start.weekday();

    let mut counts = BTreeMap::new();
    let mut current = start;
    while let Some(next) = advance(current, unit, anchor) {
        if next > end {
            break;
        }
        let played = events_in_period(events, current, next).len() as u64;
        counts.insert(current, played);
        current = next;
    }
    counts
}

/// Truncate a timestamp to midnight of its UTC calendar day.
fn midnight_of(ts: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&ts.date_naive().and_time(NaiveTime::MIN))
}

/// Advance a bucket start by one unit increment.
///
/// Returns `None` when the calendar arithmetic leaves the representable
/// range, which ends bucket generation.
fn advance(current: DateTime<Utc>, unit: PeriodUnit, anchor: Weekday) -> Option<DateTime<Utc>> {
    match unit {
        PeriodUnit::Hours => current.checked_add_signed(Duration::hours(1)),
        PeriodUnit::Days => current.checked_add_signed(Duration::days(1)),
        PeriodUnit::Weeks => current.checked_add_signed(Duration::weeks(1)),
        PeriodUnit::Months => current.checked_add_months(Months::new(1)),
        PeriodUnit::Years => current.checked_add_months(Months::new(12)),
        PeriodUnit::Weekdays => next_occurrence_of(current, anchor),
    }
}

/// The next day after `current` falling on `weekday`.
///
/// Bucket starts share the window start's weekday, so in practice this is
/// always exactly seven days ahead.
fn next_occurrence_of(current: DateTime<Utc>, weekday: Weekday) -> Option<DateTime<Utc>> {
    let mut next = current.checked_add_signed(Duration::days(1))?;
    while next.weekday() != weekday {
        next = next.checked_add_signed(Duration::days(1))?;
    }
    Some(next)
}
