//! Calendar arithmetic for the week planner.
//!
//! Weeks start on Monday. Every date comparison in the ledger, the week
//! overrides and the aggregator goes through [`IsoDate`], the canonical
//! `YYYY-MM-DD` identity of a local calendar day: any instant on the same day
//! maps to the same `IsoDate`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Format of the canonical date identity.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Day zero of the alternate rotation, 2024-01-01 (a Monday).
pub const ROTATION_EPOCH: &str = "2024-01-01";

/// `num_days_from_ce` of [`ROTATION_EPOCH`].
const ROTATION_EPOCH_DAYS_FROM_CE: i32 = 738_886;

const LAST_MILLI_OF_DAY: i64 = 24 * 60 * 60 * 1000 - 1;

/// Canonical calendar-day identity, ordered chronologically.
///
/// Chronological order equals the lexicographic order of the fixed-width
/// string form, so ranges over serialized keys and over `IsoDate` agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoDate(NaiveDate);

impl IsoDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn today() -> Self {
        Self(today())
    }
}

impl From<NaiveDate> for IsoDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<NaiveDateTime> for IsoDate {
    fn from(value: NaiveDateTime) -> Self {
        Self(value.date())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for IsoDate {
    fn from(value: DateTime<Tz>) -> Self {
        Self(value.date_naive())
    }
}

impl From<IsoDate> for NaiveDate {
    fn from(value: IsoDate) -> Self {
        value.0
    }
}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_DATE_FORMAT))
    }
}

impl FromStr for IsoDate {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
            .map(Self)
            .map_err(|_| Error::InvalidDate(trimmed.to_string()))
    }
}

impl Serialize for IsoDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IsoDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Canonical identity of the calendar day containing `value`.
pub fn iso_date(value: impl Into<IsoDate>) -> IsoDate {
    value.into()
}

/// Today's local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Monday of the week containing `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    add_days(date, -(day_index(date) as i64))
}

/// The seven dates Monday..Sunday starting at `week_start`.
pub fn week_days(week_start: NaiveDate) -> [NaiveDate; 7] {
    std::array::from_fn(|offset| add_days(week_start, offset as i64))
}

/// Recurrence slot of `date`: Monday is 0, Sunday is 6.
pub fn day_index(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

pub fn add_days(date: NaiveDate, amount: i64) -> NaiveDate {
    date + Duration::days(amount)
}

pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::default())
}

/// Last representable millisecond of `date` (23:59:59.999).
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::milliseconds(LAST_MILLI_OF_DAY)
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    add_days(date, -(date.day0() as i64))
}

/// Inclusive end of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDateTime {
    let next_month = start_of_month(add_days(start_of_month(date), 31));
    end_of_day(add_days(next_month, -1))
}

pub fn start_of_year(date: NaiveDate) -> NaiveDate {
    add_days(date, -(date.ordinal0() as i64))
}

/// Inclusive end of the year containing `date`.
pub fn end_of_year(date: NaiveDate) -> NaiveDateTime {
    let next_year = start_of_year(add_days(start_of_year(date), 366));
    end_of_day(add_days(next_year, -1))
}

/// Calendar days spanned by `start..=end`, ignoring time of day.
///
/// Returns 0 when `end` falls on an earlier day than `start`.
pub fn inclusive_day_count(start: impl Into<IsoDate>, end: impl Into<IsoDate>) -> u64 {
    let start = start.into().date();
    let end = end.into().date();
    let diff = (end - start).num_days();
    if diff < 0 {
        0
    } else {
        diff as u64 + 1
    }
}

/// `min(end, end of today)`, so statistics never walk into the future.
pub fn clamp_range_end_to_today(end: NaiveDateTime, today: NaiveDate) -> NaiveDateTime {
    end.min(end_of_day(today))
}

/// Whole days between the rotation epoch and `date`; negative before it.
pub fn days_since_epoch(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce() - ROTATION_EPOCH_DAYS_FROM_CE)
}
