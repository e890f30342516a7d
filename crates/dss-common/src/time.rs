//! DSS date/time values.
//!
//! Legacy grid headers store start and end times as minute-granularity
//! integers: days since 31 Dec 1899 (so 01JAN1900 is day 1) times 1440,
//! plus minutes since midnight. Pathname date parts use the
//! `DDMMMYYYY:HHMM` form, where `2400` denotes the end of the day.

use crate::error::{GridError, GridResult};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// `num_days_from_ce` of 31 Dec 1899, day zero of the DSS calendar.
const JULIAN_BASE_DAYS_FROM_CE: i32 = 693_595;

const MINUTES_PER_DAY: i64 = 1440;

/// A DSS timestamp at minute granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DssTime {
    datetime: NaiveDateTime,
}

impl DssTime {
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Self { datetime }
    }

    /// Parse a DSS date part such as `01JAN2020:0000`, `1Jan2020 2400`
    /// or `01JAN2020` (midnight).
    pub fn parse(s: &str) -> GridResult<Self> {
        let text = s.trim();
        let invalid = || GridError::invalid_field("time", format!("'{}' is not a DSS date/time", s));

        // Only ASCII separators; other text after the date fails the date parse.
        let (date_part, time_part) = match text.find(|c: char| c == ':' || c.is_ascii_whitespace()) {
            Some(idx) => (&text[..idx], text[idx + 1..].trim()),
            None => (text, ""),
        };

        let date = NaiveDate::parse_from_str(date_part, "%d%b%Y").map_err(|_| invalid())?;

        let digits: String = time_part.chars().filter(|c| *c != ':').collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let field = |range: std::ops::Range<usize>| -> GridResult<u32> {
            digits[range].parse::<u32>().map_err(|_| invalid())
        };
        let (hour, minute, second) = match digits.len() {
            0 => (0, 0, 0),
            4 => (field(0..2)?, field(2..4)?, 0),
            6 => (field(0..2)?, field(2..4)?, field(4..6)?),
            _ => return Err(invalid()),
        };

        if hour == 24 && minute == 0 && second == 0 {
            let next = date.succ_opt().ok_or_else(invalid)?;
            let midnight = next.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
            return Ok(Self::from_datetime(midnight));
        }

        let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(invalid)?;
        Ok(Self::from_datetime(date.and_time(time)))
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.datetime
    }

    /// Days since 31 Dec 1899.
    pub fn julian_day(&self) -> i32 {
        self.datetime.date().num_days_from_ce() - JULIAN_BASE_DAYS_FROM_CE
    }

    /// Minute-granularity value stored in legacy `stime`/`etime` slots.
    ///
    /// Dates whose minute count does not fit an `i32` are an error.
    pub fn minutes_value(&self) -> GridResult<i32> {
        let minutes = self.julian_day() as i64 * MINUTES_PER_DAY
            + self.datetime.hour() as i64 * 60
            + self.datetime.minute() as i64;
        i32::try_from(minutes).map_err(|_| {
            GridError::invalid_field(
                "time",
                format!("{} is outside the legacy minute range", self),
            )
        })
    }

    /// Inverse of [`DssTime::minutes_value`].
    pub fn from_minutes_value(value: i32) -> Option<Self> {
        let value = value as i64;
        let days = value.div_euclid(MINUTES_PER_DAY);
        let minutes = value.rem_euclid(MINUTES_PER_DAY);
        let date = NaiveDate::from_num_days_from_ce_opt(JULIAN_BASE_DAYS_FROM_CE + days as i32)?;
        let time = NaiveTime::from_hms_opt((minutes / 60) as u32, (minutes % 60) as u32, 0)?;
        Some(Self::from_datetime(date.and_time(time)))
    }

    /// Signed span from `self` to `later`.
    pub fn span_to(&self, later: &DssTime) -> Duration {
        later.datetime - self.datetime
    }
}

impl fmt::Display for DssTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.datetime.format("%d%b%Y:%H%M").to_string();
        f.write_str(&text.to_uppercase())
    }
}

impl FromStr for DssTime {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
