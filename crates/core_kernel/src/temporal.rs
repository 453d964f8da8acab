//! Business calendar helpers
//!
//! Due dates are calendar dates in the business timezone while creation
//! timestamps are stored in UTC. These helpers convert between the two and
//! provide the month buckets used by the dashboard statistics.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Date out of range: {0}")]
    OutOfRange(String),
}

/// Timezone wrapper for the business calendar
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| TemporalError::InvalidTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the calendar date of a UTC instant in this timezone
    pub fn local_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        utc.with_timezone(&self.0).date_naive()
    }

    /// Gets the start of day (00:00:00) in this timezone as UTC
    ///
    /// Returns `None` if midnight does not exist on that date (DST gap).
    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        date.and_hms_opt(0, 0, 0)?
            .and_local_timezone(self.0)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    }

    /// Returns the month containing a UTC instant in this timezone
    pub fn month_of(&self, utc: DateTime<Utc>) -> Month {
        Month::of(self.local_date(utc))
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::Asia::Seoul)
    }
}

/// A calendar month, displayed as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Creates a month, validating the month number (1-12)
    pub fn new(year: i32, month: u32) -> Result<Self, TemporalError> {
        if !(1..=12).contains(&month) {
            return Err(TemporalError::InvalidMonth(format!("{}-{}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// Returns the month containing the given date
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First calendar day of the month
    pub fn first_day(&self) -> Result<NaiveDate, TemporalError> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or_else(|| TemporalError::OutOfRange(self.to_string()))
    }

    /// The following month
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// The month `n` months before this one
    pub fn minus_months(&self, n: u32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) - n as i32;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Half-open date range `[first day, first day of next month)`
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate), TemporalError> {
        Ok((self.first_day()?, self.next().first_day()?))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| TemporalError::InvalidMonth(s.to_string()))?;
        let year = year
            .parse()
            .map_err(|_| TemporalError::InvalidMonth(s.to_string()))?;
        let month = month
            .parse()
            .map_err(|_| TemporalError::InvalidMonth(s.to_string()))?;
        Month::new(year, month)
    }
}

impl Serialize for Month {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_month_display() {
        let month = Month::new(2024, 3).unwrap();
        assert_eq!(month.to_string(), "2024-03");
    }

    #[test]
    fn test_month_wraps_year() {
        let december = Month::new(2024, 12).unwrap();
        assert_eq!(december.next(), Month::new(2025, 1).unwrap());

        let february = Month::new(2025, 2).unwrap();
        assert_eq!(february.minus_months(6), Month::new(2024, 8).unwrap());
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        let tz = Timezone::default();
        // 2024-03-31 16:00 UTC is 2024-04-01 01:00 in Seoul
        let utc = Utc.with_ymd_and_hms(2024, 3, 31, 16, 0, 0).unwrap();
        assert_eq!(tz.local_date(utc), NaiveDate::from_ymd_opt(2024, 4, 1).unwrap());
        assert_eq!(tz.month_of(utc).to_string(), "2024-04");
    }
}
