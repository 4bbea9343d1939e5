//! Calendar month keys
//!
//! Billing buckets are keyed by zero-padded `YYYY-MM` strings. Because the
//! format is fixed-width, lexicographic order on the string is chronological
//! order, and policy thresholds can be compared with plain `>=`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;

/// A validated `YYYY-MM` month key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey(String);

impl MonthKey {
    /// Parse a `YYYY-MM` string
    pub fn parse(value: &str) -> Result<Self, AppError> {
        if is_month_shape(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(AppError::InvalidMonth(value.to_string()))
        }
    }

    /// Wrap a literal already known to be `YYYY-MM`
    pub(crate) fn new_unchecked(value: &str) -> Self {
        debug_assert!(is_month_shape(value));
        Self(value.to_string())
    }

    /// Month key of a raw `YYYY-MM-DD...` string by slicing its first seven
    /// characters. No date is constructed, so no timezone can shift the day.
    pub fn from_date_str(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let prefix = raw.get(..7)?;
        if !is_month_shape(prefix) {
            return None;
        }
        // Anything after the month must continue as "-DD"
        match raw.as_bytes().get(7) {
            None | Some(b'-') => Some(Self(prefix.to_string())),
            Some(_) => None,
        }
    }

    /// Month containing a calendar date
    pub fn from_date(date: NaiveDate) -> Self {
        Self(format!("{:04}-{:02}", date.year(), date.month()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn year(&self) -> i32 {
        self.0[..4].parse().unwrap_or_default()
    }

    pub fn month(&self) -> u32 {
        self.0[5..7].parse().unwrap_or_default()
    }

    /// First calendar day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year(), self.month(), 1)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Last calendar day of the month
    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    /// Number of days in the month (28..=31)
    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// The following month
    pub fn next(&self) -> Self {
        let (year, month) = if self.month() == 12 {
            (self.year() + 1, 1)
        } else {
            (self.year(), self.month() + 1)
        };
        Self(format!("{:04}-{:02}", year, month))
    }

    /// Whether a date falls inside this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }
}

fn is_month_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return false;
    }
    if !bytes[..4].iter().chain(&bytes[5..]).all(u8::is_ascii_digit) {
        return false;
    }
    matches!(value[5..].parse::<u32>(), Ok(1..=12))
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        MonthKey::parse(&value)
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.0
    }
}
