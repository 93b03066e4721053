//! Calendar month keys for quota bucketing.
//!
//! Override budgets reset monthly without any scheduled job: quota records
//! are simply keyed by the month they belong to, so a new month reads as an
//! absent record and starts from zero. [`MonthKey`] is that bucket key.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a month key cannot be parsed or constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month key (expected YYYY-MM)")]
pub struct InvalidMonthKey;

/// A calendar month in UTC, rendered as `YYYY-MM`.
///
/// Keys order chronologically, both as values (derived `Ord`) and as their
/// string form, which the store relies on for stable quota keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Create a key for the given year and month.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMonthKey`] unless the year is in `1..=9999` and the
    /// month in `1..=12`.
    pub fn new(year: i32, month: u32) -> Result<Self, InvalidMonthKey> {
        if (1..=9999).contains(&year) && (1..=12).contains(&month) {
            Ok(Self { year, month })
        } else {
            Err(InvalidMonthKey)
        }
    }

    /// The key for the month containing the given instant.
    #[must_use]
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// The key for the month containing the given date.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The key for the current month (UTC wall clock).
    #[must_use]
    pub fn current() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// The month immediately after this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Midnight UTC on the first day of the month.
    ///
    /// # Panics
    ///
    /// Never panics for a validated key; the first of any month in
    /// `1..=9999` is a representable instant.
    #[must_use]
    pub fn first_instant(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(self.year, self.month, 1, 0, 0, 0)
            .single()
            .expect("validated month key")
    }

    /// The instant the override budget for this month lapses.
    #[must_use]
    pub fn next_reset(&self) -> DateTime<Utc> {
        self.next().first_instant()
    }

    /// Whether the given date falls inside this month.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for MonthKey {
    type Err = InvalidMonthKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s.split_once('-').ok_or(InvalidMonthKey)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(InvalidMonthKey);
        }
        let year = year.parse().map_err(|_| InvalidMonthKey)?;
        let month = month.parse().map_err(|_| InvalidMonthKey)?;
        Self::new(year, month)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = InvalidMonthKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}
