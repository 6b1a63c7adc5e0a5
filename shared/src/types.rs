//! Common types used across the pipeline

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A calendar month, the row index of every sales series.
///
/// Ordering is by `(year, month)`, which the derived `Ord` gives us because
/// `year` is declared first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

/// Errors produced when building or parsing a [`YearMonth`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum YearMonthError {
    #[error("Month out of range: {0}")]
    MonthOutOfRange(u32),

    #[error("Invalid year-month '{0}', expected YYYY-MM")]
    Malformed(String),
}

impl YearMonth {
    /// Create a year-month, rejecting months outside `1..=12`
    pub fn new(year: i32, month: u32) -> Result<Self, YearMonthError> {
        if !(1..=12).contains(&month) {
            return Err(YearMonthError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// The month a date or timestamp falls in
    pub fn of<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Number of months elapsed since year 0, January.
    fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    /// Signed number of calendar months from `other` to `self`.
    ///
    /// `YearMonth(2023, 1).months_diff(YearMonth(2022, 11)) == 2`
    pub fn months_diff(&self, other: &YearMonth) -> i64 {
        self.ordinal() - other.ordinal()
    }

    /// The month `n` months after this one (`n` may be negative).
    pub fn add_months(&self, n: i64) -> YearMonth {
        let ordinal = self.ordinal() + n;
        YearMonth {
            year: ordinal.div_euclid(12) as i32,
            month: ordinal.rem_euclid(12) as u32 + 1,
        }
    }

    /// The following calendar month
    pub fn next(&self) -> YearMonth {
        self.add_months(1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = YearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || YearMonthError::Malformed(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(malformed)?;
        let year = year.parse::<i32>().map_err(|_| malformed())?;
        let month = month.parse::<u32>().map_err(|_| malformed())?;
        YearMonth::new(year, month)
    }
}
