//! Year-month periods and the date helpers built on them.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use time::{Date, Month};

use crate::Error;

/// A calendar month, written `YYYYMM` (e.g. `202501` for January 2025).
///
/// Entries are bucketed by period: a transaction may have at most one entry per period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: Month,
}

impl Period {
    /// The period containing `date`.
    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The year of the period.
    pub fn year(self) -> i32 {
        self.year
    }

    /// The month of the period.
    pub fn month(self) -> Month {
        self.month
    }
}

impl FromStr for Period {
    type Err = Error;

    /// Parse a period from exactly six digits, `YYYYMM`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidPeriod] if `text` is not six digits or the month is not 01 to 12.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidPeriod(text.to_owned());

        if text.len() != 6 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = text[..4].parse().map_err(|_| invalid())?;
        let month: u8 = text[4..].parse().map_err(|_| invalid())?;
        let month = Month::try_from(month).map_err(|_| invalid())?;

        Ok(Self { year, month })
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}{:02}", self.year, u8::from(self.month))
    }
}

impl Serialize for Period {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

/// Periods are read from integer `YYYYMM` columns, or from text.
impl FromSql for Period {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = match value {
            ValueRef::Integer(period) => period.to_string(),
            _ => String::column_result(value)?,
        };

        text.parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// Advance `date` by `months` calendar months.
///
/// The day of the month is kept when the target month has it, otherwise it is clamped to the
/// last day of that month, e.g. 2025-01-31 plus one month is 2025-02-28.
///
/// Returns `None` if the result is outside the range [Date] supports.
pub fn add_months(date: Date, months: u32) -> Option<Date> {
    let month_index =
        i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1 + i64::from(months);

    let year = i32::try_from(month_index.div_euclid(12)).ok()?;
    let month = u8::try_from(month_index.rem_euclid(12) + 1).ok()?;
    let month = Month::try_from(month).ok()?;

    let mut day = date.day();

    loop {
        match Date::from_calendar_date(year, month, day) {
            Ok(date) => return Some(date),
            Err(_) if day > 28 => day -= 1,
            Err(_) => return None,
        }
    }
}

/// Serde helpers for dates written as `YYYY-MM-DD`.
pub mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer, de, ser};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    const DATE_FORMAT: &[BorrowedFormatItem] =
        format_description!("[year]-[month repr:numerical padding:zero]-[day padding:zero]");

    /// Write `date` as `YYYY-MM-DD`.
    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = date.format(DATE_FORMAT).map_err(ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    /// Read a date written as `YYYY-MM-DD`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;

        Date::parse(&text, DATE_FORMAT)
            .map_err(|error| de::Error::custom(format!("invalid date \"{text}\": {error}")))
    }
}
