//! Monetary amounts stored as a whole number of cents.

use std::{fmt::Display, ops::Neg, str::FromStr};

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Error;

/// An amount of money in cents.
///
/// Amounts are parsed from their decimal text, e.g. `"12.34"` is exactly 1234 cents. JSON numbers
/// are read through the shortest decimal text that round-trips the number, so `0.1` is read as 10
/// cents rather than whatever `0.1 * 100.0` happens to be. Digits past the second decimal place
/// round half away from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cents(i64);

impl Cents {
    /// Zero cents.
    pub const ZERO: Cents = Cents(0);

    /// Create an amount from a number of cents.
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// The number of cents.
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// The amount in whole currency units, e.g. 1234 cents is 12.34.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// The absolute value of the amount.
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// The amount with a negative sign, whatever its original sign.
    pub fn negative(self) -> Self {
        Self(-self.0.abs())
    }

    /// The amount with a positive sign, whatever its original sign.
    pub fn positive(self) -> Self {
        self.abs()
    }
}

impl Neg for Cents {
    type Output = Cents;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl FromStr for Cents {
    type Err = Error;

    /// Parse a decimal amount such as `"-12.5"` or `"1000"`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `text` is not a plain decimal number or does not fit in
    /// 64 bits of cents.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_cents(text)
            .map(Cents)
            .ok_or_else(|| Error::InvalidAmount(text.to_owned()))
    }
}

fn parse_cents(text: &str) -> Option<i64> {
    let text = text.trim();
    let (is_negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };

    let fraction = fraction.as_bytes();
    let digit = |index: usize| fraction.get(index).map_or(0, |b| i64::from(b - b'0'));

    let mut cents = whole
        .checked_mul(100)?
        .checked_add(digit(0) * 10 + digit(1))?;

    if digit(2) >= 5 {
        cents = cents.checked_add(1)?;
    }

    Some(if is_negative { -cents } else { cents })
}

impl Display for Cents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();

        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Cents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Cents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(CentsVisitor)
    }
}

struct CentsVisitor;

impl de::Visitor<'_> for CentsVisitor {
    type Value = Cents;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a decimal amount of money")
    }

    fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        value
            .checked_mul(100)
            .map(Cents)
            .ok_or_else(|| E::custom(format!("amount {value} is out of range")))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        i64::try_from(value)
            .map_err(|_| E::custom(format!("amount {value} is out of range")))
            .and_then(|value| self.visit_i64(value))
    }

    fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if !value.is_finite() {
            return Err(E::custom(format!("amount {value} is not a finite number")));
        }

        // `Display` for f64 prints the shortest decimal that round-trips, without an exponent.
        self.visit_str(&value.to_string())
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        value.parse().map_err(E::custom)
    }
}

impl ToSql for Cents {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for Cents {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Cents)
    }
}
