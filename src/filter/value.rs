//! Scalar values that can appear on the right-hand side of a filter condition.

use std::fmt::Display;

use rusqlite::{
    ToSql,
    types::{Null, ToSqlOutput},
};
use serde::Serialize;

/// A literal value compared against a column.
///
/// Values are always bound as query parameters, never interpolated into the SQL text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A text value.
    Text(String),
    /// A boolean value.
    Bool(bool),
    /// A numeric value.
    Number(f64),
    /// The SQL `NULL` value.
    Null,
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl<T> From<Option<T>> for FilterValue
where
    T: Into<FilterValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl ToSql for FilterValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            FilterValue::Text(text) => text.to_sql(),
            FilterValue::Bool(boolean) => boolean.to_sql(),
            FilterValue::Number(number) => number.to_sql(),
            FilterValue::Null => Null.to_sql(),
        }
    }
}

impl Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Text(text) => write!(f, "'{text}'"),
            FilterValue::Bool(boolean) => boolean.fmt(f),
            FilterValue::Number(number) => number.fmt(f),
            FilterValue::Null => f.write_str("null"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::{Connection, params_from_iter};

    use crate::filter::FilterValue;

    #[test]
    fn converts_from_rust_types() {
        assert_eq!(FilterValue::from("a"), FilterValue::Text("a".to_owned()));
        assert_eq!(FilterValue::from(true), FilterValue::Bool(true));
        assert_eq!(FilterValue::from(3), FilterValue::Number(3.0));
        assert_eq!(FilterValue::from(None::<i64>), FilterValue::Null);
        assert_eq!(FilterValue::from(Some(1.5)), FilterValue::Number(1.5));
    }

    #[test]
    fn binds_as_sqlite_parameters() {
        let connection = Connection::open_in_memory().unwrap();

        let args = vec![
            FilterValue::from("text"),
            FilterValue::Bool(true),
            FilterValue::Number(42.0),
            FilterValue::Number(3.14),
            FilterValue::Null,
        ];

        let got: (String, i64, f64, f64, Option<i64>) = connection
            .query_row(
                "SELECT $1, $2, $3, $4, $5",
                params_from_iter(args.iter()),
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .unwrap();

        assert_eq!(got, ("text".to_owned(), 1, 42.0, 3.14, None));
    }
}
