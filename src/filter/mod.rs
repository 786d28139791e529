//! Dynamic, parameterized SQL filtering.
//!
//! A [FilterBuilder] collects conditions, ordering and paging bounds, [parse_filter] turns the
//! `filter` query parameter into builder calls, and the [statement] functions apply a builder to
//! SELECT, COUNT and DELETE statements.

mod builder;
mod operator;
mod parser;
pub mod statement;
mod value;

pub use builder::{Condition, Direction, FilterBuilder, WhereClause};
pub use operator::Operator;
pub use parser::{parse_filter, parse_value};
pub use statement::Statement;
pub use value::FilterValue;

/// Errors raised while building or parsing a filter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    /// The operator token is not in the operator table.
    #[error("invalid operator: {0}")]
    InvalidOperator(String),

    /// The `ORDER BY` direction was not `asc` or `desc`.
    #[error("invalid direction for ORDER BY: {0} (use 'asc' or 'desc')")]
    InvalidOrderDirection(String),

    /// An `ORDER BY` term was added without a field.
    #[error("empty field for ORDER BY")]
    EmptyOrderField,

    /// A negative row limit was requested.
    #[error("limit cannot be negative: {0}")]
    NegativeLimit(i64),

    /// A negative row offset was requested.
    #[error("offset cannot be negative: {0}")]
    NegativeOffset(i64),

    /// A filter term did not have the form `field op value`.
    #[error("filter syntax error at '{0}'")]
    Syntax(String),

    /// A filter term used an operator that query strings may not use.
    #[error("operator '{operator}' not allowed at '{fragment}'")]
    OperatorNotAllowed {
        /// The rejected operator.
        operator: String,
        /// The term the operator appeared in.
        fragment: String,
    },

    /// A filter value was not a quoted string, boolean, `null` or number.
    #[error("invalid value {0}")]
    InvalidValue(String),

    /// A filter or ordering referenced a field that may not be queried.
    #[error("unknown field '{0}'")]
    UnknownField(String),
}
