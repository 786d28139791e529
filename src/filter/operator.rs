//! The fixed table of comparison operators a filter may use.

use std::{fmt::Display, str::FromStr};

use super::FilterError;

/// A comparison operator in a filter condition.
///
/// Each operator has a short token used by callers (e.g., `"gte"`) and maps to exactly one SQL
/// comparison fragment (e.g., `>=`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IN`
    In,
    /// `NOT IN`
    NotIn,
    /// `IS`
    Is,
    /// `IS NOT`
    IsNot,
}

impl Operator {
    /// Every operator, in table order.
    pub const ALL: [Operator; 12] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::Like,
        Operator::NotLike,
        Operator::In,
        Operator::NotIn,
        Operator::Is,
        Operator::IsNot,
    ];

    /// The token callers use to name the operator.
    pub fn token(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Like => "like",
            Operator::NotLike => "nlike",
            Operator::In => "in",
            Operator::NotIn => "nin",
            Operator::Is => "is",
            Operator::IsNot => "isn",
        }
    }

    /// The SQL comparison fragment for the operator.
    pub fn sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
        }
    }

    /// The tokens of all valid operators.
    pub fn valid_tokens() -> Vec<&'static str> {
        Self::ALL.iter().map(|operator| operator.token()).collect()
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    /// Parse an operator token. Tokens are case sensitive.
    ///
    /// # Errors
    ///
    /// Returns [FilterError::InvalidOperator] if `token` is not in the operator table.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|operator| operator.token() == token)
            .ok_or_else(|| FilterError::InvalidOperator(token.to_owned()))
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}
