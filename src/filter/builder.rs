//! A fluent builder that renders filter conditions into a parameterized SQL `WHERE` fragment.

use std::str::FromStr;

use super::{FilterError, FilterValue, Operator};

/// One comparison requested by a caller, e.g. `status eq 'active'`.
///
/// The operator is kept as the caller's token and checked against the operator table when the
/// condition is handed to a [FilterBuilder].
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// The column the condition applies to.
    pub field: String,
    /// The operator token, e.g. `"eq"` or `"like"`.
    pub operator: String,
    /// The value the column is compared against.
    pub value: FilterValue,
}

impl Condition {
    /// Create a condition from a field, operator token and value.
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// The direction of an `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = FilterError;

    /// Parse `asc` or `desc` in any letter case.
    fn from_str(direction: &str) -> Result<Self, Self::Err> {
        match direction.to_uppercase().as_str() {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            other => Err(FilterError::InvalidOrderDirection(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Comparison {
    field: String,
    operator: Operator,
    value: FilterValue,
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    And(Comparison),
    Or(Vec<Comparison>),
}

#[derive(Debug, Clone, PartialEq)]
struct OrderClause {
    field: String,
    direction: Direction,
}

/// The rendered `WHERE` fragment of a filter and its positional arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WhereClause {
    /// The SQL text, without the `WHERE` keyword. Empty when the filter has no conditions.
    pub sql: String,
    /// The arguments for the placeholders `$1..$n`, in placeholder order.
    pub args: Vec<FilterValue>,
}

/// Accumulates conditions, ordering and paging bounds for one query.
///
/// The first invalid call records an error and every later call is a no-op, so a chain of calls
/// can be written without checking each step:
///
/// ```
/// use wallet_rs::filter::{Condition, FilterBuilder};
///
/// let clause = FilterBuilder::new()
///     .and("user_id", "eq", 7)
///     .or([
///         Condition::new("type", "eq", "income"),
///         Condition::new("type", "eq", "installment"),
///     ])
///     .order_by("reference_date", "desc")
///     .limit(11)
///     .build()
///     .unwrap();
///
/// assert_eq!(clause.sql, "user_id = $1 AND (type = $2 OR type = $3)");
/// assert_eq!(clause.args.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterBuilder {
    predicates: Vec<Predicate>,
    order_by: Vec<OrderClause>,
    limit: Option<u64>,
    offset: Option<u64>,
    error: Option<FilterError>,
}

impl FilterBuilder {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition that must hold for a row to match.
    pub fn and(
        mut self,
        field: impl Into<String>,
        operator: &str,
        value: impl Into<FilterValue>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }

        match Operator::from_str(operator) {
            Ok(operator) => self.predicates.push(Predicate::And(Comparison {
                field: field.into(),
                operator,
                value: value.into(),
            })),
            Err(error) => self.error = Some(error),
        }

        self
    }

    /// Add a group of conditions of which at least one must hold.
    ///
    /// An empty group is accepted and does not change the rendered SQL.
    pub fn or(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        if self.error.is_some() {
            return self;
        }

        let group: Result<Vec<Comparison>, FilterError> = conditions
            .into_iter()
            .map(|condition| -> Result<Comparison, FilterError> {
                Ok(Comparison {
                    operator: Operator::from_str(&condition.operator)?,
                    field: condition.field,
                    value: condition.value,
                })
            })
            .collect();

        match group {
            Ok(group) if group.is_empty() => {}
            Ok(group) => self.predicates.push(Predicate::Or(group)),
            Err(error) => self.error = Some(error),
        }

        self
    }

    /// Add an `ORDER BY` term. `direction` must be `asc` or `desc`, in any letter case.
    pub fn order_by(mut self, field: impl Into<String>, direction: &str) -> Self {
        if self.error.is_some() {
            return self;
        }

        let direction = match Direction::from_str(direction) {
            Ok(direction) => direction,
            Err(error) => {
                self.error = Some(error);
                return self;
            }
        };

        let field = field.into();
        if field.trim().is_empty() {
            self.error = Some(FilterError::EmptyOrderField);
            return self;
        }

        self.order_by.push(OrderClause { field, direction });
        self
    }

    /// Set the maximum number of rows to return.
    pub fn limit(mut self, limit: i64) -> Self {
        if self.error.is_some() {
            return self;
        }

        match u64::try_from(limit) {
            Ok(limit) => self.limit = Some(limit),
            Err(_) => self.error = Some(FilterError::NegativeLimit(limit)),
        }

        self
    }

    /// Set the number of rows to skip.
    pub fn offset(mut self, offset: i64) -> Self {
        if self.error.is_some() {
            return self;
        }

        match u64::try_from(offset) {
            Ok(offset) => self.offset = Some(offset),
            Err(_) => self.error = Some(FilterError::NegativeOffset(offset)),
        }

        self
    }

    /// Render the conditions as a `WHERE` fragment with `$n` placeholders.
    ///
    /// Conditions are joined with `AND` in the order they were added and each OR group is
    /// rendered in parentheses. Placeholders are numbered left to right from `$1`. Ordering and
    /// paging are not part of the fragment, see [Self::order_by_terms], [Self::limit_value] and
    /// [Self::offset_value].
    ///
    /// # Errors
    ///
    /// Returns the first error recorded by an earlier call.
    pub fn build(&self) -> Result<WhereClause, FilterError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        let mut args = Vec::new();
        let mut render = |comparison: &Comparison| {
            args.push(comparison.value.clone());
            format!(
                "{} {} ${}",
                comparison.field,
                comparison.operator.sql(),
                args.len()
            )
        };

        let parts: Vec<String> = self
            .predicates
            .iter()
            .map(|predicate| match predicate {
                Predicate::And(comparison) => render(comparison),
                Predicate::Or(group) => {
                    let terms: Vec<String> = group.iter().map(&mut render).collect();
                    format!("({})", terms.join(" OR "))
                }
            })
            .collect();

        Ok(WhereClause {
            sql: parts.join(" AND "),
            args,
        })
    }

    /// The `ORDER BY` terms as `"field DIRECTION"` strings, or `None` if no ordering was added.
    pub fn order_by_terms(&self) -> Option<Vec<String>> {
        if self.order_by.is_empty() {
            return None;
        }

        Some(
            self.order_by
                .iter()
                .map(|clause| format!("{} {}", clause.field, clause.direction.as_sql()))
                .collect(),
        )
    }

    /// The row limit, if one was set.
    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    /// The row offset, if one was set.
    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    /// Whether an invalid call has been recorded.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// The first recorded error, if any.
    pub fn error(&self) -> Option<&FilterError> {
        self.error.as_ref()
    }

    /// A copy of this filter with the same conditions (and error) but no ordering or paging.
    ///
    /// Used to count every row a paged query could return.
    pub fn without_paging(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            error: self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::filter::{Condition, FilterBuilder, FilterError, FilterValue, WhereClause};

    #[test]
    fn renders_single_condition() {
        let got = FilterBuilder::new().and("id", "eq", 10).build();

        assert_eq!(
            got,
            Ok(WhereClause {
                sql: "id = $1".to_owned(),
                args: vec![FilterValue::Number(10.0)],
            })
        );
    }

    #[test]
    fn numbers_and_conditions_left_to_right() {
        let got = FilterBuilder::new()
            .and("a", "eq", 1)
            .and("b", "like", "%x%")
            .build()
            .unwrap();

        assert_eq!(got.sql, "a = $1 AND b LIKE $2");
        assert_eq!(got.args, vec![FilterValue::from(1), FilterValue::from("%x%")]);
    }

    #[test]
    fn renders_or_group_in_parentheses() {
        let got = FilterBuilder::new()
            .or([
                Condition::new("s", "eq", "active"),
                Condition::new("s", "eq", "pending"),
            ])
            .build()
            .unwrap();

        assert_eq!(got.sql, "(s = $1 OR s = $2)");
        assert_eq!(
            got.args,
            vec![FilterValue::from("active"), FilterValue::from("pending")]
        );
    }

    #[test]
    fn numbers_mixed_predicates_in_insertion_order() {
        let got = FilterBuilder::new()
            .and("id", "gt", 5)
            .or([
                Condition::new("status", "ne", "inactive"),
                Condition::new("status", "ne", "deleted"),
            ])
            .and("created_at", "lt", "2024-01-01")
            .build()
            .unwrap();

        assert_eq!(
            got.sql,
            "id > $1 AND (status != $2 OR status != $3) AND created_at < $4"
        );
        assert_eq!(
            got.args,
            vec![
                FilterValue::from(5),
                FilterValue::from("inactive"),
                FilterValue::from("deleted"),
                FilterValue::from("2024-01-01"),
            ]
        );
    }

    #[test]
    fn renders_every_operator() {
        let want = [
            ("eq", "="),
            ("ne", "!="),
            ("gt", ">"),
            ("gte", ">="),
            ("lt", "<"),
            ("lte", "<="),
            ("like", "LIKE"),
            ("nlike", "NOT LIKE"),
            ("in", "IN"),
            ("nin", "NOT IN"),
            ("is", "IS"),
            ("isn", "IS NOT"),
        ];

        for (token, sql) in want {
            let got = FilterBuilder::new().and("f", token, 1).build().unwrap();

            assert_eq!(got.sql, format!("f {sql} $1"));
        }
    }

    #[test]
    fn empty_or_group_renders_nothing() {
        let got = FilterBuilder::new()
            .and("a", "eq", 1)
            .or(Vec::new())
            .and("b", "eq", 2)
            .build()
            .unwrap();

        assert_eq!(got.sql, "a = $1 AND b = $2");
    }

    #[test]
    fn empty_filter_renders_empty_clause() {
        let got = FilterBuilder::new()
            .order_by("name", "asc")
            .limit(10)
            .offset(20)
            .build();

        assert_eq!(got, Ok(WhereClause::default()));
    }

    #[test]
    fn invalid_operator_is_sticky() {
        let filter = FilterBuilder::new().and("id", "invalid", 10);

        assert!(filter.has_error());
        let error = filter.build().unwrap_err();
        assert!(error.to_string().contains("invalid operator: invalid"));
    }

    #[test]
    fn invalid_operator_in_or_group_is_sticky() {
        let filter = FilterBuilder::new().or([
            Condition::new("status", "eq", "active"),
            Condition::new("status", "invalid_op", "pending"),
        ]);

        assert_eq!(
            filter.build(),
            Err(FilterError::InvalidOperator("invalid_op".to_owned()))
        );
    }

    #[test]
    fn first_error_wins_and_later_calls_are_ignored() {
        let first = FilterError::InvalidOperator("nope".to_owned());
        let filter = FilterBuilder::new()
            .and("a", "eq", 1)
            .and("b", "nope", 2)
            .limit(-1)
            .offset(-1)
            .order_by("", "sideways")
            .or([Condition::new("c", "bad", 3)])
            .and("d", "eq", 4)
            .limit(5);

        assert_eq!(filter.error(), Some(&first));
        assert_eq!(filter.build(), Err(first));
        assert_eq!(filter.limit_value(), None);
        assert_eq!(filter.order_by_terms(), None);
    }

    #[test]
    fn order_by_canonicalizes_direction() {
        let filter = FilterBuilder::new()
            .order_by("name", "asc")
            .order_by("created_at", "DeSc");

        assert_eq!(
            filter.order_by_terms(),
            Some(vec!["name ASC".to_owned(), "created_at DESC".to_owned()])
        );
    }

    #[test]
    fn order_by_rejects_invalid_direction() {
        let filter = FilterBuilder::new().order_by("name", "up");

        assert_eq!(
            filter.error(),
            Some(&FilterError::InvalidOrderDirection("UP".to_owned()))
        );
    }

    #[test]
    fn order_by_rejects_empty_field() {
        let filter = FilterBuilder::new().order_by("  ", "asc");

        assert_eq!(filter.error(), Some(&FilterError::EmptyOrderField));
    }

    #[test]
    fn order_by_terms_is_none_without_ordering() {
        assert_eq!(FilterBuilder::new().order_by_terms(), None);
    }

    #[test]
    fn limit_and_offset_distinguish_zero_from_absent() {
        let unset = FilterBuilder::new();
        let zero = FilterBuilder::new().limit(0).offset(0);

        assert_eq!(unset.limit_value(), None);
        assert_eq!(unset.offset_value(), None);
        assert_eq!(zero.limit_value(), Some(0));
        assert_eq!(zero.offset_value(), Some(0));
    }

    #[test]
    fn negative_limit_is_an_error() {
        let filter = FilterBuilder::new().limit(-1);

        assert_eq!(filter.build(), Err(FilterError::NegativeLimit(-1)));
    }

    #[test]
    fn negative_offset_is_an_error() {
        let filter = FilterBuilder::new().offset(-10);

        assert_eq!(filter.build(), Err(FilterError::NegativeOffset(-10)));
    }

    #[test]
    fn build_can_be_called_repeatedly() {
        let filter = FilterBuilder::new().and("a", "eq", 1);

        assert_eq!(filter.build(), filter.build());
    }

    #[test]
    fn without_paging_keeps_conditions_only() {
        let filter = FilterBuilder::new()
            .and("a", "eq", 1)
            .order_by("a", "asc")
            .limit(11)
            .offset(10);

        let count_filter = filter.without_paging();

        assert_eq!(count_filter.build(), filter.build());
        assert_eq!(count_filter.order_by_terms(), None);
        assert_eq!(count_filter.limit_value(), None);
        assert_eq!(count_filter.offset_value(), None);
    }
}
