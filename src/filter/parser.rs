//! Parses the `filter` query parameter into filter conditions.
//!
//! The syntax is a list of terms joined by ` and `. A term is either `field op value` or a
//! parenthesized list of such comparisons joined by ` or `:
//!
//! ```text
//! period eq '202501' and (type eq 'income' or amount le -100)
//! ```
//!
//! Only `eq`, `ne`, `gt`, `ge`, `lt` and `le` are accepted here. Values are typed as follows, in
//! order: `'quoted'` text, `true`/`false`, `null`, then any number. Anything else is rejected.

use super::{Condition, FilterBuilder, FilterError, FilterValue};

/// The comparison operators accepted in a filter string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryOperator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl QueryOperator {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "gt" => Some(Self::Gt),
            "ge" => Some(Self::Ge),
            "lt" => Some(Self::Lt),
            "le" => Some(Self::Le),
            _ => None,
        }
    }

    /// The equivalent [FilterBuilder] operator token.
    fn builder_token(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Ge => "gte",
            Self::Lt => "lt",
            Self::Le => "lte",
        }
    }
}

/// Parse `filter` and add its conditions to `builder`.
///
/// Only fields listed in `allowed_fields` may be referenced, since field names end up in the
/// SQL text.
///
/// # Errors
///
/// Returns a [FilterError] describing the first malformed term, disallowed operator, unknown
/// field or invalid value.
pub fn parse_filter(
    filter: &str,
    builder: FilterBuilder,
    allowed_fields: &[&str],
) -> Result<FilterBuilder, FilterError> {
    let mut builder = builder;

    for term in filter.split(" and ") {
        let or_group = term
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'));

        builder = match or_group {
            Some(inner) => {
                let conditions = inner
                    .split(" or ")
                    .map(|comparison| parse_comparison(comparison, allowed_fields))
                    .collect::<Result<Vec<_>, _>>()?;

                builder.or(conditions)
            }
            None => {
                let condition = parse_comparison(term, allowed_fields)?;
                builder.and(condition.field, &condition.operator, condition.value)
            }
        };
    }

    Ok(builder)
}

fn parse_comparison(fragment: &str, allowed_fields: &[&str]) -> Result<Condition, FilterError> {
    let mut parts = fragment.splitn(3, ' ');
    let (Some(field), Some(operator), Some(value)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(FilterError::Syntax(fragment.to_owned()));
    };

    let Some(operator) = QueryOperator::parse(operator) else {
        return Err(FilterError::OperatorNotAllowed {
            operator: operator.to_owned(),
            fragment: fragment.to_owned(),
        });
    };

    if !allowed_fields.contains(&field) {
        return Err(FilterError::UnknownField(field.to_owned()));
    }

    Ok(Condition::new(
        field,
        operator.builder_token(),
        parse_value(value)?,
    ))
}

/// Parse the literal on the right-hand side of a comparison.
///
/// # Errors
///
/// Returns [FilterError::InvalidValue] if `value` is not a quoted string, boolean, `null` or
/// finite number.
pub fn parse_value(value: &str) -> Result<FilterValue, FilterError> {
    // Every surrounding quote is stripped, so a lone `'` is the empty string.
    if value.starts_with('\'') && value.ends_with('\'') {
        return Ok(FilterValue::Text(value.trim_matches('\'').to_owned()));
    }

    match value {
        "true" => return Ok(FilterValue::Bool(true)),
        "false" => return Ok(FilterValue::Bool(false)),
        "null" => return Ok(FilterValue::Null),
        _ => {}
    }

    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(FilterValue::Number(number)),
        _ => Err(FilterError::InvalidValue(value.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use crate::filter::{FilterBuilder, FilterError, FilterValue};

    use super::{parse_filter, parse_value};

    const FIELDS: &[&str] = &["name", "amount", "status", "period", "category_id"];

    #[test]
    fn types_values() {
        assert_eq!(parse_value("'a b'"), Ok(FilterValue::Text("a b".to_owned())));
        assert_eq!(parse_value("''"), Ok(FilterValue::Text(String::new())));
        assert_eq!(parse_value("true"), Ok(FilterValue::Bool(true)));
        assert_eq!(parse_value("false"), Ok(FilterValue::Bool(false)));
        assert_eq!(parse_value("null"), Ok(FilterValue::Null));
        assert_eq!(parse_value("3.14"), Ok(FilterValue::Number(3.14)));
        assert_eq!(parse_value("-100"), Ok(FilterValue::Number(-100.0)));
    }

    #[test]
    fn quoted_keywords_stay_text() {
        assert_eq!(parse_value("'true'"), Ok(FilterValue::Text("true".to_owned())));
        assert_eq!(parse_value("'null'"), Ok(FilterValue::Text("null".to_owned())));
        assert_eq!(parse_value("'42'"), Ok(FilterValue::Text("42".to_owned())));
    }

    #[test]
    fn lone_quote_is_empty_text() {
        assert_eq!(parse_value("'"), Ok(FilterValue::Text(String::new())));
        assert_eq!(parse_value("''"), Ok(FilterValue::Text(String::new())));
        assert_eq!(parse_value("''abc''"), Ok(FilterValue::Text("abc".to_owned())));
    }

    #[test]
    fn rejects_unquoted_text() {
        for value in ["abc", "True", "NULL", "'abc", "abc'", "inf", "NaN"] {
            assert_eq!(
                parse_value(value),
                Err(FilterError::InvalidValue(value.to_owned())),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn parses_and_terms() {
        let filter = parse_filter("name eq 'rent' and amount le -50", FilterBuilder::new(), FIELDS)
            .unwrap();

        let got = filter.build().unwrap();
        assert_eq!(got.sql, "name = $1 AND amount <= $2");
        assert_eq!(
            got.args,
            vec![FilterValue::from("rent"), FilterValue::Number(-50.0)]
        );
    }

    #[test]
    fn parses_or_groups() {
        let filter = parse_filter(
            "period eq '202501' and (status eq 'active' or status ne 'pending')",
            FilterBuilder::new(),
            FIELDS,
        )
        .unwrap();

        let got = filter.build().unwrap();
        assert_eq!(got.sql, "period = $1 AND (status = $2 OR status != $3)");
    }

    #[test]
    fn maps_ge_and_le_onto_builder_operators() {
        let filter =
            parse_filter("amount ge 1 and amount le 2", FilterBuilder::new(), FIELDS).unwrap();

        assert_eq!(filter.build().unwrap().sql, "amount >= $1 AND amount <= $2");
    }

    #[test]
    fn values_may_contain_spaces() {
        let filter =
            parse_filter("name eq 'weekly groceries'", FilterBuilder::new(), FIELDS).unwrap();

        assert_eq!(
            filter.build().unwrap().args,
            vec![FilterValue::from("weekly groceries")]
        );
    }

    #[test]
    fn appends_to_existing_conditions() {
        let builder = FilterBuilder::new().and("user_id", "eq", 1);

        let filter = parse_filter("amount gt 0", builder, FIELDS).unwrap();

        assert_eq!(filter.build().unwrap().sql, "user_id = $1 AND amount > $2");
    }

    #[test]
    fn rejects_short_terms() {
        let got = parse_filter("name eq", FilterBuilder::new(), FIELDS);

        assert_eq!(got, Err(FilterError::Syntax("name eq".to_owned())));
    }

    #[test]
    fn rejects_short_terms_inside_or_groups() {
        let got = parse_filter("(name eq 'a' or status)", FilterBuilder::new(), FIELDS);

        assert_eq!(got, Err(FilterError::Syntax("status".to_owned())));
    }

    #[test]
    fn rejects_operators_outside_the_query_whitelist() {
        for operator in ["like", "gte", "lte", "in", "is"] {
            let fragment = format!("name {operator} 'a'");

            let got = parse_filter(&fragment, FilterBuilder::new(), FIELDS);

            assert_eq!(
                got,
                Err(FilterError::OperatorNotAllowed {
                    operator: operator.to_owned(),
                    fragment: fragment.clone(),
                })
            );
        }
    }

    #[test]
    fn rejects_unknown_fields() {
        let got = parse_filter("password eq 'x'", FilterBuilder::new(), FIELDS);

        assert_eq!(got, Err(FilterError::UnknownField("password".to_owned())));
    }

    #[test]
    fn rejects_field_injection() {
        let got = parse_filter("1=1; DROP TABLE users; -- eq 1", FilterBuilder::new(), FIELDS);

        assert!(got.is_err());
    }

    #[test]
    fn rejects_invalid_values() {
        let got = parse_filter("name eq abc", FilterBuilder::new(), FIELDS);

        assert_eq!(got, Err(FilterError::InvalidValue("abc".to_owned())));
    }
}
