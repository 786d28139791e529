//! Applies a [FilterBuilder] to base SELECT, COUNT and DELETE statements.

use std::slice::Iter;

use rusqlite::{ParamsFromIter, params_from_iter};

use super::{FilterBuilder, FilterError, FilterValue};

/// SQL text and the positional arguments it expects.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The complete SQL statement.
    pub sql: String,
    /// Arguments for the `$n` placeholders in `sql`.
    pub args: Vec<FilterValue>,
}

impl Statement {
    /// The arguments in a form accepted by `rusqlite` query functions.
    pub fn params(&self) -> ParamsFromIter<Iter<'_, FilterValue>> {
        params_from_iter(self.args.iter())
    }
}

/// Extend `base`, a `SELECT ... FROM ...` statement without a `WHERE` clause, with the filter's
/// conditions, ordering and paging.
///
/// # Errors
///
/// Returns the filter's recorded error, if any.
pub fn select(base: &str, filter: &FilterBuilder) -> Result<Statement, FilterError> {
    let clause = filter.build()?;

    let mut sql = base.to_owned();
    push_where(&mut sql, &clause.sql);
    push_order_and_paging(&mut sql, filter);

    Ok(Statement {
        sql,
        args: clause.args,
    })
}

/// Count the rows of `table` (a table or view name) that match the filter's conditions.
///
/// Ordering and paging on the filter are ignored.
///
/// # Errors
///
/// Returns the filter's recorded error, if any.
pub fn count(table: &str, filter: &FilterBuilder) -> Result<Statement, FilterError> {
    select(
        &format!("SELECT COUNT(*) FROM {table}"),
        &filter.without_paging(),
    )
}

/// Delete the rows of `table` that match the filter.
///
/// SQLite does not support `ORDER BY`/`LIMIT` on `DELETE` by default, so a filter with ordering
/// or paging selects the affected rows by `rowid` in a sub-query instead.
///
/// # Errors
///
/// Returns the filter's recorded error, if any.
pub fn delete(table: &str, filter: &FilterBuilder) -> Result<Statement, FilterError> {
    let clause = filter.build()?;

    let is_paged = filter.order_by_terms().is_some()
        || filter.limit_value().is_some()
        || filter.offset_value().is_some();

    let mut sql = if is_paged {
        let mut sub_query = format!("SELECT rowid FROM {table}");
        push_where(&mut sub_query, &clause.sql);
        push_order_and_paging(&mut sub_query, filter);

        format!("DELETE FROM {table} WHERE rowid IN ({sub_query})")
    } else {
        format!("DELETE FROM {table}")
    };

    if !is_paged {
        push_where(&mut sql, &clause.sql);
    }

    Ok(Statement {
        sql,
        args: clause.args,
    })
}

fn push_where(sql: &mut String, where_clause: &str) {
    if !where_clause.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(where_clause);
    }
}

fn push_order_and_paging(sql: &mut String, filter: &FilterBuilder) {
    if let Some(terms) = filter.order_by_terms() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&terms.join(", "));
    }

    match (filter.limit_value(), filter.offset_value()) {
        (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
        (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
        // SQLite only accepts OFFSET after LIMIT; a negative limit means no limit.
        (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
        (None, None) => {}
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::filter::{Condition, FilterBuilder, FilterError, FilterValue};

    use super::{count, delete, select};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        connection
            .execute_batch(
                "CREATE TABLE item (id INTEGER PRIMARY KEY, name TEXT NOT NULL, price REAL NOT NULL);
                 INSERT INTO item (name, price) VALUES
                    ('apple', 1.5), ('banana', 0.5), ('cherry', 4.0), ('durian', 12.0);",
            )
            .unwrap();
        connection
    }

    fn names(connection: &Connection, filter: &FilterBuilder) -> Vec<String> {
        let statement = select("SELECT name FROM item", filter).unwrap();

        connection
            .prepare(&statement.sql)
            .unwrap()
            .query_map(statement.params(), |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn select_without_conditions_is_unchanged() {
        let got = select("SELECT * FROM item", &FilterBuilder::new()).unwrap();

        assert_eq!(got.sql, "SELECT * FROM item");
        assert!(got.args.is_empty());
    }

    #[test]
    fn select_appends_where_order_and_paging() {
        let filter = FilterBuilder::new()
            .and("price", "gt", 1)
            .order_by("name", "desc")
            .order_by("id", "asc")
            .limit(11)
            .offset(10);

        let got = select("SELECT * FROM item", &filter).unwrap();

        assert_eq!(
            got.sql,
            "SELECT * FROM item WHERE price > $1 ORDER BY name DESC, id ASC LIMIT 11 OFFSET 10"
        );
        assert_eq!(got.args, vec![FilterValue::from(1)]);
    }

    #[test]
    fn select_with_offset_only_adds_unbounded_limit() {
        let got = select("SELECT * FROM item", &FilterBuilder::new().offset(5)).unwrap();

        assert_eq!(got.sql, "SELECT * FROM item LIMIT -1 OFFSET 5");
    }

    #[test]
    fn select_propagates_filter_error() {
        let filter = FilterBuilder::new().and("price", "between", 1);

        assert_eq!(
            select("SELECT * FROM item", &filter),
            Err(FilterError::InvalidOperator("between".to_owned()))
        );
    }

    #[test]
    fn select_runs_against_sqlite() {
        let connection = get_test_connection();
        let filter = FilterBuilder::new()
            .or([
                Condition::new("name", "like", "%an%"),
                Condition::new("price", "gte", 10),
            ])
            .order_by("price", "asc");

        let got = names(&connection, &filter);

        assert_eq!(got, vec!["banana", "durian"]);
    }

    #[test]
    fn select_pages_results() {
        let connection = get_test_connection();
        let filter = FilterBuilder::new()
            .order_by("id", "asc")
            .limit(2)
            .offset(1);

        let got = names(&connection, &filter);

        assert_eq!(got, vec!["banana", "cherry"]);
    }

    #[test]
    fn count_ignores_paging() {
        let connection = get_test_connection();
        let filter = FilterBuilder::new()
            .and("price", "lt", 5)
            .order_by("id", "asc")
            .limit(1)
            .offset(1);

        let statement = count("item", &filter).unwrap();
        let got: i64 = connection
            .query_row(&statement.sql, statement.params(), |row| row.get(0))
            .unwrap();

        assert_eq!(statement.sql, "SELECT COUNT(*) FROM item WHERE price < $1");
        assert_eq!(got, 3);
    }

    #[test]
    fn delete_with_conditions() {
        let connection = get_test_connection();
        let filter = FilterBuilder::new().and("name", "eq", "apple");

        let statement = delete("item", &filter).unwrap();
        let rows_affected = connection
            .execute(&statement.sql, statement.params())
            .unwrap();

        assert_eq!(statement.sql, "DELETE FROM item WHERE name = $1");
        assert_eq!(rows_affected, 1);
    }

    #[test]
    fn delete_with_ordering_and_limit_uses_sub_query() {
        let connection = get_test_connection();
        let filter = FilterBuilder::new()
            .and("price", "gt", 1)
            .order_by("price", "desc")
            .limit(2);

        let statement = delete("item", &filter).unwrap();
        let rows_affected = connection
            .execute(&statement.sql, statement.params())
            .unwrap();

        assert_eq!(
            statement.sql,
            "DELETE FROM item WHERE rowid IN \
            (SELECT rowid FROM item WHERE price > $1 ORDER BY price DESC LIMIT 2)"
        );
        assert_eq!(rows_affected, 2);
        assert_eq!(
            names(&connection, &FilterBuilder::new().order_by("id", "asc")),
            vec!["apple", "banana"]
        );
    }
}
