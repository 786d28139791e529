//! Database operations for categories.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error, UserID,
    category::{Category, CategoryAmount, CategoryName, Color},
    database_id::CategoryId,
    filter::{FilterBuilder, statement},
};

/// The fields of a category that clients may filter and order by.
pub const CATEGORY_FIELDS: &[&str] = &["id", "name", "color", "created_at"];

/// The fields of a category amount that clients may filter and order by.
pub const CATEGORY_AMOUNT_FIELDS: &[&str] = &["id", "name", "color", "period", "total_amount"];

/// Initialize the categories table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_categories_user_id ON categories(user_id);",
    )?;

    Ok(())
}

/// Create the `v_category_amount_per_period` view, which sums each category's entries per period.
///
/// Categories without entries in a period have no row for that period.
pub fn create_category_views(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE VIEW IF NOT EXISTS v_category_amount_per_period AS
        SELECT
            c.id AS id,
            c.user_id AS user_id,
            c.name AS name,
            c.color AS color,
            CAST(strftime('%Y%m', e.reference_date) AS INTEGER) AS period,
            SUM(e.amount) AS total_amount_cents,
            SUM(e.amount) / 100.0 AS total_amount
        FROM categories c
        INNER JOIN transactions t ON t.category_id = c.id
        INNER JOIN entries e ON e.transaction_id = t.id
        GROUP BY c.id, strftime('%Y%m', e.reference_date);",
    )?;

    Ok(())
}

/// Create a category and return it with its generated ID.
pub fn create_category(
    user_id: UserID,
    name: CategoryName,
    color: Color,
    connection: &Connection,
) -> Result<Category, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO categories (user_id, name, color, created_at) VALUES (?1, ?2, ?3, ?4);",
        (user_id.as_i64(), name.as_ref(), color.as_ref(), created_at),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id,
        name,
        color,
        created_at,
    })
}

/// Retrieve a single category by ID, if it belongs to `user_id`.
///
/// # Errors
///
/// Returns [Error::CategoryNotFound] if there is no such category for the user.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    let filter = FilterBuilder::new()
        .and("id", "eq", category_id)
        .and("user_id", "eq", user_id);

    list_categories(&filter, connection)?
        .into_iter()
        .next()
        .ok_or(Error::CategoryNotFound)
}

/// Retrieve the categories matching `filter`.
pub fn list_categories(
    filter: &FilterBuilder,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    let statement = statement::select(
        "SELECT id, user_id, name, color, created_at FROM categories",
        filter,
    )?;

    connection
        .prepare(&statement.sql)?
        .query_map(statement.params(), map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Count the categories matching the conditions of `filter`, ignoring paging.
pub fn count_categories(filter: &FilterBuilder, connection: &Connection) -> Result<i64, Error> {
    let statement = statement::count("categories", filter)?;

    connection
        .query_row(&statement.sql, statement.params(), |row| row.get(0))
        .map_err(|error| error.into())
}

/// Update a category's name and color. Returns an error if the category doesn't exist.
pub fn update_category(category: &Category, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE categories SET name = ?1, color = ?2 WHERE id = ?3",
        (category.name.as_ref(), category.color.as_ref(), category.id),
    )?;

    if rows_affected == 0 {
        return Err(Error::CategoryNotFound);
    }

    Ok(())
}

/// Delete a category by ID. Returns an error if the category doesn't exist.
///
/// Transactions in the category are kept and no longer have a category.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let rows_affected =
        connection.execute("DELETE FROM categories WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::CategoryNotFound);
    }

    Ok(())
}

const SELECT_CATEGORY_AMOUNTS: &str = "SELECT id, user_id, name, color, period, \
    total_amount_cents FROM v_category_amount_per_period";

/// Retrieve the per period category totals matching `filter`.
pub fn list_category_amounts(
    filter: &FilterBuilder,
    connection: &Connection,
) -> Result<Vec<CategoryAmount>, Error> {
    let statement = statement::select(SELECT_CATEGORY_AMOUNTS, filter)?;

    connection
        .prepare(&statement.sql)?
        .query_map(statement.params(), map_amount_row)?
        .map(|maybe_amount| maybe_amount.map_err(|error| error.into()))
        .collect()
}

/// Count the per period category totals matching the conditions of `filter`, ignoring paging.
pub fn count_category_amounts(
    filter: &FilterBuilder,
    connection: &Connection,
) -> Result<i64, Error> {
    let statement = statement::count("v_category_amount_per_period", filter)?;

    connection
        .query_row(&statement.sql, statement.params(), |row| row.get(0))
        .map_err(|error| error.into())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(2)?;
    let raw_color: String = row.get(3)?;

    Ok(Category {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: CategoryName::new_unchecked(&raw_name),
        color: Color::new_unchecked(&raw_color),
        created_at: row.get(4)?,
    })
}

fn map_amount_row(row: &Row) -> Result<CategoryAmount, rusqlite::Error> {
    Ok(CategoryAmount {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        color: row.get(3)?,
        period: row.get(4)?,
        total_amount: row.get(5)?,
    })
}
