//! The SQL for the transactions and entries tables and the entries view.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Cents, Error, UserID,
    database_id::{CategoryId, TransactionId},
    filter::{FilterBuilder, statement},
    transaction::{Entry, NewEntry, Transaction, TransactionType, ViewEntry},
};

/// Create the transactions and entries tables.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_transaction_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            type TEXT NOT NULL CHECK (type IN ('simple_expense', 'income', 'installment')),
            name TEXT NOT NULL,
            note TEXT,
            category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transactions_user_id ON transactions(user_id);
        CREATE INDEX IF NOT EXISTS idx_transactions_category_id ON transactions(category_id);

        CREATE TABLE IF NOT EXISTS entries (
            id INTEGER PRIMARY KEY,
            transaction_id INTEGER NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
            amount INTEGER NOT NULL,
            reference_date TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_entries_transaction_id ON entries(transaction_id);
        CREATE INDEX IF NOT EXISTS idx_entries_reference_date ON entries(reference_date);",
    )
}

/// Create the `v_entries` view, which joins every entry with its transaction and category.
///
/// Amounts are available both as integer cents (`amount_cents`, `total_amount_cents`) and in
/// currency units (`amount`, `total_amount`) so that filters can be written in currency units.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_transaction_views(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE VIEW IF NOT EXISTS v_entries AS
        SELECT
            e.id AS id,
            e.transaction_id AS transaction_id,
            t.name AS name,
            t.note AS note,
            e.amount AS amount_cents,
            e.amount / 100.0 AS amount,
            CAST(strftime('%Y%m', e.reference_date) AS INTEGER) AS period,
            t.user_id AS user_id,
            t.type AS type,
            SUM(e.amount) OVER (PARTITION BY e.transaction_id) AS total_amount_cents,
            SUM(e.amount) OVER (PARTITION BY e.transaction_id) / 100.0 AS total_amount,
            ROW_NUMBER() OVER (
                PARTITION BY e.transaction_id ORDER BY e.reference_date, e.id
            ) AS installment,
            COUNT(*) OVER (PARTITION BY e.transaction_id) AS total_installments,
            e.created_at AS created_at,
            e.reference_date AS reference_date,
            t.category_id AS category_id,
            c.name AS category_name,
            c.color AS category_color
        FROM entries e
        INNER JOIN transactions t ON t.id = e.transaction_id
        LEFT JOIN categories c ON c.id = t.category_id;",
    )
}

/// Insert a transaction row without any entries.
///
/// # Errors
///
/// This function will return an error if the SQL query failed, e.g. the user or category does not
/// exist.
pub fn insert_transaction(
    user_id: UserID,
    transaction_type: TransactionType,
    name: &str,
    note: Option<&str>,
    category_id: Option<CategoryId>,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let created_at = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO transactions (user_id, type, name, note, category_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user_id.as_i64(),
            transaction_type,
            name,
            note,
            category_id,
            created_at,
        ),
    )?;

    Ok(Transaction {
        id: connection.last_insert_rowid(),
        user_id,
        transaction_type,
        name: name.to_owned(),
        note: note.map(ToOwned::to_owned),
        category_id,
        created_at,
    })
}

/// Insert `entries` for a transaction, with each amount given the sign of `transaction_type`.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn insert_entries(
    transaction_id: TransactionId,
    transaction_type: TransactionType,
    entries: &[NewEntry],
    connection: &Connection,
) -> Result<Vec<Entry>, Error> {
    let mut statement = connection.prepare(
        "INSERT INTO entries (transaction_id, amount, reference_date, created_at)
            VALUES (?1, ?2, ?3, ?4)",
    )?;

    let created_at = OffsetDateTime::now_utc();

    entries
        .iter()
        .map(|entry| -> Result<Entry, Error> {
            let amount = transaction_type.signed(entry.amount);
            statement.execute((transaction_id, amount, entry.reference_date, created_at))?;

            Ok(Entry {
                id: connection.last_insert_rowid(),
                transaction_id,
                amount,
                reference_date: entry.reference_date,
                created_at,
            })
        })
        .collect()
}

/// Get the transactions matching `filter`.
///
/// # Errors
///
/// This function will return an error if the filter is invalid or the SQL query failed.
pub fn list_transactions(
    filter: &FilterBuilder,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let statement = statement::select(
        "SELECT id, user_id, type, name, note, category_id, created_at FROM transactions",
        filter,
    )?;

    connection
        .prepare(&statement.sql)?
        .query_map(statement.params(), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the transaction with `transaction_id` if it belongs to `user_id`.
///
/// # Errors
///
/// Returns [Error::TransactionNotFound] if there is no such transaction for the user, or an error
/// if the SQL query failed.
pub fn get_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let filter = FilterBuilder::new()
        .and("id", "eq", transaction_id)
        .and("user_id", "eq", user_id);

    list_transactions(&filter, connection)?
        .into_iter()
        .next()
        .ok_or(Error::TransactionNotFound)
}

/// Get the entries of a transaction, ordered by reference date.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn get_entries(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Vec<Entry>, Error> {
    connection
        .prepare(
            "SELECT id, transaction_id, amount, reference_date, created_at FROM entries
            WHERE transaction_id = :transaction_id
            ORDER BY reference_date, id",
        )?
        .query_map(&[(":transaction_id", &transaction_id)], map_entry_row)?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

/// Overwrite the name, note and category of a stored transaction with those of `transaction`.
///
/// # Errors
///
/// Returns [Error::TransactionNotFound] if no row was updated, or an error if the SQL query
/// failed.
pub fn update_transaction_row(
    transaction: &Transaction,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE transactions SET name = ?1, note = ?2, category_id = ?3 WHERE id = ?4",
        (
            &transaction.name,
            &transaction.note,
            transaction.category_id,
            transaction.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound);
    }

    Ok(())
}

/// Delete the entries matching `filter`, returning how many were deleted.
///
/// # Errors
///
/// This function will return an error if the filter is invalid or the SQL query failed.
pub fn delete_entries(filter: &FilterBuilder, connection: &Connection) -> Result<usize, Error> {
    let statement = statement::delete("entries", filter)?;

    connection
        .execute(&statement.sql, statement.params())
        .map_err(Error::from)
}

/// Delete a transaction row.
///
/// # Errors
///
/// Returns [Error::TransactionNotFound] if no row was deleted, or an error if the SQL query
/// failed.
pub fn delete_transaction_row(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM transactions WHERE id = :id",
        &[(":id", &transaction_id)],
    )?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound);
    }

    Ok(())
}

/// The fields of the entries view that clients may filter and order by.
pub const VIEW_ENTRY_FIELDS: &[&str] = &[
    "id",
    "transaction_id",
    "name",
    "note",
    "amount",
    "period",
    "type",
    "total_amount",
    "installment",
    "total_installments",
    "created_at",
    "reference_date",
    "category_id",
    "category_name",
    "category_color",
];

const SELECT_VIEW_ENTRIES: &str = "SELECT id, transaction_id, name, note, amount_cents, period, \
    user_id, type, total_amount_cents, installment, total_installments, created_at, \
    reference_date, category_id, category_name, category_color FROM v_entries";

/// Get the rows of the entries view matching `filter`.
///
/// # Errors
///
/// This function will return an error if the filter is invalid or the SQL query failed.
pub fn list_entries(
    filter: &FilterBuilder,
    connection: &Connection,
) -> Result<Vec<ViewEntry>, Error> {
    let statement = statement::select(SELECT_VIEW_ENTRIES, filter)?;

    connection
        .prepare(&statement.sql)?
        .query_map(statement.params(), map_view_entry_row)?
        .map(|maybe_entry| maybe_entry.map_err(Error::from))
        .collect()
}

/// Count the rows of the entries view matching the conditions of `filter`, ignoring paging.
///
/// # Errors
///
/// This function will return an error if the filter is invalid or the SQL query failed.
pub fn count_entries(filter: &FilterBuilder, connection: &Connection) -> Result<i64, Error> {
    let statement = statement::count("v_entries", filter)?;

    connection
        .query_row(&statement.sql, statement.params(), |row| row.get(0))
        .map_err(Error::from)
}

fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        transaction_type: row.get(2)?,
        name: row.get(3)?,
        note: row.get(4)?,
        category_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn map_entry_row(row: &Row) -> Result<Entry, rusqlite::Error> {
    Ok(Entry {
        id: row.get(0)?,
        transaction_id: row.get(1)?,
        amount: row.get(2)?,
        reference_date: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn map_view_entry_row(row: &Row) -> Result<ViewEntry, rusqlite::Error> {
    Ok(ViewEntry {
        id: row.get(0)?,
        transaction_id: row.get(1)?,
        name: row.get(2)?,
        note: row.get(3)?,
        amount: row.get(4)?,
        period: row.get(5)?,
        user_id: UserID::new(row.get(6)?),
        transaction_type: row.get(7)?,
        total_amount: row.get::<_, Cents>(8)?,
        installment: row.get(9)?,
        total_installments: row.get(10)?,
        created_at: row.get(11)?,
        reference_date: row.get(12)?,
        category_id: row.get(13)?,
        category_name: row.get(14)?,
        category_color: row.get(15)?,
    })
}
