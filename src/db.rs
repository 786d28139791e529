//! Creates the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error,
    category::{create_category_table, create_category_views},
    transaction::{create_transaction_tables, create_transaction_views},
    user::create_user_table,
};

/// Create the tables and views for the domain models if they do not already exist.
///
/// Foreign key enforcement is switched on for `connection`, since deleting a transaction relies
/// on its entries being deleted by cascade.
///
/// # Errors
/// Returns an error if there is an SQL error. On error no part of the schema is created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Has no effect inside a transaction, so it must run first.
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_tables(&transaction)?;
    create_transaction_views(&transaction)?;
    create_category_views(&transaction)?;

    transaction.commit()?;

    Ok(())
}
