//! Creating, updating, deleting and listing transactions.
//!
//! Every function that writes more than one row does so in a single database transaction, so a
//! failure leaves no partial transaction or entry set behind.

use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    Cents, Error, UserID,
    category::get_category,
    database_id::{CategoryId, TransactionId},
    filter::FilterBuilder,
    pagination::{PageMeta, PageRequest, paginate},
    transaction::{
        NewEntry, Transaction, TransactionType, ViewEntry,
        db::{
            count_entries, delete_entries, delete_transaction_row, get_transaction,
            insert_entries, insert_transaction, list_entries as list_view_entries,
            update_transaction_row,
        },
        installment::split_installments,
        validation::validate_entries,
    },
};

/// A transaction to create, with its entries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewTransaction {
    /// What kind of transaction to create.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// A short name for the transaction.
    pub name: String,
    /// Free text notes.
    #[serde(default)]
    pub note: Option<String>,
    /// The category the transaction belongs to.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// The entries of the transaction.
    pub entries: Vec<NewEntry>,
}

/// A purchase to be paid in equal monthly installments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewInstallmentPlan {
    /// A short name for the transaction.
    pub name: String,
    /// Free text notes.
    #[serde(default)]
    pub note: Option<String>,
    /// The category the transaction belongs to.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// The total price, split across the installments.
    pub total_amount: Cents,
    /// The number of monthly installments.
    pub installments: u32,
    /// The date of the first installment.
    #[serde(with = "crate::period::iso_date")]
    pub start_date: Date,
}

/// A field that an update request may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateField {
    /// The transaction's name.
    Name,
    /// The transaction's notes.
    Note,
    /// The transaction's category.
    CategoryId,
    /// All of the transaction's entries.
    Entries,
}

/// A partial update of a transaction.
///
/// Only the fields listed in `update` are changed. A listed field that is missing or `null`
/// clears the value where that is allowed (`note`, `category_id`), and is rejected otherwise.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionUpdate {
    /// The fields to change.
    pub update: Vec<UpdateField>,
    /// The new name.
    #[serde(default)]
    pub name: Option<String>,
    /// The new notes.
    #[serde(default)]
    pub note: Option<String>,
    /// The new category.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// The entries that replace all of the transaction's entries.
    #[serde(default)]
    pub entries: Option<Vec<NewEntry>>,
}

impl TransactionUpdate {
    fn selects(&self, field: UpdateField) -> bool {
        self.update.contains(&field)
    }
}

/// Create a transaction and its entries for `user_id`.
///
/// Entry amounts are stored with the sign of the transaction type, see
/// [TransactionType::signed].
///
/// # Errors
///
/// This function will return an error if:
/// - the name is empty ([Error::EmptyName]),
/// - the entries are invalid for the transaction type, see
///   [validate_entries](crate::transaction::validation::validate_entries),
/// - the category does not exist for the user ([Error::CategoryNotFound]),
/// - an SQL related error occurred. Nothing is written in that case.
pub fn create_transaction(
    user_id: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let name = new_transaction.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    validate_entries(new_transaction.transaction_type, &new_transaction.entries)?;

    let sql_transaction = connection.unchecked_transaction()?;

    if let Some(category_id) = new_transaction.category_id {
        get_category(category_id, user_id, &sql_transaction)?;
    }

    let transaction = insert_transaction(
        user_id,
        new_transaction.transaction_type,
        name,
        new_transaction.note.as_deref(),
        new_transaction.category_id,
        &sql_transaction,
    )?;

    insert_entries(
        transaction.id,
        transaction.transaction_type,
        &new_transaction.entries,
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Create an installment transaction whose entries are split from a total amount.
///
/// # Errors
///
/// Returns the errors of [split_installments] and [create_transaction].
pub fn create_installment_transaction(
    user_id: UserID,
    plan: NewInstallmentPlan,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let entries = split_installments(plan.total_amount, plan.installments, plan.start_date)?;

    create_transaction(
        user_id,
        NewTransaction {
            transaction_type: TransactionType::Installment,
            name: plan.name,
            note: plan.note,
            category_id: plan.category_id,
            entries,
        },
        connection,
    )
}

/// Apply `update` to the transaction with `transaction_id` owned by `user_id`.
///
/// When the entries are selected, all existing entries are replaced by the new ones, which must
/// be valid for the transaction's existing type.
///
/// # Errors
///
/// This function will return an error if:
/// - no field is selected ([Error::NothingToUpdate]),
/// - the transaction does not exist for the user ([Error::TransactionNotFound]),
/// - the new category does not exist for the user ([Error::CategoryNotFound]),
/// - the new name is missing or empty ([Error::EmptyName]),
/// - the new entries are invalid,
/// - an SQL related error occurred.
///
/// Nothing is changed if an error is returned.
pub fn update_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if update.update.is_empty() {
        return Err(Error::NothingToUpdate);
    }

    let sql_transaction = connection.unchecked_transaction()?;

    let mut transaction = get_transaction(transaction_id, user_id, &sql_transaction)?;

    if update.selects(UpdateField::CategoryId) {
        if let Some(category_id) = update.category_id {
            get_category(category_id, user_id, &sql_transaction)?;
        }

        transaction.category_id = update.category_id;
    }

    if update.selects(UpdateField::Name) {
        let name = update.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        transaction.name = name.to_owned();
    }

    if update.selects(UpdateField::Note) {
        transaction.note = update.note.clone();
    }

    update_transaction_row(&transaction, &sql_transaction)?;

    if update.selects(UpdateField::Entries) {
        let entries = update.entries.as_deref().unwrap_or_default();
        validate_entries(transaction.transaction_type, entries)?;

        delete_entries(
            &FilterBuilder::new().and("transaction_id", "eq", transaction.id),
            &sql_transaction,
        )?;
        insert_entries(
            transaction.id,
            transaction.transaction_type,
            entries,
            &sql_transaction,
        )?;
    }

    let transaction = get_transaction(transaction.id, user_id, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Delete the transaction with `transaction_id` owned by `user_id`, along with its entries.
///
/// # Errors
///
/// Returns [Error::TransactionNotFound] if the transaction does not exist for the user, or an
/// error if an SQL query failed.
pub fn delete_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let transaction = get_transaction(transaction_id, user_id, &sql_transaction)?;

    delete_entries(
        &FilterBuilder::new().and("transaction_id", "eq", transaction.id),
        &sql_transaction,
    )?;
    delete_transaction_row(transaction.id, &sql_transaction)?;

    sql_transaction.commit()?;

    Ok(())
}

/// Get one page of `user_id`'s entries, as requested by `request`.
///
/// # Errors
///
/// This function will return an error if the request's filter is invalid or an SQL query failed.
pub fn list_entries(
    user_id: UserID,
    request: &PageRequest,
    connection: &Connection,
) -> Result<(Vec<ViewEntry>, PageMeta), Error> {
    let filter = request.filter.clone().and("user_id", "eq", user_id);

    let rows = list_view_entries(&filter, connection)?;
    let total_items = count_entries(&filter, connection)?;

    Ok(paginate(rows, request, total_items))
}
