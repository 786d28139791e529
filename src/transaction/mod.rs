//! Transactions and the entries that record when their money moves.
//!
//! This module contains everything related to transactions:
//! - The `Transaction`, `Entry` and `ViewEntry` models and the rules for each transaction type
//! - Database functions for storing, querying, and managing transactions and entries
//! - Splitting a total price into monthly installments
//! - Route handlers for the transaction API

mod create_endpoint;
pub(crate) mod db;
mod delete_endpoint;
mod domain;
mod installment;
mod list_endpoint;
pub(crate) mod service;
mod update_endpoint;
mod validation;

pub use create_endpoint::{create_installments_endpoint, create_transaction_endpoint};
pub use db::{
    create_transaction_tables, create_transaction_views, insert_entries, insert_transaction,
};
pub use delete_endpoint::delete_transaction_endpoint;
pub use domain::{Entry, NewEntry, Transaction, TransactionType, ViewEntry};
pub use list_endpoint::list_entries_endpoint;
pub use service::{
    NewInstallmentPlan, NewTransaction, TransactionUpdate, UpdateField, create_transaction,
};
pub use update_endpoint::update_transaction_endpoint;
