//! Defines the endpoints for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, AuthUser, Error,
    json::Json,
    transaction::{
        Transaction,
        service::{
            NewInstallmentPlan, NewTransaction, create_installment_transaction, create_transaction,
        },
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The body of a response that carries a single transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    data: TransactionData,
}

#[derive(Debug, Serialize)]
struct TransactionData {
    transaction: Transaction,
}

impl TransactionResponse {
    pub(crate) fn new(transaction: Transaction) -> Self {
        Self {
            data: TransactionData { transaction },
        }
    }
}

/// A route handler for creating a new transaction with explicit entries.
///
/// Responds with `201 Created` and the new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    AuthUser(user_id): AuthUser,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = create_transaction(user_id, new_transaction, &connection)?;

    tracing::debug!("created transaction {} for user {user_id}", transaction.id);

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse::new(transaction)),
    ))
}

/// A route handler for creating a purchase paid in monthly installments from its total price.
///
/// Responds with `201 Created` and the new transaction.
pub async fn create_installments_endpoint(
    State(state): State<CreateTransactionState>,
    AuthUser(user_id): AuthUser,
    Json(plan): Json<NewInstallmentPlan>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = create_installment_transaction(user_id, plan, &connection)?;

    tracing::debug!(
        "created installment transaction {} for user {user_id}",
        transaction.id
    );

    Ok((
        StatusCode::CREATED,
        Json(TransactionResponse::new(transaction)),
    ))
}
