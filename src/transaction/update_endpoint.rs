//! Defines the endpoint for changing part of a transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::IntoResponse,
};
use rusqlite::Connection;

use crate::{
    AppState, AuthUser, Error,
    database_id::TransactionId,
    extract::Path,
    json::Json,
    transaction::{
        create_endpoint::TransactionResponse,
        service::{TransactionUpdate, update_transaction},
    },
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct UpdateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating the fields of a transaction listed in the body's `update` array.
///
/// Responds with the updated transaction.
pub async fn update_transaction_endpoint(
    State(state): State<UpdateTransactionState>,
    AuthUser(user_id): AuthUser,
    Path(transaction_id): Path<TransactionId>,
    Json(update): Json<TransactionUpdate>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = update_transaction(transaction_id, user_id, update, &connection)?;

    Ok(Json(TransactionResponse::new(transaction)))
}
