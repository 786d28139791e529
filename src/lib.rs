//! wallet_rs is a personal finance backend.
//!
//! This library provides a JSON REST API for recording expenses, income and purchases paid in
//! installments, grouped into categories, with paginated and filterable listings.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::Serialize;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod database_id;
mod db;
mod endpoints;
mod extract;
pub mod filter;
mod json;
mod logging;
mod money;
mod pagination;
mod period;
mod routing;
mod transaction;
mod user;

pub use app_state::AppState;
pub use auth::{AuthUser, Claims, JwtKeys, encode_token};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::Cents;
pub use pagination::PaginationConfig;
pub use period::Period;
pub use routing::build_router;
pub use transaction::TransactionType;
pub use user::{NewUser, User, UserID, create_user, get_user_by_id, get_user_by_username};

use crate::filter::FilterError;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install the terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The filter, ordering or paging requested by the client is invalid.
    #[error("{0}")]
    InvalidFilter(#[from] FilterError),

    /// Two entries of one transaction fall in the same year and month.
    #[error("entries must be in different periods")]
    EntriesInSamePeriod,

    /// The number of entries does not match what the transaction type allows.
    #[error("{}", .0.entry_count_rule())]
    InvalidEntryCount(TransactionType),

    /// An installment plan was requested with fewer than two or too many installments.
    #[error("installment count must be between 2 and 100, got {0}")]
    InvalidInstallmentCount(u32),

    /// An amount could not be parsed or is out of range.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A period was not a valid `YYYYMM` string.
    #[error("invalid period \"{0}\", expected YYYYMM")]
    InvalidPeriod(String),

    /// The requested page size is outside the allowed range.
    #[error("per_page must be between 1 and {max}, got {per_page}")]
    InvalidPageSize {
        /// The page size that was requested.
        per_page: i64,
        /// The largest page size allowed.
        max: u64,
    },

    /// An empty string was used as a name.
    #[error("name cannot be empty")]
    EmptyName,

    /// An update request did not select any field to update.
    #[error("no fields to update")]
    NothingToUpdate,

    /// A category color was not a hex color such as `#ff8800`.
    #[error("invalid color \"{0}\", expected a hex color such as #ff8800")]
    InvalidColor(String),

    /// The request body could not be read as the expected JSON document.
    #[error("{0}")]
    InvalidBody(String),

    /// A path segment, such as an ID, could not be parsed.
    #[error("{0}")]
    InvalidPath(String),

    /// The query string could not be parsed.
    #[error("{0}")]
    InvalidQuery(String),

    /// The request did not have a bearer token.
    #[error("missing token")]
    MissingToken,

    /// The bearer token could not be verified or has expired.
    #[error("invalid token")]
    InvalidToken,

    /// The transaction does not exist or belongs to another user.
    #[error("transaction not found")]
    TransactionNotFound,

    /// The category does not exist or belongs to another user.
    #[error("category not found")]
    CategoryNotFound,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The email address is already registered.
    #[error("user with this email already exists")]
    DuplicateEmail,

    /// The username is already taken.
    #[error("user with this username already exists")]
    DuplicateUsername,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A token could not be signed.
    #[error("could not create token: {0}")]
    TokenCreation(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("users.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("users.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidBody(rejection.body_text())
    }
}

impl Error {
    /// The HTTP status code the error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidFilter(_)
            | Error::EntriesInSamePeriod
            | Error::InvalidEntryCount(_)
            | Error::InvalidInstallmentCount(_)
            | Error::InvalidAmount(_)
            | Error::InvalidPeriod(_)
            | Error::InvalidPageSize { .. }
            | Error::EmptyName
            | Error::NothingToUpdate
            | Error::InvalidColor(_)
            | Error::InvalidBody(_)
            | Error::InvalidPath(_)
            | Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::MissingToken | Error::InvalidToken => StatusCode::UNAUTHORIZED,
            Error::TransactionNotFound | Error::CategoryNotFound | Error::NotFound => {
                StatusCode::NOT_FOUND
            }
            Error::DuplicateEmail | Error::DuplicateUsername => StatusCode::CONFLICT,
            Error::SqlError(_) | Error::DatabaseLockError | Error::TokenCreation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// The JSON body sent for every error response.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: &'static str,
    message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status.is_server_error() {
            // Internal details are only logged, never sent to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "an unexpected error occurred, check the server logs for more details".to_owned()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            status: status.as_u16(),
            error: ErrorDetail {
                kind: status.canonical_reason().unwrap_or("Unknown"),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}
