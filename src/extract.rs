//! Path and query extractors that reject bad input with the app's error response.

use axum::extract::{FromRequestParts, rejection::PathRejection, rejection::QueryRejection};

use crate::Error;

/// Like [axum::extract::Path], but a segment that cannot be parsed is rejected with
/// [Error::InvalidPath].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);

/// Like [axum::extract::Query], but a query string that cannot be parsed is rejected with
/// [Error::InvalidQuery].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct Query<T>(pub T);

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidPath(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidQuery(rejection.body_text())
    }
}
