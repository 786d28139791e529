//! Defines the endpoint for listing entries.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::IntoResponse,
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, AuthUser, Error,
    extract::Query,
    json::Json,
    pagination::{ListQuery, Paginated, PaginationConfig},
    transaction::{ViewEntry, db::VIEW_ENTRY_FIELDS, service::list_entries},
};

/// The state needed to list entries.
#[derive(Debug, Clone)]
pub struct ListEntriesState {
    /// The database connection for reading entries.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls the size of pages of data.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ListEntriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EntriesData {
    entries: Vec<ViewEntry>,
}

/// A route handler for listing the user's entries, joined with their transaction and category.
///
/// Supports the `page`, `per_page`, `order_by`, `order` and `filter` query parameters, e.g.
/// `?filter=period eq '202501' and (type eq 'income' or type eq 'simple_expense')`.
pub async fn list_entries_endpoint(
    State(state): State<ListEntriesState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, Error> {
    let request = query.into_page_request(&state.pagination_config, VIEW_ENTRY_FIELDS)?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let (entries, meta) = list_entries(user_id, &request, &connection)?;

    Ok(Json(Paginated {
        data: EntriesData { entries },
        query: meta,
    }))
}
