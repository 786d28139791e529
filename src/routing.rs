//! Application router configuration.

use axum::{
    Router,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde_json::json;

use crate::{
    AppState, Error,
    category::{
        create_category_endpoint, delete_category_endpoint, list_categories_endpoint,
        list_category_amounts_endpoint, update_category_endpoint,
    },
    endpoints,
    json::Json,
    transaction::{
        create_installments_endpoint, create_transaction_endpoint, delete_transaction_endpoint,
        list_entries_endpoint, update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every route except the health check requires a bearer token, which the handlers check by
/// extracting [AuthUser](crate::AuthUser).
pub fn build_router(state: AppState) -> Router {
    let transaction_routes = Router::new()
        .route(endpoints::ENTRIES, get(list_entries_endpoint))
        .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
        .route(endpoints::INSTALLMENTS, post(create_installments_endpoint))
        .route(
            endpoints::TRANSACTION,
            patch(update_transaction_endpoint).delete(delete_transaction_endpoint),
        );

    let category_routes = Router::new()
        .route(
            endpoints::CATEGORIES,
            get(list_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            patch(update_category_endpoint).delete(delete_category_endpoint),
        )
        .route(
            endpoints::CATEGORY_AMOUNTS,
            get(list_category_amounts_endpoint),
        );

    Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .merge(transaction_routes)
        .merge(category_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
