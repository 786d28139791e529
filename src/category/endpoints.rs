//! Route handlers for listing, creating, updating and deleting categories.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, AuthUser, Error, Period,
    category::{
        CATEGORY_AMOUNT_FIELDS, CATEGORY_FIELDS, Category, CategoryAmount,
        service::{
            CategoryUpdate, NewCategory, add_category, change_category, list_categories_page,
            list_category_amounts_page, remove_category,
        },
    },
    database_id::CategoryId,
    extract::{Path, Query},
    json::Json,
    pagination::{ListQuery, Paginated, PaginationConfig},
};

/// The state needed by the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The config that controls the size of pages of data.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

impl CategoryState {
    fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

#[derive(Debug, Serialize)]
struct CategoryData {
    category: Category,
}

#[derive(Debug, Serialize)]
struct CategoriesData<T> {
    categories: Vec<T>,
}

/// A route handler for listing the user's categories.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, Error> {
    let request = query.into_page_request(&state.pagination_config, CATEGORY_FIELDS)?;

    let connection = state.connection()?;
    let (categories, meta) = list_categories_page(user_id, &request, &connection)?;

    Ok(Json(Paginated {
        data: CategoriesData { categories },
        query: meta,
    }))
}

/// A route handler for creating a category, responds with the new category.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    AuthUser(user_id): AuthUser,
    Json(new_category): Json<NewCategory>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.connection()?;
    let category = add_category(user_id, new_category, &connection)?;

    tracing::debug!("created category {} for user {user_id}", category.id);

    Ok((StatusCode::CREATED, Json(Payload::new(CategoryData { category }))))
}

/// A route handler for changing a category's name or color, responds with the updated category.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    AuthUser(user_id): AuthUser,
    Path(category_id): Path<CategoryId>,
    Json(update): Json<CategoryUpdate>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.connection()?;
    let category = change_category(category_id, user_id, update, &connection)?;

    Ok(Json(Payload::new(CategoryData { category })))
}

/// A route handler for deleting a category, responds with `204 No Content`.
///
/// Transactions in the category are kept without a category.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    AuthUser(user_id): AuthUser,
    Path(category_id): Path<CategoryId>,
) -> Result<impl IntoResponse, Error> {
    let connection = state.connection()?;
    remove_category(category_id, user_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

/// A route handler for listing how much was spent or earned per category in a `YYYYMM` period.
pub async fn list_category_amounts_endpoint(
    State(state): State<CategoryState>,
    AuthUser(user_id): AuthUser,
    Path(period): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, Error> {
    let period: Period = period.parse()?;
    let request = query.into_page_request(&state.pagination_config, CATEGORY_AMOUNT_FIELDS)?;

    let connection = state.connection()?;
    let (categories, meta) =
        list_category_amounts_page(user_id, period, &request, &connection)?;

    Ok(Json(Paginated::<CategoriesData<CategoryAmount>> {
        data: CategoriesData { categories },
        query: meta,
    }))
}

#[derive(Debug, Serialize)]
struct Payload<T> {
    data: T,
}

impl<T> Payload<T> {
    fn new(data: T) -> Self {
        Self { data }
    }
}
