//! Category use cases, with the ownership checks the database functions leave to their callers.

use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error, Period, UserID,
    category::{
        Category, CategoryAmount, CategoryName, Color,
        db::{
            count_categories, count_category_amounts, create_category, delete_category,
            get_category, list_categories, list_category_amounts, update_category,
        },
    },
    database_id::CategoryId,
    pagination::{PageMeta, PageRequest, paginate},
};

/// The request body for creating a category.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewCategory {
    /// The name of the category.
    pub name: String,
    /// A hex color such as `#ff8800`.
    pub color: String,
}

/// The request body for updating a category. Fields that are left out are not changed.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CategoryUpdate {
    /// The new name.
    #[serde(default)]
    pub name: Option<String>,
    /// The new color.
    #[serde(default)]
    pub color: Option<String>,
}

/// Validate and store a new category for `user_id`.
///
/// # Errors
///
/// Returns [Error::EmptyName] or [Error::InvalidColor] for invalid input, or an error if the SQL
/// query failed.
pub fn add_category(
    user_id: UserID,
    new_category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    let name = CategoryName::new(&new_category.name)?;
    let color = Color::new(&new_category.color)?;

    create_category(user_id, name, color, connection)
}

/// Change the name and/or color of one of `user_id`'s categories.
///
/// # Errors
///
/// This function will return an error if:
/// - neither field is given ([Error::NothingToUpdate]),
/// - a given field is invalid ([Error::EmptyName], [Error::InvalidColor]),
/// - the category does not exist for the user ([Error::CategoryNotFound]),
/// - an SQL related error occurred.
pub fn change_category(
    category_id: CategoryId,
    user_id: UserID,
    update: CategoryUpdate,
    connection: &Connection,
) -> Result<Category, Error> {
    if update.name.is_none() && update.color.is_none() {
        return Err(Error::NothingToUpdate);
    }

    let name = update.name.as_deref().map(CategoryName::new).transpose()?;
    let color = update.color.as_deref().map(Color::new).transpose()?;

    let mut category = get_category(category_id, user_id, connection)?;

    if let Some(name) = name {
        category.name = name;
    }

    if let Some(color) = color {
        category.color = color;
    }

    update_category(&category, connection)?;

    Ok(category)
}

/// Delete one of `user_id`'s categories.
///
/// # Errors
///
/// Returns [Error::CategoryNotFound] if the category does not exist for the user, or an error if
/// an SQL query failed.
pub fn remove_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let category = get_category(category_id, user_id, connection)?;

    delete_category(category.id, connection)
}

/// Get one page of `user_id`'s categories.
///
/// # Errors
///
/// Returns an error if the request's filter is invalid or an SQL query failed.
pub fn list_categories_page(
    user_id: UserID,
    request: &PageRequest,
    connection: &Connection,
) -> Result<(Vec<Category>, PageMeta), Error> {
    let filter = request.filter.clone().and("user_id", "eq", user_id);

    let rows = list_categories(&filter, connection)?;
    let total_items = count_categories(&filter, connection)?;

    Ok(paginate(rows, request, total_items))
}

/// Get one page of the amounts `user_id` spent or earned per category in `period`.
///
/// # Errors
///
/// Returns an error if the request's filter is invalid or an SQL query failed.
pub fn list_category_amounts_page(
    user_id: UserID,
    period: Period,
    request: &PageRequest,
    connection: &Connection,
) -> Result<(Vec<CategoryAmount>, PageMeta), Error> {
    let filter = request
        .filter
        .clone()
        .and("user_id", "eq", user_id)
        .and("period", "eq", period.to_string());

    let rows = list_category_amounts(&filter, connection)?;
    let total_items = count_category_amounts(&filter, connection)?;

    Ok(paginate(rows, request, total_items))
}
