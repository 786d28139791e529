//! Categories group a user's transactions, e.g. 'Groceries' or 'Salary'.

mod db;
mod domain;
mod endpoints;
mod service;

pub use db::{
    CATEGORY_AMOUNT_FIELDS, CATEGORY_FIELDS, create_category, create_category_table,
    create_category_views, get_category,
};
pub use domain::{Category, CategoryAmount, CategoryName, Color};
pub use endpoints::{
    CategoryState, create_category_endpoint, delete_category_endpoint, list_categories_endpoint,
    list_category_amounts_endpoint, update_category_endpoint,
};
