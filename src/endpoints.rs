//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/categories/{category_id}', use [format_endpoint].

use std::fmt::Display;

/// The route for checking that the server is up.
pub const HEALTH: &str = "/api/v1/health";
/// The route to create transactions.
pub const TRANSACTIONS: &str = "/api/v1/transactions";
/// The route to create a transaction paid in installments.
pub const INSTALLMENTS: &str = "/api/v1/transactions/installments";
/// The route to update or delete a single transaction.
pub const TRANSACTION: &str = "/api/v1/transactions/{transaction_id}";
/// The route to list entries joined with their transaction and category.
pub const ENTRIES: &str = "/api/v1/transactions/entries";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/v1/categories";
/// The route to update or delete a single category.
pub const CATEGORY: &str = "/api/v1/categories/{category_id}";
/// The route to list the amount spent per category in a period.
pub const CATEGORY_AMOUNTS: &str = "/api/v1/categories/amounts/{period}";

/// Replace the parameter in `endpoint_path` with `value`.
///
/// A parameter starts with a left brace and ends with the next right brace.
/// For example, in the endpoint path '/categories/{category_id}', '{category_id}' is the parameter.
///
/// This function assumes that an endpoint path contains at most one parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, value: impl Display) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |end| param_start + end + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        value,
        &endpoint_path[param_end..]
    )
}
