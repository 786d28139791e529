//! This modules defines the common functionality for paging, ordering and filtering lists.

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    filter::{FilterBuilder, FilterError, parse_filter},
};

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of items per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest number of items a client may request per page.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

/// The query string parameters accepted by list endpoints.
///
/// Values are kept as text so that an unparseable `page` or `per_page` falls back to the default
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// The 1-based page number.
    pub page: Option<String>,
    /// The number of items per page.
    pub per_page: Option<String>,
    /// The field to order by. Ignored unless `order` is also set.
    pub order_by: Option<String>,
    /// `asc` or `desc`. Ignored unless `order_by` is also set.
    pub order: Option<String>,
    /// A filter expression, see [parse_filter].
    pub filter: Option<String>,
}

/// A validated list request, ready to run against a repository.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// The 1-based page number.
    pub page: i64,
    /// The number of items per page.
    pub per_page: i64,
    /// The requested conditions, ordering and paging.
    ///
    /// The limit is one more than `per_page`, so that fetching the page also tells whether
    /// there is a next page.
    pub filter: FilterBuilder,
}

impl ListQuery {
    /// Turn the query string into a [PageRequest].
    ///
    /// `allowed_fields` lists the fields a client may order and filter by.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidPageSize] if `per_page` is below 1 or above the configured maximum,
    /// or [Error::InvalidFilter] if the page is below 1 or the ordering or filter is invalid.
    pub fn into_page_request(
        self,
        config: &PaginationConfig,
        allowed_fields: &[&str],
    ) -> Result<PageRequest, Error> {
        let page = parse_or(self.page.as_deref(), config.default_page);
        let per_page = parse_or(self.per_page.as_deref(), config.default_page_size);

        if per_page < 1 || per_page as u64 > config.max_page_size {
            return Err(Error::InvalidPageSize {
                per_page,
                max: config.max_page_size,
            });
        }

        let mut filter = FilterBuilder::new()
            .offset(page.saturating_sub(1).saturating_mul(per_page))
            .limit(per_page + 1);

        let order_by = self.order_by.unwrap_or_default();
        let order = self.order.unwrap_or_default();

        if !order_by.is_empty() && !order.is_empty() {
            if !allowed_fields.contains(&order_by.as_str()) {
                return Err(FilterError::UnknownField(order_by).into());
            }

            filter = filter.order_by(order_by, &order);
        }

        if let Some(expression) = self.filter.filter(|expression| !expression.is_empty()) {
            filter = parse_filter(&expression, filter, allowed_fields)?;
        }

        if let Some(error) = filter.error() {
            return Err(error.clone().into());
        }

        Ok(PageRequest {
            page,
            per_page,
            filter,
        })
    }
}

fn parse_or(value: Option<&str>, default: u64) -> i64 {
    value
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default as i64)
}

/// The paging details sent alongside a page of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    /// The 1-based page number.
    pub page: i64,
    /// The number of items per page.
    pub per_page: i64,
    /// Whether there are more items after this page.
    pub next_page: bool,
    /// The number of pages needed to show every matching item.
    pub total_pages: i64,
    /// The number of items matching the request's conditions.
    pub total_items: i64,
}

/// A page of items and its paging details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    /// The items, wrapped in an endpoint specific object.
    pub data: T,
    /// The paging details.
    pub query: PageMeta,
}

/// Drop the lookahead row from `rows` and describe the page.
///
/// `rows` is the result of a query limited to `per_page + 1` rows and `total_items` is the
/// number of rows matching the same conditions without paging.
pub fn paginate<T>(
    mut rows: Vec<T>,
    request: &PageRequest,
    total_items: i64,
) -> (Vec<T>, PageMeta) {
    let per_page = request.per_page;
    let next_page = rows.len() as i64 > per_page;

    if next_page {
        rows.truncate(per_page as usize);
    }

    let meta = PageMeta {
        page: request.page,
        per_page,
        next_page,
        total_pages: (total_items + per_page - 1) / per_page,
        total_items,
    };

    (rows, meta)
}
