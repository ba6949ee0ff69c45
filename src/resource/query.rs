//! List query: pagination, equality filters and sort order.

use tracing::debug;

use super::error::ResourceError;
use super::record::{Field, Record};

/// Page-size bounds for list requests.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pagination {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { default_limit: 10, max_limit: 100 }
    }
}

/// Sort key; `-field` on the wire means descending.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Sort {
    pub field: Field,
    pub descending: bool,
}

/// One `key=value` equality filter. A key that names no record field
/// matches nothing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Filter {
    pub field: Option<Field>,
    pub value: String,
}

impl Filter {
    pub fn new(key: &str, value: impl Into<String>) -> Self {
        Self { field: key.parse().ok(), value: value.into() }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.field.is_some_and(|field| field.matches(record, &self.value))
    }
}

/// A validated list request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: usize,
    pub limit: usize,
    /// All must match.
    pub filters: Vec<Filter>,
    pub sort: Option<Sort>,
}

impl ListQuery {
    /// The first page in insertion order with no filters.
    pub fn first_page(limit: usize) -> Self {
        Self { page: 1, limit, filters: Vec::new(), sort: None }
    }

    /// Builds a query from decoded query-string pairs.
    ///
    /// `page`, `limit` and `sort` are reserved; every other key is an
    /// equality filter on the record field of that name. A repeated reserved
    /// key takes its last value. `limit` is capped at `max_limit`, and a sort
    /// key naming no field keeps insertion order.
    pub fn from_pairs<I>(pairs: I, pagination: Pagination) -> Result<Self, ResourceError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::first_page(pagination.default_limit);

        for (key, value) in pairs {
            match key.as_str() {
                "page" => {
                    query.page = value.parse::<usize>().ok().filter(|p| *p >= 1).ok_or_else(|| {
                        ResourceError::validation("page must be a positive integer")
                    })?;
                }
                "limit" => {
                    let limit = value.parse::<usize>().ok().filter(|l| *l >= 1).ok_or_else(|| {
                        ResourceError::validation("limit must be a positive integer")
                    })?;
                    query.limit = limit.min(pagination.max_limit);
                }
                "sort" => {
                    let (name, descending) = match value.strip_prefix('-') {
                        Some(name) => (name, true),
                        None => (value.as_str(), false),
                    };
                    query.sort = match name.parse() {
                        Ok(field) => Some(Sort { field, descending }),
                        Err(()) => {
                            debug!(sort = name, "sort key names no field");
                            None
                        }
                    };
                }
                other => query.filters.push(Filter::new(other, value)),
            }
        }

        Ok(query)
    }

    /// Index of the first record on this page.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}
