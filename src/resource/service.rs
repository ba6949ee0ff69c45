//! The resource collection service.
//!
//! Owns one in-memory collection behind a mutex and implements the CRUD
//! operations over it. Handlers never touch the collection directly.

use std::sync::{Mutex, MutexGuard};

use serde::Deserialize;
use tracing::{debug, info};

use super::error::ResourceError;
use super::query::{ListQuery, Pagination};
use super::record::{Collection, Record};

/// How the resource is named in URLs and messages.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResourceNames {
    /// Path segment, e.g. `users`.
    pub plural: String,
    /// Message subject, e.g. `User` in `"User not found"`.
    pub singular: String,
}

impl ResourceNames {
    pub fn new(plural: impl Into<String>, singular: impl Into<String>) -> Self {
        Self { plural: plural.into(), singular: singular.into() }
    }
}

/// Body of create, replace and update requests. Unknown fields, `id`
/// included, are ignored.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct RecordPayload {
    #[serde(default)]
    pub name: Option<String>,
}

/// One page of a list result.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page {
    pub records: Vec<Record>,
    /// Records matching the filters, across all pages.
    pub total: usize,
}

pub struct ResourceService {
    names: ResourceNames,
    pagination: Pagination,
    collection: Mutex<Collection>,
}

impl ResourceService {
    pub fn new(names: ResourceNames, pagination: Pagination, collection: Collection) -> Self {
        Self { names, pagination, collection: Mutex::new(collection) }
    }

    pub fn names(&self) -> &ResourceNames {
        &self.names
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn len(&self) -> Result<usize, ResourceError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, ResourceError> {
        Ok(self.lock()?.is_empty())
    }

    /// Filters, then stable-sorts, then slices out the requested page.
    /// A page past the end is empty, not an error.
    pub fn list(&self, query: &ListQuery) -> Result<Page, ResourceError> {
        let mut matched: Vec<Record> = {
            let collection = self.lock()?;
            collection
                .records()
                .iter()
                .filter(|r| query.filters.iter().all(|filter| filter.matches(r)))
                .cloned()
                .collect()
        };

        if let Some(sort) = query.sort {
            matched.sort_by(|a, b| {
                let ord = sort.field.compare(a, b);
                if sort.descending { ord.reverse() } else { ord }
            });
        }

        let total = matched.len();
        let records = matched.into_iter().skip(query.offset()).take(query.limit).collect();
        debug!(resource = %self.names.plural, page = query.page, limit = query.limit, total, "listed");
        Ok(Page { records, total })
    }

    pub fn get(&self, id: u64) -> Result<Record, ResourceError> {
        self.lock()?.get(id).cloned().ok_or_else(|| self.not_found())
    }

    /// Validates before locking, so a rejected payload never touches the
    /// collection.
    pub fn create(&self, payload: RecordPayload) -> Result<Record, ResourceError> {
        let name = required_name(payload.name)?;
        let record = self.lock()?.insert(name).clone();
        info!(resource = %self.names.plural, id = record.id, "created");
        Ok(record)
    }

    /// Replaces every mutable field; `name` is required as on create.
    pub fn replace(&self, id: u64, payload: RecordPayload) -> Result<Record, ResourceError> {
        let name = required_name(payload.name)?;
        let mut collection = self.lock()?;
        let record = collection.get_mut(id).ok_or_else(|| self.not_found())?;
        record.name = name;
        info!(resource = %self.names.plural, id, "replaced");
        Ok(record.clone())
    }

    /// Changes only the fields present in `payload`.
    pub fn update(&self, id: u64, payload: RecordPayload) -> Result<Record, ResourceError> {
        let name = payload.name.map(non_empty).transpose()?;
        let mut collection = self.lock()?;
        let record = collection.get_mut(id).ok_or_else(|| self.not_found())?;
        if let Some(name) = name {
            record.name = name;
        }
        info!(resource = %self.names.plural, id, "updated");
        Ok(record.clone())
    }

    pub fn delete(&self, id: u64) -> Result<Record, ResourceError> {
        let record = self.lock()?.remove(id).ok_or_else(|| self.not_found())?;
        info!(resource = %self.names.plural, id, "deleted");
        Ok(record)
    }

    pub(crate) fn not_found(&self) -> ResourceError {
        ResourceError::not_found(&self.names.singular)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collection>, ResourceError> {
        self.collection
            .lock()
            .map_err(|_| ResourceError::internal(format!("{} collection lock poisoned", self.names.plural)))
    }
}

fn required_name(name: Option<String>) -> Result<String, ResourceError> {
    let name = name.ok_or_else(|| ResourceError::validation("name is required"))?;
    non_empty(name)
}

fn non_empty(name: String) -> Result<String, ResourceError> {
    if name.trim().is_empty() {
        return Err(ResourceError::validation("name must not be empty"));
    }
    Ok(name)
}
