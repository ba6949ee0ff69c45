//! Resource records and the ordered collection that owns them.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One record of the resource.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub name: String,
}

/// A record field that lists can filter and sort on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Field {
    Id,
    Name,
}

impl Field {
    /// Equality against a raw query-string value. A value that does not
    /// parse as the field's type matches nothing.
    pub fn matches(self, record: &Record, value: &str) -> bool {
        match self {
            Self::Id => value.parse::<u64>().is_ok_and(|id| id == record.id),
            Self::Name => record.name == value,
        }
    }

    pub fn compare(self, a: &Record, b: &Record) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Name => a.name.cmp(&b.name),
        }
    }
}

impl FromStr for Field {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            _ => Err(()),
        }
    }
}

/// Insertion-ordered records plus the id high-water mark.
///
/// `next_id` only ever grows: deleting the newest record does not make its
/// id available again.
#[derive(Debug)]
pub struct Collection {
    records: Vec<Record>,
    next_id: u64,
}

impl Collection {
    pub fn new() -> Self {
        Self { records: Vec::new(), next_id: 1 }
    }

    /// A collection holding `names` with ids `1..=n`, in order.
    pub fn seeded<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut collection = Self::new();
        for name in names {
            collection.insert(name.into());
        }
        collection
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: u64) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    /// Appends a record under the next id and returns it.
    pub fn insert(&mut self, name: String) -> &Record {
        let id = self.next_id;
        self.next_id += 1;
        self.records.push(Record { id, name });
        &self.records[self.records.len() - 1]
    }

    /// Removes a record, keeping the remaining ones in order.
    pub fn remove(&mut self, id: u64) -> Option<Record> {
        let index = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(index))
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_ids_start_at_one() {
        let c = Collection::seeded(["John Doe", "Jane Doe"]);
        let ids: Vec<u64> = c.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn ids_grow_and_are_not_reused_after_delete() {
        let mut c = Collection::seeded(["a", "b", "c"]);
        assert_eq!(c.remove(3).map(|r| r.id), Some(3));
        assert_eq!(c.remove(1).map(|r| r.id), Some(1));
        assert_eq!(c.insert("d".into()).id, 4);
        assert_eq!(c.insert("e".into()).id, 5);
    }

    #[test]
    fn remove_preserves_order_of_the_rest() {
        let mut c = Collection::seeded(["a", "b", "c", "d"]);
        c.remove(2);
        let names: Vec<&str> = c.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "c", "d"]);
        assert!(c.remove(2).is_none());
    }

    #[test]
    fn id_filter_ignores_non_numeric_values() {
        let r = Record { id: 7, name: "x".into() };
        assert!(Field::Id.matches(&r, "7"));
        assert!(!Field::Id.matches(&r, "seven"));
        assert!(Field::Name.matches(&r, "x"));
        assert!(!Field::Name.matches(&r, "X"));
    }
}
