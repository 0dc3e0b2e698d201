//! Id-keyed, insertion-ordered registries.
//!
//! Every collection in a component section is a [`Registry`]: entries are
//! looked up by id before insertion, so an id can never appear twice.
//! Re-inserting an identical entry is a no-op, re-inserting a different one
//! is reported as a [`DuplicateId`].

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Anything stored in a [`Registry`].
pub trait Identified {
    fn id(&self) -> &str;
}

/// An attempt to register a different entry under an existing id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateId(pub String);

#[derive(Debug, Clone, PartialEq)]
pub struct Registry<T> {
    entries: IndexMap<String, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Fetch the entry for `id`, creating it with `create` if absent.
    pub fn get_or_insert_with(&mut self, id: &str, create: impl FnOnce() -> T) -> &mut T {
        self.entries.entry(id.to_string()).or_insert_with(create)
    }
}

impl<T: Identified + PartialEq> Registry<T> {
    /// Insert `entry`, or verify it matches the entry already registered
    /// under the same id.
    pub fn insert_or_verify(&mut self, entry: T) -> Result<&mut T, DuplicateId> {
        match self.entries.entry(entry.id().to_string()) {
            Entry::Vacant(vacant) => Ok(vacant.insert(entry)),
            Entry::Occupied(occupied) => {
                if *occupied.get() == entry {
                    Ok(occupied.into_mut())
                } else {
                    Err(DuplicateId(occupied.key().clone()))
                }
            }
        }
    }
}

impl<T: Serialize> Serialize for Registry<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.values())
    }
}
