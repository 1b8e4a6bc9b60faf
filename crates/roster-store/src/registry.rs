use std::borrow::Borrow;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use roster_types::{Entity, EntityId};

use crate::filter::Filter;

/// In-memory id -> entity map for one declared type.
///
/// Iteration follows id order, so results are deterministic for a given
/// content. Callers should not rely on any particular order beyond that.
#[derive(Debug)]
pub struct Registry<T> {
    entries: BTreeMap<EntityId, T>,
}

impl<T: Entity> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get<Q>(&self, id: &Q) -> Option<&T>
    where
        EntityId: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.get(id)
    }

    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        EntityId: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.contains_key(id)
    }

    /// Insert or overwrite by id, returning the entity previously stored.
    pub fn insert(&mut self, entity: T) -> Option<T> {
        self.entries.insert(entity.id().clone(), entity)
    }

    /// Insert or overwrite by id and hand back the stored entity.
    pub fn put(&mut self, entity: T) -> &T {
        match self.entries.entry(entity.id().clone()) {
            Entry::Occupied(mut slot) => {
                slot.insert(entity);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(entity),
        }
    }

    pub fn remove<Q>(&mut self, id: &Q) -> Option<T>
    where
        EntityId: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// Every entity matching `filter`.
    pub fn search(&self, filter: &Filter) -> Vec<&T> {
        self.entries
            .values()
            .filter(|entity| filter.matches(*entity))
            .collect()
    }
}

impl<T: Entity> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::testing::{contact, Contact};

    #[test]
    fn insert_overwrites_by_id() {
        let mut reg = Registry::new();
        let mut c = contact("a@b.com", None);
        assert!(reg.insert(c.clone()).is_none());
        c.name = Some("Ada".into());
        let previous = reg.insert(c.clone()).unwrap();
        assert_eq!(previous.name, None);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(c.id()).unwrap().name.as_deref(), Some("Ada"));
    }

    #[test]
    fn put_returns_the_stored_entity() {
        let mut reg = Registry::new();
        let mut c = contact("a@b.com", None);
        assert_eq!(reg.put(c.clone()).email, "a@b.com");
        c.email = "new@b.com".into();
        assert_eq!(reg.put(c.clone()).email, "new@b.com");
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(c.id()).unwrap().email, "new@b.com");
    }

    #[test]
    fn lookup_by_str() {
        let mut reg = Registry::new();
        let c = contact("a@b.com", None);
        let id = c.id().to_string();
        reg.insert(c);
        assert!(reg.contains(id.as_str()));
        assert!(reg.get("nope").is_none());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut reg = Registry::new();
        let c = contact("a@b.com", None);
        let id = c.id().clone();
        reg.insert(c);
        assert!(reg.remove(&id).is_some());
        assert!(reg.remove(&id).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn search_order_is_stable() {
        let mut reg = Registry::new();
        for i in 0..20 {
            reg.insert(contact(&format!("{i}@b.com"), None));
        }
        let first: Vec<_> = reg.search(&Filter::new()).iter().map(|c| c.id().clone()).collect();
        let second: Vec<_> = reg.iter().map(|c| c.id().clone()).collect();
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn search_returns_exact_subset(names in prop::collection::vec(
            proptest::option::of(prop_oneof![Just("Ada"), Just("Bob"), Just("Cy")]),
            0..40,
        )) {
            let mut reg: Registry<Contact> = Registry::new();
            for (i, name) in names.iter().enumerate() {
                reg.insert(contact(&format!("{i}@b.com"), *name));
            }

            prop_assert_eq!(reg.search(&Filter::new()).len(), names.len());

            let hits = reg.search(&Filter::new().eq("name", "Bob"));
            let expected = names.iter().filter(|n| **n == Some("Bob")).count();
            prop_assert_eq!(hits.len(), expected);
            prop_assert!(hits.iter().all(|c| c.name.as_deref() == Some("Bob")));
        }
    }
}
