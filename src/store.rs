//! Store: ordered key/value storage with stable handles.
//!
//! A `hashbrown::HashTable` indexes slots of a `SlotMap`. Each slot keeps
//! its precomputed hash so the index never rehashes keys. Iteration walks
//! the slots, which is insertion order until a removal frees a slot that a
//! later insert reuses.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    fn raw(self) -> DefaultKey {
        self.0
    }
}

#[derive(Clone, Debug)]
struct Slot<K, V> {
    key: K,
    value: V,
    hash: u64,
}

#[derive(Clone)]
pub struct Store<K, V, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Slot<K, V>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    DuplicateKey,
    StaleHandle,
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for Store<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over entries in slot order.
pub struct Iter<'a, K, V> {
    it: slotmap::basic::Iter<'a, DefaultKey, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (Handle, &'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, s)| (Handle(k), &s.key, &s.value))
    }
}

/// Iterator over entries with mutable values.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Slot<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (Handle, &'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it
            .next()
            .map(|(k, s)| (Handle(k), &s.key, &mut s.value))
    }
}

impl<K, V, S> Store<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::new(),
            slots: SlotMap::with_key(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|s| s.key.borrow() == q)
                    .unwrap_or(false)
            })
            .map(|&k| Handle(k))
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_key_value(q).map(|(_, v)| v)
    }

    /// The stored key (which may be spelled differently from `q`) and its value.
    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).and_then(|h| self.entry(h))
    }

    /// Insert a new key; fails without touching the store if it exists.
    pub fn insert(&mut self, key: K, value: V) -> Result<Handle, InsertError> {
        let hash = self.make_hash(&key);
        match self.index.entry(
            hash,
            |&kk| self.slots.get(kk).map(|s| s.key == key).unwrap_or(false),
            |&kk| self.slots.get(kk).map(|s| s.hash).unwrap_or(0),
        ) {
            hashbrown::hash_table::Entry::Occupied(_) => Err(InsertError::DuplicateKey),
            hashbrown::hash_table::Entry::Vacant(v) => {
                let k = self.slots.insert(Slot { key, value, hash });
                let _ = v.insert(k);
                Ok(Handle(k))
            }
        }
    }

    /// Insert, or overwrite the value in place. An existing entry keeps
    /// the key it was first stored under.
    pub fn upsert(&mut self, key: K, value: V) -> Handle {
        let hash = self.make_hash(&key);
        match self.index.entry(
            hash,
            |&kk| self.slots.get(kk).map(|s| s.key == key).unwrap_or(false),
            |&kk| self.slots.get(kk).map(|s| s.hash).unwrap_or(0),
        ) {
            hashbrown::hash_table::Entry::Occupied(o) => {
                let k = *o.get();
                if let Some(slot) = self.slots.get_mut(k) {
                    slot.value = value;
                }
                Handle(k)
            }
            hashbrown::hash_table::Entry::Vacant(v) => {
                let k = self.slots.insert(Slot { key, value, hash });
                let _ = v.insert(k);
                Handle(k)
            }
        }
    }

    pub fn remove(&mut self, handle: Handle) -> Option<(K, V)> {
        let k = handle.raw();
        let slot = self.slots.remove(k)?;
        if let Ok(found) = self.index.find_entry(slot.hash, |&kk| kk == k) {
            found.remove();
        }
        Some((slot.key, slot.value))
    }

    /// Replace the key of a live entry, keeping its slot and value.
    /// Returns the previous key.
    pub fn rekey(&mut self, handle: Handle, key: K) -> Result<K, InsertError> {
        if self.contains_key(&key) {
            return Err(InsertError::DuplicateKey);
        }
        let k = handle.raw();
        let hash = self.make_hash(&key);
        let slot = self.slots.get_mut(k).ok_or(InsertError::StaleHandle)?;
        let old_hash = core::mem::replace(&mut slot.hash, hash);
        let old_key = core::mem::replace(&mut slot.key, key);
        if let Ok(found) = self.index.find_entry(old_hash, |&kk| kk == k) {
            found.remove();
        }
        let slots = &self.slots;
        self.index
            .insert_unique(hash, k, |&kk| slots.get(kk).map(|s| s.hash).unwrap_or(0));
        Ok(old_key)
    }

    pub fn entry(&self, handle: Handle) -> Option<(&K, &V)> {
        self.slots.get(handle.raw()).map(|s| (&s.key, &s.value))
    }

    pub fn value_mut(&mut self, handle: Handle) -> Option<&mut V> {
        self.slots.get_mut(handle.raw()).map(|s| &mut s.value)
    }

    pub fn key(&self, handle: Handle) -> Option<&K> {
        self.slots.get(handle.raw()).map(|s| &s.key)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.slots.iter_mut(),
        }
    }

    /// Same key set with equal values, ignoring order.
    pub fn same_contents<S2>(&self, other: &Store<K, V, S2>) -> bool
    where
        V: PartialEq,
        S2: BuildHasher,
    {
        self.len() == other.len() && self.iter().all(|(_, k, v)| other.get(k) == Some(v))
    }
}
