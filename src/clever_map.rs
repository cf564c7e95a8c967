//! CleverMap: entries reachable both as keyed items and as attribute names.
//!
//! Three stores make up an instance:
//! - `entries`: the real key -> value data, the only thing iterated.
//! - `aliases`: normalized spelling -> real key, filled lazily the first
//!   time a key that is not already an identifier is written.
//! - `attrs`: directly assigned attributes; never entries, never aliased.
//!
//! Item and attribute syntax share one write path (`set`) and one read
//! path (`lookup`). The normalizer is consulted only when a key is neither
//! a real key nor a known alias. The save hook runs after each committed
//! write, with the real key.

use crate::error::CleverError;
use crate::key::Key;
use crate::normalize::Normalizer;
use crate::save::{NoSave, Save};
use crate::store::{Handle, Store};
use tracing::{debug, trace};

#[derive(Clone)]
pub struct CleverMap<V, S = NoSave> {
    entries: Store<Key, V>,
    aliases: Store<String, Key>,
    attrs: Store<String, V>,
    normalizer: Normalizer,
    saver: S,
}

impl<V> CleverMap<V> {
    pub fn new() -> Self {
        Self::with_parts(Normalizer::new(), NoSave)
    }

    pub fn with_normalizer(normalizer: Normalizer) -> Self {
        Self::with_parts(normalizer, NoSave)
    }

    /// Build from a mapping or an iterable of pairs, writing each pair
    /// through the regular write path.
    pub fn try_from_iter<I, K>(pairs: I) -> Result<Self, CleverError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
    {
        Self::try_from_iter_with_saver(pairs, NoSave)
    }

    /// Every key maps to a clone of `value`.
    pub fn from_keys<I, K>(keys: I, value: V) -> Result<Self, CleverError>
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
        V: Clone,
    {
        Self::try_from_iter(keys.into_iter().map(|k| (k, value.clone())))
    }
}

impl<V> Default for CleverMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> CleverMap<V, S>
where
    S: Save<V>,
{
    pub fn with_saver(saver: S) -> Self {
        Self::with_parts(Normalizer::new(), saver)
    }

    pub fn with_parts(normalizer: Normalizer, saver: S) -> Self {
        Self {
            entries: Store::new(),
            aliases: Store::new(),
            attrs: Store::new(),
            normalizer,
            saver,
        }
    }

    /// Like `try_from_iter`; the hook sees every loaded pair.
    pub fn try_from_iter_with_saver<I, K>(pairs: I, saver: S) -> Result<Self, CleverError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
    {
        let mut map = Self::with_saver(saver);
        map.update(pairs)?;
        Ok(map)
    }

    /// Write every pair in order; stops at the first error, keeping the
    /// writes made before it.
    pub fn update<I, K>(&mut self, pairs: I) -> Result<(), CleverError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
    {
        for (k, v) in pairs {
            self.set(k.into(), v)?;
        }
        Ok(())
    }

    pub fn set_item<K: Into<Key>>(&mut self, key: K, value: V) -> Result<(), CleverError> {
        self.set(key.into(), value)
    }

    pub fn set_attr(&mut self, name: &str, value: V) -> Result<(), CleverError> {
        self.set(Key::from(name), value)
    }

    fn set(&mut self, key: Key, value: V) -> Result<(), CleverError> {
        if let Some(h) = self.entries.find(&key) {
            // 0/1 written as another spelling (False, 1.0, ...) still gets
            // its own alias unless an alias spelled exactly like it exists.
            let respell =
                key.is_bool_like() && !self.aliases.contains_key(key.to_string().as_str());
            if !respell {
                if let Some(slot) = self.entries.value_mut(h) {
                    *slot = value;
                }
                self.fire(h);
                return Ok(());
            }
        }

        if let Some(target) = key.as_str().and_then(|s| self.aliases.get(s)) {
            let h = self.entries.upsert(target.clone(), value);
            self.fire(h);
            return Ok(());
        }

        let norm = self.normalizer.normalize(&key);
        if key.as_str() != Some(norm.as_str()) {
            self.register_alias(norm, &key)?;
        }
        let h = self.entries.upsert(key, value);
        self.fire(h);
        Ok(())
    }

    fn register_alias(&mut self, norm: String, key: &Key) -> Result<(), CleverError> {
        if let Some((existing, _)) = self.entries.get_key_value(&Key::Str(norm.clone())) {
            return Err(CleverError::DuplicateAlias(existing.clone()));
        }
        match self.aliases.get(norm.as_str()) {
            Some(target) if target != key => Err(CleverError::DuplicateAlias(target.clone())),
            Some(_) => Ok(()),
            None => {
                debug!(alias = %norm, key = ?key, "registered alias");
                self.aliases.upsert(norm, key.clone());
                Ok(())
            }
        }
    }

    fn fire(&mut self, h: Handle) {
        if let Some((key, value)) = self.entries.entry(h) {
            trace!(key = ?key, "committed write");
            self.saver.save(key, value);
        }
    }

    /// Remove the entry reached by `key` (directly or through an alias)
    /// and every alias pointing at it. The hook is not called.
    pub fn del_item<K: Into<Key>>(&mut self, key: K) -> Result<V, CleverError> {
        let key = key.into();
        match self.remove_entry(&key) {
            Some((_, value)) => Ok(value),
            None => Err(CleverError::Key(key)),
        }
    }

    /// Remove a direct attribute, or else the entry reached by `name`.
    pub fn del_attr(&mut self, name: &str) -> Result<V, CleverError> {
        if let Some(h) = self.attrs.find(name) {
            if let Some((_, value)) = self.attrs.remove(h) {
                return Ok(value);
            }
        }
        self.remove_entry(&Key::from(name))
            .map(|(_, value)| value)
            .ok_or_else(|| CleverError::Attribute(name.to_owned()))
    }

    fn remove_entry(&mut self, key: &Key) -> Option<(Key, V)> {
        let h = match self.entries.find(key) {
            Some(h) => h,
            None => {
                let norm = self.normalizer.normalize(key);
                let target = self.aliases.get(norm.as_str())?;
                self.entries.find(target)?
            }
        };
        let (real, value) = self.entries.remove(h)?;
        let stale: Vec<Handle> = self
            .aliases
            .iter()
            .filter(|(_, _, target)| **target == real)
            .map(|(h, _, _)| h)
            .collect();
        for h in stale {
            self.aliases.remove(h);
        }
        debug!(key = ?real, "removed entry");
        Some((real, value))
    }

    /// Attach extra spellings to the entry reached by `key`. Each name is
    /// normalized first. Names already reaching that entry are skipped; the
    /// batch is checked in full before anything is registered.
    pub fn add_alias<K, I, N>(&mut self, key: K, names: I) -> Result<(), CleverError>
    where
        K: Into<Key>,
        I: IntoIterator<Item = N>,
        N: Into<Key>,
    {
        let key = key.into();
        let real = match self.lookup(&key) {
            Some((real, _)) => real.clone(),
            None => return Err(CleverError::Key(key)),
        };
        let mut fresh: Vec<String> = Vec::new();
        for name in names {
            let norm = self.normalizer.normalize(&name.into());
            if real.as_str() == Some(norm.as_str()) || fresh.contains(&norm) {
                continue;
            }
            if let Some((existing, _)) = self.entries.get_key_value(&Key::Str(norm.clone())) {
                return Err(CleverError::DuplicateAlias(existing.clone()));
            }
            match self.aliases.get(norm.as_str()) {
                Some(target) if *target == real => {}
                Some(target) => return Err(CleverError::DuplicateAlias(target.clone())),
                None => fresh.push(norm),
            }
        }
        for norm in fresh {
            debug!(alias = %norm, key = ?real, "added alias");
            self.aliases.upsert(norm, real.clone());
        }
        Ok(())
    }

    /// Remove spellings. Removing an entry's real key promotes its oldest
    /// remaining alias to be the real key; an entry must keep one name.
    pub fn delete_alias<I, N>(&mut self, names: I) -> Result<(), CleverError>
    where
        I: IntoIterator<Item = N>,
        N: Into<Key>,
    {
        let mut doomed_aliases: Vec<String> = Vec::new();
        let mut doomed_keys: Vec<Handle> = Vec::new();
        for name in names {
            let name = name.into();
            if let Some(h) = self.entries.find(&name) {
                if !doomed_keys.contains(&h) {
                    doomed_keys.push(h);
                }
                continue;
            }
            let norm = self.normalizer.normalize(&name);
            if !self.aliases.contains_key(norm.as_str()) {
                return Err(CleverError::Key(name));
            }
            if !doomed_aliases.contains(&norm) {
                doomed_aliases.push(norm);
            }
        }

        let mut promotions: Vec<(Handle, String)> = Vec::new();
        for &h in &doomed_keys {
            let Some(real) = self.entries.key(h) else {
                continue;
            };
            let heir = self
                .aliases
                .iter()
                .find(|(_, name, target)| *target == real && !doomed_aliases.contains(name))
                .map(|(_, name, _)| name.clone());
            match heir {
                Some(name) => promotions.push((h, name)),
                None => return Err(CleverError::LastName(real.clone())),
            }
        }

        for name in &doomed_aliases {
            if let Some(ah) = self.aliases.find(name.as_str()) {
                self.aliases.remove(ah);
            }
        }
        for (h, heir) in promotions {
            if let Some(ah) = self.aliases.find(heir.as_str()) {
                self.aliases.remove(ah);
            }
            let promoted = Key::Str(heir);
            let old = self
                .entries
                .rekey(h, promoted.clone())
                .map_err(|_| CleverError::DuplicateAlias(promoted.clone()))?;
            for (_, _, target) in self.aliases.iter_mut() {
                if *target == old {
                    *target = promoted.clone();
                }
            }
            debug!(old = ?old, new = ?promoted, "promoted alias to key");
        }
        Ok(())
    }

    /// Set an instance attribute without creating an entry or alias and
    /// without calling the hook.
    pub fn setattr_direct<N: Into<String>>(&mut self, name: N, value: V) {
        self.attrs.upsert(name.into(), value);
    }
}

impl<V, S> CleverMap<V, S> {
    fn lookup(&self, key: &Key) -> Option<(&Key, &V)> {
        if let Some(found) = self.entries.get_key_value(key) {
            return Some(found);
        }
        let norm = self.normalizer.normalize(key);
        let target = self.aliases.get(norm.as_str())?;
        self.entries.get_key_value(target)
    }

    pub fn get_item<K: Into<Key>>(&self, key: K) -> Result<&V, CleverError> {
        let key = key.into();
        match self.lookup(&key) {
            Some((_, value)) => Ok(value),
            None => Err(CleverError::Key(key)),
        }
    }

    /// Attribute read. Direct attributes win over entries and are returned
    /// as they are.
    pub fn get_attr(&self, name: &str) -> Result<&V, CleverError> {
        if let Some(value) = self.attrs.get(name) {
            return Ok(value);
        }
        self.lookup(&Key::from(name))
            .map(|(_, value)| value)
            .ok_or_else(|| CleverError::Attribute(name.to_owned()))
    }

    pub fn contains_key<K: Into<Key>>(&self, key: K) -> bool {
        self.lookup(&key.into()).is_some()
    }

    /// The real key that `key` reaches, if any.
    pub fn resolve<K: Into<Key>>(&self, key: K) -> Option<&Key> {
        self.lookup(&key.into()).map(|(real, _)| real)
    }

    pub fn direct_attr(&self, name: &str) -> Option<&V> {
        self.attrs.get(name)
    }

    pub fn direct_attrs(&self) -> impl Iterator<Item = (&str, &V)> {
        self.attrs.iter().map(|(_, name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries as (real key, value).
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &V)> {
        self.entries.iter().map(|(_, key, value)| (key, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// The alias table as (spelling, key it stands in for).
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &Key)> {
        self.aliases.iter().map(|(_, name, target)| (name.as_str(), target))
    }

    /// Alias spellings that reach the entry stored under `real`.
    pub fn aliases_of<'a>(&'a self, real: &'a Key) -> impl Iterator<Item = &'a str> + 'a {
        self.aliases()
            .filter(move |(_, target)| *target == real)
            .map(|(name, _)| name)
    }

    /// Key spellings the aliases of `real` were created from, without
    /// repeats; just `real` when it has no alias.
    pub(crate) fn spellings<'a>(&'a self, real: &'a Key) -> Vec<&'a Key> {
        let mut out: Vec<&Key> = Vec::new();
        for (_, target) in self.aliases().filter(|(_, target)| *target == real) {
            if !out.iter().any(|k| k.same_spelling(target)) {
                out.push(target);
            }
        }
        if out.is_empty() {
            out.push(real);
        }
        out
    }

    /// Pairs that rebuild this map's entries and generated aliases when
    /// fed back through `try_from_iter`. Aliases added with `add_alias`
    /// are not replayed, nor are the spellings of an entry whose real key
    /// was promoted by `delete_alias`.
    pub fn to_pairs(&self) -> Vec<(Key, V)>
    where
        V: Clone,
    {
        self.iter()
            .flat_map(|(real, value)| {
                self.spellings(real)
                    .into_iter()
                    .map(move |k| (k.clone(), value.clone()))
            })
            .collect()
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn saver(&self) -> &S {
        &self.saver
    }

    pub fn saver_mut(&mut self) -> &mut S {
        &mut self.saver
    }
}

/// Instance state equality: entries, aliases and direct attributes, each
/// compared as an unordered map. Hook and normalizer are not compared.
impl<V: PartialEq, S, S2> PartialEq<CleverMap<V, S2>> for CleverMap<V, S> {
    fn eq(&self, other: &CleverMap<V, S2>) -> bool {
        self.entries.same_contents(&other.entries)
            && self.aliases.same_contents(&other.aliases)
            && self.attrs.same_contents(&other.attrs)
    }
}
