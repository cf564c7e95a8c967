//! Mutation hook fired after every committed write.

use crate::key::Key;

/// Receives every successful logical write of a `CleverMap`.
///
/// `save` runs synchronously after the value is stored, with the real key
/// the entry lives under (never an alias spelling). Plug persistence in
/// here; the map ignores whatever the hook does with the data.
pub trait Save<V> {
    fn save(&mut self, key: &Key, value: &V);
}

/// Default hook: does nothing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NoSave;

impl<V> Save<V> for NoSave {
    #[inline]
    fn save(&mut self, _key: &Key, _value: &V) {}
}

impl<V, F> Save<V> for F
where
    F: FnMut(&Key, &V),
{
    #[inline]
    fn save(&mut self, key: &Key, value: &V) {
        self(key, value)
    }
}
