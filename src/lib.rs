//! clevermap: a map whose entries are reachable both as keyed items and
//! as identifier-safe attribute names.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: every key, whatever it looks like (`"who are you?"`, `1234.0`,
//!   `None`), can also be read and written through an attribute spelling
//!   (`who_are_you_`, `_1234`, `_None`) without the two views drifting.
//! - Layers:
//!   - `normalize`: pure key -> identifier conversion with a frozen
//!     reserved-word set. No state, no map access.
//!   - `Store<K, V>`: ordered storage with stable handles; a hashbrown
//!     `HashTable` over a `SlotMap`. Backs entries, aliases and direct
//!     attributes alike.
//!   - `CleverMap<V, S>`: public API. One write path and one read path
//!     shared by item and attribute syntax, alias bookkeeping, and the
//!     `Save` hook fired after each committed write.
//!
//! Constraints
//! - Aliases are always legal identifier spellings, always point at a
//!   live entry, and never coincide with a real key.
//! - A write that would break this fails with `DuplicateAlias` before any
//!   state changes.
//! - The hook sees the real key, never an alias spelling.
//! - Direct attributes are instance state: visible to attribute reads,
//!   `Display` and equality, invisible to iteration and `Debug`.
//!
//! Concurrency
//! - No locking. An alias write and its entry write are two steps; share
//!   a map across threads only behind external mutual exclusion.
//!
//! Notes and non-goals
//! - Not a serialization format or a schema validator.
//! - Ordering is the store's slot order: insertion order until a removal
//!   frees a slot that a later insert reuses.

pub mod clever_map;
#[cfg(test)]
mod clever_map_proptest;
pub mod error;
pub mod key;
pub mod normalize;
pub mod save;
pub mod store;
mod views;

// Public surface
pub use clever_map::CleverMap;
pub use error::CleverError;
pub use key::Key;
pub use normalize::{normalize, Normalizer, PYTHON_KEYWORDS};
pub use save::{NoSave, Save};
pub use store::InsertError;
