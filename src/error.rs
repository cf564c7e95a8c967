//! Errors raised by `CleverMap` operations.

use crate::key::Key;
use thiserror::Error;

/// Two families: attribute-style (`DuplicateAlias`, `Attribute`) and
/// key-style (`Key`, `LastName`). Nothing is retried; every error is
/// returned by the call that caused it, before any state changes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CleverError {
    /// A generated or explicit alias collides with a real key or with an
    /// alias bound to another key. Carries the key it collided with.
    #[error("duplicate alias already exists for {0:?}")]
    DuplicateAlias(Key),
    #[error("no attribute, key or alias named {0:?}")]
    Attribute(String),
    #[error("no key or alias {0:?}")]
    Key(Key),
    /// Removing the requested names would leave this entry unreachable.
    #[error("cannot remove every name of the entry stored under {0:?}")]
    LastName(Key),
}

impl CleverError {
    pub fn is_attribute_error(&self) -> bool {
        matches!(self, CleverError::DuplicateAlias(_) | CleverError::Attribute(_))
    }

    pub fn is_key_error(&self) -> bool {
        !self.is_attribute_error()
    }
}
