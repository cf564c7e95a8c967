//! Textual views of a `CleverMap`.
//!
//! `Debug` is the constructor-style view: `CleverMap([(1, "a"), ...])`,
//! one pair per key spelling an entry was aliased from. `Display` lists
//! every access path of each entry, then the direct attributes.

use crate::clever_map::CleverMap;
use core::fmt;

impl<V: fmt::Debug, S> fmt::Debug for CleverMap<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CleverMap([")?;
        let mut first = true;
        for (real, value) in self.iter() {
            for spelling in self.spellings(real) {
                if !first {
                    f.write_str(", ")?;
                }
                first = false;
                write!(f, "({spelling:?}, {value:?})")?;
            }
        }
        f.write_str("])")
    }
}

impl<V: fmt::Debug, S> fmt::Display for CleverMap<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CleverMap")?;
        for (real, value) in self.iter() {
            write!(f, "\n    x[{real:?}] == ")?;
            let names: Vec<&str> = self.aliases_of(real).collect();
            for name in &names {
                write!(f, "x[{name:?}] == ")?;
            }
            for name in &names {
                write!(f, "x.{name} == ")?;
            }
            if names.is_empty() {
                write!(f, "x.{real} == ")?;
            }
            write!(f, "{value:?}")?;
        }
        for (name, value) in self.direct_attrs() {
            write!(f, "\n    x.{name} == {value:?}")?;
        }
        Ok(())
    }
}
