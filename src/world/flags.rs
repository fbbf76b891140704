//! Named world-state flags
//!
//! Flags are the scalar persisted state shared between the director and the
//! rest of the game ("faction ordered to attack harder", "bridge open", ...).
//! Rule predicates and availability conditions only see [`FlagQuery`], so
//! scoring cannot write. Arrival hooks get the concrete [`WorldFlags`] and
//! write through it; later readers in the same pass see the new values.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Read-only view over world-state flags
pub trait FlagQuery {
    /// Unknown flags read as `false`
    fn flag(&self, name: &str) -> bool;
}

/// Mutable flag store owned by the director
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldFlags {
    flags: AHashMap<String, bool>,
}

impl WorldFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: bool) -> bool {
        self.flags.insert(name.into(), value).unwrap_or(false)
    }

    pub fn clear(&mut self, name: &str) {
        self.flags.remove(name);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FlagQuery for WorldFlags {
    fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }
}
