//! Per-compilation identifier table.
//!
//! Every declaration name and namespace segment goes through here once.
//! Symbol tables then key on [`Name`], and only diagnostics and tree printing
//! turn a `Name` back into text.

use super::Name;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// More distinct identifiers than a [`Name`] can address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternError {
    pub count: usize,
}

impl fmt::Display for InternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "too many identifiers: {} interned", self.count)
    }
}

impl std::error::Error for InternError {}

#[derive(Default)]
struct Slots {
    by_text: FxHashMap<&'static str, Name>,
    text: Vec<&'static str>,
}

/// Identifier table shared by all front ends of one compilation.
///
/// Text is leaked on insertion and lives for the rest of the process, which
/// lets `lookup` return `&'static str` after dropping the read lock.
pub struct StringInterner {
    slots: RwLock<Slots>,
}

impl StringInterner {
    pub fn new() -> Self {
        let mut slots = Slots::default();
        slots.by_text.insert("", Name::EMPTY);
        slots.text.push("");
        StringInterner {
            slots: RwLock::new(slots),
        }
    }

    pub fn try_intern(&self, text: &str) -> Result<Name, InternError> {
        if let Some(name) = self.get(text) {
            return Ok(name);
        }

        let mut slots = self.slots.write();
        // Another writer may have won the race between the two locks.
        if let Some(&name) = slots.by_text.get(text) {
            return Ok(name);
        }
        let count = slots.text.len();
        let slot = u32::try_from(count).map_err(|_| InternError { count })?;
        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        let name = Name::from_slot(slot);
        slots.text.push(leaked);
        slots.by_text.insert(leaked, name);
        Ok(name)
    }

    /// # Panics
    /// Past `u32::MAX` distinct identifiers.
    #[inline]
    pub fn intern(&self, text: &str) -> Name {
        self.try_intern(text).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Existing handle for `text`, without inserting it.
    pub fn get(&self, text: &str) -> Option<Name> {
        self.slots.read().by_text.get(text).copied()
    }

    /// # Panics
    /// If `name` came from another interner and is out of range.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.slots.read().text[name.slot()]
    }

    pub fn len(&self) -> usize {
        self.slots.read().text.len()
    }

    /// Nothing but the empty string.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringInterner({} names)", self.len())
    }
}

/// Turns names back into text for printing.
pub trait StringLookup {
    fn lookup(&self, name: Name) -> &str;
}

impl StringLookup for StringInterner {
    fn lookup(&self, name: Name) -> &str {
        StringInterner::lookup(self, name)
    }
}

/// Cheaply cloneable handle to one [`StringInterner`].
#[derive(Clone, Default, Debug)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &StringInterner {
        &self.0
    }
}

impl StringLookup for SharedInterner {
    fn lookup(&self, name: Name) -> &str {
        self.0.lookup(name)
    }
}
