//! String interner for identifiers.
//!
//! Lookups dominate once parsing is done, so the table sits behind a
//! `parking_lot::RwLock`: readers never block each other, and the write
//! lock is taken only when a new string is inserted.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{to_u32, Name};

#[derive(Default)]
struct Table {
    map: FxHashMap<Arc<str>, Name>,
    strings: Vec<Arc<str>>,
}

/// Maps identifier text to compact [`Name`] handles and back.
pub struct StringInterner {
    table: RwLock<Table>,
}

impl StringInterner {
    /// Create an interner with the empty string pre-interned as
    /// [`Name::EMPTY`].
    pub fn new() -> Self {
        let interner = StringInterner {
            table: RwLock::new(Table::default()),
        };
        interner.intern("");
        interner
    }

    /// Intern `s`, returning the existing handle if it is already known.
    pub fn intern(&self, s: &str) -> Name {
        if let Some(&name) = self.table.read().map.get(s) {
            return name;
        }

        let mut table = self.table.write();
        // Another writer may have inserted it between the two locks.
        if let Some(&name) = table.map.get(s) {
            return name;
        }
        let name = Name::from_raw(to_u32(table.strings.len(), "interned strings"));
        let text: Arc<str> = Arc::from(s);
        table.strings.push(Arc::clone(&text));
        table.map.insert(text, name);
        name
    }

    /// The text of `name`.
    ///
    /// # Panics
    /// Panics if `name` was produced by a different interner.
    pub fn lookup(&self, name: Name) -> Arc<str> {
        Arc::clone(&self.table.read().strings[name.index()])
    }

    /// Look up a name without interning.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.table.read().map.get(s).copied()
    }

    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    /// True when only the empty string is interned.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

/// Interner shared by every phase of one compilation and by the runtime
/// that results from it.
#[derive(Clone, Debug, Default)]
pub struct SharedInterner(Arc<StringInterner>);

impl SharedInterner {
    pub fn new() -> Self {
        SharedInterner(Arc::new(StringInterner::new()))
    }
}

impl std::ops::Deref for SharedInterner {
    type Target = StringInterner;

    fn deref(&self) -> &StringInterner {
        &self.0
    }
}
