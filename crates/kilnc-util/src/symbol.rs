//! Symbol module - String interning for identifiers.
//!
//! A [`Symbol`] is a 4-byte handle to a string held in a global table.
//! Every identifier, keyword, and tag name in the compiler is interned
//! once, so name comparison is an integer comparison and the same text is
//! stored only a single time.
//!
//! The table is process-global and thread-safe (lock-free via `DashMap`);
//! interned strings live for the lifetime of the process. The Kiln
//! keywords, basic-type names, and procedure tags are interned eagerly at
//! startup so they have stable indices and can be exposed as `const`
//! symbols.
//!
//! # Examples
//!
//! ```
//! use kilnc_util::symbol::{Symbol, SYM_UNDERSCORE};
//!
//! let a = Symbol::intern("velocity");
//! let b = Symbol::intern("velocity");
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "velocity");
//!
//! assert_eq!(SYM_UNDERSCORE.as_str(), "_");
//! assert!(SYM_UNDERSCORE.is_known());
//! ```

use ahash::RandomState;
use dashmap::DashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

/// An interned string identifier.
///
/// Exactly 4 bytes; cheap to copy, hash, and compare. The text is
/// recovered with [`Symbol::as_str`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    index: u32,
}

static_assertions::assert_eq_size!(Symbol, u32);
static_assertions::assert_impl_all!(Symbol: Send, Sync);

/// Indices below this value are reserved for the eagerly interned symbols
/// listed in [`KNOWN_SYMBOLS`]; dynamically interned strings start here.
const RESERVED_SYMBOLS_END: u32 = 64;

/// Symbols interned at table initialization, in index order.
///
/// The `SYM_*`/`KW_*`/`TAG_*` constants below must agree with the
/// positions in this list.
const KNOWN_SYMBOLS: &[&str] = &[
    // Blank identifier
    "_",
    // Declaration keywords
    "proc", "type", "defer", "return", "if", "else", "for",
    // Literal keywords
    "nil", "true", "false",
    // Procedure tags
    "foreign", "inline", "no_inline",
    // Basic type names
    "bool", "i8", "i16", "i32", "i64", "int", "u8", "u16", "u32", "u64",
    "uint", "f32", "f64", "string", "rune", "rawptr",
];

/// The blank identifier `_`.
pub const SYM_UNDERSCORE: Symbol = Symbol { index: 0 };
/// The `proc` keyword.
pub const KW_PROC: Symbol = Symbol { index: 1 };
/// The `type` keyword.
pub const KW_TYPE: Symbol = Symbol { index: 2 };
/// The `defer` keyword.
pub const KW_DEFER: Symbol = Symbol { index: 3 };
/// The `nil` keyword.
pub const KW_NIL: Symbol = Symbol { index: 8 };
/// The `#foreign` procedure tag.
pub const TAG_FOREIGN: Symbol = Symbol { index: 11 };
/// The `#inline` procedure tag.
pub const TAG_INLINE: Symbol = Symbol { index: 12 };
/// The `#no_inline` procedure tag.
pub const TAG_NO_INLINE: Symbol = Symbol { index: 13 };

impl Symbol {
    /// Intern a string, returning its symbol.
    ///
    /// Interning the same text twice yields the same symbol.
    pub fn intern(text: &str) -> Self {
        STRING_TABLE.intern(text)
    }

    /// The interned text.
    ///
    /// # Panics
    ///
    /// Panics if the symbol was not produced by [`Symbol::intern`]
    /// (an out-of-range index is a compiler bug).
    pub fn as_str(self) -> &'static str {
        match STRING_TABLE.get(self.index) {
            Some(text) => text,
            None => panic!("Symbol({}) does not name an interned string", self.index),
        }
    }

    /// Compare against a plain string without interning it first.
    #[inline]
    pub fn eq_str(self, text: &str) -> bool {
        STRING_TABLE.lookup(text) == Some(self.index)
    }

    /// True for the eagerly interned keywords, tags, and type names.
    #[inline]
    pub fn is_known(self) -> bool {
        self.index < RESERVED_SYMBOLS_END
    }

    /// The raw table index (for debugging and serialization).
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.index
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Global string table, initialized with the known symbols on first use.
static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(|| {
    let table = StringTable::new();
    for (index, text) in KNOWN_SYMBOLS.iter().enumerate() {
        table.insert_at(index as u32, text);
    }
    table
});

/// Thread-safe backing store for interned strings.
///
/// Strings are leaked to obtain a `'static` lifetime; the total is bounded
/// by the set of distinct identifiers in the compilation, so this is an
/// acceptable trade for lifetime-free handles.
struct StringTable {
    by_text: DashMap<&'static str, u32, RandomState>,
    by_index: DashMap<u32, &'static str, RandomState>,
    next_index: AtomicU32,
}

impl StringTable {
    fn new() -> Self {
        Self {
            by_text: DashMap::with_capacity_and_hasher(256, RandomState::new()),
            by_index: DashMap::with_capacity_and_hasher(256, RandomState::new()),
            next_index: AtomicU32::new(RESERVED_SYMBOLS_END),
        }
    }

    /// Seed a known symbol at a fixed index.
    fn insert_at(&self, index: u32, text: &'static str) {
        self.by_text.insert(text, index);
        self.by_index.insert(index, text);
    }

    fn intern(&self, text: &str) -> Symbol {
        if let Some(index) = self.by_text.get(text) {
            return Symbol { index: *index };
        }

        let stored: &'static str = Box::leak(text.to_owned().into_boxed_str());
        let index = *self
            .by_text
            .entry(stored)
            .or_insert_with(|| self.next_index.fetch_add(1, Ordering::SeqCst));
        self.by_index.insert(index, stored);
        Symbol { index }
    }

    fn lookup(&self, text: &str) -> Option<u32> {
        self.by_text.get(text).map(|entry| *entry)
    }

    fn get(&self, index: u32) -> Option<&'static str> {
        self.by_index.get(&index).map(|entry| *entry)
    }
}
