//! Global string interner.
//!
//! Bone names are interned once (when a skeleton or clip is built) and from
//! then on compared and hashed as integer [`Symbol`]s.
//!
//! ```rust,ignore
//! use sinew::core::interner;
//!
//! let a = interner::intern("spine_01");
//! let b = interner::intern("spine_01");
//! assert_eq!(a, b);
//! ```

use std::sync::LazyLock;

use lasso::{Spur, ThreadedRodeo};

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// Compact integer identifier of an interned string.
pub type Symbol = Spur;

/// Interns a string, returning the existing symbol if it was seen before.
#[inline]
pub fn intern(s: &str) -> Symbol {
    INTERNER.get_or_intern(s)
}

/// Looks up a string without interning it.
#[inline]
#[must_use]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.get(s)
}

/// Resolves a symbol back to its string.
///
/// # Panics
/// Panics if the symbol did not come from this interner.
#[inline]
#[must_use]
pub fn resolve(sym: Symbol) -> &'static str {
    INTERNER.resolve(&sym)
}
