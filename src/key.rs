//! Identity and content keys
//!
//! Two orthogonal kinds of change have to stay distinguishable:
//!
//! - **Identity** ([`IdentityKey`], [`SectionKey`]): which logical item this
//!   is. Equal identities in two snapshots are "the same" row or section,
//!   wherever they sit.
//! - **Content** ([`ContentKey`]): a fingerprint of what the item displays.
//!   Same identity with a different content key is a reload, not a
//!   delete + insert.
//!
//! The engine only ever compares and hashes keys. It never looks inside.
//!
//! # Scoped identities
//!
//! Items of different kinds (for instance two cell types) may share raw keys
//! such as database ids. [`IdentityKey::scoped`] folds the kind into the key
//! so they never match each other:
//!
//! ```
//! use structured_diff::IdentityKey;
//!
//! let city = IdentityKey::scoped("city", 42u64);
//! let country = IdentityKey::scoped("country", 42u64);
//! assert_ne!(city, country);
//! ```

use std::fmt;

use compact_str::CompactString;

use crate::hash::StableHasher;

// =============================================================================
// Key
// =============================================================================

/// Primitive key value shared by identities and section identifiers
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Signed integer key
    Int(i64),
    /// Unsigned integer key (ids, indices)
    Uint(u64),
    /// String key, inline for short values
    Str(CompactString),
    /// Precomputed 64-bit digest
    Digest(u64),
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(v) => write!(f, "{v}"),
            Key::Uint(v) => write!(f, "{v}u"),
            Key::Str(s) => write!(f, "{s:?}"),
            Key::Digest(d) => write!(f, "#{d:016x}"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(v) => write!(f, "{v}"),
            Key::Uint(v) => write!(f, "{v}"),
            Key::Str(s) => f.write_str(s),
            Key::Digest(d) => write!(f, "#{d:x}"),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(CompactString::from(s))
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(CompactString::from(s))
    }
}

impl From<CompactString> for Key {
    fn from(s: CompactString) -> Self {
        Key::Str(s)
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key::Int(v)
    }
}

impl From<i32> for Key {
    fn from(v: i32) -> Self {
        Key::Int(v as i64)
    }
}

impl From<u64> for Key {
    fn from(v: u64) -> Self {
        Key::Uint(v)
    }
}

impl From<u32> for Key {
    fn from(v: u32) -> Self {
        Key::Uint(v as u64)
    }
}

impl From<usize> for Key {
    fn from(v: usize) -> Self {
        Key::Uint(v as u64)
    }
}

// =============================================================================
// Newtypes
// =============================================================================

macro_rules! key_newtype {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Key);

        impl $name {
            /// Wrap a primitive key
            #[inline]
            pub const fn new(key: Key) -> Self {
                Self(key)
            }

            /// Borrow the underlying key
            #[inline]
            pub fn as_key(&self) -> &Key {
                &self.0
            }

            /// Unwrap into the underlying key
            #[inline]
            pub fn into_key(self) -> Key {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({:?})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        key_newtype!(@from $name, Key, &str, String, CompactString, i64, i32, u64, u32, usize);
    };
    (@from $name:ident, $($ty:ty),*) => {
        $(
            impl From<$ty> for $name {
                fn from(key: $ty) -> Self {
                    Self(key.into())
                }
            }
        )*
    };
}

key_newtype!(
    /// Stable identity of a row or decoration
    ///
    /// Must be equal for what the caller considers the same logical item in
    /// two snapshots, and unique within its section.
    IdentityKey,
    "IdentityKey"
);

key_newtype!(
    /// Identifier of a section, unique within a structure
    SectionKey,
    "SectionKey"
);

impl IdentityKey {
    /// Identity namespaced by an item kind
    ///
    /// Equal raw keys of different kinds produce different identities.
    pub fn scoped(kind: &str, key: impl Into<Key>) -> Self {
        StableHasher::new()
            .update_str("__identity__")
            .update_str(kind)
            .update_key(&key.into())
            .finish_identity()
    }
}

impl SectionKey {
    /// Identifier for a section appended without an explicit one
    ///
    /// Renders as `#Section{index}`.
    pub fn positional(index: usize) -> Self {
        Self(Key::Str(compact_str::format_compact!("#Section{index}")))
    }
}

// =============================================================================
// ContentKey
// =============================================================================

/// Fingerprint of an item's displayable content
///
/// Changes exactly when the displayed payload changes, independent of
/// identity.
///
/// # Memory Layout
///
/// - 8 bytes (u64), Copy
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct ContentKey(u64);

impl ContentKey {
    /// Create a ContentKey from a raw digest
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw u64 representation
    #[inline]
    pub const fn as_raw(&self) -> u64 {
        self.0
    }

    /// Fingerprint of a text payload (plain text headers and footers)
    pub fn of_text(text: &str) -> Self {
        StableHasher::new()
            .update_str("__text__")
            .update_str(text)
            .finish_content()
    }
}

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentKey({:016x})", self.0)
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
