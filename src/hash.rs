//! Deterministic fingerprinting for identity and content keys
//!
//! Provides cross-process deterministic hashing using blake3, so keys
//! computed in one run compare equal to keys computed in the next.

use crate::key::{ContentKey, IdentityKey, Key};

// =============================================================================
// StableHasher - Builder Pattern
// =============================================================================

/// A deterministic hasher using blake3
///
/// Unlike `std::hash::Hasher`, this produces the same output across
/// process restarts for the same input. It is consumed by `finish*`, so a
/// fingerprint can never be extended after it was read.
///
/// ```
/// use structured_diff::StableHasher;
///
/// let a = StableHasher::new().update_str("title").update_u64(3).finish_content();
/// let b = StableHasher::new().update_str("title").update_u64(3).finish_content();
/// assert_eq!(a, b);
/// ```
pub struct StableHasher {
    inner: blake3::Hasher,
}

impl StableHasher {
    /// Create a new StableHasher
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: blake3::Hasher::new(),
        }
    }

    /// Update with raw bytes
    #[inline]
    pub fn update(mut self, data: &[u8]) -> Self {
        self.inner.update(data);
        self
    }

    /// Update with a length-prefixed string
    ///
    /// The prefix keeps `("ab", "c")` and `("a", "bc")` apart.
    #[inline]
    pub fn update_str(self, s: &str) -> Self {
        self.update_usize(s.len()).update(s.as_bytes())
    }

    /// Update with a u64 value (little-endian)
    #[inline]
    pub fn update_u64(self, v: u64) -> Self {
        self.update(&v.to_le_bytes())
    }

    /// Update with an i64 value (little-endian)
    #[inline]
    pub fn update_i64(self, v: i64) -> Self {
        self.update(&v.to_le_bytes())
    }

    /// Update with a usize value (widened to u64 so 32 and 64-bit hosts agree)
    #[inline]
    pub fn update_usize(self, v: usize) -> Self {
        self.update_u64(v as u64)
    }

    /// Update with a bool
    #[inline]
    pub fn update_bool(self, v: bool) -> Self {
        self.update(&[v as u8])
    }

    /// Update with a key, tagged by variant
    pub fn update_key(self, key: &Key) -> Self {
        match key {
            Key::Int(v) => self.update(&[0]).update_i64(*v),
            Key::Uint(v) => self.update(&[1]).update_u64(*v),
            Key::Str(s) => self.update(&[2]).update_str(s),
            Key::Digest(d) => self.update(&[3]).update_u64(*d),
        }
    }

    /// Finish and return the hash as u64
    ///
    /// Takes the first 8 bytes of blake3 output as little-endian u64.
    #[inline]
    pub fn finish(self) -> u64 {
        let hash = self.inner.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Finish into a content signature
    #[inline]
    pub fn finish_content(self) -> ContentKey {
        ContentKey::from_raw(self.finish())
    }

    /// Finish into an identity key
    #[inline]
    pub fn finish_identity(self) -> IdentityKey {
        IdentityKey::new(Key::Digest(self.finish()))
    }
}

impl Default for StableHasher {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let a = StableHasher::new().update_str("row").update_u64(7).finish();
        let b = StableHasher::new().update_str("row").update_u64(7).finish();
        assert_eq!(a, b);
    }

    #[test]
    fn test_length_prefix_separates_boundaries() {
        let a = StableHasher::new().update_str("ab").update_str("c").finish();
        let b = StableHasher::new().update_str("a").update_str("bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_variants_are_tagged() {
        let int = StableHasher::new().update_key(&Key::Int(1)).finish();
        let uint = StableHasher::new().update_key(&Key::Uint(1)).finish();
        assert_ne!(int, uint);
    }

    #[test]
    fn test_finish_content_matches_finish() {
        let raw = StableHasher::new().update_bool(true).finish();
        let content = StableHasher::new().update_bool(true).finish_content();
        assert_eq!(content.as_raw(), raw);
    }
}
