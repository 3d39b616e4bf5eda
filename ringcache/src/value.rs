//! Immutable byte values (C3).
//!
//! The cache never hands out a reference to its internal buffer: every byte
//! slice crossing the cache boundary is copied once, in either direction.

/// An owned, defensively-copied byte buffer.
///
/// Constructing one from a borrowed slice copies it; reading it back out via
/// [`ImmutableBytes::as_bytes`] copies it again, so a caller mutating the
/// returned `Vec` can never corrupt what the cache holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImmutableBytes {
    bytes: Vec<u8>,
}

impl ImmutableBytes {
    /// Copies `bytes` into a new immutable value.
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Takes ownership of an already-owned buffer without copying.
    ///
    /// Use this when the caller just allocated `bytes` and no other holder
    /// can observe or mutate it (e.g. a loader's freshly-built `Vec<u8>`).
    #[must_use]
    pub fn from_owned(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Number of bytes held. This is what the LRU store accounts against
    /// `maxMemory` (see [`crate::lru::Value::len`]).
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if this value holds zero bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a fresh copy of the underlying bytes.
    #[must_use]
    pub fn as_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// A lossy-free string view of the bytes, copied.
    ///
    /// Mirrors the original's `String()` accessor; bytes that are not valid
    /// UTF-8 are replaced per [`String::from_utf8_lossy`].
    #[must_use]
    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl crate::lru::Value for ImmutableBytes {
    fn len(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defensive_copy_on_construction() {
        let mut source = vec![1, 2, 3];
        let value = ImmutableBytes::new(&source);
        source[0] = 99;
        assert_eq!(value.as_bytes(), vec![1, 2, 3]);
    }

    #[test]
    fn defensive_copy_on_read() {
        let value = ImmutableBytes::new(b"hello");
        let mut out = value.as_bytes();
        out[0] = b'H';
        assert_eq!(value.as_string(), "hello");
    }

    #[test]
    fn len_matches_byte_count() {
        let value = ImmutableBytes::new(b"abc");
        assert_eq!(value.len(), 3);
        assert!(!value.is_empty());
        assert!(ImmutableBytes::new(b"").is_empty());
    }

    #[test]
    fn as_string_roundtrips_utf8() {
        let value = ImmutableBytes::from_owned("630".as_bytes().to_vec());
        assert_eq!(value.as_string(), "630");
    }
}
