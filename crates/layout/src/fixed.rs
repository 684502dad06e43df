use std::fmt;
use thiserror::Error;

/// Errors raised when building a [`FixedStr`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixedStrError {
    /// The value does not fit in the fixed-size field.
    #[error("value is {len} bytes, field holds at most {max}")]
    TooLong { len: usize, max: usize },

    /// NUL would terminate the value early on the next read.
    #[error("value contains a NUL byte")]
    InteriorNul,
}

/// A fixed-length, NUL-padded text field.
///
/// Stored exactly as `N` raw bytes with no length prefix. The value may use
/// all `N` bytes; shorter values are padded with `0`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedStr<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> FixedStr<N> {
    /// Capacity of the field in bytes.
    pub const CAPACITY: usize = N;

    /// An all-NUL (empty) field.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bytes: [0u8; N] }
    }

    /// Builds a field from a literal at compile time.
    ///
    /// Intended for `const` defaults: an oversized literal fails the build.
    #[must_use]
    pub const fn literal(value: &str) -> Self {
        let raw = value.as_bytes();
        assert!(raw.len() <= N, "literal does not fit in FixedStr");
        let mut bytes = [0u8; N];
        let mut i = 0;
        while i < raw.len() {
            bytes[i] = raw[i];
            i += 1;
        }
        Self { bytes }
    }

    /// Builds a field from `value`, rejecting values that do not fit.
    pub fn new(value: &str) -> Result<Self, FixedStrError> {
        let raw = value.as_bytes();
        if raw.len() > N {
            return Err(FixedStrError::TooLong {
                len: raw.len(),
                max: N,
            });
        }
        if raw.contains(&0) {
            return Err(FixedStrError::InteriorNul);
        }
        let mut bytes = [0u8; N];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self { bytes })
    }

    /// Wraps raw field bytes as read from the medium, without validation.
    #[must_use]
    pub const fn from_raw(bytes: [u8; N]) -> Self {
        Self { bytes }
    }

    /// Raw field bytes including padding.
    #[must_use]
    pub fn as_raw(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Text up to the first NUL.
    ///
    /// Bytes loaded from a damaged medium may not be valid UTF-8; the longest
    /// valid prefix is returned in that case.
    #[must_use]
    pub fn as_str(&self) -> &str {
        let end = self.bytes.iter().position(|&b| b == 0).unwrap_or(N);
        let text = &self.bytes[..end];
        match std::str::from_utf8(text) {
            Ok(s) => s,
            Err(e) => std::str::from_utf8(&text[..e.valid_up_to()]).unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes[0] == 0
    }
}

impl<const N: usize> Default for FixedStr<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedStr<{}>({:?})", N, self.as_str())
    }
}

impl<const N: usize> std::str::FromStr for FixedStr<N> {
    type Err = FixedStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
