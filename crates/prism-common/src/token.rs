//! Packed name tokens.
//!
//! Names of bones, parts, locators, looks, variants and attributes are stored
//! as fixed 8-byte character buffers. Shorter names are zero padded; a name
//! that uses all 8 bytes has no terminator.

use std::fmt;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Size of a packed token in bytes.
pub const TOKEN_SIZE: usize = 8;

/// A fixed-width packed name token.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(transparent)]
pub struct Token(pub [u8; TOKEN_SIZE]);

impl Token {
    /// Empty token (all zeros).
    pub const EMPTY: Self = Self([0; TOKEN_SIZE]);

    /// Pack a name into a token, truncating it to [`TOKEN_SIZE`] bytes.
    pub fn new(name: &str) -> Self {
        let mut bytes = [0u8; TOKEN_SIZE];
        let len = name.len().min(TOKEN_SIZE);
        bytes[..len].copy_from_slice(&name.as_bytes()[..len]);
        Self(bytes)
    }

    /// The bytes up to the first zero byte (or all of them).
    #[inline]
    pub fn as_bytes_trimmed(&self) -> &[u8] {
        let end = memchr::memchr(0, &self.0).unwrap_or(TOKEN_SIZE);
        &self.0[..end]
    }

    /// Check if the token holds no characters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }

    /// Decode the token into a display string.
    ///
    /// Never fails: bytes that are not valid UTF-8 are replaced.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes_trimmed()).into_owned()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes_trimmed()))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?})", self.to_string_lossy())
    }
}
