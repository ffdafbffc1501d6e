//! Common types used throughout ChainVault.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque unique identifier for a user.
///
/// The identity directory mints these at registration; everything else
/// treats them as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create a UserId from a string.
    ///
    /// # Errors
    /// - Returns error if id is empty
    pub fn new(id: impl Into<String>) -> crate::Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(crate::Error::InvalidInput(
                "UserId cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// SHA-256 digest of a document's plaintext, hex-encoded.
///
/// The hash is the store's primary key and doubles as the ciphertext file
/// name, so parsing rejects anything that is not exactly 64 lowercase hex
/// characters; caller-supplied hashes must not be able to name arbitrary
/// paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Length of the hex-encoded digest.
    pub const HEX_LENGTH: usize = 64;

    /// Build a ContentHash from a raw 32-byte digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(hex::encode(digest))
    }

    /// Parse an externally supplied hash string.
    ///
    /// # Errors
    /// - Returns error unless the input is 64 lowercase hex characters
    pub fn parse(hash: &str) -> crate::Result<Self> {
        if hash.len() != Self::HEX_LENGTH
            || !hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            return Err(crate::Error::InvalidInput(
                "Content hash must be 64 lowercase hex characters".to_string(),
            ));
        }
        Ok(Self(hash.to_string()))
    }

    /// Get the hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// High-entropy random session token.
///
/// Tokens authenticate every vault operation and must never appear in logs
/// or error messages; Debug output is redacted.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a token string.
    ///
    /// No validation: tokens are minted by the identity directory, and an
    /// arbitrary caller-supplied token simply fails to match any session.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the token string.
    ///
    /// # Security
    /// The returned value must only flow back to the presentation layer,
    /// never into logs or error messages.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken([REDACTED])")
    }
}
