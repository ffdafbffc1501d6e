//! Key material with secure memory handling.
//!
//! Document keys automatically zeroize their memory on drop to prevent
//! sensitive data from persisting in memory. Keys serialize as base64 text
//! because they are persisted alongside document metadata; the store keeps
//! the key with the record rather than acting as a custodian.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use chainvault_common::SessionToken;

/// Length of document encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Length of password salts in bytes.
pub const SALT_LENGTH: usize = 32;

/// Length of session tokens in bytes (hex-encoded to 64 characters).
pub const TOKEN_LENGTH: usize = 32;

/// Symmetric key for encrypting one document's content.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DocumentKey {
    key: [u8; KEY_LENGTH],
}

impl DocumentKey {
    /// Create a document key from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut key = [0u8; KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut key);
        Self { key }
    }
}

impl fmt::Debug for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentKey([REDACTED])")
    }
}

impl Serialize for DocumentKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(self.key))
    }
}

impl<'de> Deserialize<'de> for DocumentKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = STANDARD
            .decode(&text)
            .map_err(serde::de::Error::custom)?;
        let key: [u8; KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("invalid document key length"))?;
        Ok(Self { key })
    }
}

/// Salt for password hashing.
///
/// Not secret; hex-encoded when persisted in the user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt([u8; SALT_LENGTH]);

impl Salt {
    /// Generate a random salt.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut salt = [0u8; SALT_LENGTH];
        rand::thread_rng().fill_bytes(&mut salt);
        Self(salt)
    }

    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; SALT_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the salt bytes.
    pub fn as_bytes(&self) -> &[u8; SALT_LENGTH] {
        &self.0
    }
}

impl Serialize for Salt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(&text).map_err(serde::de::Error::custom)?;
        let salt: [u8; SALT_LENGTH] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("invalid salt length"))?;
        Ok(Self(salt))
    }
}

/// Mint a high-entropy session token.
pub fn session_token() -> SessionToken {
    use rand::RngCore;
    let mut bytes = [0u8; TOKEN_LENGTH];
    rand::thread_rng().fill_bytes(&mut bytes);
    SessionToken::new(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_key_generate() {
        let key1 = DocumentKey::generate();
        let key2 = DocumentKey::generate();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_document_key_debug_redacted() {
        let key = DocumentKey::generate();
        assert_eq!(format!("{:?}", key), "DocumentKey([REDACTED])");
    }

    #[test]
    fn test_document_key_serde_base64() {
        let key = DocumentKey::from_bytes([7u8; KEY_LENGTH]);
        let json = serde_json::to_string(&key).unwrap();
        // Base64 text, not a byte array
        assert!(json.starts_with('"'));

        let restored: DocumentKey = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_document_key_deserialize_rejects_wrong_length() {
        use base64::Engine as _;
        let short = format!("\"{}\"", STANDARD.encode([1u8; 16]));
        assert!(serde_json::from_str::<DocumentKey>(&short).is_err());
    }

    #[test]
    fn test_salt_generate() {
        let salt1 = Salt::generate();
        let salt2 = Salt::generate();

        assert_ne!(salt1.as_bytes(), salt2.as_bytes());
    }

    #[test]
    fn test_salt_serde_hex() {
        let salt = Salt::from_bytes([0xaau8; SALT_LENGTH]);
        let json = serde_json::to_string(&salt).unwrap();
        assert_eq!(json, format!("\"{}\"", "aa".repeat(SALT_LENGTH)));

        let restored: Salt = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, salt);
    }

    #[test]
    fn test_session_token_entropy() {
        let t1 = session_token();
        let t2 = session_token();

        assert_eq!(t1.as_str().len(), TOKEN_LENGTH * 2);
        assert_ne!(t1.as_str(), t2.as_str());
    }
}
