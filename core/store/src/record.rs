//! Document metadata records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chainvault_common::{ContentHash, UserId};
use chainvault_crypto::{DocumentKey, Iv};

/// Metadata for one stored document.
///
/// Keyed by content hash, so there is at most one record per distinct
/// plaintext byte sequence. The owner field belongs to the last writer of
/// that content; true provenance lives only in the ledger. Key and IV are
/// persisted with the record: the store is not the key custodian, its
/// caller is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// SHA-256 of the plaintext; the store's primary key.
    pub content_hash: ContentHash,
    /// Current owner (last writer of this content).
    pub owner_id: UserId,
    /// Display name supplied at upload.
    pub name: String,
    /// MIME type supplied at upload.
    pub mime_type: String,
    /// Plaintext size in bytes.
    pub size: u64,
    /// When this record was last written.
    pub created_at: DateTime<Utc>,
    /// Symmetric key the ciphertext is encrypted under (base64 text).
    pub key: DocumentKey,
    /// Initialization vector; stored alongside, not secret (base64 text).
    #[serde(with = "iv_encoding")]
    pub iv: Iv,
}

mod iv_encoding {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    use chainvault_crypto::Iv;

    pub fn serialize<S: Serializer>(iv: &Iv, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(iv))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Iv, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(&text).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("invalid iv length"))
    }
}
