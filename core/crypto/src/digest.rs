//! Content digests.
//!
//! A document's identity is the SHA-256 digest of its plaintext bytes,
//! making the digest a pure function of content: identical bytes always
//! map to the same store slot, regardless of who uploads them.

use sha2::{Digest, Sha256};

use chainvault_common::ContentHash;

/// Compute the content hash of a plaintext byte sequence.
pub fn content_hash(bytes: &[u8]) -> ContentHash {
    let digest: [u8; 32] = Sha256::digest(bytes).into();
    ContentHash::from_digest(digest)
}

/// SHA-256 digest of arbitrary bytes, hex-encoded.
///
/// Used by the ledger for block hashing, where the input is a canonical
/// encoding rather than document plaintext.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
