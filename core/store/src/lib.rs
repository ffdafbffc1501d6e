//! Content-addressed encrypted object store for ChainVault.
//!
//! Documents are encrypted at rest under per-document symmetric keys and
//! addressed by the SHA-256 digest of their plaintext. One slot exists per
//! distinct byte sequence, globally; ciphertext and metadata are kept in
//! lockstep under that key.

pub mod record;
pub mod store;

pub use record::DocumentRecord;
pub use store::{DocumentStore, METADATA_FILENAME};
