//! Content-addressed encrypted document store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use chainvault_common::{ContentHash, Error, Result, UserId};
use chainvault_crypto::{content_hash, decrypt, encrypt, DocumentKey};

use crate::record::DocumentRecord;

/// Metadata checkpoint file name under the store root.
pub const METADATA_FILENAME: &str = "metadata.json";

/// Encrypted object store keyed by content hash.
///
/// Ciphertext lives at `root/<content_hash>`, metadata in one JSON map
/// kept in lockstep with it. The store owns its in-memory record map and
/// flushes metadata on every mutation.
///
/// Content addressing gives free deduplication and an implicit tamper
/// check, but the single slot per hash means the owner field is mutable
/// by the last writer. Provenance must come from the ledger, never from
/// the store alone.
pub struct DocumentStore {
    root: PathBuf,
    metadata_path: PathBuf,
    records: HashMap<ContentHash, DocumentRecord>,
}

impl DocumentStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    /// - `PersistenceCorruption` if an existing metadata checkpoint cannot
    ///   be parsed. Unlike the ledger there is no best-effort mode here:
    ///   dropping records would orphan ciphertext and lose keys.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;

        let metadata_path = root.join(METADATA_FILENAME);
        let records = if metadata_path.exists() {
            let data = std::fs::read(&metadata_path)?;
            serde_json::from_slice(&data).map_err(|e| {
                Error::PersistenceCorruption(format!("Document metadata unreadable: {}", e))
            })?
        } else {
            HashMap::new()
        };

        Ok(Self {
            root,
            metadata_path,
            records,
        })
    }

    /// Encrypt and persist a document, returning its record.
    ///
    /// # Postconditions
    /// - `content_hash` is SHA-256 of `bytes`: storing identical bytes
    ///   again lands in the same slot, overwriting ciphertext and record
    ///   (including the owner) regardless of the prior writer
    /// - The returned record carries the key material; the caller is the
    ///   custodian
    ///
    /// # Errors
    /// - I/O failure writing ciphertext or metadata
    pub fn store(
        &mut self,
        owner: &UserId,
        name: &str,
        bytes: &[u8],
        mime_type: &str,
        key: Option<DocumentKey>,
    ) -> Result<DocumentRecord> {
        let key = key.unwrap_or_else(DocumentKey::generate);
        let hash = content_hash(bytes);
        let (ciphertext, iv) = encrypt(&key, bytes);

        let record = DocumentRecord {
            content_hash: hash.clone(),
            owner_id: owner.clone(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size: bytes.len() as u64,
            created_at: Utc::now(),
            key,
            iv,
        };

        std::fs::write(self.ciphertext_path(&hash), &ciphertext)?;
        self.records.insert(hash.clone(), record.clone());
        self.flush()?;

        info!(hash = %hash, size = record.size, "Stored encrypted document");
        Ok(record)
    }

    /// Decrypt and return a document with its record.
    ///
    /// # Errors
    /// - `NotFound` if the hash is unknown or its ciphertext file is gone
    /// - `IntegrityFailure` if the ciphertext or padding is malformed
    pub fn retrieve(&self, hash: &ContentHash) -> Result<(Vec<u8>, DocumentRecord)> {
        let record = self
            .records
            .get(hash)
            .ok_or_else(|| Error::NotFound(format!("No document with hash {}", hash)))?;

        let path = self.ciphertext_path(hash);
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "Ciphertext missing for hash {}",
                hash
            )));
        }

        let ciphertext = std::fs::read(&path)?;
        let plaintext = decrypt(&record.key, &record.iv, &ciphertext)?;

        debug!(hash = %hash, size = plaintext.len(), "Retrieved document");
        Ok((plaintext, record.clone()))
    }

    /// Remove a document's ciphertext and record. Idempotent.
    pub fn delete(&mut self, hash: &ContentHash) -> Result<bool> {
        if !self.records.contains_key(hash) {
            return Ok(false);
        }

        let path = self.ciphertext_path(hash);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        self.records.remove(hash);
        self.flush()?;

        info!(hash = %hash, "Deleted document");
        Ok(true)
    }

    /// All records currently owned by a user.
    pub fn list_by_owner(&self, owner: &UserId) -> HashMap<ContentHash, DocumentRecord> {
        self.records
            .iter()
            .filter(|(_, record)| &record.owner_id == owner)
            .map(|(hash, record)| (hash.clone(), record.clone()))
            .collect()
    }

    /// Metadata-only lookup, without decrypting.
    pub fn record(&self, hash: &ContentHash) -> Option<&DocumentRecord> {
        self.records.get(hash)
    }

    fn ciphertext_path(&self, hash: &ContentHash) -> PathBuf {
        self.root.join(hash.as_str())
    }

    fn flush(&self) -> Result<()> {
        let data = serde_json::to_vec_pretty(&self.records)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        std::fs::write(&self.metadata_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn owner(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    #[test]
    fn test_store_retrieve_roundtrip() {
        let temp = TempDir::new().unwrap();
        let mut store = DocumentStore::open(temp.path()).unwrap();

        let record = store
            .store(&owner("alice"), "greet.txt", b"hello", "text/plain", None)
            .unwrap();

        let (plaintext, retrieved) = store.retrieve(&record.content_hash).unwrap();
        assert_eq!(plaintext, b"hello");
        assert_eq!(retrieved.owner_id, owner("alice"));
        assert_eq!(retrieved.size, 5);
    }

    #[test]
    fn test_empty_document_roundtrip() {
        let temp = TempDir::new().unwrap();
        let mut store = DocumentStore::open(temp.path()).unwrap();

        let record = store
            .store(&owner("alice"), "empty", b"", "application/octet-stream", None)
            .unwrap();

        let (plaintext, _) = store.retrieve(&record.content_hash).unwrap();
        assert!(plaintext.is_empty());
    }

    #[test]
    fn test_ciphertext_on_disk_differs_from_plaintext() {
        let temp = TempDir::new().unwrap();
        let mut store = DocumentStore::open(temp.path()).unwrap();

        let record = store
            .store(&owner("alice"), "greet.txt", b"hello", "text/plain", None)
            .unwrap();

        let on_disk = std::fs::read(temp.path().join(record.content_hash.as_str())).unwrap();
        assert_ne!(on_disk, b"hello");
    }

    #[test]
    fn test_identical_bytes_collapse_to_one_slot() {
        let temp = TempDir::new().unwrap();
        let mut store = DocumentStore::open(temp.path()).unwrap();

        let first = store
            .store(&owner("alice"), "a.txt", b"shared bytes", "text/plain", None)
            .unwrap();
        let second = store
            .store(&owner("bob"), "b.txt", b"shared bytes", "text/plain", None)
            .unwrap();

        // Same content hash; the second writer owns the single slot.
        assert_eq!(first.content_hash, second.content_hash);
        let (_, record) = store.retrieve(&first.content_hash).unwrap();
        assert_eq!(record.owner_id, owner("bob"));
        assert_eq!(record.name, "b.txt");

        assert!(store.list_by_owner(&owner("alice")).is_empty());
        assert_eq!(store.list_by_owner(&owner("bob")).len(), 1);
    }

    #[test]
    fn test_store_with_caller_key_reuses_it() {
        let temp = TempDir::new().unwrap();
        let mut store = DocumentStore::open(temp.path()).unwrap();

        let key = DocumentKey::generate();
        let record = store
            .store(
                &owner("alice"),
                "a.txt",
                b"content",
                "text/plain",
                Some(key.clone()),
            )
            .unwrap();

        assert_eq!(record.key.as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_retrieve_unknown_hash_not_found() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::open(temp.path()).unwrap();

        let missing = ContentHash::from_digest([0u8; 32]);
        assert!(matches!(
            store.retrieve(&missing),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_retrieve_missing_ciphertext_not_found() {
        let temp = TempDir::new().unwrap();
        let mut store = DocumentStore::open(temp.path()).unwrap();

        let record = store
            .store(&owner("alice"), "a.txt", b"content", "text/plain", None)
            .unwrap();
        std::fs::remove_file(temp.path().join(record.content_hash.as_str())).unwrap();

        assert!(matches!(
            store.retrieve(&record.content_hash),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_retrieve_tampered_ciphertext_integrity_failure() {
        let temp = TempDir::new().unwrap();
        let mut store = DocumentStore::open(temp.path()).unwrap();

        let record = store
            .store(&owner("alice"), "a.txt", b"content", "text/plain", None)
            .unwrap();

        let path = temp.path().join(record.content_hash.as_str());
        let mut ciphertext = std::fs::read(&path).unwrap();
        ciphertext.truncate(ciphertext.len() - 1);
        std::fs::write(&path, &ciphertext).unwrap();

        assert!(matches!(
            store.retrieve(&record.content_hash),
            Err(Error::IntegrityFailure(_))
        ));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let mut store = DocumentStore::open(temp.path()).unwrap();

        let record = store
            .store(&owner("alice"), "a.txt", b"content", "text/plain", None)
            .unwrap();

        assert!(store.delete(&record.content_hash).unwrap());
        assert!(!store.delete(&record.content_hash).unwrap());
        assert!(store.record(&record.content_hash).is_none());
        assert!(!temp.path().join(record.content_hash.as_str()).exists());
    }

    #[test]
    fn test_metadata_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let hash = {
            let mut store = DocumentStore::open(temp.path()).unwrap();
            store
                .store(&owner("alice"), "a.txt", b"content", "text/plain", None)
                .unwrap()
                .content_hash
        };

        let store = DocumentStore::open(temp.path()).unwrap();
        let (plaintext, record) = store.retrieve(&hash).unwrap();
        assert_eq!(plaintext, b"content");
        assert_eq!(record.owner_id, owner("alice"));
    }

    #[test]
    fn test_corrupt_metadata_fails_open() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(METADATA_FILENAME), b"{ not json").unwrap();

        assert!(matches!(
            DocumentStore::open(temp.path()),
            Err(Error::PersistenceCorruption(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]
        #[test]
        fn prop_store_retrieve_arbitrary_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let temp = TempDir::new().unwrap();
            let mut store = DocumentStore::open(temp.path()).unwrap();

            let record = store
                .store(&owner("alice"), "blob", &bytes, "application/octet-stream", None)
                .unwrap();
            let (plaintext, _) = store.retrieve(&record.content_hash).unwrap();
            prop_assert_eq!(plaintext, bytes);
        }
    }
}
