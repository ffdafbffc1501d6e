//! The vault orchestrator.
//!
//! Composes the document store, the ledger, and the identity directory
//! under session-checked, ownership-checked contracts. Every mutating
//! operation notarizes exactly one transaction and seals exactly one
//! block; batching is structurally possible but unused.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use chrono::Utc;
use tracing::{debug, info};

use chainvault_common::{ContentHash, Error, Result, SessionToken, UserId};
use chainvault_identity::{Directory, User};
use chainvault_ledger::{Block, Ledger, LedgerCheckpoint, LedgerEntry, Transaction};
use chainvault_store::{DocumentRecord, DocumentStore};

use crate::config::VaultConfig;

/// The document vault.
///
/// There is exactly one authoritative writer, and the mutual-exclusion
/// boundary is explicit: the ledger lock is held across the whole
/// append-seal-checkpoint sequence, the store lock across store mutation.
/// Lock order is store before ledger; the directory lock is never held
/// while another lock is taken.
pub struct Vault {
    directory: RwLock<Directory>,
    store: Mutex<DocumentStore>,
    ledger: Mutex<Ledger>,
    checkpoint: LedgerCheckpoint,
}

impl Vault {
    /// Open a vault, loading all persisted state under the configured root.
    ///
    /// # Errors
    /// - `PersistenceCorruption` from any unreadable checkpoint (the
    ///   ledger's is subject to the configured recovery mode)
    pub fn open(config: VaultConfig) -> Result<Self> {
        let checkpoint = LedgerCheckpoint::with_recovery(&config.root, config.recovery)?
            .with_default_difficulty(config.difficulty);
        let ledger = checkpoint.load()?;
        let store = DocumentStore::open(config.documents_root())?;
        let directory = Directory::open(&config.root, config.hash_params.clone())?;

        Ok(Self {
            directory: RwLock::new(directory),
            store: Mutex::new(store),
            ledger: Mutex::new(ledger),
            checkpoint,
        })
    }

    /// Register a new user.
    pub fn register(&self, username: &str, password: &str, email: &str) -> Result<User> {
        self.directory
            .write()
            .unwrap()
            .register(username, password, email)
    }

    /// Authenticate and open a session.
    pub fn login(&self, username: &str, password: &str) -> Result<SessionToken> {
        self.directory.write().unwrap().login(username, password)
    }

    /// Close a session. Idempotent.
    pub fn logout(&self, token: &SessionToken) -> Result<bool> {
        self.directory.write().unwrap().logout(token)
    }

    /// Resolve a session to its user.
    ///
    /// # Errors
    /// - `Unauthorized` if the token does not match an open session
    pub fn user_by_session(&self, token: &SessionToken) -> Result<User> {
        self.authorize(token)
    }

    /// Look up a user by opaque id.
    ///
    /// History entries carry user ids; callers resolve them to handles
    /// with this when rendering.
    pub fn user_by_id(&self, user_id: &UserId) -> Option<User> {
        self.directory.read().unwrap().user_by_id(user_id).cloned()
    }

    /// Encrypt, store, and notarize a new document.
    ///
    /// # Postconditions
    /// - The document is stored under a fresh key
    /// - One `upload` transaction is sealed into one new block and the
    ///   ledger is checkpointed
    ///
    /// # Errors
    /// - `Unauthorized` if the session does not resolve
    pub fn upload_document(
        &self,
        token: &SessionToken,
        name: &str,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<DocumentRecord> {
        let user = self.authorize(token)?;

        let record = {
            let mut store = self.store.lock().unwrap();
            store.store(&user.user_id, name, bytes, mime_type, None)?
        };

        self.notarize(Transaction::Upload {
            user_id: user.user_id,
            content_hash: record.content_hash.clone(),
            document_name: name.to_string(),
            mime_type: mime_type.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        })?;

        info!(hash = %record.content_hash, "Document uploaded");
        Ok(record)
    }

    /// Decrypt and return a document the session's user owns.
    ///
    /// Ownership enforcement lives here, not in the store: the store
    /// happily decrypts for anyone holding its record.
    ///
    /// # Errors
    /// - `NotFound` if the hash is unknown
    /// - `Unauthorized` if the session does not resolve or the record's
    ///   owner is not the session's user, even though the hash exists
    pub fn get_document(
        &self,
        token: &SessionToken,
        hash: &ContentHash,
    ) -> Result<(Vec<u8>, DocumentRecord)> {
        let user = self.authorize(token)?;

        let store = self.store.lock().unwrap();
        let record = store
            .record(hash)
            .ok_or_else(|| Error::NotFound(format!("No document with hash {}", hash)))?;
        if record.owner_id != user.user_id {
            return Err(Error::Unauthorized(
                "Caller does not own this document".to_string(),
            ));
        }

        store.retrieve(hash)
    }

    /// Move custody of a document to another user.
    ///
    /// Re-stores the same plaintext under the same key: the content hash
    /// is unchanged, so the single store slot's owner field flips to the
    /// recipient. The sender keeps appearing as uploader in the ledger but
    /// loses retrieval rights.
    ///
    /// # Errors
    /// - `NotFound` if the hash is unknown
    /// - `Unauthorized` if the session does not resolve or the sender does
    ///   not own the record
    /// - `RecipientNotFound` if no user has the recipient username
    pub fn transfer_document(
        &self,
        token: &SessionToken,
        hash: &ContentHash,
        recipient_username: &str,
    ) -> Result<DocumentRecord> {
        let sender = self.authorize(token)?;

        let (new_record, recipient_id) = {
            let mut store = self.store.lock().unwrap();
            let record = store
                .record(hash)
                .ok_or_else(|| Error::NotFound(format!("No document with hash {}", hash)))?
                .clone();
            if record.owner_id != sender.user_id {
                return Err(Error::Unauthorized(
                    "Only the owner can transfer a document".to_string(),
                ));
            }

            let recipient = self
                .directory
                .read()
                .unwrap()
                .user_by_name(recipient_username)
                .cloned()
                .ok_or_else(|| Error::RecipientNotFound(recipient_username.to_string()))?;

            let (plaintext, _) = store.retrieve(hash)?;
            let new_record = store.store(
                &recipient.user_id,
                &record.name,
                &plaintext,
                &record.mime_type,
                Some(record.key.clone()),
            )?;
            (new_record, recipient.user_id)
        };

        self.notarize(Transaction::Transfer {
            sender_id: sender.user_id,
            recipient_id,
            content_hash: new_record.content_hash.clone(),
            document_name: new_record.name.clone(),
            timestamp: Utc::now().timestamp_millis(),
        })?;

        info!(hash = %new_record.content_hash, "Document transferred");
        Ok(new_record)
    }

    /// All documents currently owned by the session's user.
    pub fn list_documents(
        &self,
        token: &SessionToken,
    ) -> Result<HashMap<ContentHash, DocumentRecord>> {
        let user = self.authorize(token)?;
        Ok(self.store.lock().unwrap().list_by_owner(&user.user_id))
    }

    /// Every sealed transaction involving the session's user.
    pub fn list_transactions(&self, token: &SessionToken) -> Result<Vec<LedgerEntry>> {
        let user = self.authorize(token)?;
        Ok(self
            .ledger
            .lock()
            .unwrap()
            .transactions_for_user(&user.user_id))
    }

    /// Custody history of a document, in chain order.
    pub fn document_history(
        &self,
        token: &SessionToken,
        hash: &ContentHash,
    ) -> Result<Vec<LedgerEntry>> {
        self.authorize(token)?;
        Ok(self.ledger.lock().unwrap().transactions_for_document(hash))
    }

    /// All sealed blocks, genesis first. For chain exploration.
    pub fn blocks(&self) -> Vec<Block> {
        self.ledger.lock().unwrap().blocks().to_vec()
    }

    /// Find a sealed block by its hash.
    ///
    /// # Errors
    /// - `NotFound` if no block has this hash
    pub fn block_by_hash(&self, hash: &str) -> Result<Block> {
        self.ledger
            .lock()
            .unwrap()
            .block_by_hash(hash)
            .cloned()
            .ok_or_else(|| Error::NotFound("No block with this hash".to_string()))
    }

    /// Validate the full chain.
    pub fn verify_integrity(&self) -> bool {
        self.ledger.lock().unwrap().is_valid()
    }

    fn authorize(&self, token: &SessionToken) -> Result<User> {
        self.directory
            .read()
            .unwrap()
            .user_by_session(token)
            .cloned()
            .ok_or_else(|| Error::Unauthorized("Session is missing or invalid".to_string()))
    }

    /// Append, seal, and checkpoint under one ledger lock.
    fn notarize(&self, transaction: Transaction) -> Result<()> {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.append_transaction(transaction);
        ledger.seal_pending_block()?;
        self.checkpoint.save(&ledger)?;

        debug!(blocks = ledger.blocks().len(), "Ledger notarized");
        Ok(())
    }
}
