//! Custody transactions.
//!
//! A transaction is immutable once its block is sealed. The two custody
//! events are kept as a tagged union so every consumer (history rendering,
//! user scans) handles both shapes exhaustively.

use serde::{Deserialize, Serialize};

use chainvault_common::{ContentHash, UserId};

/// A custody-changing event recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transaction {
    /// A document entered the vault.
    Upload {
        user_id: UserId,
        content_hash: ContentHash,
        document_name: String,
        mime_type: String,
        /// Unix milliseconds.
        timestamp: i64,
    },
    /// Custody of a document moved from sender to recipient.
    Transfer {
        sender_id: UserId,
        recipient_id: UserId,
        content_hash: ContentHash,
        document_name: String,
        /// Unix milliseconds.
        timestamp: i64,
    },
}

impl Transaction {
    /// The document this transaction is about.
    pub fn content_hash(&self) -> &ContentHash {
        match self {
            Transaction::Upload { content_hash, .. } => content_hash,
            Transaction::Transfer { content_hash, .. } => content_hash,
        }
    }

    /// Display name carried by the transaction.
    pub fn document_name(&self) -> &str {
        match self {
            Transaction::Upload { document_name, .. } => document_name,
            Transaction::Transfer { document_name, .. } => document_name,
        }
    }

    /// Time the transaction was built, Unix milliseconds.
    pub fn timestamp(&self) -> i64 {
        match self {
            Transaction::Upload { timestamp, .. } => *timestamp,
            Transaction::Transfer { timestamp, .. } => *timestamp,
        }
    }

    /// Whether the given user took part in this transaction.
    ///
    /// An upload involves its uploader; a transfer involves both the
    /// sender and the recipient.
    pub fn involves(&self, user: &UserId) -> bool {
        match self {
            Transaction::Upload { user_id, .. } => user_id == user,
            Transaction::Transfer {
                sender_id,
                recipient_id,
                ..
            } => sender_id == user || recipient_id == user,
        }
    }
}
