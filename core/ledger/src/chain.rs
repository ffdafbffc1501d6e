//! The append-only ledger of sealed blocks.

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use chainvault_common::{ContentHash, Error, Result, UserId};

use crate::block::Block;
use crate::checkpoint::LedgerSnapshot;
use crate::transaction::Transaction;

/// Default difficulty: leading zero hex digits required of a block hash.
pub const DEFAULT_DIFFICULTY: usize = 2;

/// A transaction decorated with its containing block's identity.
///
/// Returned by the user and document scans; serialization flattens the
/// transaction so consumers see one flat record per hit.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub block_hash: String,
    pub block_index: u64,
    pub block_timestamp: i64,
}

/// Hash-chained ledger with a single pending buffer.
///
/// Exactly one buffer of un-sealed transactions exists ledger-wide;
/// sealing drains it into a new block referencing the current tip.
/// Validity is a function solely of recomputable digests and linkage.
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    difficulty: usize,
}

impl Ledger {
    /// Create a fresh ledger holding only the genesis block.
    pub fn new() -> Result<Self> {
        Self::with_difficulty(DEFAULT_DIFFICULTY)
    }

    /// Create a fresh ledger with an explicit difficulty.
    ///
    /// # Errors
    /// - Returns error if difficulty exceeds the digest length (64 hex
    ///   digits), which no nonce could ever satisfy
    pub fn with_difficulty(difficulty: usize) -> Result<Self> {
        if difficulty > 64 {
            return Err(Error::InvalidInput(
                "Difficulty cannot exceed 64 hex digits".to_string(),
            ));
        }
        Ok(Self {
            chain: vec![Block::genesis()?],
            pending: Vec::new(),
            difficulty,
        })
    }

    /// All sealed blocks, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// The most recently sealed block.
    pub fn tip(&self) -> &Block {
        // The chain always holds at least the genesis block.
        self.chain.last().expect("chain contains genesis")
    }

    /// Transactions appended but not yet sealed.
    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    /// Current difficulty target.
    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Add a transaction to the pending buffer.
    ///
    /// Nothing is sealed and no per-transaction hash exists; the
    /// transaction becomes tamper-evident only once its block is sealed.
    pub fn append_transaction(&mut self, transaction: Transaction) {
        self.pending.push(transaction);
    }

    /// Seal the pending buffer into a new block.
    ///
    /// # Postconditions
    /// - Returns `None` (and changes nothing) when the buffer is empty
    /// - Otherwise the new tip's hash meets the difficulty target, its
    ///   `previous_hash` is the old tip's hash, and the buffer is empty
    pub fn seal_pending_block(&mut self) -> Result<Option<&Block>> {
        if self.pending.is_empty() {
            return Ok(None);
        }

        let (next_index, previous_hash) = {
            let tip = self.tip();
            (tip.index + 1, tip.hash.clone())
        };
        let mut block = Block::candidate(
            next_index,
            Utc::now().timestamp_millis(),
            std::mem::take(&mut self.pending),
            previous_hash,
        )?;
        block.seal(self.difficulty)?;

        debug!(
            index = block.index,
            nonce = block.nonce,
            transactions = block.transactions.len(),
            "Sealed block"
        );

        self.chain.push(block);
        Ok(self.chain.last())
    }

    /// Validate the whole chain.
    ///
    /// For every block after genesis, the stored hash must equal the
    /// recomputed digest and `previous_hash` must equal the predecessor's
    /// stored hash. Returns false at the first mismatch. An operator who
    /// rewrites history and re-mines everything after the edit point is
    /// not detected; the trust model assumes a single honest writer.
    pub fn is_valid(&self) -> bool {
        for window in self.chain.windows(2) {
            let (previous, current) = (&window[0], &window[1]);
            match current.compute_hash() {
                Ok(recomputed) if recomputed == current.hash => {}
                _ => return false,
            }
            if current.previous_hash != previous.hash {
                return false;
            }
        }
        true
    }

    /// Find a block by its stored hash. Linear scan.
    pub fn block_by_hash(&self, hash: &str) -> Option<&Block> {
        self.chain.iter().find(|block| block.hash == hash)
    }

    /// Every transaction involving a user, in chain order.
    pub fn transactions_for_user(&self, user: &UserId) -> Vec<LedgerEntry> {
        self.scan(|transaction| transaction.involves(user))
    }

    /// Every transaction about a document, in chain order.
    pub fn transactions_for_document(&self, hash: &ContentHash) -> Vec<LedgerEntry> {
        self.scan(|transaction| transaction.content_hash() == hash)
    }

    fn scan(&self, matches: impl Fn(&Transaction) -> bool) -> Vec<LedgerEntry> {
        let mut entries = Vec::new();
        for block in &self.chain {
            for transaction in &block.transactions {
                if matches(transaction) {
                    entries.push(LedgerEntry {
                        transaction: transaction.clone(),
                        block_hash: block.hash.clone(),
                        block_index: block.index,
                        block_timestamp: block.timestamp,
                    });
                }
            }
        }
        entries
    }

    /// Capture the full ledger state for checkpointing.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            chain: self.chain.clone(),
            pending_transactions: self.pending.clone(),
            difficulty: self.difficulty,
        }
    }

    /// Rebuild a ledger from a checkpoint snapshot.
    ///
    /// # Errors
    /// - `PersistenceCorruption` if the snapshot has no genesis block or
    ///   an impossible difficulty
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self> {
        if snapshot.chain.is_empty() {
            return Err(Error::PersistenceCorruption(
                "Ledger snapshot has no genesis block".to_string(),
            ));
        }
        if snapshot.difficulty > 64 {
            return Err(Error::PersistenceCorruption(
                "Ledger snapshot difficulty exceeds 64 hex digits".to_string(),
            ));
        }
        Ok(Self {
            chain: snapshot.chain,
            pending: snapshot.pending_transactions,
            difficulty: snapshot.difficulty,
        })
    }
}
