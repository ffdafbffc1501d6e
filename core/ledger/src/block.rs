//! Hash-chained blocks with proof-of-work sealing.
//!
//! Sealing is a cheap identity-stiffening step, not consensus: there is
//! exactly one authoritative writer. The nonce search is bounded in
//! practice by ~16^difficulty expected attempts.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use chainvault_common::{Error, Result};
use chainvault_crypto::sha256_hex;

use crate::transaction::Transaction;

/// Sentinel previous-hash of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// One sealed (or candidate) block of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain, monotonic from 0.
    pub index: u64,
    /// Unix milliseconds at block construction.
    pub timestamp: i64,
    /// Transactions embedded in this block, in append order.
    pub transactions: Vec<Transaction>,
    /// Hash of the predecessor block.
    pub previous_hash: String,
    /// Proof-of-work counter.
    pub nonce: u64,
    /// Digest over the canonical encoding of the other five fields.
    pub hash: String,
}

/// Canonical hash input. The field order is part of the chain format;
/// changing it invalidates every persisted chain.
#[derive(Serialize)]
struct HashInput<'a> {
    index: u64,
    timestamp: i64,
    transactions: &'a [Transaction],
    previous_hash: &'a str,
    nonce: u64,
}

impl Block {
    /// Create the genesis block: index 0, no transactions, sentinel parent.
    pub fn genesis() -> Result<Self> {
        Self::candidate(
            0,
            Utc::now().timestamp_millis(),
            Vec::new(),
            GENESIS_PREVIOUS_HASH.to_string(),
        )
    }

    /// Build a candidate block with nonce 0 and its initial hash.
    pub(crate) fn candidate(
        index: u64,
        timestamp: i64,
        transactions: Vec<Transaction>,
        previous_hash: String,
    ) -> Result<Self> {
        let mut block = Self {
            index,
            timestamp,
            transactions,
            previous_hash,
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.compute_hash()?;
        Ok(block)
    }

    /// Recompute the digest from the block's stored fields.
    ///
    /// Validation compares this against the stored `hash`; any mutation of
    /// index, timestamp, transactions, previous_hash, or nonce changes the
    /// result.
    pub fn compute_hash(&self) -> Result<String> {
        let input = HashInput {
            index: self.index,
            timestamp: self.timestamp,
            transactions: &self.transactions,
            previous_hash: &self.previous_hash,
            nonce: self.nonce,
        };
        let encoded =
            serde_json::to_vec(&input).map_err(|e| Error::Serialization(e.to_string()))?;
        Ok(sha256_hex(&encoded))
    }

    /// Whether a hash meets a difficulty target of leading zero hex digits.
    pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
        hash.len() >= difficulty && hash.as_bytes()[..difficulty].iter().all(|&b| b == b'0')
    }

    /// Increment the nonce until the digest meets the difficulty target.
    ///
    /// The nonce-0 hash is checked first, so a lucky candidate seals
    /// without any search.
    pub(crate) fn seal(&mut self, difficulty: usize) -> Result<()> {
        while !Self::meets_difficulty(&self.hash, difficulty) {
            self.nonce += 1;
            self.hash = self.compute_hash()?;
        }
        Ok(())
    }
}
