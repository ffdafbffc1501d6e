//! Tamper-evident custody ledger for ChainVault.
//!
//! This module provides:
//! - Custody transactions as a tagged union (upload, transfer)
//! - Hash-chained blocks with lightweight proof-of-work sealing
//! - Chain validation from recomputable digests and linkage alone
//! - Full-state checkpointing with an explicit recovery policy
//!
//! # Trust Model
//! The ledger has exactly one authoritative writer. Sealing stiffens
//! block identity; it is not a consensus mechanism, and validation cannot
//! detect a writer who rewrites history and re-mines every later block.

pub mod block;
pub mod chain;
pub mod checkpoint;
pub mod transaction;

pub use block::{Block, GENESIS_PREVIOUS_HASH};
pub use chain::{Ledger, LedgerEntry, DEFAULT_DIFFICULTY};
pub use checkpoint::{LedgerCheckpoint, LedgerSnapshot, RecoveryMode, CHECKPOINT_FILENAME};
pub use transaction::Transaction;
