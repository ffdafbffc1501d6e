//! Ledger checkpointing.
//!
//! The whole ledger state (chain, pending buffer, difficulty) is written
//! as one snapshot file, overwriting the prior checkpoint: a full-state
//! checkpoint, not an append log.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use chainvault_common::{Error, Result};

use crate::block::Block;
use crate::chain::Ledger;
use crate::transaction::Transaction;

/// Checkpoint file name under the storage root.
pub const CHECKPOINT_FILENAME: &str = "blockchain.json";

/// Serialized form of the full ledger state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub chain: Vec<Block>,
    pub pending_transactions: Vec<Transaction>,
    pub difficulty: usize,
}

/// What to do when a checkpoint exists but cannot be parsed.
///
/// Best-effort recovery silently restarts from a genesis-only ledger;
/// custody history recorded only in the corrupt snapshot is lost. The
/// choice is explicit configuration rather than an implicit default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Log a warning and start from a fresh genesis-only ledger.
    #[default]
    BestEffort,
    /// Surface `PersistenceCorruption` to the caller.
    FailFast,
}

/// Saves and loads ledger snapshots under a storage root.
pub struct LedgerCheckpoint {
    path: PathBuf,
    recovery: RecoveryMode,
    default_difficulty: usize,
}

impl LedgerCheckpoint {
    /// Create a checkpoint handle rooted at `root`, with best-effort
    /// recovery.
    ///
    /// # Postconditions
    /// - The root directory exists
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        Self::with_recovery(root, RecoveryMode::default())
    }

    /// Create a checkpoint handle with an explicit recovery mode.
    pub fn with_recovery(root: impl AsRef<Path>, recovery: RecoveryMode) -> Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        Ok(Self {
            path: root.join(CHECKPOINT_FILENAME),
            recovery,
            default_difficulty: crate::chain::DEFAULT_DIFFICULTY,
        })
    }

    /// Difficulty for fresh ledgers minted when no usable snapshot exists.
    ///
    /// An existing snapshot's own difficulty always wins over this.
    pub fn with_default_difficulty(mut self, difficulty: usize) -> Self {
        self.default_difficulty = difficulty;
        self
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full ledger state, overwriting any prior snapshot.
    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        let snapshot = ledger.snapshot();
        let data = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        std::fs::write(&self.path, data)?;

        debug!(
            blocks = snapshot.chain.len(),
            pending = snapshot.pending_transactions.len(),
            "Checkpointed ledger"
        );
        Ok(())
    }

    /// Load the ledger from the snapshot file.
    ///
    /// # Postconditions
    /// - An absent snapshot yields a fresh genesis-only ledger
    ///
    /// # Errors
    /// - `PersistenceCorruption` for an unparsable or structurally invalid
    ///   snapshot, only in [`RecoveryMode::FailFast`]; best-effort mode
    ///   logs a warning and yields a fresh ledger instead
    pub fn load(&self) -> Result<Ledger> {
        if !self.path.exists() {
            return Ledger::with_difficulty(self.default_difficulty);
        }

        let data = std::fs::read(&self.path)?;
        let parsed = serde_json::from_slice::<LedgerSnapshot>(&data)
            .map_err(|e| Error::PersistenceCorruption(e.to_string()))
            .and_then(Ledger::from_snapshot);

        match parsed {
            Ok(ledger) => Ok(ledger),
            Err(error) => match self.recovery {
                RecoveryMode::FailFast => Err(error),
                RecoveryMode::BestEffort => {
                    warn!(
                        error = %error,
                        "Ledger checkpoint unreadable, starting from genesis"
                    );
                    Ledger::with_difficulty(self.default_difficulty)
                }
            },
        }
    }
}
