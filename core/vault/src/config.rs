//! Vault configuration.

use std::path::{Path, PathBuf};

use chainvault_crypto::HashParams;
use chainvault_ledger::{RecoveryMode, DEFAULT_DIFFICULTY};

/// Directory name for the document store under the vault root.
pub const DOCUMENTS_DIRNAME: &str = "documents";

/// Construction parameters for a vault.
///
/// Loading these from a file is the bootstrap layer's concern; the vault
/// only consumes the resolved values.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Root directory for every checkpoint file and the document store.
    pub root: PathBuf,
    /// Ledger sealing difficulty (leading zero hex digits).
    pub difficulty: usize,
    /// What to do when the ledger checkpoint is unreadable.
    pub recovery: RecoveryMode,
    /// Password hashing parameters for the identity directory.
    pub hash_params: HashParams,
}

impl VaultConfig {
    /// Configuration with default difficulty, best-effort ledger recovery,
    /// and interactive password hashing.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            difficulty: DEFAULT_DIFFICULTY,
            recovery: RecoveryMode::default(),
            hash_params: HashParams::default(),
        }
    }

    /// Override the sealing difficulty.
    pub fn with_difficulty(mut self, difficulty: usize) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Override the ledger checkpoint recovery mode.
    pub fn with_recovery(mut self, recovery: RecoveryMode) -> Self {
        self.recovery = recovery;
        self
    }

    /// Override the password hashing parameters.
    pub fn with_hash_params(mut self, hash_params: HashParams) -> Self {
        self.hash_params = hash_params;
        self
    }

    /// Root of the document store.
    pub fn documents_root(&self) -> PathBuf {
        self.root.join(DOCUMENTS_DIRNAME)
    }
}
