//! Vault orchestrator for ChainVault.
//!
//! This module composes the object store, the custody ledger, and the
//! identity directory into one coherent document-custody service:
//! - Session-checked, ownership-checked upload/retrieve/transfer
//! - One notarized transaction and one sealed block per mutating call
//! - Ledger checkpointing after every seal
//!
//! # Architecture
//! The orchestrator sits between the presentation layer and the core
//! stores. The presentation layer supplies credentials and document
//! bytes, renders returned metadata and history, and treats ciphertext
//! and keys as opaque pass-through values.

pub mod config;
pub mod vault;

pub use config::{VaultConfig, DOCUMENTS_DIRNAME};
pub use vault::Vault;
