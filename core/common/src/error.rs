//! Common error types for ChainVault.

use thiserror::Error;

/// Top-level error type for ChainVault operations.
///
/// Error messages never contain session tokens, key material, or password
/// bytes; callers may surface them to the user verbatim.
#[derive(Debug, Error)]
pub enum Error {
    /// Session missing or invalid, or the caller does not own the resource.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Username or password did not match a known user.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Username is already registered.
    #[error("Duplicate user: {0}")]
    DuplicateUser(String),

    /// Document, block, or user not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transfer recipient does not exist.
    #[error("Recipient not found: {0}")]
    RecipientNotFound(String),

    /// Chain validation failed, or ciphertext/padding is malformed.
    #[error("Integrity failure: {0}")]
    IntegrityFailure(String),

    /// A persisted checkpoint could not be parsed.
    #[error("Persistence corruption: {0}")]
    PersistenceCorruption(String),

    /// Cryptographic operation failed.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
