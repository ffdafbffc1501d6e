//! Cryptographic primitives for ChainVault.
//!
//! This module provides:
//! - Content addressing via SHA-256 digests
//! - Document encryption using AES-256-CBC with PKCS#7 padding
//! - Password hashing using Argon2id
//! - Secure key and token generation with automatic zeroization
//!
//! # Security Guarantees
//! - All document key material is automatically zeroized on drop
//! - No plaintext, key, or token material is ever logged
//! - Constant-time comparison for password verification

pub mod cipher;
pub mod digest;
pub mod keys;
pub mod password;

pub use cipher::{decrypt, encrypt, Iv, BLOCK_SIZE, IV_LENGTH};
pub use digest::{content_hash, sha256_hex};
pub use keys::{session_token, DocumentKey, Salt, KEY_LENGTH, SALT_LENGTH};
pub use password::{hash_password, verify_password, HashParams, PasswordHash, HASH_LENGTH};
