//! Password hashing using Argon2id.
//!
//! Argon2id is a memory-hard password hashing function that provides
//! resistance to both GPU and time-memory trade-off attacks. The raw
//! 32-byte output is stored next to its per-user salt in the user
//! directory; verification recomputes and compares in constant time.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;

use crate::keys::Salt;
use chainvault_common::{Error, Result};

/// Length of the stored password hash in bytes.
pub const HASH_LENGTH: usize = 32;

/// Parameters for Argon2id password hashing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashParams {
    /// Memory cost in KiB (e.g., 65536 = 64 MiB).
    pub memory_cost: u32,
    /// Number of iterations.
    pub time_cost: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl HashParams {
    /// Create parameters suitable for interactive login.
    ///
    /// These parameters provide a balance between security and usability,
    /// targeting approximately 0.5-1 second of hashing time.
    pub fn interactive() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }

    /// Create moderate parameters for constrained hosts.
    pub fn moderate() -> Self {
        Self {
            memory_cost: 32768, // 32 MiB
            time_cost: 3,
            parallelism: 2,
        }
    }
}

impl Default for HashParams {
    fn default() -> Self {
        Self::interactive()
    }
}

/// Stored Argon2id output for one user.
#[derive(Clone)]
pub struct PasswordHash([u8; HASH_LENGTH]);

impl PasswordHash {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the hash bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PasswordHash([REDACTED])")
    }
}

impl Serialize for PasswordHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl<'de> Deserialize<'de> for PasswordHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(&text).map_err(serde::de::Error::custom)?;
        let hash: [u8; HASH_LENGTH] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("invalid password hash length"))?;
        Ok(Self(hash))
    }
}

/// Hash a password with a salt using Argon2id.
///
/// # Preconditions
/// - `password` must not be empty
///
/// # Postconditions
/// - The output is deterministic given the same password, salt, and params
///
/// # Errors
/// - Returns error if the password is empty or the parameters are invalid
///
/// # Security
/// - The password is not stored or logged
pub fn hash_password(password: &str, salt: &Salt, params: &HashParams) -> Result<PasswordHash> {
    if password.is_empty() {
        return Err(Error::InvalidInput("Password cannot be empty".to_string()));
    }

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(HASH_LENGTH),
    )
    .map_err(|e| Error::Crypto(format!("Invalid hash parameters: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut hash = [0u8; HASH_LENGTH];
    argon2
        .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut hash)
        .map_err(|e| Error::Crypto(format!("Password hashing failed: {}", e)))?;

    Ok(PasswordHash(hash))
}

/// Verify that a password matches a stored hash.
///
/// Comparison is constant-time to prevent timing attacks.
pub fn verify_password(
    password: &str,
    salt: &Salt,
    params: &HashParams,
    expected: &PasswordHash,
) -> Result<bool> {
    let derived = hash_password(password, salt, params)?;
    Ok(bool::from(derived.0.as_slice().ct_eq(expected.0.as_slice())))
}
