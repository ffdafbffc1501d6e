//! Identity and session directory for ChainVault.
//!
//! Credential storage, session issuance and teardown, and the read-only
//! lookups the rest of the vault uses for authorization.

pub mod directory;
pub mod user;

pub use directory::{Directory, SESSIONS_FILENAME, USERS_FILENAME};
pub use user::{Role, Session, User};
