//! User and session directory.
//!
//! The directory owns both maps in memory and flushes the mutated map to
//! its checkpoint file on every change. Lookups back authorization across
//! the whole vault, so they stay read-only and cheap.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use chainvault_common::{Error, Result, SessionToken, UserId};
use chainvault_crypto::{hash_password, session_token, verify_password, HashParams, Salt};

use crate::user::{Role, Session, User};

/// User checkpoint file name under the storage root.
pub const USERS_FILENAME: &str = "users.json";

/// Session checkpoint file name under the storage root.
pub const SESSIONS_FILENAME: &str = "sessions.json";

/// Credential store and session issuer.
///
/// Known gaps, preserved deliberately: sessions never expire, and login
/// attempts are not throttled.
pub struct Directory {
    users_path: PathBuf,
    sessions_path: PathBuf,
    users: HashMap<String, User>,
    sessions: HashMap<SessionToken, Session>,
    params: HashParams,
}

impl Directory {
    /// Open a directory rooted at `root`, creating it if needed.
    ///
    /// # Errors
    /// - `PersistenceCorruption` if either checkpoint exists but cannot be
    ///   parsed; credential records are never silently dropped
    pub fn open(root: impl AsRef<Path>, params: HashParams) -> Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;

        let users_path = root.join(USERS_FILENAME);
        let sessions_path = root.join(SESSIONS_FILENAME);
        let users = load_map(&users_path)?;
        let sessions = load_map(&sessions_path)?;

        Ok(Self {
            users_path,
            sessions_path,
            users,
            sessions,
            params,
        })
    }

    /// Register a new user.
    ///
    /// # Postconditions
    /// - The user is persisted with a fresh random salt, an Argon2id hash,
    ///   an opaque generated id, and the `User` role
    ///
    /// # Errors
    /// - `DuplicateUser` if the username is taken
    /// - `InvalidInput` for an empty username or password
    pub fn register(&mut self, username: &str, password: &str, email: &str) -> Result<User> {
        if username.is_empty() {
            return Err(Error::InvalidInput("Username cannot be empty".to_string()));
        }
        if self.users.contains_key(username) {
            return Err(Error::DuplicateUser(username.to_string()));
        }

        let salt = Salt::generate();
        let hashed_password = hash_password(password, &salt, &self.params)?;

        let user = User {
            user_id: UserId::new(Uuid::new_v4().to_string())?,
            username: username.to_string(),
            email: email.to_string(),
            hashed_password,
            salt,
            role: Role::User,
        };

        self.users.insert(username.to_string(), user.clone());
        flush_map(&self.users_path, &self.users)?;

        info!(username = %username, "Registered user");
        Ok(user)
    }

    /// Authenticate and open a session.
    ///
    /// # Errors
    /// - `InvalidCredentials` on unknown username or password mismatch;
    ///   the two cases are indistinguishable to the caller
    pub fn login(&mut self, username: &str, password: &str) -> Result<SessionToken> {
        let user = match self.users.get(username) {
            Some(user) => user,
            None => return Err(Error::InvalidCredentials),
        };

        if !verify_password(password, &user.salt, &self.params, &user.hashed_password)? {
            return Err(Error::InvalidCredentials);
        }

        let token = session_token();
        self.sessions.insert(
            token.clone(),
            Session {
                user_id: user.user_id.clone(),
                username: user.username.clone(),
            },
        );
        flush_map(&self.sessions_path, &self.sessions)?;

        debug!(username = %username, "Session opened");
        Ok(token)
    }

    /// Close a session. Idempotent; returns false for an unknown token.
    pub fn logout(&mut self, token: &SessionToken) -> Result<bool> {
        if self.sessions.remove(token).is_none() {
            return Ok(false);
        }
        flush_map(&self.sessions_path, &self.sessions)?;

        debug!("Session closed");
        Ok(true)
    }

    /// Resolve a session token to its user.
    pub fn user_by_session(&self, token: &SessionToken) -> Option<&User> {
        let session = self.sessions.get(token)?;
        self.users.get(&session.username)
    }

    /// Look up a user by opaque id. Linear scan.
    pub fn user_by_id(&self, user_id: &UserId) -> Option<&User> {
        self.users.values().find(|user| &user.user_id == user_id)
    }

    /// Look up a user by handle.
    pub fn user_by_name(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    /// Replace a user's password.
    ///
    /// Salt and hash are replaced together; returns false on unknown user
    /// or old-password mismatch.
    ///
    /// # Errors
    /// - `InvalidInput` if the new password is empty
    pub fn change_password(
        &mut self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<bool> {
        let verified = match self.users.get(username) {
            Some(user) => {
                verify_password(old_password, &user.salt, &self.params, &user.hashed_password)?
            }
            None => return Ok(false),
        };
        if !verified {
            return Ok(false);
        }

        let salt = Salt::generate();
        let hashed_password = hash_password(new_password, &salt, &self.params)?;

        // Both fields replaced under the same flush.
        if let Some(user) = self.users.get_mut(username) {
            user.salt = salt;
            user.hashed_password = hashed_password;
        }
        flush_map(&self.users_path, &self.users)?;

        info!(username = %username, "Password changed");
        Ok(true)
    }
}

fn load_map<K, V>(path: &Path) -> Result<HashMap<K, V>>
where
    K: Eq + Hash + DeserializeOwned,
    V: DeserializeOwned,
{
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let data = std::fs::read(path)?;
    serde_json::from_slice(&data).map_err(|e| {
        Error::PersistenceCorruption(format!("{} unreadable: {}", path.display(), e))
    })
}

fn flush_map<K, V>(path: &Path, map: &HashMap<K, V>) -> Result<()>
where
    K: Eq + Hash + Serialize,
    V: Serialize,
{
    let data = serde_json::to_vec_pretty(map).map_err(|e| Error::Serialization(e.to_string()))?;
    std::fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fast_params() -> HashParams {
        HashParams {
            memory_cost: 8,
            time_cost: 1,
            parallelism: 1,
        }
    }

    fn open(temp: &TempDir) -> Directory {
        Directory::open(temp.path(), fast_params()).unwrap()
    }

    #[test]
    fn test_register_and_login() {
        let temp = TempDir::new().unwrap();
        let mut directory = open(&temp);

        let user = directory.register("alice", "pw1", "a@x").unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::User);

        let token = directory.login("alice", "pw1").unwrap();
        let resolved = directory.user_by_session(&token).unwrap();
        assert_eq!(resolved.user_id, user.user_id);
    }

    #[test]
    fn test_register_duplicate_username_fails() {
        let temp = TempDir::new().unwrap();
        let mut directory = open(&temp);

        directory.register("alice", "pw1", "a@x").unwrap();
        assert!(matches!(
            directory.register("alice", "pw2", "a2@x"),
            Err(Error::DuplicateUser(_))
        ));
    }

    #[test]
    fn test_login_wrong_password_never_yields_session() {
        let temp = TempDir::new().unwrap();
        let mut directory = open(&temp);
        directory.register("alice", "pw1", "a@x").unwrap();

        assert!(matches!(
            directory.login("alice", "wrong"),
            Err(Error::InvalidCredentials)
        ));
        assert!(matches!(
            directory.login("nobody", "pw1"),
            Err(Error::InvalidCredentials)
        ));
    }

    #[test]
    fn test_logout_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let mut directory = open(&temp);
        directory.register("alice", "pw1", "a@x").unwrap();

        let token = directory.login("alice", "pw1").unwrap();
        assert!(directory.logout(&token).unwrap());
        assert!(!directory.logout(&token).unwrap());
        assert!(directory.user_by_session(&token).is_none());

        let unknown = SessionToken::new("unknown-token");
        assert!(!directory.logout(&unknown).unwrap());
    }

    #[test]
    fn test_lookups() {
        let temp = TempDir::new().unwrap();
        let mut directory = open(&temp);
        let user = directory.register("alice", "pw1", "a@x").unwrap();

        assert_eq!(
            directory.user_by_id(&user.user_id).unwrap().username,
            "alice"
        );
        assert!(directory.user_by_name("alice").is_some());
        assert!(directory.user_by_name("bob").is_none());
    }

    #[test]
    fn test_state_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let token = {
            let mut directory = open(&temp);
            directory.register("alice", "pw1", "a@x").unwrap();
            directory.login("alice", "pw1").unwrap()
        };

        let directory = open(&temp);
        assert!(directory.user_by_name("alice").is_some());
        assert!(directory.user_by_session(&token).is_some());
    }

    #[test]
    fn test_change_password() {
        let temp = TempDir::new().unwrap();
        let mut directory = open(&temp);
        directory.register("alice", "old-pw", "a@x").unwrap();

        assert!(!directory
            .change_password("alice", "wrong", "new-pw")
            .unwrap());
        assert!(!directory
            .change_password("nobody", "old-pw", "new-pw")
            .unwrap());

        assert!(directory
            .change_password("alice", "old-pw", "new-pw")
            .unwrap());
        assert!(directory.login("alice", "old-pw").is_err());
        assert!(directory.login("alice", "new-pw").is_ok());
    }

    #[test]
    fn test_corrupt_users_checkpoint_fails_open() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(USERS_FILENAME), b"][").unwrap();

        assert!(matches!(
            Directory::open(temp.path(), fast_params()),
            Err(Error::PersistenceCorruption(_))
        ));
    }
}
