//! Login state persisted across reloads.
//!
//! The session is the only client state that outlives a page: tokens and
//! the last known user live in a key-value store under fixed keys. Nothing
//! here checks token expiry; a rejected token surfaces later as a 401 from
//! the API and the caller clears the session.

use std::collections::BTreeMap;

use taskhub_shared::{TokenPair, UserSummary};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage write failed: {0}")]
    Write(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Encode(#[from] serde_json::Error),
}

/// Persistent string storage (browser `localStorage`, a JSON file, ...).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Snapshot handed to every API call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserSummary>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn bearer(&self) -> Option<String> {
        self.access_token
            .as_deref()
            .map(|token| format!("Bearer {token}"))
    }
}

#[derive(Debug)]
pub struct SessionStore<S> {
    store: S,
    session: Session,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Reads whatever session the store holds.
    pub fn init(store: S) -> Self {
        let access_token = store.get(ACCESS_TOKEN_KEY);
        let refresh_token = store.get(REFRESH_TOKEN_KEY);
        let user = store
            .get(USER_KEY)
            .and_then(|raw| match serde_json::from_str::<UserSummary>(&raw) {
                Ok(user) => Some(user),
                Err(error) => {
                    warn!(%error, "discarding unreadable cached user");
                    None
                }
            });

        debug!(
            authenticated = access_token.is_some(),
            "restored session"
        );

        Self {
            store,
            session: Session {
                access_token,
                refresh_token,
                user,
            },
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Persists fresh tokens. The in-memory session is updated even when
    /// the store refuses the write, so the current page stays signed in.
    pub fn set_session(
        &mut self,
        tokens: TokenPair,
        user: Option<UserSummary>,
    ) -> Result<(), StorageError> {
        self.session = Session {
            access_token: Some(tokens.access.clone()),
            refresh_token: Some(tokens.refresh.clone()),
            user: user.clone(),
        };

        self.store.set(ACCESS_TOKEN_KEY, &tokens.access)?;
        self.store.set(REFRESH_TOKEN_KEY, &tokens.refresh)?;
        match &user {
            Some(user) => {
                let json = serde_json::to_string(user)?;
                self.store.set(USER_KEY, &json)?;
            }
            None => {
                self.store.remove(USER_KEY)?;
            }
        }

        info!(
            user = user
                .as_ref()
                .map(|u| u.email.as_str())
                .unwrap_or("<unknown>"),
            "session stored"
        );
        Ok(())
    }

    /// Drops the session from memory and storage.
    pub fn clear_session(&mut self) -> Result<(), StorageError> {
        self.session = Session::default();
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        info!("session cleared");
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> TokenPair {
        TokenPair {
            access: "T1".to_string(),
            refresh: "T2".to_string(),
        }
    }

    #[test]
    fn empty_store_is_signed_out() {
        let sessions = SessionStore::init(MemoryStore::new());
        assert!(!sessions.is_authenticated());
        assert_eq!(sessions.session(), &Session::default());
    }

    #[test]
    fn set_session_persists_under_fixed_keys() {
        let mut sessions = SessionStore::init(MemoryStore::new());
        sessions
            .set_session(
                tokens(),
                Some(UserSummary {
                    id: Some(4),
                    username: "a@b.com".to_string(),
                    email: "a@b.com".to_string(),
                }),
            )
            .expect("store session");

        assert!(sessions.is_authenticated());
        let store = sessions.store();
        assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("T1"));
        assert_eq!(store.get(REFRESH_TOKEN_KEY).as_deref(), Some("T2"));
        assert!(
            store
                .get(USER_KEY)
                .is_some_and(|raw| raw.contains("a@b.com"))
        );

        let reloaded = SessionStore::init(sessions.into_store());
        assert_eq!(
            reloaded.session().bearer().as_deref(),
            Some("Bearer T1")
        );
        assert_eq!(
            reloaded.session().user.as_ref().and_then(|u| u.id),
            Some(4)
        );
    }

    #[test]
    fn clear_session_removes_every_key() {
        let mut sessions = SessionStore::init(MemoryStore::with_entries([
            (ACCESS_TOKEN_KEY, "old"),
            (REFRESH_TOKEN_KEY, "older"),
            (USER_KEY, "{\"username\":\"x\",\"email\":\"x@y\"}"),
        ]));
        assert!(sessions.is_authenticated());

        sessions.clear_session().expect("clear session");
        assert!(!sessions.is_authenticated());
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            assert!(sessions.store().get(key).is_none());
        }
    }

    #[test]
    fn unreadable_user_keeps_tokens() {
        let sessions = SessionStore::init(MemoryStore::with_entries([
            (ACCESS_TOKEN_KEY, "T1"),
            (USER_KEY, "not json"),
        ]));
        assert!(sessions.is_authenticated());
        assert!(sessions.session().user.is_none());
    }
}
