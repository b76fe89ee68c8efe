//! Locally cached identity and the client-side route guard.
//!
//! The cache is a small JSON key-value file that survives restarts until an
//! explicit sign-out. The gate only checks for a cached identifier; every
//! backend call is still authorized server-side from the bearer token.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::ClientProfile;

/// Where unauthenticated callers are sent
pub const SIGN_IN_ROUTE: &str = "/login";

const USER_KEY: &str = "user";
const SESSION_KEY: &str = "session";
const CLIENT_KEY: &str = "client";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: SessionUser,
    pub expires_at: DateTime<Utc>,
}

/// Persistent key-value store backed by a single JSON object on disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, SessionError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, map: &Map<String, Value>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(map)?)?;
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        match self.read_all()?.remove(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), SessionError> {
        let mut map = self.read_all()?;
        map.insert(key.to_string(), serde_json::to_value(value)?);
        self.write_all(&map)
    }

    pub fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }
}

/// The single session holder of a running client, injected into commands
#[derive(Debug)]
pub struct SessionContext {
    store: FileStore,
    session: Option<Session>,
    client: Option<ClientProfile>,
}

impl SessionContext {
    /// Reads whatever identity is cached. Unreadable entries count as absent.
    pub fn load(store: FileStore) -> Result<Self, SessionError> {
        let session = match store.get::<Session>(SESSION_KEY) {
            Ok(session) => session,
            Err(SessionError::Corrupt(e)) => {
                warn!("Ignoring unreadable cached session: {}", e);
                None
            }
            Err(e) => return Err(e),
        };
        let client = store.get::<ClientProfile>(CLIENT_KEY).unwrap_or_else(|e| {
            warn!("Ignoring unreadable cached client profile: {}", e);
            None
        });

        debug!("Loaded session cache from {}", store.path().display());
        Ok(Self { store, session, client })
    }

    pub fn persist(&mut self, session: Session, client: Option<ClientProfile>) -> Result<(), SessionError> {
        self.store.set(USER_KEY, &session.user)?;
        self.store.set(SESSION_KEY, &session)?;
        match &client {
            Some(profile) => self.store.set(CLIENT_KEY, profile)?,
            None => self.store.remove(CLIENT_KEY)?,
        }
        self.session = Some(session);
        self.client = client;
        Ok(())
    }

    pub fn set_client(&mut self, client: ClientProfile) -> Result<(), SessionError> {
        self.store.set(CLIENT_KEY, &client)?;
        self.client = Some(client);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.store.remove(CLIENT_KEY)?;
        self.store.remove(SESSION_KEY)?;
        self.store.remove(USER_KEY)?;
        self.session = None;
        self.client = None;
        Ok(())
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn client(&self) -> Option<&ClientProfile> {
        self.client.as_ref()
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.user.id).filter(|id| !id.is_nil())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Admit(Uuid),
    Redirect(&'static str),
}

pub struct SessionGate;

impl SessionGate {
    pub fn check(ctx: &SessionContext) -> GateDecision {
        match ctx.user_id() {
            Some(id) => GateDecision::Admit(id),
            None => GateDecision::Redirect(SIGN_IN_ROUTE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(id: Uuid) -> Session {
        Session {
            access_token: "token".to_string(),
            user: SessionUser { id, email: "chef@example.com".to_string() },
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn empty_store_redirects_to_sign_in() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = SessionContext::load(FileStore::new(dir.path().join("session.json"))).unwrap();
        assert_eq!(SessionGate::check(&ctx), GateDecision::Redirect(SIGN_IN_ROUTE));
    }

    #[test]
    fn persisted_session_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let id = Uuid::new_v4();

        let mut ctx = SessionContext::load(FileStore::new(&path)).unwrap();
        ctx.persist(session(id), None).unwrap();

        let reloaded = SessionContext::load(FileStore::new(&path)).unwrap();
        assert_eq!(SessionGate::check(&reloaded), GateDecision::Admit(id));
        let user: Option<SessionUser> = FileStore::new(&path).get("user").unwrap();
        assert_eq!(user.unwrap().id, id);
    }

    #[test]
    fn clear_removes_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut ctx = SessionContext::load(FileStore::new(&path)).unwrap();
        ctx.persist(session(Uuid::new_v4()), None).unwrap();
        ctx.clear().unwrap();

        assert!(ctx.session().is_none());
        let reloaded = SessionContext::load(FileStore::new(&path)).unwrap();
        assert_eq!(SessionGate::check(&reloaded), GateDecision::Redirect(SIGN_IN_ROUTE));
    }

    #[test]
    fn nil_identifier_is_not_admitted() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = SessionContext::load(FileStore::new(dir.path().join("s.json"))).unwrap();
        ctx.persist(session(Uuid::nil()), None).unwrap();
        assert_eq!(SessionGate::check(&ctx), GateDecision::Redirect(SIGN_IN_ROUTE));
    }

    #[test]
    fn corrupt_session_entry_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"session": {"unexpected": true}}"#).unwrap();
        let ctx = SessionContext::load(FileStore::new(&path)).unwrap();
        assert!(ctx.session().is_none());
    }
}
