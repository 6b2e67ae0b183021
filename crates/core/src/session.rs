//! Signed-in session state.
//!
//! A [`Session`] is created once from the persisted token and then passed
//! explicitly to whatever needs the current user. Privilege checks made
//! through it are advisory: they keep the client from issuing calls the
//! backend would refuse, but the backend remains the authorization boundary.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::user::User;
use crate::errors::DomainError;
use crate::privilege::Privilege;

/// Key the bearer token is stored under.
pub const TOKEN_STORAGE_KEY: &str = "jwtToken";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session token is malformed: {0}")]
    MalformedToken(String),
    #[error("session token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
    #[error("token storage failed: {0}")]
    Storage(String),
}

/// Durable storage for the one piece of client state that survives restarts.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<SecretString>, SessionError>;
    fn save(&self, token: &SecretString) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Stores the token as `{"jwtToken": "..."}` in a JSON file.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, Value>, SessionError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = fs::read_to_string(&self.path).map_err(|error| {
            SessionError::Storage(format!("could not read `{}`: {error}", self.path.display()))
        })?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => Err(SessionError::Storage(format!(
                "`{}` does not contain a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| {
                SessionError::Storage(format!("could not create `{}`: {error}", parent.display()))
            })?;
        }
        let raw = serde_json::to_string_pretty(map)
            .map_err(|error| SessionError::Storage(error.to_string()))?;
        fs::write(&self.path, raw).map_err(|error| {
            SessionError::Storage(format!("could not write `{}`: {error}", self.path.display()))
        })
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SecretString>, SessionError> {
        let map = self.read_map()?;
        Ok(map
            .get(TOKEN_STORAGE_KEY)
            .and_then(Value::as_str)
            .filter(|token| !token.trim().is_empty())
            .map(|token| SecretString::from(token.to_string())))
    }

    fn save(&self, token: &SecretString) -> Result<(), SessionError> {
        let mut map = self.read_map().unwrap_or_default();
        map.insert(
            TOKEN_STORAGE_KEY.to_string(),
            Value::String(token.expose_secret().to_string()),
        );
        self.write_map(&map)
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(_) => Map::new(),
        };
        if map.remove(TOKEN_STORAGE_KEY).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.write_map(&map)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    token: Arc<Mutex<Option<SecretString>>>,
}

impl InMemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Arc::new(Mutex::new(Some(SecretString::from(token.into())))) }
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>, SessionError> {
        match self.token.lock() {
            Ok(token) => Ok(token.clone()),
            Err(poisoned) => Ok(poisoned.into_inner().clone()),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), SessionError> {
        match self.token.lock() {
            Ok(mut slot) => *slot = Some(token.clone()),
            Err(poisoned) => *poisoned.into_inner() = Some(token.clone()),
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match self.token.lock() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
        Ok(())
    }
}

/// Payload claims the backend embeds in its session token.
#[derive(Clone, Debug, Deserialize)]
pub struct Claims {
    pub user: User,
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> Result<DateTime<Utc>, SessionError> {
        Utc.timestamp_opt(self.exp, 0).single().ok_or_else(|| {
            SessionError::MalformedToken(format!("`exp` {} is out of range", self.exp))
        })
    }
}

/// Decodes the payload segment of a JWT without verifying its signature.
/// Verification is the backend's job; the client only reads the claims.
pub fn decode_claims(token: &str) -> Result<Claims, SessionError> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return Err(SessionError::MalformedToken("expected three dot-separated segments".into()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|error| SessionError::MalformedToken(format!("payload is not base64url: {error}")))?;

    serde_json::from_slice::<Claims>(&bytes)
        .map_err(|error| SessionError::MalformedToken(format!("payload claims: {error}")))
}

#[derive(Clone, Default)]
pub struct Session {
    token: Option<SecretString>,
    user: Option<User>,
    expires_at: Option<DateTime<Utc>>,
    store: Option<Arc<dyn TokenStore>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token)
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .field("persistent", &self.store.is_some())
            .finish()
    }
}

impl Session {
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Restores the session persisted in `store`.
    ///
    /// A malformed or expired token is cleared from storage and the session
    /// starts signed out.
    pub fn initialize(store: Arc<dyn TokenStore>, now: DateTime<Utc>) -> Self {
        let mut session = Self { store: Some(store.clone()), ..Self::default() };

        let token = match store.load() {
            Ok(Some(token)) => token,
            Ok(None) => return session,
            Err(error) => {
                warn!(
                    event_name = "session.restore.storage_failed",
                    error = %error,
                    "could not read persisted session token"
                );
                return session;
            }
        };

        match Self::decode_valid(token.expose_secret(), now) {
            Ok((user, expires_at)) => {
                info!(
                    event_name = "session.restored",
                    user_id = %user.user_id,
                    expires_at = %expires_at,
                    "restored persisted session"
                );
                session.token = Some(token);
                session.user = Some(user);
                session.expires_at = Some(expires_at);
            }
            Err(error) => {
                warn!(
                    event_name = "session.restore.discarded",
                    error = %error,
                    "discarding persisted session token"
                );
                if let Err(clear_error) = store.clear() {
                    warn!(
                        event_name = "session.restore.clear_failed",
                        error = %clear_error,
                        "could not clear discarded session token"
                    );
                }
            }
        }

        session
    }

    /// Decodes and persists a freshly issued token.
    pub fn login(
        &mut self,
        token: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<&User, SessionError> {
        let token = SecretString::from(token.into());
        let (user, expires_at) = Self::decode_valid(token.expose_secret(), now)?;

        if let Some(store) = &self.store {
            store.save(&token)?;
        }

        info!(
            event_name = "session.login",
            user_id = %user.user_id,
            role_id = %user.role_id,
            "session started"
        );
        self.token = Some(token);
        self.expires_at = Some(expires_at);
        Ok(&*self.user.insert(user))
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        if let Some(user) = self.user.take() {
            info!(event_name = "session.logout", user_id = %user.user_id, "session ended");
        }
        self.token = None;
        self.expires_at = None;
        match &self.store {
            Some(store) => store.clear(),
            None => Ok(()),
        }
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|expires_at| expires_at <= now).unwrap_or(false)
    }

    pub fn has_privilege(&self, privilege: Privilege) -> bool {
        self.user.as_ref().map(|user| user.has_privilege(privilege)).unwrap_or(false)
    }

    pub fn require(&self, privilege: Privilege) -> Result<(), DomainError> {
        if self.has_privilege(privilege) {
            Ok(())
        } else {
            Err(DomainError::PermissionDenied(privilege))
        }
    }

    fn decode_valid(
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<(User, DateTime<Utc>), SessionError> {
        let claims = decode_claims(token)?;
        let expires_at = claims.expires_at()?;
        if expires_at <= now {
            return Err(SessionError::Expired { expired_at: expires_at });
        }
        Ok((claims.user, expires_at))
    }

    #[cfg(test)]
    pub(crate) fn signed_in_for_tests(user: User) -> Self {
        Self { user: Some(user), ..Self::default() }
    }
}
