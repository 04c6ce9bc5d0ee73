//! Application state shared by every client: the signed-in session, the
//! theme preference and the response cache.
//!
//! The session and theme survive restarts when a state file is configured;
//! the cache never does.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use crate::auth::Session;
use crate::cache::ResponseCache;
use crate::config::ClientOptions;
use crate::error::Error;

/// Colour scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Persisted {
    #[serde(default)]
    session: Option<Session>,
    #[serde(default)]
    theme: Theme,
}

/// Explicit, injectable application state
pub struct AppState {
    session: RwLock<Option<Session>>,
    theme: RwLock<Theme>,
    cache: ResponseCache,
    path: Option<PathBuf>,
}

impl AppState {
    /// In-memory state with nothing persisted
    pub fn new(cache_ttl: Duration) -> Self {
        Self {
            session: RwLock::new(None),
            theme: RwLock::new(Theme::default()),
            cache: ResponseCache::new(cache_ttl),
            path: None,
        }
    }

    /// Build the state described by `options`, loading the state file if set
    pub fn init(options: &ClientOptions) -> Result<Self, Error> {
        match &options.state_path {
            Some(path) => Self::load(path, options.cache_ttl),
            None => Ok(Self::new(options.cache_ttl)),
        }
    }

    /// Load persisted state from `path`. A missing file starts empty.
    pub fn load(path: impl AsRef<Path>, cache_ttl: Duration) -> Result<Self, Error> {
        let path = path.as_ref();
        let persisted = match std::fs::read(path) {
            Ok(bytes) => serde_json::from_slice::<Persisted>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Persisted::default(),
            Err(e) => return Err(e.into()),
        };
        debug!("loaded state from {}", path.display());

        Ok(Self {
            session: RwLock::new(persisted.session),
            theme: RwLock::new(persisted.theme),
            cache: ResponseCache::new(cache_ttl),
            path: Some(path.to_path_buf()),
        })
    }

    /// Write the session and theme to the state file, if one is configured
    pub fn save(&self) -> Result<(), Error> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let persisted = Persisted {
            session: self.session.read().unwrap_or_else(PoisonError::into_inner).clone(),
            theme: self.theme(),
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_vec_pretty(&persisted)?)?;
        Ok(())
    }

    /// The live session. An expired session is dropped and reads as none.
    pub fn session(&self) -> Option<Session> {
        let current = self.session.read().unwrap_or_else(PoisonError::into_inner).clone();
        match current {
            Some(session) if session.is_expired() => {
                self.expire();
                None
            }
            other => other,
        }
    }

    /// Bearer token of the live session
    pub fn token(&self) -> Option<String> {
        self.session().map(|s| s.token)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session().is_some()
    }

    /// Store a new session and persist it
    pub fn sign_in(&self, session: Session) -> Result<(), Error> {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        self.save()
    }

    /// Forget the session and everything cached on its behalf
    pub fn sign_out(&self) -> Result<(), Error> {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.cache.clear();
        self.save()
    }

    pub fn theme(&self) -> Theme {
        *self.theme.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), Error> {
        *self.theme.write().unwrap_or_else(PoisonError::into_inner) = theme;
        self.save()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Drop an expired session and stale cache entries
    pub fn expire(&self) {
        {
            let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
            if session.as_ref().is_some_and(Session::is_expired) {
                *session = None;
            }
        }
        self.cache.purge_expired();
        if let Err(e) = self.save() {
            warn!("failed to persist state after expiry: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: Option<i64>) -> Session {
        Session {
            token: "opaque-token".to_string(),
            user: None,
            expires_at,
        }
    }

    #[test]
    fn persists_session_and_theme() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let state = AppState::load(&path, Duration::from_secs(60)).unwrap();
        assert!(!state.is_logged_in());
        state.sign_in(session(None)).unwrap();
        state.set_theme(Theme::Dark).unwrap();

        let reloaded = AppState::load(&path, Duration::from_secs(60)).unwrap();
        assert_eq!(reloaded.token().as_deref(), Some("opaque-token"));
        assert_eq!(reloaded.theme(), Theme::Dark);

        reloaded.sign_out().unwrap();
        let again = AppState::load(&path, Duration::from_secs(60)).unwrap();
        assert!(!again.is_logged_in());
        assert_eq!(again.theme(), Theme::Dark);
    }

    #[test]
    fn expired_session_is_dropped() {
        let state = AppState::new(Duration::from_secs(60));
        state.sign_in(session(Some(1))).unwrap();
        assert!(!state.is_logged_in());
        assert!(state.token().is_none());
    }

    #[test]
    fn corrupt_state_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(matches!(AppState::load(&path, Duration::from_secs(1)), Err(Error::Json(_))));
    }
}
