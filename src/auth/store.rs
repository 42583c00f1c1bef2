//! Persistent session store.
//!
//! The store plays the role the browser's local storage played for the web
//! client: it holds the access token, the user profile, and the currently
//! selected shop under `~/.config/shopctl/session.json`. Reads are served
//! from an in-memory copy; every mutation is written back to disk.

use crate::config::config_root_dir;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::error::AuthError;
use super::types::{Shop, StoredSession, User};

/// Shared handle to the persisted session.
///
/// Cheap to clone; the gateway and the service layer hold clones of the same
/// underlying state.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug)]
struct StoreInner {
    /// Backing file. `None` keeps the session in memory only (tests).
    path: Option<PathBuf>,
    session: RwLock<StoredSession>,
}

/// Returns the default session file path (`~/.config/shopctl/session.json`).
pub fn default_session_path() -> Option<PathBuf> {
    config_root_dir().map(|dir| dir.join("shopctl").join("session.json"))
}

impl SessionStore {
    /// Open the store at `path`, loading any previously saved session.
    pub fn open(path: PathBuf) -> Result<Self, AuthError> {
        let session = load_session(&path)?;
        Ok(Self {
            inner: Arc::new(StoreInner {
                path: Some(path),
                session: RwLock::new(session),
            }),
        })
    }

    /// In-memory store with no backing file.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                path: None,
                session: RwLock::new(StoredSession::default()),
            }),
        }
    }

    /// Current access token, if logged in.
    pub fn access_token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// Saved user profile, if logged in.
    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    /// Shop the user is currently operating on.
    pub fn current_shop(&self) -> Option<Shop> {
        self.read().current_shop.clone()
    }

    /// True when an access token is present.
    pub fn is_logged_in(&self) -> bool {
        self.read().token.is_some()
    }

    /// Record a fresh login: token, profile, and the user's starting shop.
    pub fn set_auth(&self, token: &str, user: User) -> Result<(), AuthError> {
        {
            let mut session = self.write();
            session.token = Some(token.to_string());
            session.current_shop = user.default_shop();
            session.user = Some(user);
        }
        self.persist()
    }

    /// Swap in a renewed access token, keeping profile and shop.
    pub fn set_access_token(&self, token: &str) -> Result<(), AuthError> {
        self.write().token = Some(token.to_string());
        self.persist()
    }

    /// Switch the active shop.
    pub fn set_current_shop(&self, shop: Shop) -> Result<(), AuthError> {
        self.write().current_shop = Some(shop);
        self.persist()
    }

    /// Drop token, user, and shop. Used by logout and by forced expiry.
    pub fn clear(&self) -> Result<(), AuthError> {
        *self.write() = StoredSession::default();
        self.persist()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoredSession> {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoredSession> {
        self.inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self) -> Result<(), AuthError> {
        let Some(path) = self.inner.path.as_deref() else {
            return Ok(());
        };
        let snapshot = self.read().clone();
        write_session(path, &snapshot)
    }
}

/// Load the session file, treating a missing file as an empty session.
fn load_session(path: &Path) -> Result<StoredSession, AuthError> {
    match std::fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text).map_err(|err| {
            AuthError::Invalid(format!(
                "failed to parse session file `{}`: {err}",
                path.display()
            ))
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(StoredSession::default()),
        Err(err) => Err(AuthError::Io(err)),
    }
}

/// Persist the session to disk with restrictive permissions.
fn write_session(path: &Path, session: &StoredSession) -> Result<(), AuthError> {
    if let Some(parent) = path.parent() {
        // Ensure the config directory exists and is private.
        std::fs::create_dir_all(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700));
        }
    }

    let text = serde_json::to_string_pretty(session)
        .map_err(|err| AuthError::Invalid(format!("failed to serialize session: {err}")))?;
    let mut options = std::fs::OpenOptions::new();
    options.create(true).truncate(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testsupport::TestTempDir;
    use serde_json::Map;

    fn sample_user() -> User {
        User {
            id: 11,
            email: "clerk@example.com".into(),
            name: Some("Clerk".into()),
            role: Some("staff".into()),
            shop_id: Some(2),
            shops: vec![Shop::with_id(1), Shop::with_id(2)],
            extra: Map::new(),
        }
    }

    // Verifies a login survives reopening the store from disk.
    #[test]
    fn session_round_trips_through_disk() {
        let dir = TestTempDir::new("store");
        let path = dir.child("session.json");

        let store = SessionStore::open(path.clone()).unwrap();
        store.set_auth("tok-1", sample_user()).unwrap();

        let reopened = SessionStore::open(path).unwrap();
        assert_eq!(reopened.access_token().as_deref(), Some("tok-1"));
        assert_eq!(reopened.user().map(|u| u.id), Some(11));
        assert_eq!(reopened.current_shop().map(|s| s.id), Some(2));
    }

    // Verifies a missing session file loads as logged-out, not an error.
    #[test]
    fn missing_file_loads_empty_session() {
        let dir = TestTempDir::new("store");
        let store = SessionStore::open(dir.child("absent.json")).unwrap();
        assert!(!store.is_logged_in());
        assert_eq!(store.user(), None);
    }

    // Verifies the persisted file uses the contract's storage keys.
    #[test]
    fn persisted_file_uses_contract_key_names() {
        let dir = TestTempDir::new("store");
        let path = dir.child("session.json");
        let store = SessionStore::open(path.clone()).unwrap();
        store.set_auth("tok-1", sample_user()).unwrap();

        let raw = std::fs::read_to_string(path).unwrap();
        assert!(raw.contains("\"token\""));
        assert!(raw.contains("\"user\""));
        assert!(raw.contains("\"currentShop\""));
    }

    // Verifies clear wipes both the memory copy and the file.
    #[test]
    fn clear_empties_memory_and_disk() {
        let dir = TestTempDir::new("store");
        let path = dir.child("session.json");
        let store = SessionStore::open(path.clone()).unwrap();
        store.set_auth("tok-1", sample_user()).unwrap();

        store.clear().unwrap();
        assert!(!store.is_logged_in());

        let reopened = SessionStore::open(path).unwrap();
        assert!(!reopened.is_logged_in());
        assert_eq!(reopened.current_shop(), None);
    }

    // Verifies token renewal replaces the token without touching the profile.
    #[test]
    fn set_access_token_keeps_profile_and_shop() {
        let store = SessionStore::in_memory();
        store.set_auth("tok-1", sample_user()).unwrap();
        store.set_access_token("tok-2").unwrap();
        assert_eq!(store.access_token().as_deref(), Some("tok-2"));
        assert_eq!(store.user().map(|u| u.id), Some(11));
        assert_eq!(store.current_shop().map(|s| s.id), Some(2));
    }

    // Verifies clones observe each other's writes.
    #[test]
    fn clones_share_state() {
        let store = SessionStore::in_memory();
        let other = store.clone();
        store.set_access_token("tok-9").unwrap();
        assert_eq!(other.access_token().as_deref(), Some("tok-9"));
    }

    // Verifies a corrupt session file is reported, not silently reset.
    #[test]
    fn corrupt_file_surfaces_parse_error() {
        let dir = TestTempDir::new("store");
        let path = dir.write_text("session.json", "{not json");
        let err = SessionStore::open(path).unwrap_err();
        assert!(err.to_string().contains("failed to parse session file"));
    }
}
