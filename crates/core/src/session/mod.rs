//! Client-side login session
//!
//! [`SessionStore`] owns the bearer token, persists it through a
//! [`TokenStorage`] port and derives the administrator flag from the token's
//! claims. Readers get an immutable [`Session`] snapshot; `login` and `logout`
//! swap in a new one.

pub mod claims;
pub mod storage;

pub use claims::{Claims, DecodeError, decode_claims};
pub use storage::{ACCESS_TOKEN_KEY, FileTokenStorage, MemoryTokenStorage, TokenStorage};

use arc_swap::ArcSwap;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Snapshot of the login session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    token: Option<String>,
    is_admin: bool,
}

impl Session {
    /// A logged-out session
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated session, with the admin flag read from the token claims
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let is_admin = admin_flag(&token);
        Self {
            token: Some(token),
            is_admin,
        }
    }

    /// Whether a token is held
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Whether the token's claims mark the user as administrator
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Raw bearer token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

fn admin_flag(token: &str) -> bool {
    match decode_claims(token) {
        Ok(claims) => {
            debug!(?claims, "Decoded token claims");
            if claims.is_superuser.is_none() {
                warn!("Token does not carry an is_superuser claim");
            }
            claims.is_admin()
        }
        Err(e) => {
            warn!("Failed to decode token: {e}");
            false
        }
    }
}

/// Login session bound to durable storage
pub struct SessionStore {
    storage: Arc<dyn TokenStorage>,
    current: ArcSwap<Session>,
}

impl SessionStore {
    /// Open the store, restoring any token left in `storage`
    pub fn open(storage: Arc<dyn TokenStorage>) -> Self {
        let session = Self::restore(storage.as_ref());
        Self {
            storage,
            current: ArcSwap::from_pointee(session),
        }
    }

    /// Open a store backed by process memory only
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryTokenStorage::new()))
    }

    fn restore(storage: &dyn TokenStorage) -> Session {
        match storage.load() {
            Ok(Some(token)) => Session::from_token(token),
            Ok(None) => Session::anonymous(),
            Err(e) => {
                warn!("Failed to read persisted token, starting logged out: {e}");
                Session::anonymous()
            }
        }
    }

    /// Persist `token` and make it the active session
    ///
    /// Never fails: a storage error is logged and the session still changes
    /// for the lifetime of this store.
    pub fn login(&self, token: impl Into<String>) {
        let session = Session::from_token(token);
        if let Some(token) = session.token() {
            if let Err(e) = self.storage.save(token) {
                warn!("Failed to persist token: {e}");
            }
        }
        info!(is_admin = session.is_admin(), "Logged in");
        self.current.store(Arc::new(session));
    }

    /// Drop the persisted token and return to an anonymous session
    pub fn logout(&self) {
        if let Err(e) = self.storage.clear() {
            warn!("Failed to remove persisted token: {e}");
        }
        if self.current.load().is_authenticated() {
            info!("Logged out");
        }
        self.current.store(Arc::new(Session::anonymous()));
    }

    /// Re-read the persisted token, picking up changes made outside this store
    pub fn reload(&self) {
        let session = Self::restore(self.storage.as_ref());
        self.current.store(Arc::new(session));
    }

    /// Current session snapshot
    pub fn current(&self) -> Arc<Session> {
        self.current.load_full()
    }

    /// Whether a token is held
    pub fn is_authenticated(&self) -> bool {
        self.current.load().is_authenticated()
    }

    /// Whether the active token marks the user as administrator
    pub fn is_admin(&self) -> bool {
        self.current.load().is_admin()
    }

    /// Active bearer token
    pub fn token(&self) -> Option<String> {
        self.current.load().token().map(str::to_string)
    }

    /// Claims of the active token, when it decodes
    pub fn claims(&self) -> Option<Claims> {
        self.current
            .load()
            .token()
            .and_then(|token| decode_claims(token).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, CoreResult};
    use mockall::mock;

    const ADMIN_TOKEN: &str = "header.eyJpc19zdXBlcnVzZXIiOnRydWV9.sig";
    // {"is_superuser":false}
    const USER_TOKEN: &str = "header.eyJpc19zdXBlcnVzZXIiOmZhbHNlfQ.sig";
    // {"user_id":1}
    const NO_CLAIM_TOKEN: &str = "header.eyJ1c2VyX2lkIjoxfQ.sig";

    mock! {
        pub Storage {}

        impl TokenStorage for Storage {
            fn load(&self) -> CoreResult<Option<String>>;
            fn save(&self, token: &str) -> CoreResult<()>;
            fn clear(&self) -> CoreResult<()>;
        }
    }

    fn assert_anonymous(store: &SessionStore) {
        assert!(!store.is_authenticated());
        assert!(!store.is_admin());
        assert_eq!(store.token(), None);
        assert_eq!(*store.current(), Session::anonymous());
    }

    #[test]
    fn test_login_with_superuser_claim() {
        let store = SessionStore::in_memory();
        store.login(ADMIN_TOKEN);

        assert!(store.is_authenticated());
        assert!(store.is_admin());
        assert_eq!(store.token().as_deref(), Some(ADMIN_TOKEN));
    }

    #[test]
    fn test_login_without_admin_rights() {
        let store = SessionStore::in_memory();

        store.login(USER_TOKEN);
        assert!(store.is_authenticated());
        assert!(!store.is_admin());

        store.login(NO_CLAIM_TOKEN);
        assert!(store.is_authenticated());
        assert!(!store.is_admin());
    }

    #[test]
    fn test_login_with_malformed_token() {
        let store = SessionStore::in_memory();

        for token in ["not-a-jwt", "a.b", "a.!!!.c", "a..c", "", "a.b.c.d"] {
            store.login(token);
            assert!(store.is_authenticated(), "token {token:?}");
            assert!(!store.is_admin(), "token {token:?}");
        }
    }

    #[test]
    fn test_admin_flag_follows_latest_login() {
        let store = SessionStore::in_memory();
        store.login(ADMIN_TOKEN);
        assert!(store.is_admin());

        store.login("not-a-jwt");
        assert!(!store.is_admin());
    }

    #[test]
    fn test_logout_resets_any_state() {
        let store = SessionStore::in_memory();
        store.logout();
        assert_anonymous(&store);

        store.login(ADMIN_TOKEN);
        store.logout();
        assert_anonymous(&store);

        store.login("not-a-jwt");
        store.logout();
        store.logout();
        assert_anonymous(&store);
    }

    #[test]
    fn test_login_persists_and_logout_clears() {
        let storage = Arc::new(MemoryTokenStorage::new());
        let store = SessionStore::open(storage.clone());

        store.login(USER_TOKEN);
        assert_eq!(storage.load().unwrap().as_deref(), Some(USER_TOKEN));

        store.logout();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn test_open_restores_persisted_session() {
        let storage = Arc::new(MemoryTokenStorage::with_token(ADMIN_TOKEN));
        let store = SessionStore::open(storage);

        assert!(store.is_authenticated());
        assert!(store.is_admin());
        assert_eq!(store.claims().and_then(|c| c.is_superuser), Some(true));
    }

    #[test]
    fn test_reload_picks_up_external_clear() {
        let storage = Arc::new(MemoryTokenStorage::new());
        let store = SessionStore::open(storage.clone());
        store.login(ADMIN_TOKEN);

        storage.clear().unwrap();
        assert!(store.is_authenticated());

        store.reload();
        assert_anonymous(&store);
    }

    #[test]
    fn test_snapshot_is_stable_across_logout() {
        let store = SessionStore::in_memory();
        store.login(ADMIN_TOKEN);

        let snapshot = store.current();
        store.logout();

        assert_eq!(snapshot.token(), Some(ADMIN_TOKEN));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_login_saves_through_storage_port() {
        let mut storage = MockStorage::new();
        storage.expect_load().times(1).returning(|| Ok(None));
        storage
            .expect_save()
            .withf(|token| token == USER_TOKEN)
            .times(1)
            .returning(|_| Ok(()));
        storage.expect_clear().times(1).returning(|| Ok(()));

        let store = SessionStore::open(Arc::new(storage));
        store.login(USER_TOKEN);
        store.logout();
    }

    #[test]
    fn test_storage_failures_are_contained() {
        let mut storage = MockStorage::new();
        storage
            .expect_load()
            .returning(|| Err(CoreError::io_error("disk unavailable")));
        storage
            .expect_save()
            .returning(|_| Err(CoreError::io_error("read-only")));
        storage
            .expect_clear()
            .returning(|| Err(CoreError::io_error("read-only")));

        let store = SessionStore::open(Arc::new(storage));
        assert_anonymous(&store);

        store.login(ADMIN_TOKEN);
        assert!(store.is_authenticated());
        assert!(store.is_admin());

        store.logout();
        assert_anonymous(&store);
    }
}
