//! Authentication service.
//!
//! Username/password accounts kept in the persistent store, and a session
//! (logged-in flag + username) kept in the session store.
//!
//! Passwords are hashed with Argon2id. Records created by the browser
//! storefront carry the password in plaintext; those still verify by exact
//! comparison so the accounts keep working.

mod error;

pub use error::AuthError;

use std::collections::BTreeMap;
use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{SecondsFormat, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use tafe_shop_core::{PasswordDigest, Username};

use crate::models::{CurrentUser, Page, StoredUser, User};
use crate::storage::{self, KeyValueStore, keys};

type UserMap = BTreeMap<Username, StoredUser>;

/// Outcome of the protected-page guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthGate {
    /// The page may be shown.
    Allowed,
    /// No session on a protected page; the page was recorded as the
    /// post-login target and the visitor should be sent to `destination`.
    RedirectToLogin { destination: Page },
}

/// Authentication manager.
///
/// Cheap to clone; clones share the same stores.
#[derive(Clone)]
pub struct AuthManager {
    local: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl AuthManager {
    /// Create a manager over the persistent and session stores.
    #[must_use]
    pub fn new(local: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self { local, session }
    }

    /// Create the empty users map if none is stored yet.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the store fails.
    pub fn initialize(&self) -> Result<(), AuthError> {
        storage::init_json(self.local.as_ref(), keys::USERS, &UserMap::new())?;
        Ok(())
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if either field is blank.
    /// Returns `AuthError::DuplicateUser` if the username is taken.
    #[instrument(skip(self, password))]
    pub fn register(&self, username: &str, password: &SecretString) -> Result<User, AuthError> {
        let (username, password) = validate_input(username, password)?;

        let mut users = self.users()?;
        if users.contains_key(&username) {
            tracing::info!(%username, "Registration rejected, username taken");
            return Err(AuthError::DuplicateUser(username));
        }

        let stored = StoredUser {
            password: hash_password(password)?,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let user = stored.to_user(username.clone());
        users.insert(username, stored);
        storage::write_json(self.local.as_ref(), keys::USERS, &users)?;

        tracing::info!(username = %user.username, "User registered");
        Ok(user)
    }

    /// Log in, replacing any existing session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if either field is blank.
    /// Returns `AuthError::InvalidCredentials` if the user is unknown or the
    /// password does not match.
    #[instrument(skip(self, password))]
    pub fn login(&self, username: &str, password: &SecretString) -> Result<CurrentUser, AuthError> {
        let (username, password) = validate_input(username, password)?;

        let users = self.users()?;
        let stored = users.get(&username).ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &stored.password)?;

        self.session.clear()?;
        self.session.set(keys::LOGGED_IN, "true")?;
        self.session.set(keys::USERNAME, username.as_str())?;

        tracing::info!(%username, "User logged in");
        Ok(CurrentUser { username })
    }

    /// End the session. Safe to call when nobody is logged in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the store fails.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), AuthError> {
        self.session.clear()?;
        self.local.remove(keys::REDIRECT_AFTER_LOGIN)?;
        self.local.remove(keys::CURRENT_ORDER)?;
        tracing::debug!("Session cleared");
        Ok(())
    }

    /// The logged-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the session store fails.
    pub fn current_user(&self) -> Result<Option<CurrentUser>, AuthError> {
        if self.session.get(keys::LOGGED_IN)?.is_none() {
            return Ok(None);
        }

        let user = self
            .session
            .get(keys::USERNAME)?
            .and_then(|name| Username::parse(&name).ok())
            .map(|username| CurrentUser { username });
        Ok(user)
    }

    /// Look up a registered user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the store fails.
    pub fn find_user(&self, username: &str) -> Result<Option<User>, AuthError> {
        let Ok(username) = Username::parse(username) else {
            return Ok(None);
        };
        let users = self.users()?;
        Ok(users
            .get(&username)
            .map(|stored| stored.to_user(username.clone())))
    }

    // =========================================================================
    // Navigation Guard
    // =========================================================================

    /// Evaluate the page guard once for a page load.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if a store fails.
    #[instrument(skip(self, protected))]
    pub fn require_auth(&self, page: Page, protected: &[Page]) -> Result<AuthGate, AuthError> {
        if !protected.contains(&page) || self.current_user()?.is_some() {
            return Ok(AuthGate::Allowed);
        }

        self.local
            .set(keys::REDIRECT_AFTER_LOGIN, page.file_name())?;
        tracing::info!(%page, "Protected page requires login");
        Ok(AuthGate::RedirectToLogin {
            destination: Page::LOGIN,
        })
    }

    /// Where to go after a successful login.
    ///
    /// Consumes the target recorded by [`Self::require_auth`], falling back
    /// to [`Page::AFTER_LOGIN`].
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the store fails.
    pub fn post_login_destination(&self) -> Result<Page, AuthError> {
        let recorded = self.local.get(keys::REDIRECT_AFTER_LOGIN)?;
        self.local.remove(keys::REDIRECT_AFTER_LOGIN)?;

        Ok(recorded
            .and_then(|name| name.parse::<Page>().ok())
            .unwrap_or(Page::AFTER_LOGIN))
    }

    fn users(&self) -> Result<UserMap, AuthError> {
        Ok(storage::read_json_or_default(self.local.as_ref(), keys::USERS)?)
    }
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager").finish_non_exhaustive()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Trim both fields and reject blanks.
fn validate_input<'a>(
    username: &str,
    password: &'a SecretString,
) -> Result<(Username, &'a str), AuthError> {
    let password = password.expose_secret().trim();
    let username = Username::parse(username).map_err(|_| AuthError::Validation)?;
    if password.is_empty() {
        return Err(AuthError::Validation);
    }
    Ok((username, password))
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<PasswordDigest, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| PasswordDigest::new(hash.to_string()))
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored digest.
fn verify_password(password: &str, digest: &PasswordDigest) -> Result<(), AuthError> {
    if !digest.is_phc() {
        return if digest.as_str() == password {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        };
    }

    let parsed_hash =
        PasswordHash::new(digest.as_str()).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn manager() -> (AuthManager, Arc<MemoryStore>, Arc<MemoryStore>) {
        let local = Arc::new(MemoryStore::new());
        let session = Arc::new(MemoryStore::new());
        let auth = AuthManager::new(local.clone(), session.clone());
        (auth, local, session)
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn test_register_stores_hash_not_password() {
        let (auth, local, _) = manager();
        auth.register("alice", &secret("pw")).unwrap();

        let raw = local.get(keys::USERS).unwrap().unwrap();
        assert!(raw.contains("\"alice\""));
        assert!(raw.contains("$argon2"));
        assert!(!raw.contains("\"pw\""));
    }

    #[test]
    fn test_register_trims_username() {
        let (auth, _, _) = manager();
        let user = auth.register("  alice  ", &secret("pw")).unwrap();
        assert_eq!(user.username.as_str(), "alice");
        assert!(matches!(
            auth.register("alice", &secret("x")),
            Err(AuthError::DuplicateUser(_))
        ));
    }

    #[test]
    fn test_register_blank_fields() {
        let (auth, _, _) = manager();
        assert!(matches!(auth.register("   ", &secret("pw")), Err(AuthError::Validation)));
        assert!(matches!(auth.register("bob", &secret("  ")), Err(AuthError::Validation)));
    }

    #[test]
    fn test_legacy_plaintext_record_logs_in() {
        let (auth, local, _) = manager();
        local
            .set(
                keys::USERS,
                r#"{"carol":{"password":"secret1","createdAt":"2024-01-01T00:00:00.000Z"}}"#,
            )
            .unwrap();

        assert!(matches!(
            auth.login("carol", &secret("wrong")),
            Err(AuthError::InvalidCredentials)
        ));
        let user = auth.login("carol", &secret("secret1")).unwrap();
        assert_eq!(user.username.as_str(), "carol");
    }

    #[test]
    fn test_login_replaces_session() {
        let (auth, _, session) = manager();
        session.set("stale", "1").unwrap();
        auth.register("dave", &secret("pw")).unwrap();
        auth.login("dave", &secret("pw")).unwrap();

        assert_eq!(session.get("stale").unwrap(), None);
        assert_eq!(session.get(keys::LOGGED_IN).unwrap().as_deref(), Some("true"));
        assert_eq!(session.get(keys::USERNAME).unwrap().as_deref(), Some("dave"));
    }

    #[test]
    fn test_current_user_requires_flag() {
        let (auth, _, session) = manager();
        session.set(keys::USERNAME, "eve").unwrap();
        assert_eq!(auth.current_user().unwrap(), None);

        session.set(keys::LOGGED_IN, "true").unwrap();
        assert_eq!(
            auth.current_user().unwrap().map(|u| u.username.into_inner()),
            Some("eve".to_string())
        );
    }

    #[test]
    fn test_guard_records_redirect_target() {
        let (auth, local, _) = manager();
        let gate = auth
            .require_auth(Page::Checkout, &Page::DEFAULT_PROTECTED)
            .unwrap();
        assert_eq!(gate, AuthGate::RedirectToLogin { destination: Page::Home });
        assert_eq!(
            local.get(keys::REDIRECT_AFTER_LOGIN).unwrap().as_deref(),
            Some("checkout.html")
        );

        assert_eq!(auth.post_login_destination().unwrap(), Page::Checkout);
        assert_eq!(auth.post_login_destination().unwrap(), Page::Shopping);
    }

    #[test]
    fn test_guard_allows_unprotected_and_logged_in() {
        let (auth, local, _) = manager();
        assert_eq!(
            auth.require_auth(Page::Courses, &Page::DEFAULT_PROTECTED).unwrap(),
            AuthGate::Allowed
        );
        assert_eq!(local.get(keys::REDIRECT_AFTER_LOGIN).unwrap(), None);

        auth.register("frank", &secret("pw")).unwrap();
        auth.login("frank", &secret("pw")).unwrap();
        assert_eq!(
            auth.require_auth(Page::Shopping, &Page::DEFAULT_PROTECTED).unwrap(),
            AuthGate::Allowed
        );
    }

    #[test]
    fn test_logout_clears_redirect_and_legacy_keys() {
        let (auth, local, _) = manager();
        local.set(keys::REDIRECT_AFTER_LOGIN, "checkout.html").unwrap();
        local.set(keys::CURRENT_ORDER, "{}").unwrap();

        auth.logout().unwrap();
        assert_eq!(local.get(keys::REDIRECT_AFTER_LOGIN).unwrap(), None);
        assert_eq!(local.get(keys::CURRENT_ORDER).unwrap(), None);
    }

    #[test]
    fn test_find_user() {
        let (auth, _, _) = manager();
        auth.register("gina", &secret("pw")).unwrap();
        assert!(auth.find_user("gina").unwrap().is_some());
        assert!(auth.find_user("nobody").unwrap().is_none());
        assert!(auth.find_user("").unwrap().is_none());
    }
}
