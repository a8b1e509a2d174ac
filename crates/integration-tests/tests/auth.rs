//! Integration tests for accounts, sessions and the page guard.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;

use tafe_shop_integration_tests::{memory_session, test_config};
use tafe_shop_storefront::models::Page;
use tafe_shop_storefront::services::{AuthError, AuthGate};
use tafe_shop_storefront::storage::keys;

fn password(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn test_register_twice_fails_with_duplicate() {
    let state = memory_session();
    state.auth().register("alice", &password("pw1")).unwrap();

    let err = state.auth().register("alice", &password("pw2")).unwrap_err();
    assert!(matches!(err, AuthError::DuplicateUser(ref name) if name.as_str() == "alice"));

    // The first password still works
    state.auth().login("alice", &password("pw1")).unwrap();
}

#[test]
fn test_register_trims_and_rejects_blanks() {
    let state = memory_session();
    assert!(matches!(
        state.auth().register("   ", &password("pw")),
        Err(AuthError::Validation)
    ));
    assert!(matches!(
        state.auth().register("alice", &password("  ")),
        Err(AuthError::Validation)
    ));

    let user = state.auth().register("  alice  ", &password("pw")).unwrap();
    assert_eq!(user.username.as_str(), "alice");
    assert!(state.auth().find_user("alice").unwrap().is_some());
}

#[test]
fn test_registration_does_not_log_in() {
    let state = memory_session();
    state.auth().register("alice", &password("pw")).unwrap();
    assert!(state.auth().current_user().unwrap().is_none());
}

#[test]
fn test_stored_password_is_not_plaintext() {
    let state = memory_session();
    state.auth().register("alice", &password("hunter2")).unwrap();

    let raw = state.local_store().get(keys::USERS).unwrap().unwrap();
    assert!(!raw.contains("hunter2"));
    assert!(raw.contains("$argon2"));
}

// =============================================================================
// Login and Logout
// =============================================================================

#[test]
fn test_login_wrong_password() {
    let state = memory_session();
    state.auth().register("alice", &password("pw")).unwrap();

    assert!(matches!(
        state.auth().login("alice", &password("nope")),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        state.auth().login("ghost", &password("pw")),
        Err(AuthError::InvalidCredentials)
    ));
    assert!(state.auth().current_user().unwrap().is_none());
}

#[test]
fn test_login_sets_current_user() {
    let state = memory_session();
    state.auth().register("alice", &password("pw")).unwrap();
    let user = state.auth().login(" alice ", &password("pw")).unwrap();

    assert_eq!(user.username.as_str(), "alice");
    assert_eq!(state.auth().current_user().unwrap(), Some(user));
}

#[test]
fn test_legacy_plaintext_record_still_logs_in() {
    let state = memory_session();
    state
        .local_store()
        .set(
            keys::USERS,
            r#"{"legacy":{"password":"old-pw","createdAt":"2023-05-01T10:00:00.000Z"}}"#,
        )
        .unwrap();

    state.auth().login("legacy", &password("old-pw")).unwrap();
    assert_eq!(
        state.auth().current_user().unwrap().unwrap().username.as_str(),
        "legacy"
    );
}

#[test]
fn test_logout_is_idempotent() {
    let state = memory_session();
    state.auth().register("alice", &password("pw")).unwrap();
    state.auth().login("alice", &password("pw")).unwrap();

    state.auth().logout().unwrap();
    assert!(state.auth().current_user().unwrap().is_none());

    state.auth().logout().unwrap();
    assert!(state.auth().current_user().unwrap().is_none());
    assert!(state.auth().find_user("alice").unwrap().is_some());
}

// =============================================================================
// Page Guard
// =============================================================================

#[test]
fn test_guard_redirects_then_returns_once() {
    let state = memory_session();
    let protected = test_config().protected_pages;
    state.auth().register("alice", &password("pw")).unwrap();

    let gate = state.auth().require_auth(Page::Checkout, &protected).unwrap();
    assert_eq!(
        gate,
        AuthGate::RedirectToLogin {
            destination: Page::Home
        }
    );

    state.auth().login("alice", &password("pw")).unwrap();
    assert_eq!(state.auth().post_login_destination().unwrap(), Page::Checkout);
    assert_eq!(state.auth().post_login_destination().unwrap(), Page::Shopping);
    assert_eq!(
        state.auth().require_auth(Page::Checkout, &protected).unwrap(),
        AuthGate::Allowed
    );
}

#[test]
fn test_guard_ignores_unprotected_pages() {
    let state = memory_session();
    let protected = test_config().protected_pages;

    for page in [Page::Home, Page::Courses] {
        assert_eq!(state.auth().require_auth(page, &protected).unwrap(), AuthGate::Allowed);
    }
    assert!(state.local_store().get(keys::REDIRECT_AFTER_LOGIN).unwrap().is_none());
}

#[test]
fn test_logout_forgets_redirect_target() {
    let state = memory_session();
    let protected = test_config().protected_pages;
    state.auth().require_auth(Page::Checkout, &protected).unwrap();
    assert!(state.local_store().get(keys::REDIRECT_AFTER_LOGIN).unwrap().is_some());

    state.auth().logout().unwrap();
    assert_eq!(state.auth().post_login_destination().unwrap(), Page::Shopping);
}
