//! Account and session commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an account (password from --password or TAFE_SHOP_PASSWORD)
//! tafe-shop register alice --password hunter2
//!
//! # Log in, then check who is logged in
//! tafe-shop login alice --password hunter2
//! tafe-shop whoami
//!
//! # Evaluate the navigation guard for a page
//! tafe-shop guard checkout.html
//! ```

use std::io::Write;

use askama::Template;
use secrecy::SecretString;

use tafe_shop_storefront::error::{clear_sentry_user, set_sentry_user};
use tafe_shop_storefront::models::Page;
use tafe_shop_storefront::services::AuthGate;
use tafe_shop_storefront::state::AppState;
use tafe_shop_storefront::views::AuthLinkTemplate;

use super::{CliError, parse_page};

/// Register a new account.
///
/// # Errors
///
/// Returns `CliError::App` if the input is blank or the username is taken.
pub fn register(
    state: &AppState,
    username: &str,
    password: &SecretString,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let user = state.auth().register(username, password)?;
    tracing::debug!(username = %user.username, "Account created from CLI");
    writeln!(out, "Registration successful! Please login.")?;
    Ok(())
}

/// Log in and report where the storefront navigates next.
///
/// # Errors
///
/// Returns `CliError::App` if the credentials are rejected.
pub fn login(
    state: &AppState,
    username: &str,
    password: &SecretString,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let user = state.auth().login(username, password)?;
    set_sentry_user(&user.username);

    let destination = state.auth().post_login_destination()?;
    writeln!(out, "Welcome, {}", user.username)?;
    writeln!(out, "Redirecting to {destination}")?;
    Ok(())
}

/// End the session.
///
/// # Errors
///
/// Returns `CliError::App` if a store fails.
pub fn logout(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    state.auth().logout()?;
    clear_sentry_user();
    writeln!(out, "Logged out. Redirecting to {}", Page::LOGIN)?;
    Ok(())
}

/// Show the logged-in user, or the login/logout link as HTML.
///
/// # Errors
///
/// Returns `CliError` if the session cannot be read or the view fails.
pub fn whoami(state: &AppState, html: bool, out: &mut impl Write) -> Result<(), CliError> {
    let user = state.auth().current_user()?;

    if html {
        writeln!(out, "{}", AuthLinkTemplate::new(user.as_ref()).render()?)?;
        return Ok(());
    }

    match user {
        Some(user) => writeln!(out, "{}", user.username)?,
        None => writeln!(out, "Not logged in")?,
    }
    Ok(())
}

/// Evaluate the navigation guard for a page load.
///
/// # Errors
///
/// Returns `CliError::App` if the page is unknown or a store fails.
pub fn guard(state: &AppState, page: &str, out: &mut impl Write) -> Result<(), CliError> {
    let page = parse_page(page)?;

    match state
        .auth()
        .require_auth(page, &state.config().protected_pages)?
    {
        AuthGate::Allowed => writeln!(out, "Allowed: {page}")?,
        AuthGate::RedirectToLogin { destination } => {
            writeln!(out, "Login required, redirecting to {destination}")?;
        }
    }
    Ok(())
}
