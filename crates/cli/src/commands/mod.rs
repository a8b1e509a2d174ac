//! Subcommand implementations.
//!
//! Each command takes the session [`AppState`] and writes its output to the
//! given writer, so commands can be exercised against in-memory stores.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod orders;

use std::io;

use thiserror::Error;

use tafe_shop_storefront::catalog::CatalogError;
use tafe_shop_storefront::error::AppError;
use tafe_shop_storefront::models::Page;
use tafe_shop_storefront::services::{AuthError, OrderError};
use tafe_shop_storefront::storage::StorageError;

/// Errors that end a command with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// A storefront operation failed.
    #[error(transparent)]
    App(#[from] AppError),

    /// The storefront declined the action; the message is for the shopper.
    #[error("{0}")]
    Rejected(String),

    /// Writing output or the export file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A view could not be rendered.
    #[error("failed to render view: {0}")]
    Render(#[from] askama::Error),
}

impl CliError {
    /// Text printed to stderr before exiting.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::App(e) => e.user_message(),
            Self::Rejected(message) => message.clone(),
            Self::Io(_) | Self::Render(_) => self.to_string(),
        }
    }

    /// Log the failure; storefront faults are also captured to Sentry.
    pub fn report(&self) {
        match self {
            Self::App(e) => e.report(),
            Self::Rejected(message) => tracing::debug!(%message, "Command rejected"),
            Self::Io(_) | Self::Render(_) => tracing::error!(error = %self, "Command failed"),
        }
    }
}

impl From<AuthError> for CliError {
    fn from(err: AuthError) -> Self {
        Self::App(err.into())
    }
}

impl From<OrderError> for CliError {
    fn from(err: OrderError) -> Self {
        Self::App(err.into())
    }
}

impl From<StorageError> for CliError {
    fn from(err: StorageError) -> Self {
        Self::App(err.into())
    }
}

impl From<CatalogError> for CliError {
    fn from(err: CatalogError) -> Self {
        Self::App(err.into())
    }
}

/// Parse a page argument (`shopping.html` or `shopping`).
pub(crate) fn parse_page(name: &str) -> Result<Page, CliError> {
    name.parse::<Page>()
        .map_err(|e| CliError::App(AppError::BadRequest(e)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use secrecy::SecretString;
    use tafe_shop_storefront::catalog::Catalog;
    use tafe_shop_storefront::config::StorefrontConfig;
    use tafe_shop_storefront::state::AppState;
    use tafe_shop_storefront::storage::MemoryStore;

    pub const PRODUCTS: &str = r#"{"resources":[
        {"id":1,"name":"Workbook","price":19.99,"image":"wb.png","description":"Printed"},
        {"id":2,"name":"Toolkit","price":5.00,"image":"tk.png","description":"Tools"}
    ]}"#;

    pub const COURSES: &str = r#"{"courses":[
        {"id":10,"name":"Cert III","description":"Intro","price":300,"assessment":"Portfolio","projects":["A","B"],"image":"c3.png"}
    ]}"#;

    pub fn state() -> AppState {
        let config = StorefrontConfig::from_source(|_| None).unwrap();
        let catalog = Catalog::from_json(PRODUCTS, COURSES).unwrap();
        let state = AppState::new(
            config,
            catalog,
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
        );
        state.initialize().unwrap();
        state
    }

    pub fn logged_in_state(username: &str) -> AppState {
        let state = state();
        let password = SecretString::from("secret");
        state.auth().register(username, &password).unwrap();
        state.auth().login(username, &password).unwrap();
        state
    }

    pub fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }
}
