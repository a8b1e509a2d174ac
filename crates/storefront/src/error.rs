//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type over every service error. Front ends
//! show [`AppError::user_message`] to the shopper and call
//! [`AppError::report`] so unexpected failures reach Sentry.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order operation failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Catalog document could not be fetched.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// A store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The input did not name a known page, item or quantity.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Text shown to the shopper. Internal details are never exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(err) => match err {
                AuthError::Validation => "Please enter both username and password".to_string(),
                AuthError::DuplicateUser(_) => "Username already exists".to_string(),
                AuthError::InvalidCredentials => "Invalid username or password".to_string(),
                AuthError::PasswordHash | AuthError::Storage(_) => {
                    "Something went wrong. Please try again.".to_string()
                }
            },
            Self::Order(err) => err.user_message().to_string(),
            Self::Catalog(_) => "Error loading catalog. Please try again later.".to_string(),
            Self::Storage(_) => "Something went wrong. Please try again.".to_string(),
            Self::Config(err) => err.to_string(),
            Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Whether this error points at a fault rather than a shopper mistake.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Storage(_)
                | Self::Catalog(_)
                | Self::Auth(AuthError::PasswordHash | AuthError::Storage(_))
                | Self::Order(
                    OrderError::Storage(_)
                        | OrderError::Serialize(_)
                        | OrderError::StorageVerification(_)
                )
        )
    }

    /// Log the error and capture internal faults to Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "Storefront request rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after a successful login to associate errors with the shopper.
pub fn set_sentry_user(username: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the shopper.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
