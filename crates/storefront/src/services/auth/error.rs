//! Authentication error types.

use thiserror::Error;

use tafe_shop_core::Username;

use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password missing after trimming.
    #[error("username and password are required")]
    Validation,

    /// The username is already registered.
    #[error("username already exists: {0}")]
    DuplicateUser(Username),

    /// Unknown user or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Reading or writing a store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
