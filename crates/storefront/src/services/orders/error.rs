//! Order error types.

use thiserror::Error;

use tafe_shop_core::OrderId;

use crate::services::auth::AuthError;
use crate::storage::StorageError;

/// Errors that can occur while creating or reading orders.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No user is logged in.
    #[error("user not logged in")]
    NotAuthenticated,

    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// The order was written but could not be read back; the history was
    /// restored to its previous contents.
    #[error("failed to verify order storage for {0}")]
    StorageVerification(OrderId),

    /// There is no order history to export.
    #[error("no orders to export")]
    NoOrders,

    /// The history could not be encoded.
    #[error("failed to encode order history: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Reading or writing a store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl OrderError {
    /// Message shown to the shopper.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "Please login to place order",
            Self::EmptyCart => "Your cart is empty",
            Self::StorageVerification(_) => "Failed to verify order storage",
            Self::NoOrders => "No orders to download",
            Self::Serialize(_) | Self::Storage(_) => "Something went wrong. Please try again.",
        }
    }
}

impl From<AuthError> for OrderError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Storage(e) => Self::Storage(e),
            _ => Self::NotAuthenticated,
        }
    }
}
