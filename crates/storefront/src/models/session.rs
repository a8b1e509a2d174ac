//! Session-related types.

use serde::{Deserialize, Serialize};

use tafe_shop_core::Username;

/// Session-stored user identity.
///
/// Minimal data kept in the session store to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Name of the logged-in user.
    pub username: Username,
}
