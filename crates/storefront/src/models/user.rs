//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tafe_shop_core::{PasswordDigest, Username};

/// A registered user (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique account name.
    pub username: Username,
    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}

/// A user record as stored in the users map (`username -> StoredUser`).
///
/// Field names match the browser storefront's records so existing data keeps
/// loading. `created_at` is kept as the raw stored string for the same reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    /// Argon2 PHC hash, or plaintext for legacy records.
    pub password: PasswordDigest,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl StoredUser {
    /// Convert to the domain type.
    ///
    /// An unparsable timestamp maps to the Unix epoch rather than failing.
    #[must_use]
    pub fn to_user(&self, username: Username) -> User {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_default();
        User {
            username,
            created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_record_parses() {
        let stored: StoredUser = serde_json::from_str(
            r#"{"password":"pw","createdAt":"2024-03-01T10:00:00.000Z"}"#,
        )
        .unwrap();
        assert!(!stored.password.is_phc());

        let user = stored.to_user(Username::parse("alice").unwrap());
        assert_eq!(user.created_at.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_bad_timestamp_is_epoch() {
        let stored = StoredUser {
            password: PasswordDigest::new("pw".into()),
            created_at: "yesterday".into(),
        };
        let user = stored.to_user(Username::parse("bob").unwrap());
        assert_eq!(user.created_at.timestamp(), 0);
    }
}
