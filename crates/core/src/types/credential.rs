//! Stored credential types.

use serde::{Deserialize, Serialize};

/// The password field of a stored user record.
///
/// New records hold an argon2 PHC string (`$argon2id$...`). Records written
/// by the browser storefront hold the password itself; those are
/// still readable so existing accounts keep working.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a stored password field.
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    /// Whether this is a PHC-formatted hash rather than a legacy plaintext value.
    #[must_use]
    pub fn is_phc(&self) -> bool {
        self.0.starts_with("$argon2")
    }

    /// The raw stored value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordDigest([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_phc() {
        assert!(PasswordDigest::new("$argon2id$v=19$m=19456,t=2,p=1$abc$def".into()).is_phc());
        assert!(!PasswordDigest::new("hunter2".into()).is_phc());
    }

    #[test]
    fn test_debug_redacts() {
        let digest = PasswordDigest::new("hunter2".into());
        assert!(!format!("{digest:?}").contains("hunter2"));
    }
}
