//! Key-value storage adapters.
//!
//! The storefront keeps all of its state in two string-keyed stores:
//!
//! - a **persistent** store (users, cart, order history, redirect target)
//! - a **session** store (the logged-in flag and username)
//!
//! Values are JSON text and every entry is read and written wholesale; there
//! are no partial updates. Managers receive stores as `Arc<dyn KeyValueStore>`
//! so tests can swap in [`MemoryStore`] and the CLI can use [`FileStore`].
//!
//! # Leniency
//!
//! [`read_json_or_default`] treats an absent *or unparsable* value as the
//! type's default. Parse failures are logged at `warn` and never surfaced.
//! I/O failures of the store itself are still returned as [`StorageError`].

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors returned by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a JSON object of strings.
    #[error("storage file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },

    /// A value could not be encoded as JSON.
    #[error("failed to encode value for key {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
}

/// A string-keyed store of JSON text values.
///
/// Mirrors the browser storage contract: `get` of a missing key is `None`,
/// `remove` of a missing key is a no-op, `clear` empties the whole scope.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key` if present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Delete every key in this store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backing medium cannot be written.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Storage keys shared by the managers.
pub mod keys {
    /// Persistent: map of username to stored user record.
    pub const USERS: &str = "tafe_users";

    /// Persistent: array of cart line items.
    pub const CART: &str = "tafe_cart";

    /// Persistent: array of placed orders (all users).
    pub const ORDERS: &str = "tafe_orders";

    /// Persistent: page to return to after logging in.
    pub const REDIRECT_AFTER_LOGIN: &str = "redirectAfterLogin";

    /// Persistent: legacy scratch key, removed on start-up and logout.
    pub const CURRENT_ORDER: &str = "currentOrder";

    /// Session: `"true"` while a user is logged in.
    pub const LOGGED_IN: &str = "logged_in";

    /// Session: name of the logged-in user.
    pub const USERNAME: &str = "username";
}

/// Read a JSON value, falling back to `T::default()` when absent or unparsable.
///
/// # Errors
///
/// Returns `StorageError` only if the store itself fails.
pub fn read_json_or_default<T>(store: &dyn KeyValueStore, key: &str) -> Result<T, StorageError>
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = store.get(key)? else {
        return Ok(T::default());
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Stored value is not valid JSON, using default");
            Ok(T::default())
        }
    }
}

/// Serialize `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns `StorageError::Serialize` if encoding fails, or the store's error.
pub fn write_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

/// Store `value` under `key` only if the key is absent.
///
/// # Errors
///
/// Returns `StorageError` if the store fails.
pub fn init_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
{
    if store.get(key)?.is_none() {
        write_json(store, key, value)?;
    }
    Ok(())
}
