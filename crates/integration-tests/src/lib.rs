//! Integration tests for TAFE Shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tafe-shop-integration-tests
//! ```
//!
//! No network or database is needed: the catalog is built from fixture
//! documents and the stores are in memory or in a temporary directory.
//!
//! # Test Categories
//!
//! - `auth` - Registration, login, logout and the page guard
//! - `cart` - Cart properties
//! - `orders` - Checkout, history, export and clearing
//! - `storage` - File-backed stores shared between sessions
//! - `catalog` - Catalog construction and loading

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use secrecy::SecretString;

use tafe_shop_storefront::catalog::Catalog;
use tafe_shop_storefront::config::StorefrontConfig;
use tafe_shop_storefront::state::AppState;
use tafe_shop_storefront::storage::{KeyValueStore, MemoryStore, StorageError};

/// Products document used by every test.
pub const PRODUCTS_JSON: &str = r#"{"resources":[
    {"id":1,"name":"Workbook","price":19.99,"image":"img/workbook.png","description":"Printed workbook"},
    {"id":2,"name":"Toolkit","price":5.00,"image":"img/toolkit.png","description":"Starter toolkit"},
    {"id":3,"name":"Safety Glasses","price":12.5,"image":"img/glasses.png","description":"Clear lenses"}
]}"#;

/// Courses document used by every test. Course 3 collides with a product.
pub const COURSES_JSON: &str = r#"{"courses":[
    {"id":3,"name":"Colliding Course","description":"Same ID as a product","price":99,"assessment":"Exam","projects":[],"image":"img/c.png"},
    {"id":101,"name":"Certificate III in IT","description":"Foundations","price":450,"assessment":"Portfolio","projects":["Network lab","Web page"],"image":"img/cert3.png"}
]}"#;

/// The fixture catalog.
///
/// # Panics
///
/// Panics if the fixture documents are malformed.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn fixture_catalog() -> Catalog {
    Catalog::from_json(PRODUCTS_JSON, COURSES_JSON).unwrap()
}

/// Default configuration with no environment.
///
/// # Panics
///
/// Panics if the built-in defaults fail to parse.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig::from_source(|_| None).unwrap()
}

/// A session over the given stores, initialized like a page load.
///
/// # Panics
///
/// Panics if initialization fails.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn session_with(local: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> AppState {
    let state = AppState::new(test_config(), fixture_catalog(), local, session);
    state.initialize().unwrap();
    state
}

/// A fresh in-memory session.
#[must_use]
pub fn memory_session() -> AppState {
    session_with(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
}

/// Register (if needed) and log in.
///
/// # Panics
///
/// Panics if registration or login fails.
#[allow(clippy::unwrap_used)]
pub fn sign_in(state: &AppState, username: &str) {
    let password = SecretString::from(format!("{username}-pw"));
    if state.auth().find_user(username).unwrap().is_none() {
        state.auth().register(username, &password).unwrap();
    }
    state.auth().login(username, &password).unwrap();
}

// =============================================================================
// Fault Injection
// =============================================================================

/// A store that can be told to silently drop writes to one key.
///
/// Reads and all other keys pass through to an in-memory store.
#[derive(Debug)]
pub struct DroppingStore {
    inner: MemoryStore,
    key: &'static str,
    dropping: AtomicBool,
}

impl DroppingStore {
    #[must_use]
    pub fn new(key: &'static str) -> Self {
        Self {
            inner: MemoryStore::new(),
            key,
            dropping: AtomicBool::new(false),
        }
    }

    /// Start or stop dropping writes to the key.
    pub fn set_dropping(&self, dropping: bool) {
        self.dropping.store(dropping, Ordering::SeqCst);
    }

    fn drops(&self, key: &str) -> bool {
        key == self.key && self.dropping.load(Ordering::SeqCst)
    }
}

impl KeyValueStore for DroppingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.drops(key) {
            return Ok(());
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.drops(key) {
            return Ok(());
        }
        self.inner.remove(key)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.inner.clear()
    }
}

/// A store whose value for one key is replaced by a fixed payload on write.
///
/// Used to simulate a write that lands but does not contain the new record.
#[derive(Debug)]
pub struct OverwritingStore {
    inner: MemoryStore,
    key: &'static str,
    payload: &'static str,
    armed: AtomicBool,
}

impl OverwritingStore {
    #[must_use]
    pub fn new(key: &'static str, payload: &'static str) -> Self {
        Self {
            inner: MemoryStore::new(),
            key,
            payload,
            armed: AtomicBool::new(false),
        }
    }

    /// Replace the next write to the key with the payload.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

impl KeyValueStore for OverwritingStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == self.key && self.armed.swap(false, Ordering::SeqCst) {
            return self.inner.set(key, self.payload);
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.inner.clear()
    }
}
