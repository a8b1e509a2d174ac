//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `TAFE_SHOP_CATALOG_URL` - Base URL of the static file server
//!   (default: `http://127.0.0.1:8080/week14441/`)
//! - `TAFE_SHOP_PRODUCTS_PATH` - Products document, relative to the base URL
//!   (default: `resources.json`)
//! - `TAFE_SHOP_COURSES_PATH` - Courses document, relative to the base URL
//!   (default: `courses.json`)
//! - `TAFE_SHOP_DATA_DIR` - Directory holding the persistent and session
//!   stores (default: `.tafe-shop`)
//! - `TAFE_SHOP_PROTECTED_PAGES` - Comma-separated pages that require login
//!   (default: `shopping.html,checkout.html`)
//! - `TAFE_SHOP_HTTP_TIMEOUT_SECS` - Catalog request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::models::Page;

const DEFAULT_CATALOG_URL: &str = "http://127.0.0.1:8080/week14441/";
const DEFAULT_PRODUCTS_PATH: &str = "resources.json";
const DEFAULT_COURSES_PATH: &str = "courses.json";
const DEFAULT_DATA_DIR: &str = ".tafe-shop";
const DEFAULT_PROTECTED_PAGES: &str = "shopping.html,checkout.html";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Where the catalog documents live
    pub catalog: CatalogConfig,
    /// Directory for the persistent and session store files
    pub data_dir: PathBuf,
    /// Pages the navigation guard protects
    pub protected_pages: Vec<Page>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Catalog document locations.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL; always ends with `/` so relative paths join beneath it
    pub base_url: Url,
    /// Products document path
    pub products_path: String,
    /// Courses document path
    pub courses_path: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set but cannot
    /// be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable cannot be parsed.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let base_url = parse_base_url(
            "TAFE_SHOP_CATALOG_URL",
            &env("TAFE_SHOP_CATALOG_URL", DEFAULT_CATALOG_URL),
        )?;
        let timeout_secs = env("TAFE_SHOP_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TAFE_SHOP_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        let protected_pages = parse_pages(
            "TAFE_SHOP_PROTECTED_PAGES",
            &env("TAFE_SHOP_PROTECTED_PAGES", DEFAULT_PROTECTED_PAGES),
        )?;

        Ok(Self {
            catalog: CatalogConfig {
                base_url,
                products_path: env("TAFE_SHOP_PRODUCTS_PATH", DEFAULT_PRODUCTS_PATH),
                courses_path: env("TAFE_SHOP_COURSES_PATH", DEFAULT_COURSES_PATH),
                timeout: Duration::from_secs(timeout_secs),
            },
            data_dir: PathBuf::from(env("TAFE_SHOP_DATA_DIR", DEFAULT_DATA_DIR)),
            protected_pages,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.trim().is_empty()),
        })
    }

    /// Persistent store file (users, cart, orders, redirect target).
    #[must_use]
    pub fn local_store_path(&self) -> PathBuf {
        self.data_dir.join("local.json")
    }

    /// Session store file (login flag and username).
    #[must_use]
    pub fn session_store_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the catalog base URL, making sure it ends with a slash.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Parse a comma-separated page list, ignoring blank entries.
fn parse_pages(key: &str, value: &str) -> Result<Vec<Page>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            name.parse::<Page>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .collect()
}
