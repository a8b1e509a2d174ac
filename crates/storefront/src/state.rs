//! Application state shared across one storefront session.

use std::sync::Arc;

use crate::catalog::{Catalog, CatalogError, CatalogLoader};
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::services::{AuthManager, CartManager, OrderManager};
use crate::storage::{FileStore, KeyValueStore, keys};

/// Application state for one session.
///
/// This struct is cheaply cloneable via `Arc` and owns the configuration,
/// the loaded catalog, both stores and the managers built on top of them.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<Catalog>,
    local: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
    auth: AuthManager,
    cart: CartManager,
    orders: OrderManager,
}

impl AppState {
    /// Create a new application state over the given stores.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `catalog` - Catalog loaded for this session
    /// * `local` - Persistent store
    /// * `session` - Session store
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        catalog: Catalog,
        local: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let auth = AuthManager::new(Arc::clone(&local), Arc::clone(&session));
        let cart = CartManager::new(Arc::clone(&local), Arc::clone(&catalog));
        let orders = OrderManager::new(Arc::clone(&local), auth.clone(), cart.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                local,
                session,
                auth,
                cart,
                orders,
            }),
        }
    }

    /// Open the file-backed stores under the configured data directory and
    /// fetch the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Url` if the catalog locations are invalid.
    /// Fetch failures do not fail; they leave the affected list unavailable.
    pub async fn open(config: StorefrontConfig) -> Result<Self, CatalogError> {
        let loader = CatalogLoader::new(&config.catalog)?;
        let catalog = loader.load().await;
        Ok(Self::with_file_stores(config, catalog))
    }

    /// Open the file-backed stores with an already loaded catalog.
    #[must_use]
    pub fn with_file_stores(config: StorefrontConfig, catalog: Catalog) -> Self {
        let local: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.local_store_path()));
        let session: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::new(config.session_store_path()));
        Self::new(config, catalog, local, session)
    }

    /// Start-up sequence run on every page load.
    ///
    /// Drops the legacy `currentOrder` key and creates the users map, cart
    /// and order history if they are missing.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if a store fails.
    pub fn initialize(&self) -> Result<(), AppError> {
        self.inner.local.remove(keys::CURRENT_ORDER)?;
        self.inner.auth.initialize()?;
        self.inner.cart.initialize()?;
        self.inner.orders.initialize()?;
        tracing::debug!("Storefront state initialized");
        Ok(())
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the session catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    #[must_use]
    pub fn auth(&self) -> &AuthManager {
        &self.inner.auth
    }

    #[must_use]
    pub fn cart(&self) -> &CartManager {
        &self.inner.cart
    }

    #[must_use]
    pub fn orders(&self) -> &OrderManager {
        &self.inner.orders
    }

    /// The persistent store.
    #[must_use]
    pub fn local_store(&self) -> &dyn KeyValueStore {
        self.inner.local.as_ref()
    }

    /// The session store.
    #[must_use]
    pub fn session_store(&self) -> &dyn KeyValueStore {
        self.inner.session.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("products", &self.inner.catalog.products().len())
            .field("courses", &self.inner.catalog.courses().len())
            .finish_non_exhaustive()
    }
}
