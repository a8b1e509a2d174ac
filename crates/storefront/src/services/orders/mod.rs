//! Order service.
//!
//! Orders are appended to a single history shared by every user of the
//! browser profile. The history is handled as raw JSON records on the write
//! path so records this version cannot parse survive an append untouched;
//! queries parse each record on its own and skip the ones that fail.

mod error;

pub use error::OrderError;

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tracing::instrument;

use tafe_shop_core::OrderId;

use crate::models::{Order, Page};
use crate::services::auth::AuthManager;
use crate::services::cart::CartManager;
use crate::storage::{self, KeyValueStore, StorageError, keys};

/// Result of the "Place Order" action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOrderOutcome {
    /// The order was stored; navigate to `destination`.
    Placed { order: Order, destination: Page },
    /// Nothing was stored; show `message`.
    Failed { message: String },
}

/// A downloadable copy of the order history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderExport {
    /// Suggested file name, `orders_<RFC 3339 timestamp>.json`.
    pub file_name: String,
    /// Pretty-printed JSON array of every stored order.
    pub json: String,
}

/// Order manager.
///
/// Cheap to clone; clones share the ID sequence.
#[derive(Clone)]
pub struct OrderManager {
    local: Arc<dyn KeyValueStore>,
    auth: AuthManager,
    cart: CartManager,
    last_issued: Arc<AtomicI64>,
}

impl OrderManager {
    #[must_use]
    pub fn new(local: Arc<dyn KeyValueStore>, auth: AuthManager, cart: CartManager) -> Self {
        Self {
            local,
            auth,
            cart,
            last_issued: Arc::new(AtomicI64::new(0)),
        }
    }

    /// Create the empty history if none is stored yet.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Storage` if the store fails.
    pub fn initialize(&self) -> Result<(), OrderError> {
        storage::init_json(self.local.as_ref(), keys::ORDERS, &Vec::<Value>::new())?;
        Ok(())
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Turn the cart into an order for the logged-in user.
    ///
    /// The order is appended to the history and read back. If it cannot be
    /// found the previous history is restored and the cart is kept. On
    /// success the cart is cleared.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotAuthenticated` without a session user.
    /// Returns `OrderError::EmptyCart` if the cart has no lines.
    /// Returns `OrderError::StorageVerification` if the write did not stick.
    #[instrument(skip(self))]
    pub fn create_order(&self) -> Result<Order, OrderError> {
        let user = self.auth.current_user()?.ok_or(OrderError::NotAuthenticated)?;

        let items = self.cart.get_cart()?;
        if items.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let previous = self.local.get(keys::ORDERS)?;
        let mut history = parse_history(previous.as_deref());

        let now = Utc::now();
        let id = self.next_id(now.timestamp_millis(), &history);
        let order = Order::new(id, user.username, now, items);

        history.push(serde_json::to_value(&order)?);
        storage::write_json(self.local.as_ref(), keys::ORDERS, &history)?;

        if !self.history_contains(&order.id)? {
            tracing::error!(order_id = %order.id, "Order missing after write, restoring history");
            self.restore_history(previous.as_deref())?;
            return Err(OrderError::StorageVerification(order.id));
        }

        self.cart.clear_cart()?;
        tracing::info!(
            order_id = %order.id,
            user = %order.user_id,
            total = %order.total,
            "Order created"
        );
        Ok(order)
    }

    /// The "Place Order" action.
    ///
    /// Never fails; every error becomes a message for the shopper.
    #[instrument(skip(self))]
    pub fn place_order(&self) -> PlaceOrderOutcome {
        match self.try_place_order() {
            Ok(order) => PlaceOrderOutcome::Placed {
                order,
                destination: Page::OrderConfirmation,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Place order failed");
                PlaceOrderOutcome::Failed {
                    message: e.user_message().to_string(),
                }
            }
        }
    }

    fn try_place_order(&self) -> Result<Order, PlaceOrderError> {
        if self.auth.current_user().map_err(OrderError::from)?.is_none() {
            return Err(OrderError::NotAuthenticated.into());
        }
        if self.cart.get_cart().map_err(OrderError::from)?.is_empty() {
            return Err(OrderError::EmptyCart.into());
        }

        let order = self.create_order()?;
        if !self.history_contains(&order.id)? {
            return Err(PlaceOrderError::NotFoundAfterCreation);
        }
        Ok(order)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Orders placed by the logged-in user, oldest first.
    ///
    /// Empty when nobody is logged in.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Storage` if a store fails.
    pub fn user_orders(&self) -> Result<Vec<Order>, OrderError> {
        let Some(user) = self.auth.current_user()? else {
            return Ok(Vec::new());
        };

        Ok(self
            .orders()?
            .into_iter()
            .filter(|order| order.user_id == user.username)
            .collect())
    }

    /// The logged-in user's most recent order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Storage` if a store fails.
    pub fn latest_order(&self) -> Result<Option<Order>, OrderError> {
        Ok(self
            .user_orders()?
            .into_iter()
            .max_by_key(|order| order.date))
    }

    /// Every readable order in the history, for all users.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Storage` if the store fails.
    pub fn orders(&self) -> Result<Vec<Order>, OrderError> {
        let raw = self.local.get(keys::ORDERS)?;
        Ok(parse_history(raw.as_deref())
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Order>(record) {
                Ok(order) => Some(order),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable order record");
                    None
                }
            })
            .collect())
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Pretty-printed copy of the full history.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NoOrders` if the history is empty.
    pub fn export_orders(&self) -> Result<OrderExport, OrderError> {
        let raw = self.local.get(keys::ORDERS)?;
        let history = parse_history(raw.as_deref());
        if history.is_empty() {
            return Err(OrderError::NoOrders);
        }

        let json = serde_json::to_string_pretty(&history)?;
        let file_name = format!(
            "orders_{}.json",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
        );
        tracing::info!(count = history.len(), %file_name, "Order history exported");
        Ok(OrderExport { file_name, json })
    }

    /// Ask to wipe the cart and order history.
    ///
    /// Nothing changes until the returned prompt is confirmed.
    #[must_use]
    pub fn request_clear_shopping_data(&self) -> ClearShoppingDataPrompt {
        ClearShoppingDataPrompt {
            local: Arc::clone(&self.local),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Next order ID: not before `now_millis`, after every ID this manager
    /// issued, and after every ID already in the history.
    fn next_id(&self, now_millis: i64, history: &[Value]) -> OrderId {
        let stored_max = history
            .iter()
            .filter_map(|record| record.get("id")?.as_str())
            .filter_map(|id| OrderId::from(id.to_string()).millis())
            .max()
            .unwrap_or(0);
        let floor = now_millis.max(stored_max.saturating_add(1));

        let previous = self
            .last_issued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(floor.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        OrderId::from_millis(floor.max(previous.saturating_add(1)))
    }

    fn history_contains(&self, id: &OrderId) -> Result<bool, StorageError> {
        let raw = self.local.get(keys::ORDERS)?;
        Ok(parse_history(raw.as_deref())
            .iter()
            .any(|record| record.get("id").and_then(Value::as_str) == Some(id.as_str())))
    }

    fn restore_history(&self, previous: Option<&str>) -> Result<(), StorageError> {
        match previous {
            Some(raw) => self.local.set(keys::ORDERS, raw),
            None => self.local.remove(keys::ORDERS),
        }
    }
}

impl std::fmt::Debug for OrderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderManager")
            .field("last_issued", &self.last_issued.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Clear Shopping Data
// =============================================================================

/// Pending "Clear Shopping Data" request.
#[must_use = "shopping data is only cleared once the prompt is confirmed"]
pub struct ClearShoppingDataPrompt {
    local: Arc<dyn KeyValueStore>,
}

impl ClearShoppingDataPrompt {
    pub const TITLE: &'static str = "Clear Shopping Data";
    pub const MESSAGE: &'static str =
        "This will permanently clear your shopping cart and order history from your local storage.";

    /// Remove the cart and the order history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store fails.
    pub fn confirm(self) -> Result<(), StorageError> {
        self.local.remove(keys::CART)?;
        self.local.remove(keys::ORDERS)?;
        tracing::info!("Shopping data cleared");
        Ok(())
    }

    /// Dismiss the prompt without changing anything.
    pub fn cancel(self) {
        tracing::debug!("Clear shopping data cancelled");
    }
}

impl std::fmt::Debug for ClearShoppingDataPrompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClearShoppingDataPrompt").finish_non_exhaustive()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

#[derive(Debug, thiserror::Error)]
enum PlaceOrderError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("order not found after creation")]
    NotFoundAfterCreation,
}

impl From<StorageError> for PlaceOrderError {
    fn from(err: StorageError) -> Self {
        Self::Order(err.into())
    }
}

impl PlaceOrderError {
    const fn user_message(&self) -> &'static str {
        match self {
            Self::Order(e) => e.user_message(),
            Self::NotFoundAfterCreation => "Order not found after creation",
        }
    }
}

/// Parse the stored history; anything but a JSON array reads as empty.
fn parse_history(raw: Option<&str>) -> Vec<Value> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(raw) {
        Ok(history) => history,
        Err(e) => {
            tracing::warn!(error = %e, "Stored order history is not a JSON array, using empty");
            Vec::new()
        }
    }
}
