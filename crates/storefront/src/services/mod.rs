//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Accounts, session and the protected-page guard
//! - `cart` - The shopping cart
//! - `orders` - Checkout, order history, export and data clearing
//!
//! Managers never render anything; they return values and errors that the
//! view layer turns into pages and messages.

pub mod auth;
pub mod cart;
pub mod orders;

pub use auth::{AuthError, AuthGate, AuthManager};
pub use cart::{CartManager, parse_quantity_input};
pub use orders::{ClearShoppingDataPrompt, OrderError, OrderExport, OrderManager, PlaceOrderOutcome};
