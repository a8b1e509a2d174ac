//! Domain models for the storefront.
//!
//! These are the shapes written to and read from the key-value stores, plus
//! the navigation targets the managers hand back to the view layer.

pub mod cart;
pub mod order;
pub mod page;
pub mod session;
pub mod user;

pub use cart::{CartLineItem, CartSummary};
pub use order::{Order, OrderTotals};
pub use page::Page;
pub use session::CurrentUser;
pub use user::{StoredUser, User};
