//! Cart commands.
//!
//! # Usage
//!
//! ```bash
//! tafe-shop cart add 1
//! tafe-shop cart update 1 3
//! tafe-shop cart remove 1
//! tafe-shop cart show --html
//! tafe-shop cart clear
//! ```

use std::io::Write;

use askama::Template;

use tafe_shop_core::{CatalogItemId, Price};
use tafe_shop_storefront::error::AppError;
use tafe_shop_storefront::services::parse_quantity_input;
use tafe_shop_storefront::state::AppState;
use tafe_shop_storefront::views::{CartItemsTemplate, NotificationTemplate, OrderSummaryTemplate};

use super::CliError;

/// Print the cart and its order summary.
///
/// # Errors
///
/// Returns `CliError` if the store fails or a view cannot be rendered.
pub fn show(state: &AppState, html: bool, out: &mut impl Write) -> Result<(), CliError> {
    let cart = state.cart().get_cart()?;
    let summary = state.cart().summary()?;

    if html {
        writeln!(out, "{}", CartItemsTemplate::new(&cart).render()?)?;
        writeln!(out, "{}", OrderSummaryTemplate::from(&summary).render()?)?;
        return Ok(());
    }

    if cart.is_empty() {
        writeln!(out, "Your cart is empty")?;
        return Ok(());
    }

    for line in &cart {
        writeln!(
            out,
            "[{}] {}  {} x {} = {}",
            line.id,
            line.name,
            line.quantity,
            Price::new(line.price).display(),
            line.line_total().display()
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Subtotal ({} items): {}",
        summary.line_count,
        summary.subtotal.display()
    )?;
    writeln!(out, "Shipping: {}", summary.shipping.display())?;
    writeln!(out, "Tax: {}", summary.tax.display())?;
    writeln!(out, "Total: {}", summary.total.display())?;
    Ok(())
}

/// Add one unit of a product or course.
///
/// # Errors
///
/// Returns `CliError::App` if the ID is not in the catalog.
pub fn add(
    state: &AppState,
    item_id: CatalogItemId,
    html: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    if state.cart().add_to_cart(item_id)?.is_none() {
        return Err(AppError::BadRequest(format!("Item {item_id} is not in the catalog")).into());
    }

    let message = "Item added to cart successfully";
    if html {
        writeln!(out, "{}", NotificationTemplate::success(message).render()?)?;
    } else {
        writeln!(out, "{message}")?;
    }
    Ok(())
}

/// Set a line's quantity from the text typed at the quantity prompt.
///
/// Input that is not a whole number leaves the cart unchanged.
///
/// # Errors
///
/// Returns `CliError` if the store fails.
pub fn update(
    state: &AppState,
    item_id: CatalogItemId,
    quantity: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let Some(quantity) = parse_quantity_input(quantity) else {
        writeln!(out, "Quantity unchanged")?;
        return Ok(());
    };

    state.cart().update_cart_item(item_id, quantity)?;
    writeln!(out, "Cart updated ({} items)", state.cart().get_cart_item_count()?)?;
    Ok(())
}

/// Remove a line.
///
/// # Errors
///
/// Returns `CliError` if the store fails.
pub fn remove(state: &AppState, item_id: CatalogItemId, out: &mut impl Write) -> Result<(), CliError> {
    state.cart().remove_cart_item(item_id)?;
    writeln!(out, "Cart updated ({} items)", state.cart().get_cart_item_count()?)?;
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns `CliError` if the store fails.
pub fn clear(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    state.cart().clear_cart()?;
    writeln!(out, "Cart cleared")?;
    Ok(())
}
