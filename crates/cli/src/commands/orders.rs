//! Checkout, order history and data clearing.
//!
//! # Usage
//!
//! ```bash
//! # Place an order from the current cart
//! tafe-shop checkout
//!
//! # Show the confirmation for the latest order
//! tafe-shop orders latest
//!
//! # Download the full history as orders_<timestamp>.json
//! tafe-shop orders export --output ./downloads
//!
//! # Wipe cart and order history (asks for confirmation)
//! tafe-shop clear-data
//! ```

use std::io::{BufRead, Write};
use std::path::Path;

use askama::Template;

use tafe_shop_storefront::models::{Order, Page};
use tafe_shop_storefront::services::{AuthGate, ClearShoppingDataPrompt, PlaceOrderOutcome};
use tafe_shop_storefront::state::AppState;
use tafe_shop_storefront::views::{OrderConfirmationTemplate, OrderView};

use super::CliError;

/// Place an order from the cart, as the checkout page's button does.
///
/// # Errors
///
/// Returns `CliError::Rejected` with the shopper-facing message if the
/// order could not be placed.
pub fn checkout(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    if let AuthGate::RedirectToLogin { destination } = state
        .auth()
        .require_auth(Page::Checkout, &state.config().protected_pages)?
    {
        return Err(CliError::Rejected(format!(
            "Login required, redirecting to {destination}"
        )));
    }

    match state.orders().place_order() {
        PlaceOrderOutcome::Placed { order, destination } => {
            writeln!(out, "Order {} placed. Redirecting to {destination}", order.id)?;
            writeln!(out)?;
            write_order(out, &order)?;
            Ok(())
        }
        PlaceOrderOutcome::Failed { message } => Err(CliError::Rejected(message)),
    }
}

/// List the logged-in user's orders, oldest first.
///
/// # Errors
///
/// Returns `CliError` if a store fails.
pub fn list(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    let orders = state.orders().user_orders()?;
    if orders.is_empty() {
        writeln!(out, "No orders found!")?;
        return Ok(());
    }

    for order in &orders {
        let view = OrderView::from(order);
        writeln!(
            out,
            "{}  {}  {} units  {}  {}",
            view.id,
            view.date,
            order.unit_count(),
            view.total,
            order.status
        )?;
    }
    Ok(())
}

/// Show the confirmation for the logged-in user's latest order.
///
/// # Errors
///
/// Returns `CliError` if a store fails or the view cannot be rendered.
pub fn latest(state: &AppState, html: bool, out: &mut impl Write) -> Result<(), CliError> {
    let order = state.orders().latest_order()?;

    if html {
        writeln!(out, "{}", OrderConfirmationTemplate::new(order.as_ref()).render()?)?;
        return Ok(());
    }

    match order {
        Some(order) => write_order(out, &order)?,
        None => writeln!(out, "No orders found!")?,
    }
    Ok(())
}

/// Write the full history to `dir` under the suggested file name.
///
/// # Errors
///
/// Returns `CliError::App` if there are no orders, or `CliError::Io` if the
/// file cannot be written.
pub fn export(state: &AppState, dir: &Path, out: &mut impl Write) -> Result<(), CliError> {
    let export = state.orders().export_orders()?;
    let path = dir.join(&export.file_name);
    std::fs::write(&path, export.json)?;
    writeln!(out, "Orders downloaded successfully: {}", path.display())?;
    Ok(())
}

/// Clear the cart and order history after confirmation.
///
/// With `yes` the prompt is confirmed without asking; otherwise the prompt
/// is shown and a line is read from `input`.
///
/// # Errors
///
/// Returns `CliError` if reading the answer or a store fails.
pub fn clear_data(
    state: &AppState,
    yes: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let prompt = state.orders().request_clear_shopping_data();

    if !yes {
        writeln!(out, "{}", ClearShoppingDataPrompt::TITLE)?;
        writeln!(out, "{}", ClearShoppingDataPrompt::MESSAGE)?;
        write!(out, "Type 'yes' to confirm: ")?;
        out.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("yes") {
            prompt.cancel();
            writeln!(out, "Cancelled")?;
            return Ok(());
        }
    }

    prompt.confirm()?;
    writeln!(out, "Shopping data cleared successfully")?;
    Ok(())
}

fn write_order(out: &mut impl Write, order: &Order) -> Result<(), CliError> {
    let view = OrderView::from(order);
    writeln!(out, "Order ID: {}", view.id)?;
    writeln!(out, "Date: {}", view.date)?;
    writeln!(out, "Items:")?;
    for item in &view.items {
        writeln!(out, "  - {} - {} x {}", item.name, item.quantity, item.price)?;
    }
    writeln!(out, "Subtotal: {}", view.subtotal)?;
    writeln!(out, "Shipping: {}", view.shipping)?;
    writeln!(out, "Tax: {}", view.tax)?;
    writeln!(out, "Total: {}", view.total)?;
    Ok(())
}
