//! HTML fragments for the storefront pages.
//!
//! Every view is an askama template over pre-formatted strings, so money is
//! always shown as `$x.xx` and all catalog text is HTML-escaped.

use askama::Template;

use tafe_shop_core::Price;

use crate::catalog::{Catalog, Course, ListStatus, Product};
use crate::models::{CartLineItem, CartSummary, CurrentUser, Order, Page};
use crate::services::ClearShoppingDataPrompt;

// =============================================================================
// Catalog
// =============================================================================

/// A product card.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub price: String,
    pub description: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            image: product.image.clone(),
            price: Price::new(product.price).display(),
            description: product.description.clone(),
        }
    }
}

/// Product grid.
#[derive(Debug, Template)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub products: Vec<ProductCardView>,
    pub unavailable: Option<String>,
}

impl ProductGridTemplate {
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            products: catalog.products().iter().map(ProductCardView::from).collect(),
            unavailable: unavailable_message("products", catalog.products_status()),
        }
    }
}

/// A course entry.
#[derive(Debug, Clone)]
pub struct CourseView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: String,
    pub assessment: String,
    pub projects: String,
    pub image: String,
}

impl From<&Course> for CourseView {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.as_i64(),
            name: course.name.clone(),
            description: course.description.clone(),
            price: Price::new(course.price).display(),
            assessment: course.assessment.clone(),
            projects: course.projects.join(", "),
            image: course.image.clone(),
        }
    }
}

/// Course list. The add-to-cart button only appears on the shopping page.
#[derive(Debug, Template)]
#[template(path = "partials/course_list.html")]
pub struct CourseListTemplate {
    pub courses: Vec<CourseView>,
    pub show_add_to_cart: bool,
    pub unavailable: Option<String>,
}

impl CourseListTemplate {
    #[must_use]
    pub fn for_page(catalog: &Catalog, page: Page) -> Self {
        Self {
            courses: catalog.courses().iter().map(CourseView::from).collect(),
            show_add_to_cart: page == Page::Shopping,
            unavailable: unavailable_message("courses", catalog.courses_status()),
        }
    }
}

fn unavailable_message(list: &str, status: &ListStatus) -> Option<String> {
    match status {
        ListStatus::Loaded => None,
        ListStatus::Unavailable(_) => Some(format!(
            "Sorry, {list} are unavailable right now. Please try again later."
        )),
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A cart line.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image: String,
    pub alt: String,
    pub price: String,
    pub quantity: u32,
    pub decrement_to: i64,
    pub increment_to: i64,
    pub subtotal: String,
}

impl From<&CartLineItem> for CartItemView {
    fn from(line: &CartLineItem) -> Self {
        let quantity = i64::from(line.quantity);
        Self {
            id: line.id.as_i64(),
            name: line.name.clone(),
            description: line.description.clone(),
            image: line.image.clone(),
            alt: line.alt.clone(),
            price: Price::new(line.price).display(),
            quantity: line.quantity,
            decrement_to: quantity - 1,
            increment_to: quantity + 1,
            subtotal: line.line_total().display(),
        }
    }
}

/// Cart items, or the empty state with a link back to shopping.
#[derive(Debug, Template)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub items: Vec<CartItemView>,
    pub continue_shopping: &'static str,
}

impl CartItemsTemplate {
    #[must_use]
    pub fn new(cart: &[CartLineItem]) -> Self {
        Self {
            items: cart.iter().map(CartItemView::from).collect(),
            continue_shopping: Page::Home.file_name(),
        }
    }

    /// Checkout is only offered for a non-empty cart.
    #[must_use]
    pub fn checkout_enabled(&self) -> bool {
        !self.items.is_empty()
    }
}

/// Order summary beside the cart.
#[derive(Debug, Template)]
#[template(path = "partials/order_summary.html")]
pub struct OrderSummaryTemplate {
    pub line_count: usize,
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

impl From<&CartSummary> for OrderSummaryTemplate {
    fn from(summary: &CartSummary) -> Self {
        Self {
            line_count: summary.line_count,
            subtotal: summary.subtotal.display(),
            shipping: summary.shipping.display(),
            tax: summary.tax.display(),
            total: summary.total.display(),
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub date: String,
    pub items: Vec<OrderItemView>,
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let totals = order.totals();
        Self {
            id: order.id.to_string(),
            date: order.date.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    price: Price::new(item.price).display(),
                })
                .collect(),
            subtotal: totals.subtotal.display(),
            shipping: totals.shipping.display(),
            tax: totals.tax.display(),
            total: totals.total.display(),
        }
    }
}

/// Order confirmation for the shopper's latest order.
#[derive(Debug, Template)]
#[template(path = "partials/order_confirmation.html")]
pub struct OrderConfirmationTemplate {
    pub order: Option<OrderView>,
}

impl OrderConfirmationTemplate {
    #[must_use]
    pub fn new(order: Option<&Order>) -> Self {
        Self {
            order: order.map(OrderView::from),
        }
    }
}

// =============================================================================
// Chrome
// =============================================================================

/// Login/logout link with the welcome message.
#[derive(Debug, Template)]
#[template(path = "partials/auth_link.html")]
pub struct AuthLinkTemplate {
    pub username: Option<String>,
    pub login_page: &'static str,
}

impl AuthLinkTemplate {
    #[must_use]
    pub fn new(user: Option<&CurrentUser>) -> Self {
        Self {
            username: user.map(|u| u.username.to_string()),
            login_page: Page::LOGIN.file_name(),
        }
    }
}

/// Confirmation dialog for clearing the cart and order history.
#[derive(Debug, Template)]
#[template(path = "partials/clear_data_prompt.html")]
pub struct ClearDataPromptTemplate {
    pub title: &'static str,
    pub message: &'static str,
}

impl Default for ClearDataPromptTemplate {
    fn default() -> Self {
        Self {
            title: ClearShoppingDataPrompt::TITLE,
            message: ClearShoppingDataPrompt::MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Transient toast message.
#[derive(Debug, Template)]
#[template(path = "partials/notification.html")]
pub struct NotificationTemplate {
    pub message: String,
    pub kind: NotificationKind,
}

impl NotificationTemplate {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Success,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Error,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use tafe_shop_core::{CatalogItemId, OrderId, Username};

    use super::*;
    use crate::catalog::CatalogError;

    fn catalog() -> Catalog {
        Catalog::from_json(
            r#"{"resources":[{"id":1,"name":"Workbook <b>","price":19.9,"image":"wb.png","description":"Printed"}]}"#,
            r#"{"courses":[{"id":10,"name":"Cert III","description":"Intro","price":300,"assessment":"Portfolio","projects":["A","B"],"image":"c3.png"}]}"#,
        )
        .unwrap()
    }

    fn line() -> CartLineItem {
        CartLineItem {
            id: CatalogItemId::new(1),
            name: "Workbook".to_string(),
            price: Decimal::new(1999, 2),
            image: "wb.png".to_string(),
            alt: "Workbook".to_string(),
            description: "Printed".to_string(),
            quantity: 2,
        }
    }

    #[test]
    fn test_product_grid_formats_and_escapes() {
        let html = ProductGridTemplate::from_catalog(&catalog()).render().unwrap();
        assert!(html.contains("$19.90"));
        assert!(html.contains("Workbook &lt;b&gt;"));
        assert!(html.contains(r#"data-item-id="1""#));
    }

    #[test]
    fn test_course_button_only_on_shopping_page() {
        let catalog = catalog();
        let shopping = CourseListTemplate::for_page(&catalog, Page::Shopping).render().unwrap();
        let courses = CourseListTemplate::for_page(&catalog, Page::Courses).render().unwrap();
        assert!(shopping.contains("add-to-cart-btn"));
        assert!(!courses.contains("add-to-cart-btn"));
        assert!(courses.contains("A, B"));
        assert!(courses.contains("$300.00"));
    }

    #[test]
    fn test_unavailable_list_message() {
        let catalog = Catalog::from_results(
            Err(CatalogError::Status {
                url: "http://x/resources.json".to_string(),
                status: 404,
            }),
            Ok(Vec::new()),
        );
        let html = ProductGridTemplate::from_catalog(&catalog).render().unwrap();
        assert!(html.contains("products are unavailable"));
        assert!(!html.contains("Loading"));
    }

    #[test]
    fn test_empty_cart_offers_continue_shopping() {
        let template = CartItemsTemplate::new(&[]);
        assert!(!template.checkout_enabled());
        let html = template.render().unwrap();
        assert!(html.contains("Your cart is empty"));
        assert!(html.contains("Continue Shopping"));
        assert!(html.contains("home.html"));
    }

    #[test]
    fn test_cart_items_show_line_subtotal() {
        let template = CartItemsTemplate::new(&[line()]);
        assert!(template.checkout_enabled());
        let html = template.render().unwrap();
        assert!(html.contains("$19.99"));
        assert!(html.contains("Subtotal: $39.98"));
    }

    #[test]
    fn test_order_summary() {
        let summary = CartSummary::of(&[line()]);
        let html = OrderSummaryTemplate::from(&summary).render().unwrap();
        assert!(html.contains("Subtotal (1 items)"));
        assert!(html.contains("$39.98"));
        assert!(html.contains("$10.00"));
        assert!(html.contains("$4.00"));
        assert!(html.contains("$53.98"));
    }

    #[test]
    fn test_order_confirmation() {
        let order = Order::new(
            OrderId::from_millis(42),
            Username::parse("alice").unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            vec![line()],
        );
        let html = OrderConfirmationTemplate::new(Some(&order)).render().unwrap();
        assert!(html.contains("order_42"));
        assert!(html.contains("2024-05-01 12:00:00 UTC"));
        assert!(html.contains("$53.98"));

        let empty = OrderConfirmationTemplate::new(None).render().unwrap();
        assert!(empty.contains("No orders found"));
    }

    #[test]
    fn test_auth_link() {
        let user = CurrentUser {
            username: Username::parse("alice").unwrap(),
        };
        let html = AuthLinkTemplate::new(Some(&user)).render().unwrap();
        assert!(html.contains("Logout"));
        assert!(html.contains("Welcome, alice"));

        let html = AuthLinkTemplate::new(None).render().unwrap();
        assert!(html.contains("Login"));
        assert!(!html.contains("Welcome"));
    }

    #[test]
    fn test_clear_prompt_and_notification() {
        let html = ClearDataPromptTemplate::default().render().unwrap();
        assert!(html.contains("Confirm Clear"));
        assert!(html.contains("Cancel"));

        let html = NotificationTemplate::error("Your cart is empty").render().unwrap();
        assert!(html.contains("notification error"));
    }
}
