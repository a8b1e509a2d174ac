//! Catalog listing.
//!
//! # Usage
//!
//! ```bash
//! # Products and courses with add-to-cart IDs (requires login)
//! tafe-shop catalog
//!
//! # Courses only, as the courses page renders them
//! tafe-shop catalog --page courses.html --html
//! ```

use std::io::Write;

use askama::Template;

use tafe_shop_core::Price;
use tafe_shop_storefront::catalog::ListStatus;
use tafe_shop_storefront::error::AppError;
use tafe_shop_storefront::models::Page;
use tafe_shop_storefront::services::AuthGate;
use tafe_shop_storefront::state::AppState;
use tafe_shop_storefront::views::{CourseListTemplate, ProductGridTemplate};

use super::{CliError, parse_page};

/// List the catalog as the given page shows it.
///
/// The shopping page lists products and courses; the courses page lists
/// courses only. The page guard runs first.
///
/// # Errors
///
/// Returns `CliError::App` if the page does not list the catalog.
pub fn show(state: &AppState, page: &str, html: bool, out: &mut impl Write) -> Result<(), CliError> {
    let page = parse_page(page)?;
    if !matches!(page, Page::Shopping | Page::Courses) {
        return Err(AppError::BadRequest(format!("{page} does not list the catalog")).into());
    }

    if let AuthGate::RedirectToLogin { destination } = state
        .auth()
        .require_auth(page, &state.config().protected_pages)?
    {
        writeln!(out, "Login required, redirecting to {destination}")?;
        return Ok(());
    }

    let catalog = state.catalog();
    let show_products = page == Page::Shopping;

    if html {
        if show_products {
            writeln!(out, "{}", ProductGridTemplate::from_catalog(catalog).render()?)?;
        }
        writeln!(out, "{}", CourseListTemplate::for_page(catalog, page).render()?)?;
        return Ok(());
    }

    if show_products {
        writeln!(out, "Products")?;
        if write_unavailable(out, "Products", catalog.products_status())? {
            for product in catalog.products() {
                writeln!(
                    out,
                    "  [{}] {} - {}",
                    product.id,
                    product.name,
                    Price::new(product.price).display()
                )?;
                writeln!(out, "      {}", product.description)?;
            }
        }
    }

    writeln!(out, "Courses")?;
    if write_unavailable(out, "Courses", catalog.courses_status())? {
        for course in catalog.courses() {
            writeln!(
                out,
                "  [{}] {} - {}",
                course.id,
                course.name,
                Price::new(course.price).display()
            )?;
            writeln!(out, "      {}", course.description)?;
            writeln!(
                out,
                "      Assessment: {}; Projects: {}",
                course.assessment,
                course.projects.join(", ")
            )?;
        }
    }
    Ok(())
}

/// Returns `true` when the list loaded and should be printed.
fn write_unavailable(
    out: &mut impl Write,
    list: &str,
    status: &ListStatus,
) -> Result<bool, CliError> {
    if status.is_loaded() {
        return Ok(true);
    }
    writeln!(out, "  {list} are unavailable right now. Please try again later.")?;
    Ok(false)
}
