//! Read-only product and course catalogs.
//!
//! # Architecture
//!
//! - Two static JSON documents are fetched once per session by
//!   [`CatalogLoader`] and kept in memory as a [`Catalog`]
//! - The catalog is owned by [`crate::state::AppState`]; nothing mutates it
//!   after load
//! - Products and courses share one ID namespace. A course whose ID is already
//!   used by a product is dropped at construction time and reported through
//!   [`Catalog::collisions`], so [`Catalog::find`] is never ambiguous
//!
//! # Example
//!
//! ```rust,ignore
//! use tafe_shop_storefront::catalog::CatalogLoader;
//!
//! let loader = CatalogLoader::new(&config.catalog)?;
//! let catalog = loader.load().await;
//!
//! if let Some(entry) = catalog.find(CatalogItemId::new(3)) {
//!     println!("{} costs {}", entry.name(), entry.price().display());
//! }
//! ```

mod loader;
pub mod types;

pub use loader::CatalogLoader;
pub use types::{CatalogEntry, Course, CoursesDocument, Product, ProductsDocument};

use std::collections::HashSet;

use thiserror::Error;

use tafe_shop_core::CatalogItemId;

/// Errors that can occur while fetching a catalog document.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body was not the expected JSON envelope.
    #[error("failed to parse {document}: {source}")]
    Parse {
        document: &'static str,
        source: serde_json::Error,
    },

    /// The configured base URL or path could not be joined.
    #[error("invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Load state of one catalog list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListStatus {
    /// The list was fetched (it may still be empty).
    #[default]
    Loaded,
    /// Fetching failed; the list is empty and the view should say so.
    Unavailable(String),
}

impl ListStatus {
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }
}

/// In-memory catalog for one session.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    courses: Vec<Course>,
    products_status: ListStatus,
    courses_status: ListStatus,
    collisions: Vec<CatalogItemId>,
}

impl Catalog {
    /// Build a catalog, enforcing the shared ID namespace.
    ///
    /// Courses whose ID matches a product are dropped and recorded as
    /// collisions.
    #[must_use]
    pub fn new(products: Vec<Product>, courses: Vec<Course>) -> Self {
        let product_ids: HashSet<CatalogItemId> = products.iter().map(|p| p.id).collect();

        let mut collisions = Vec::new();
        let courses = courses
            .into_iter()
            .filter(|course| {
                if product_ids.contains(&course.id) {
                    tracing::warn!(
                        id = %course.id,
                        course = %course.name,
                        "Course ID collides with a product, dropping course"
                    );
                    collisions.push(course.id);
                    false
                } else {
                    true
                }
            })
            .collect();

        Self {
            products,
            courses,
            products_status: ListStatus::Loaded,
            courses_status: ListStatus::Loaded,
            collisions,
        }
    }

    /// A catalog with nothing in it.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from the two JSON documents.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` if either document is malformed.
    pub fn from_json(products_json: &str, courses_json: &str) -> Result<Self, CatalogError> {
        let products = parse_products(products_json)?;
        let courses = parse_courses(courses_json)?;
        Ok(Self::new(products, courses))
    }

    /// Build a catalog from independent fetch results.
    ///
    /// A failed list is logged, left empty and marked unavailable; the other
    /// list is still used.
    #[must_use]
    pub fn from_results(
        products: Result<Vec<Product>, CatalogError>,
        courses: Result<Vec<Course>, CatalogError>,
    ) -> Self {
        let (products, products_status) = settle("products", products);
        let (courses, courses_status) = settle("courses", courses);

        let mut catalog = Self::new(products, courses);
        catalog.products_status = products_status;
        catalog.courses_status = courses_status;
        catalog
    }

    /// Look up an entry, products first.
    #[must_use]
    pub fn find(&self, id: CatalogItemId) -> Option<CatalogEntry<'_>> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .map(CatalogEntry::Product)
            .or_else(|| {
                self.courses
                    .iter()
                    .find(|c| c.id == id)
                    .map(CatalogEntry::Course)
            })
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub const fn products_status(&self) -> &ListStatus {
        &self.products_status
    }

    #[must_use]
    pub const fn courses_status(&self) -> &ListStatus {
        &self.courses_status
    }

    /// IDs of courses dropped because a product already used them.
    #[must_use]
    pub fn collisions(&self) -> &[CatalogItemId] {
        &self.collisions
    }
}

pub(crate) fn parse_products(json: &str) -> Result<Vec<Product>, CatalogError> {
    serde_json::from_str::<ProductsDocument>(json)
        .map(|doc| doc.resources)
        .map_err(|source| CatalogError::Parse {
            document: "products",
            source,
        })
}

pub(crate) fn parse_courses(json: &str) -> Result<Vec<Course>, CatalogError> {
    serde_json::from_str::<CoursesDocument>(json)
        .map(|doc| doc.courses)
        .map_err(|source| CatalogError::Parse {
            document: "courses",
            source,
        })
}

fn settle<T>(list: &'static str, result: Result<Vec<T>, CatalogError>) -> (Vec<T>, ListStatus) {
    match result {
        Ok(items) => {
            tracing::info!(list, count = items.len(), "Catalog list loaded");
            (items, ListStatus::Loaded)
        }
        Err(e) => {
            tracing::error!(list, error = %e, "Failed to load catalog list");
            (Vec::new(), ListStatus::Unavailable(e.to_string()))
        }
    }
}
