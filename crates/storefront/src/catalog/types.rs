//! Catalog entry types and their wire envelopes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tafe_shop_core::{CatalogItemId, Price};

/// A purchasable learning resource (`resources.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: CatalogItemId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
}

/// A purchasable course (`courses.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CatalogItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub assessment: String,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub image: String,
}

/// `{ "resources": [...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductsDocument {
    pub resources: Vec<Product>,
}

/// `{ "courses": [...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoursesDocument {
    pub courses: Vec<Course>,
}

/// Display fields shared by products and courses.
///
/// This is what a cart line copies when an entry is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEntry<'a> {
    Product(&'a Product),
    Course(&'a Course),
}

impl CatalogEntry<'_> {
    #[must_use]
    pub fn id(&self) -> CatalogItemId {
        match self {
            Self::Product(p) => p.id,
            Self::Course(c) => c.id,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Product(p) => &p.name,
            Self::Course(c) => &c.name,
        }
    }

    #[must_use]
    pub fn price(&self) -> Price {
        match self {
            Self::Product(p) => Price::new(p.price),
            Self::Course(c) => Price::new(c.price),
        }
    }

    #[must_use]
    pub fn image(&self) -> &str {
        match self {
            Self::Product(p) => &p.image,
            Self::Course(c) => &c.image,
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Product(p) => &p.description,
            Self::Course(c) => &c.description,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_document_parses_numbers() {
        let doc: ProductsDocument = serde_json::from_str(
            r#"{"resources":[{"id":1,"name":"Workbook","price":19.99,"image":"img/wb.png","description":"Printed"}]}"#,
        )
        .unwrap();
        let product = &doc.resources[0];
        assert_eq!(product.id, CatalogItemId::new(1));
        assert_eq!(product.price, Decimal::new(1999, 2));
    }

    #[test]
    fn test_course_document_integer_price_and_defaults() {
        let doc: CoursesDocument = serde_json::from_str(
            r#"{"courses":[{"id":101,"name":"Cert IV","price":450}]}"#,
        )
        .unwrap();
        let course = &doc.courses[0];
        assert_eq!(course.price, Decimal::from(450));
        assert!(course.projects.is_empty());
        assert_eq!(course.assessment, "");
    }

    #[test]
    fn test_catalog_entry_accessors() {
        let course = Course {
            id: CatalogItemId::new(5),
            name: "Networking".to_string(),
            description: "Routing basics".to_string(),
            price: Decimal::new(120, 0),
            assessment: "Exam".to_string(),
            projects: vec!["Lab".to_string()],
            image: "net.png".to_string(),
        };
        let entry = CatalogEntry::Course(&course);
        assert_eq!(entry.id(), CatalogItemId::new(5));
        assert_eq!(entry.name(), "Networking");
        assert_eq!(entry.price(), Price::from_cents(12000));
        assert_eq!(entry.image(), "net.png");
        assert_eq!(entry.description(), "Routing basics");
    }
}
