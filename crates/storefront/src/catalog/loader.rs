//! HTTP loader for the catalog documents.

use std::sync::Arc;

use url::Url;

use super::{Catalog, CatalogError, Course, Product, parse_courses, parse_products};
use crate::config::CatalogConfig;

// =============================================================================
// CatalogLoader
// =============================================================================

/// Fetches the products and courses documents from the static file server.
#[derive(Clone)]
pub struct CatalogLoader {
    inner: Arc<CatalogLoaderInner>,
}

struct CatalogLoaderInner {
    client: reqwest::Client,
    products_url: Url,
    courses_url: Url,
}

impl CatalogLoader {
    /// Create a loader for the configured document locations.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Url` if a document path cannot be joined onto
    /// the base URL, or `CatalogError::Http` if the client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let products_url = config.base_url.join(&config.products_path)?;
        let courses_url = config.base_url.join(&config.courses_path)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| CatalogError::Http {
                url: config.base_url.to_string(),
                source,
            })?;

        Ok(Self {
            inner: Arc::new(CatalogLoaderInner {
                client,
                products_url,
                courses_url,
            }),
        })
    }

    #[must_use]
    pub fn products_url(&self) -> &Url {
        &self.inner.products_url
    }

    #[must_use]
    pub fn courses_url(&self) -> &Url {
        &self.inner.courses_url
    }

    /// Fetch the products document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the request fails, the server answers with a
    /// non-success status, or the body is not a `resources` envelope.
    pub async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let body = self.fetch(&self.inner.products_url).await?;
        parse_products(&body)
    }

    /// Fetch the courses document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the request fails, the server answers with a
    /// non-success status, or the body is not a `courses` envelope.
    pub async fn fetch_courses(&self) -> Result<Vec<Course>, CatalogError> {
        let body = self.fetch(&self.inner.courses_url).await?;
        parse_courses(&body)
    }

    /// Fetch both documents concurrently and build the session catalog.
    ///
    /// Never fails: a list that cannot be loaded is left empty and marked
    /// unavailable.
    pub async fn load(&self) -> Catalog {
        let (products, courses) = tokio::join!(self.fetch_products(), self.fetch_courses());
        Catalog::from_results(products, courses)
    }

    async fn fetch(&self, url: &Url) -> Result<String, CatalogError> {
        let http_error = |source| CatalogError::Http {
            url: url.to_string(),
            source,
        };

        let response = self
            .inner
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(url = %url, status = %status, "Catalog document request failed");
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(http_error)
    }
}

impl std::fmt::Debug for CatalogLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogLoader")
            .field("products_url", &self.inner.products_url.as_str())
            .field("courses_url", &self.inner.courses_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config(base: &str) -> CatalogConfig {
        CatalogConfig {
            base_url: Url::parse(base).unwrap(),
            products_path: "resources.json".to_string(),
            courses_path: "courses.json".to_string(),
            timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn test_joins_document_paths() {
        let loader = CatalogLoader::new(&config("http://127.0.0.1:8080/week14441/")).unwrap();
        assert_eq!(
            loader.products_url().as_str(),
            "http://127.0.0.1:8080/week14441/resources.json"
        );
        assert_eq!(
            loader.courses_url().as_str(),
            "http://127.0.0.1:8080/week14441/courses.json"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_marks_lists_unavailable() {
        // Port 9 (discard) is not expected to be listening on loopback.
        let loader = CatalogLoader::new(&config("http://127.0.0.1:9/")).unwrap();

        let err = loader.fetch_products().await.unwrap_err();
        assert!(matches!(err, CatalogError::Http { .. }));

        let catalog = loader.load().await;
        assert!(catalog.products().is_empty());
        assert!(catalog.courses().is_empty());
        assert!(!catalog.products_status().is_loaded());
        assert!(!catalog.courses_status().is_loaded());
    }
}
