//! Navigation targets.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A page of the storefront, addressed by its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Page {
    #[serde(rename = "home.html")]
    Home,
    #[serde(rename = "shopping.html")]
    Shopping,
    #[serde(rename = "courses.html")]
    Courses,
    #[serde(rename = "checkout.html")]
    Checkout,
    #[serde(rename = "order-confirmation.html")]
    OrderConfirmation,
}

impl Page {
    /// Where an unauthenticated visitor is sent, and where logout lands.
    pub const LOGIN: Self = Self::Home;

    /// Where a successful login lands when no redirect target was recorded.
    pub const AFTER_LOGIN: Self = Self::Shopping;

    /// Pages that require a session unless configured otherwise.
    pub const DEFAULT_PROTECTED: [Self; 2] = [Self::Shopping, Self::Checkout];

    /// All pages, in navigation order.
    pub const ALL: [Self; 5] = [
        Self::Home,
        Self::Shopping,
        Self::Courses,
        Self::Checkout,
        Self::OrderConfirmation,
    ];

    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::Home => "home.html",
            Self::Shopping => "shopping.html",
            Self::Courses => "courses.html",
            Self::Checkout => "checkout.html",
            Self::OrderConfirmation => "order-confirmation.html",
        }
    }

    /// Resolve the last path segment of a URL path to a page.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let last = path.rsplit('/').next().unwrap_or(path);
        last.parse().ok()
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

impl std::str::FromStr for Page {
    type Err = String;

    /// Accepts `shopping.html` or the bare `shopping`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|page| {
                let name = page.file_name();
                s == name || Some(s) == name.strip_suffix(".html")
            })
            .ok_or_else(|| format!("unknown page: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_extension() {
        assert_eq!("checkout.html".parse::<Page>().unwrap(), Page::Checkout);
        assert_eq!("order-confirmation".parse::<Page>().unwrap(), Page::OrderConfirmation);
        assert!("admin.html".parse::<Page>().is_err());
    }

    #[test]
    fn test_from_path_uses_last_segment() {
        assert_eq!(Page::from_path("/week14441/shopping.html"), Some(Page::Shopping));
        assert_eq!(Page::from_path("/"), None);
    }

    #[test]
    fn test_serializes_as_file_name() {
        let json = serde_json::to_string(&Page::Checkout).unwrap();
        assert_eq!(json, "\"checkout.html\"");
    }
}
