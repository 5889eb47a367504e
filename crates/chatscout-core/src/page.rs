//! Page capability abstraction
//!
//! This is the only browser-dependent surface of the engine. Everything else
//! (catalog walking, inference, selector synthesis, strategies) is written
//! against [`PageDriver`] and runs unchanged on the Chromium driver, or on an
//! in-memory page in tests.

use crate::error::PageError;
use async_trait::async_trait;

/// DOM query and script-injection capability of a single live page.
///
/// Element-level queries always address the *first* element matching the
/// selector. Drivers must surface malformed selectors and detached pages as
/// errors rather than panicking.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Number of elements matching `selector`.
    async fn count(&self, selector: &str) -> Result<usize, PageError>;

    /// Whether the first match is rendered and visible.
    async fn is_visible(&self, selector: &str) -> Result<bool, PageError>;

    /// Whether the first match is enabled (not `disabled`).
    async fn is_enabled(&self, selector: &str) -> Result<bool, PageError>;

    /// Attribute value on the first match, `None` when absent.
    async fn get_attribute(&self, selector: &str, name: &str)
    -> Result<Option<String>, PageError>;

    /// Evaluate an expression in the page context, awaiting it if it returns
    /// a promise, and return its JSON value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, PageError>;

    /// Add a stylesheet to the page.
    async fn inject_style(&self, _css: &str) -> Result<(), PageError> {
        Err(PageError::NotSupported("inject_style".into()))
    }
}

/// Handle-style view over a selector, mirroring the locator API of browser
/// automation tools.
pub struct Locator<'a> {
    page: &'a dyn PageDriver,
    selector: &'a str,
}

impl<'a> Locator<'a> {
    pub fn new(page: &'a dyn PageDriver, selector: &'a str) -> Self {
        Self { page, selector }
    }

    pub fn selector(&self) -> &str {
        self.selector
    }

    pub async fn count(&self) -> Result<usize, PageError> {
        self.page.count(self.selector).await
    }

    pub fn first(&self) -> FirstMatch<'a> {
        FirstMatch {
            page: self.page,
            selector: self.selector,
        }
    }
}

/// The first element matched by a [`Locator`].
pub struct FirstMatch<'a> {
    page: &'a dyn PageDriver,
    selector: &'a str,
}

impl FirstMatch<'_> {
    pub async fn is_visible(&self) -> Result<bool, PageError> {
        self.page.is_visible(self.selector).await
    }

    pub async fn is_enabled(&self) -> Result<bool, PageError> {
        self.page.is_enabled(self.selector).await
    }

    pub async fn get_attribute(&self, name: &str) -> Result<Option<String>, PageError> {
        self.page.get_attribute(self.selector, name).await
    }
}

/// Convenience constructor, `locator(page, "textarea").count().await`.
pub fn locator<'a>(page: &'a dyn PageDriver, selector: &'a str) -> Locator<'a> {
    Locator::new(page, selector)
}
